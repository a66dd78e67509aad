use self::defs::{
    ColumnDefinition, EventDefinition, IndexDefinition, ProcessDefinition, SchemaDefinition,
    TableDefinition,
};
use crate::core::{BaseType, ErrorKind, SQLError};

pub mod defs;

/// Name of the index backing a primary key.
pub const PRIMARY_INDEX: &str = "PRIMARY";

fn catalog_error(message: impl AsRef<str>) -> SQLError {
    SQLError::new(ErrorKind::CatalogError, message)
}

fn unknown_database(schema_name: &str) -> SQLError {
    catalog_error(format!("Unknown database '{}'", schema_name))
}

fn unknown_table(schema_name: &str, table_name: &str) -> SQLError {
    catalog_error(format!("Table '{}.{}' doesn't exist", schema_name, table_name))
}

fn cant_drop(name: &str) -> SQLError {
    catalog_error(format!(
        "Can't DROP '{}'; check that column/key exists",
        name
    ))
}

/// Definitions of every database the server knows, plus its open sessions.
///
/// Names compare case-insensitively. Mutations either apply completely or
/// leave the catalog untouched.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub schemas: Vec<SchemaDefinition>,
    pub processes: Vec<ProcessDefinition>,
    next_process_id: u64,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` when the schema exists and `if_not_exists` is set.
    pub fn create_schema(
        &mut self,
        schema_name: &str,
        if_not_exists: bool,
    ) -> Result<bool, SQLError> {
        if self.exists_schema(schema_name) {
            if if_not_exists {
                return Ok(false);
            }
            return Err(catalog_error(format!(
                "Can't create database '{}'; database exists",
                schema_name
            )));
        }

        self.schemas.push(SchemaDefinition {
            name: schema_name.to_string(),
            ..Default::default()
        });

        Ok(true)
    }

    pub fn drop_schema(&mut self, schema_name: &str, if_exists: bool) -> Result<bool, SQLError> {
        if !self.exists_schema(schema_name) {
            if if_exists {
                return Ok(false);
            }
            return Err(catalog_error(format!(
                "Can't drop database '{}'; database doesn't exist",
                schema_name
            )));
        }

        self.schemas
            .retain(|schema| !schema.name.eq_ignore_ascii_case(schema_name));

        Ok(true)
    }

    pub fn exists_schema(&self, schema_name: &str) -> bool {
        self.find_schema(schema_name).is_some()
    }

    pub fn list_schemas(&self) -> Vec<String> {
        self.schemas
            .iter()
            .map(|schema| schema.name.clone())
            .collect()
    }

    pub fn find_schema(&self, schema_name: &str) -> Option<&SchemaDefinition> {
        self.schemas
            .iter()
            .find(|schema| schema.name.eq_ignore_ascii_case(schema_name))
    }

    fn schema_mut(&mut self, schema_name: &str) -> Result<&mut SchemaDefinition, SQLError> {
        self.schemas
            .iter_mut()
            .find(|schema| schema.name.eq_ignore_ascii_case(schema_name))
            .ok_or_else(|| unknown_database(schema_name))
    }

    /// Create a table. Primary key and unique columns get their backing
    /// indexes. Returns `false` when the table exists and `if_not_exists`
    /// is set.
    pub fn create_table(
        &mut self,
        schema_name: &str,
        table_def: &TableDefinition,
        if_not_exists: bool,
    ) -> Result<bool, SQLError> {
        let schema = self.schema_mut(schema_name)?;

        if schema
            .tables
            .iter()
            .any(|table| table.name.eq_ignore_ascii_case(&table_def.name))
        {
            if if_not_exists {
                return Ok(false);
            }
            return Err(catalog_error(format!(
                "Table '{}' already exists",
                table_def.name
            )));
        }

        if table_def.columns.is_empty() {
            return Err(catalog_error("A table must have at least 1 column"));
        }

        let mut table = TableDefinition::new(&table_def.name);
        for column in &table_def.columns {
            add_column_to(&mut table, column.clone())?;
        }
        for index in &table_def.indexes {
            add_index_to(&mut table, index.clone())?;
        }

        schema.tables.push(table);

        Ok(true)
    }

    pub fn drop_table(
        &mut self,
        schema_name: &str,
        table_name: &str,
        if_exists: bool,
    ) -> Result<bool, SQLError> {
        let schema = self.schema_mut(schema_name)?;

        if !schema
            .tables
            .iter()
            .any(|table| table.name.eq_ignore_ascii_case(table_name))
        {
            if if_exists {
                return Ok(false);
            }
            return Err(catalog_error(format!(
                "Unknown table '{}.{}'",
                schema_name, table_name
            )));
        }

        schema
            .tables
            .retain(|table| !table.name.eq_ignore_ascii_case(table_name));

        Ok(true)
    }

    pub fn list_tables(&self, schema_name: &str) -> Result<Vec<String>, SQLError> {
        let schema = self
            .find_schema(schema_name)
            .ok_or_else(|| unknown_database(schema_name))?;

        Ok(schema.tables.iter().map(|table| table.name.clone()).collect())
    }

    pub fn find_table_by_name(
        &self,
        schema_name: &str,
        table_name: &str,
    ) -> Option<&TableDefinition> {
        self.find_schema(schema_name).and_then(|schema| {
            schema
                .tables
                .iter()
                .find(|table| table.name.eq_ignore_ascii_case(table_name))
        })
    }

    fn table_mut(
        &mut self,
        schema_name: &str,
        table_name: &str,
    ) -> Result<&mut TableDefinition, SQLError> {
        self.schema_mut(schema_name)?
            .tables
            .iter_mut()
            .find(|table| table.name.eq_ignore_ascii_case(table_name))
            .ok_or_else(|| unknown_table(schema_name, table_name))
    }

    pub fn add_column(
        &mut self,
        schema_name: &str,
        table_name: &str,
        column: ColumnDefinition,
    ) -> Result<(), SQLError> {
        let table = self.table_mut(schema_name, table_name)?;

        // Work on a copy so a rejected column leaves the table as it was.
        let mut altered = table.clone();
        add_column_to(&mut altered, column)?;
        *table = altered;

        Ok(())
    }

    pub fn drop_column(
        &mut self,
        schema_name: &str,
        table_name: &str,
        column_name: &str,
    ) -> Result<(), SQLError> {
        let table = self.table_mut(schema_name, table_name)?;

        if table.find_column(column_name).is_none() {
            return Err(cant_drop(column_name));
        }
        if table.columns.len() == 1 {
            return Err(catalog_error(
                "You can't delete all columns with ALTER TABLE; use DROP TABLE instead",
            ));
        }

        table
            .columns
            .retain(|column| !column.name.eq_ignore_ascii_case(column_name));
        for index in table.indexes.iter_mut() {
            index
                .columns
                .retain(|column| !column.eq_ignore_ascii_case(column_name));
        }
        table.indexes.retain(|index| !index.columns.is_empty());

        Ok(())
    }

    pub fn create_index(
        &mut self,
        schema_name: &str,
        table_name: &str,
        index: IndexDefinition,
    ) -> Result<(), SQLError> {
        let table = self.table_mut(schema_name, table_name)?;
        add_index_to(table, index)
    }

    pub fn drop_index(
        &mut self,
        schema_name: &str,
        table_name: &str,
        index_name: &str,
    ) -> Result<(), SQLError> {
        let table = self.table_mut(schema_name, table_name)?;

        if table.find_index(index_name).is_none() {
            return Err(cant_drop(index_name));
        }

        table
            .indexes
            .retain(|index| !index.name.eq_ignore_ascii_case(index_name));

        Ok(())
    }

    /// Register a scheduled event. Events have no DDL surface here, so this
    /// is how they enter the catalog.
    pub fn create_event(
        &mut self,
        schema_name: &str,
        event_name: &str,
        status: &str,
    ) -> Result<(), SQLError> {
        let schema = self.schema_mut(schema_name)?;

        if schema
            .events
            .iter()
            .any(|event| event.name.eq_ignore_ascii_case(event_name))
        {
            return Err(catalog_error(format!(
                "Event '{}' already exists",
                event_name
            )));
        }

        schema.events.push(EventDefinition {
            name: event_name.to_string(),
            status: status.to_ascii_uppercase(),
        });

        Ok(())
    }

    /// Register a session and return its id.
    pub fn open_process(&mut self) -> u64 {
        self.next_process_id += 1;
        self.processes.push(ProcessDefinition {
            id: self.next_process_id,
            database: None,
        });
        self.next_process_id
    }

    pub fn set_process_database(&mut self, id: u64, database: Option<String>) {
        if let Some(process) = self.processes.iter_mut().find(|p| p.id == id) {
            process.database = database;
        }
    }

    pub fn close_process(&mut self, id: u64) {
        self.processes.retain(|process| process.id != id);
    }
}

fn add_column_to(table: &mut TableDefinition, column: ColumnDefinition) -> Result<(), SQLError> {
    if table.find_column(&column.name).is_some() {
        return Err(catalog_error(format!(
            "Duplicate column name '{}'",
            column.name
        )));
    }
    if column.auto_increment && !column.data_type.base.is_integer() {
        return Err(catalog_error(format!(
            "Incorrect column specifier for column '{}'",
            column.name
        )));
    }
    if !default_fits(&column) {
        return Err(catalog_error(format!(
            "Invalid default value for '{}'",
            column.name
        )));
    }

    if column.primary_key {
        if table.find_index(PRIMARY_INDEX).is_some() {
            return Err(catalog_error("Multiple primary key defined"));
        }
        table.indexes.push(IndexDefinition {
            name: PRIMARY_INDEX.to_string(),
            columns: vec![column.name.clone()],
            unique: true,
            fulltext: false,
        });
    }
    if column.unique {
        let name = free_index_name(table, &column.name);
        table.indexes.push(IndexDefinition {
            name,
            columns: vec![column.name.clone()],
            unique: true,
            fulltext: false,
        });
    }

    table.columns.push(column);

    Ok(())
}

fn add_index_to(table: &mut TableDefinition, index: IndexDefinition) -> Result<(), SQLError> {
    if table.find_index(&index.name).is_some() {
        return Err(catalog_error(format!(
            "Duplicate key name '{}'",
            index.name
        )));
    }

    for name in &index.columns {
        let column = table.find_column(name).ok_or_else(|| {
            catalog_error(format!("Key column '{}' doesn't exist in table", name))
        })?;
        if index.fulltext && !column.data_type.base.is_character() {
            return Err(catalog_error(format!(
                "Column '{}' cannot be part of FULLTEXT index",
                name
            )));
        }
    }

    table.indexes.push(index);

    Ok(())
}

/// A string default must fit the declared length. `CHAR` alone is `CHAR(1)`.
fn default_fits(column: &ColumnDefinition) -> bool {
    let data_type = column.data_type;
    let limit = match data_type.base {
        BaseType::Char => data_type.size.or(Some(1)),
        BaseType::Varchar => data_type.size,
        _ => None,
    };
    match (&column.default, limit) {
        (Some(default), Some(limit)) => default.chars().count() <= limit as usize,
        _ => true,
    }
}

/// `base`, or `base_2`, `base_3`, ... when the name is taken.
fn free_index_name(table: &TableDefinition, base: &str) -> String {
    if table.find_index(base).is_none() {
        return base.to_string();
    }
    (2..)
        .map(|n| format!("{}_{}", base, n))
        .find(|name| table.find_index(name).is_none())
        .unwrap_or_else(|| base.to_string())
}
