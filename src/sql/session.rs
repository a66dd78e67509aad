use std::sync::{Arc, Mutex, MutexGuard};

use log::debug;

use super::{
    information_schema::{ViewRegistry, INFORMATION_SCHEMA},
    parser::parse_sql,
    statement::{ObjectName, Operand, Projection, Select, Statement},
};
use crate::{
    catalog::{defs::TableDefinition, Catalog},
    connection::Connection,
    core::{Datum, ErrorKind, SQLError, Tuple},
};

/// Kind of SQL statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SQLKind {
    Query,
    Execute,
}

#[derive(Debug, Clone)]
pub struct QueryResult {
    pub fields: Vec<String>,
    pub data: Vec<Tuple>,
    pub kind: SQLKind,
}

impl QueryResult {
    fn executed() -> Self {
        Self {
            fields: vec![],
            data: vec![],
            kind: SQLKind::Execute,
        }
    }
}

/// One client connection to the shared catalog, with its own current
/// database. Listed in PROCESSLIST until dropped.
pub struct Session {
    catalog: Arc<Mutex<Catalog>>,
    id: u64,
    current_schema: Mutex<Option<String>>,
}

fn poisoned<T>(_: T) -> SQLError {
    SQLError::new(ErrorKind::RuntimeError, "catalog lock poisoned")
}

impl Session {
    pub fn new(catalog: Arc<Mutex<Catalog>>) -> Result<Self, SQLError> {
        let id = catalog.lock().map_err(poisoned)?.open_process();
        Ok(Self {
            catalog,
            id,
            current_schema: Mutex::new(None),
        })
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn current_schema(&self) -> Result<Option<String>, SQLError> {
        Ok(self.current_schema.lock().map_err(poisoned)?.clone())
    }

    fn catalog(&self) -> Result<MutexGuard<'_, Catalog>, SQLError> {
        self.catalog.lock().map_err(poisoned)
    }

    /// Run a statement without parameters.
    pub fn execute(&self, sql_text: &str) -> Result<QueryResult, SQLError> {
        self.execute_with_params(sql_text, &[])
    }

    pub fn execute_with_params(
        &self,
        sql_text: &str,
        params: &[Datum],
    ) -> Result<QueryResult, SQLError> {
        debug!("Executing SQL: {}", sql_text);

        let (statement, placeholders) = parse_sql(sql_text)?;
        if placeholders != params.len() {
            return Err(SQLError::new(
                ErrorKind::ParseError,
                format!(
                    "statement has {} placeholders but {} parameters were bound",
                    placeholders,
                    params.len()
                ),
            ));
        }

        match statement {
            Statement::Select(select) => self.select(&select, params),
            Statement::Use(schema_name) => {
                let mut catalog = self.catalog()?;
                let schema = catalog
                    .find_schema(&schema_name)
                    .map(|schema| schema.name.clone())
                    .ok_or_else(|| {
                        SQLError::new(
                            ErrorKind::CatalogError,
                            format!("Unknown database '{}'", schema_name),
                        )
                    })?;
                catalog.set_process_database(self.id, Some(schema.clone()));
                *self.current_schema.lock().map_err(poisoned)? = Some(schema);
                Ok(QueryResult::executed())
            }
            ddl => {
                self.execute_ddl(ddl)?;
                Ok(QueryResult::executed())
            }
        }
    }

    fn schema_of(&self, name: &ObjectName) -> Result<String, SQLError> {
        match &name.schema {
            Some(schema) => Ok(schema.clone()),
            None => self.current_schema()?.ok_or_else(|| {
                SQLError::new(ErrorKind::CatalogError, "No database selected")
            }),
        }
    }

    fn execute_ddl(&self, statement: Statement) -> Result<(), SQLError> {
        let mut catalog = self.catalog()?;

        match statement {
            Statement::CreateDatabase {
                name,
                if_not_exists,
            } => {
                catalog.create_schema(&name, if_not_exists)?;
            }
            Statement::DropDatabase { name, if_exists } => {
                if catalog.drop_schema(&name, if_exists)? {
                    let mut current = self.current_schema.lock().map_err(poisoned)?;
                    if current
                        .as_deref()
                        .map_or(false, |c| c.eq_ignore_ascii_case(&name))
                    {
                        *current = None;
                        catalog.set_process_database(self.id, None);
                    }
                }
            }
            Statement::CreateTable {
                name,
                if_not_exists,
                columns,
            } => {
                let schema = self.schema_of(&name)?;
                let table = TableDefinition {
                    name: name.name,
                    columns,
                    indexes: vec![],
                };
                catalog.create_table(&schema, &table, if_not_exists)?;
            }
            Statement::DropTable { name, if_exists } => {
                let schema = self.schema_of(&name)?;
                catalog.drop_table(&schema, &name.name, if_exists)?;
            }
            Statement::AddColumn { table, column } => {
                let schema = self.schema_of(&table)?;
                catalog.add_column(&schema, &table.name, column)?;
            }
            Statement::DropColumn { table, column } => {
                let schema = self.schema_of(&table)?;
                catalog.drop_column(&schema, &table.name, &column)?;
            }
            Statement::CreateIndex { table, index } => {
                let schema = self.schema_of(&table)?;
                catalog.create_index(&schema, &table.name, index)?;
            }
            Statement::DropIndex { table, name } => {
                let schema = self.schema_of(&table)?;
                catalog.drop_index(&schema, &table.name, &name)?;
            }
            Statement::Use(_) | Statement::Select(_) => {
                return Err(SQLError::new(
                    ErrorKind::RuntimeError,
                    "not a DDL statement",
                ))
            }
        }

        Ok(())
    }

    fn select(&self, select: &Select, params: &[Datum]) -> Result<QueryResult, SQLError> {
        let view = match &select.view.schema {
            Some(schema) if schema.eq_ignore_ascii_case(INFORMATION_SCHEMA) => {
                ViewRegistry::builtin().lookup(&select.view.name)
            }
            _ => None,
        }
        .ok_or_else(|| {
            SQLError::new(
                ErrorKind::CatalogError,
                format!("Table '{}' doesn't exist", select.view),
            )
        })?;

        let current_schema = self.current_schema()?;
        let filters = select
            .filters
            .iter()
            .map(|filter| {
                let index = view.column_index(&filter.column)?;
                let value = match &filter.operand {
                    Operand::Placeholder(i) => params[*i].clone(),
                    Operand::Literal(datum) => datum.clone(),
                    Operand::CurrentDatabase => Datum::from(current_schema.clone()),
                };
                Ok((index, value))
            })
            .collect::<Result<Vec<_>, SQLError>>()?;

        let rows = {
            let catalog = self.catalog()?;
            (view.rows)(&catalog)
        };
        let rows = rows
            .into_iter()
            .filter(|row| {
                filters
                    .iter()
                    .all(|(index, value)| row.values[*index].matches(value))
            })
            .collect::<Vec<_>>();

        let (fields, data): (Vec<String>, Vec<Tuple>) = match &select.projection {
            Projection::Wildcard => (
                view.columns.iter().map(|c| c.to_string()).collect(),
                rows,
            ),
            Projection::Columns(columns) => {
                let indices = columns
                    .iter()
                    .map(|column| view.column_index(column))
                    .collect::<Result<Vec<_>, _>>()?;
                let fields = indices.iter().map(|i| view.columns[*i].to_string()).collect();
                let data = rows.iter().map(|row| row.project(&indices)).collect();
                (fields, data)
            }
            Projection::Count => (
                vec!["COUNT(0)".to_string()],
                vec![Tuple::new(vec![Datum::Int(rows.len() as i64)])],
            ),
        };

        Ok(QueryResult {
            fields,
            data,
            kind: SQLKind::Query,
        })
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if let Ok(mut catalog) = self.catalog.lock() {
            catalog.close_process(self.id);
        }
    }
}

impl Connection for Session {
    fn query_row(&self, sql: &str, params: &[Datum]) -> Result<Option<Tuple>, SQLError> {
        let result = self.execute_with_params(sql, params)?;
        Ok(result.data.into_iter().next())
    }

    fn execute(&self, sql: &str) -> Result<u64, SQLError> {
        let result = Session::execute(self, sql)?;
        Ok(result.data.len() as u64)
    }
}
