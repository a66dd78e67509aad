use super::{
    action::{run, Outcome, Shape},
    ddl::{
        add_column_sql, create_database_sql, create_index_sql, create_table_sql,
        drop_column_sql, drop_database_sql, drop_index_sql, drop_table_sql, ColumnSpec,
        IndexOptions,
    },
    ident::{check_identifier, required_identifier},
    probe::{self, exists, DescribeColumn, Target},
    record::Record,
    reference::{SchemaContext, SchemaReference},
};
use crate::{
    connection::Connection,
    core::{SQLError, SqlType},
};

/// Existence checks and guarded DDL over one connection.
///
/// Schema strings are `"database.table"`, `".table"` or `"table"`; a missing
/// database resolves to the context's current database. Blank or invalid
/// names are rejected before the catalog is touched.
pub struct SchemaManager<'a, C: Connection + ?Sized> {
    conn: &'a C,
    ctx: SchemaContext,
}

impl<'a, C: Connection + ?Sized> SchemaManager<'a, C> {
    pub fn new(conn: &'a C, ctx: SchemaContext) -> Self {
        Self { conn, ctx }
    }

    /// Build a manager whose context is the connection's selected database.
    pub fn detect(conn: &'a C) -> Result<Self, SQLError> {
        let ctx = SchemaContext::detect(conn)?;
        Ok(Self::new(conn, ctx))
    }

    pub fn connection(&self) -> &'a C {
        self.conn
    }

    pub fn context(&self) -> &SchemaContext {
        &self.ctx
    }

    /// Resolve unqualified references against `database` from now on. This
    /// does not change the connection's session.
    pub fn use_database(&mut self, database: &str) -> Result<(), SQLError> {
        let database = required_identifier("database", database)?;
        self.ctx.set_database(Some(database));
        Ok(())
    }

    pub fn resolve(&self, schema: &str) -> Result<SchemaReference, SQLError> {
        self.ctx.resolve(schema)
    }

    // Databases.

    pub fn database_exists(&self, database: &str) -> Result<bool, SQLError> {
        let database = required_identifier("database", database)?;
        exists(self.conn, &Target::Database(database))
    }

    /// Create a database, `AlreadyExists` if it is there.
    pub fn create_database(&self, database: &str) -> Result<Outcome, SQLError> {
        self.database_action(Shape::CreateExclusive, database)
    }

    pub fn create_database_if_not_exist(&self, database: &str) -> Result<Outcome, SQLError> {
        self.database_action(Shape::CreateIfNotExist, database)
    }

    /// Drop a database, `NotExist` if it is not there.
    pub fn drop_database(&self, database: &str) -> Result<Outcome, SQLError> {
        self.database_action(Shape::DropExclusive, database)
    }

    pub fn drop_database_if_exist(&self, database: &str) -> Result<Outcome, SQLError> {
        self.database_action(Shape::DropIfExist, database)
    }

    fn database_action(&self, shape: Shape, database: &str) -> Result<Outcome, SQLError> {
        let database = required_identifier("database", database)?;
        let statement = match shape {
            Shape::CreateIfNotExist => create_database_sql(&database, true),
            Shape::CreateExclusive => create_database_sql(&database, false),
            Shape::DropIfExist => drop_database_sql(&database, true),
            Shape::DropExclusive => drop_database_sql(&database, false),
        };
        run(self.conn, shape, &Target::Database(database), &statement)
    }

    // Tables.

    pub fn table_exists(&self, schema: &str) -> Result<bool, SQLError> {
        let table = self.resolve(schema)?;
        exists(self.conn, &Target::Table(table))
    }

    /// Create the table `record` describes, named after the record, in the
    /// current database. `AlreadyExists` if it is there.
    pub fn create_table(&self, record: &Record) -> Result<Outcome, SQLError> {
        self.create_table_with_schema(record, "")
    }

    pub fn create_table_if_not_exist(&self, record: &Record) -> Result<Outcome, SQLError> {
        self.create_table_with_schema_if_not_exist(record, "")
    }

    /// Create the table `record` describes at `schema`. A blank table part
    /// of `schema` falls back to the record name.
    pub fn create_table_with_schema(
        &self,
        record: &Record,
        schema: &str,
    ) -> Result<Outcome, SQLError> {
        self.create_table_action(Shape::CreateExclusive, record, schema)
    }

    pub fn create_table_with_schema_if_not_exist(
        &self,
        record: &Record,
        schema: &str,
    ) -> Result<Outcome, SQLError> {
        self.create_table_action(Shape::CreateIfNotExist, record, schema)
    }

    fn create_table_action(
        &self,
        shape: Shape,
        record: &Record,
        schema: &str,
    ) -> Result<Outcome, SQLError> {
        let table = self.ctx.resolve_with_default(schema, record.name())?;
        let statement = create_table_sql(&table, record.columns());
        run(self.conn, shape, &Target::Table(table), &statement)
    }

    /// Drop a table, `NotExist` if it is not there.
    pub fn drop_table(&self, schema: &str) -> Result<Outcome, SQLError> {
        let table = self.resolve(schema)?;
        let statement = drop_table_sql(&table, false);
        run(self.conn, Shape::DropExclusive, &Target::Table(table), &statement)
    }

    pub fn drop_table_if_exist(&self, schema: &str) -> Result<Outcome, SQLError> {
        let table = self.resolve(schema)?;
        let statement = drop_table_sql(&table, true);
        run(self.conn, Shape::DropIfExist, &Target::Table(table), &statement)
    }

    // Columns.

    pub fn column_exists(&self, schema: &str, column: &str) -> Result<bool, SQLError> {
        let column = required_identifier("column", column)?;
        let table = self.resolve(schema)?;
        exists(self.conn, &Target::Column(table, column))
    }

    /// Read the catalog description of a column, `None` if it does not exist.
    pub fn describe_column(
        &self,
        schema: &str,
        column: &str,
    ) -> Result<Option<DescribeColumn>, SQLError> {
        let column = required_identifier("column", column)?;
        let table = self.resolve(schema)?;
        probe::describe_column(self.conn, &table, &column)
    }

    /// Add a column of the given type (`"INT"`, `"VARCHAR(20)"`, ...),
    /// `AlreadyExists` if the table has it.
    pub fn create_column(
        &self,
        schema: &str,
        column: &str,
        column_type: &str,
    ) -> Result<Outcome, SQLError> {
        let column = required_identifier("column", column)?;
        if column_type.trim().is_empty() {
            return Err(SQLError::empty_parameter("columnType"));
        }
        let sql_type = column_type.parse::<SqlType>()?;
        self.create_column_with_spec(schema, &ColumnSpec::new(column, sql_type))
    }

    /// Add a column with constraints, `AlreadyExists` if the table has it.
    pub fn create_column_with_spec(
        &self,
        schema: &str,
        spec: &ColumnSpec,
    ) -> Result<Outcome, SQLError> {
        self.add_column_action(Shape::CreateExclusive, schema, spec)
    }

    pub fn create_column_if_not_exist(
        &self,
        schema: &str,
        spec: &ColumnSpec,
    ) -> Result<Outcome, SQLError> {
        self.add_column_action(Shape::CreateIfNotExist, schema, spec)
    }

    fn add_column_action(
        &self,
        shape: Shape,
        schema: &str,
        spec: &ColumnSpec,
    ) -> Result<Outcome, SQLError> {
        check_identifier("column", &spec.name)?;
        let table = self.resolve(schema)?;
        let statement = add_column_sql(&table, spec);
        run(
            self.conn,
            shape,
            &Target::Column(table, spec.name.clone()),
            &statement,
        )
    }

    /// Drop a column, `NotExist` if the table does not have it.
    pub fn drop_column(&self, schema: &str, column: &str) -> Result<Outcome, SQLError> {
        self.drop_column_action(Shape::DropExclusive, schema, column)
    }

    pub fn drop_column_if_exist(&self, schema: &str, column: &str) -> Result<Outcome, SQLError> {
        self.drop_column_action(Shape::DropIfExist, schema, column)
    }

    fn drop_column_action(
        &self,
        shape: Shape,
        schema: &str,
        column: &str,
    ) -> Result<Outcome, SQLError> {
        let column = required_identifier("column", column)?;
        let table = self.resolve(schema)?;
        let statement = drop_column_sql(&table, &column);
        run(self.conn, shape, &Target::Column(table, column), &statement)
    }

    // Indexes.

    pub fn index_exists(&self, schema: &str, index: &str) -> Result<bool, SQLError> {
        let index = required_identifier("index", index)?;
        let table = self.resolve(schema)?;
        exists(self.conn, &Target::Index(table, index))
    }

    /// Create an index over `columns`, `AlreadyExists` if the name is taken.
    pub fn create_index(
        &self,
        schema: &str,
        index: &str,
        columns: &[&str],
        options: IndexOptions,
    ) -> Result<Outcome, SQLError> {
        self.create_index_action(Shape::CreateExclusive, schema, index, columns, options)
    }

    pub fn create_index_if_not_exist(
        &self,
        schema: &str,
        index: &str,
        columns: &[&str],
        options: IndexOptions,
    ) -> Result<Outcome, SQLError> {
        self.create_index_action(Shape::CreateIfNotExist, schema, index, columns, options)
    }

    fn create_index_action(
        &self,
        shape: Shape,
        schema: &str,
        index: &str,
        columns: &[&str],
        options: IndexOptions,
    ) -> Result<Outcome, SQLError> {
        let index = required_identifier("index", index)?;
        if columns.is_empty() {
            return Err(SQLError::empty_parameter("columns"));
        }
        let columns = columns
            .iter()
            .map(|column| required_identifier("column", column))
            .collect::<Result<Vec<_>, _>>()?;
        let table = self.resolve(schema)?;

        let statement = create_index_sql(&table, &index, &columns, options);
        run(self.conn, shape, &Target::Index(table, index), &statement)
    }

    /// Drop an index, `NotExist` if the table does not have it.
    pub fn drop_index(&self, schema: &str, index: &str) -> Result<Outcome, SQLError> {
        self.drop_index_action(Shape::DropExclusive, schema, index)
    }

    pub fn drop_index_if_exist(&self, schema: &str, index: &str) -> Result<Outcome, SQLError> {
        self.drop_index_action(Shape::DropIfExist, schema, index)
    }

    fn drop_index_action(
        &self,
        shape: Shape,
        schema: &str,
        index: &str,
    ) -> Result<Outcome, SQLError> {
        let index = required_identifier("index", index)?;
        let table = self.resolve(schema)?;
        let statement = drop_index_sql(&table, &index);
        run(self.conn, shape, &Target::Index(table, index), &statement)
    }
}
