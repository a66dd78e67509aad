use std::fmt::Display;

use crate::{
    catalog::defs::{ColumnDefinition, IndexDefinition},
    core::Datum,
};

/// `name` or `schema.name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectName {
    pub schema: Option<String>,
    pub name: String,
}

impl Display for ObjectName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.schema {
            Some(schema) => write!(f, "{}.{}", schema, self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    /// Create database with the given name.
    CreateDatabase { name: String, if_not_exists: bool },
    DropDatabase { name: String, if_exists: bool },
    CreateTable {
        name: ObjectName,
        if_not_exists: bool,
        columns: Vec<ColumnDefinition>,
    },
    DropTable { name: ObjectName, if_exists: bool },
    /// `ALTER TABLE .. ADD [COLUMN] ..`
    AddColumn {
        table: ObjectName,
        column: ColumnDefinition,
    },
    /// `ALTER TABLE .. DROP [COLUMN] ..`
    DropColumn { table: ObjectName, column: String },
    CreateIndex {
        table: ObjectName,
        index: IndexDefinition,
    },
    DropIndex { table: ObjectName, name: String },
    /// Select the current database of the session.
    Use(String),
    Select(Select),
}

impl Statement {
    pub fn is_query(&self) -> bool {
        matches!(self, Statement::Select(_))
    }
}

/// A filtered read of one catalog view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Select {
    pub projection: Projection,
    pub view: ObjectName,
    /// Conjunction of equality filters.
    pub filters: Vec<Filter>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Projection {
    Wildcard,
    Columns(Vec<String>),
    /// `COUNT(*)` or `COUNT(<constant>)`.
    Count,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub column: String,
    pub operand: Operand,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    /// The n-th `?` of the statement, zero based.
    Placeholder(usize),
    Literal(Datum),
    /// `DATABASE()`
    CurrentDatabase,
}
