use std::fmt::Display;

use log::debug;

use super::{ident::check_identifier, probe};
use crate::{
    connection::Connection,
    core::{ErrorKind, SQLError},
};

/// A fully-qualified `(database, object)` pair.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SchemaReference {
    pub database: String,
    pub object: String,
}

impl SchemaReference {
    pub fn new(database: impl Into<String>, object: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            object: object.into(),
        }
    }
}

impl Display for SchemaReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.database, self.object)
    }
}

/// Resolve a `"database.object"`, `".object"` or `"object"` string.
///
/// The string is split on the first `.` and both parts are trimmed. A missing
/// object falls back to `default_object` when one is given, otherwise it is an
/// `EmptyParameter` error, reported before the database is looked up. A
/// missing database is filled in by `current_database`, whose error
/// propagates unchanged.
///
/// `"db.table"` -> `(db, table)`, `".table"` and `"table"` -> `(current, table)`.
pub fn resolve<F>(
    raw: &str,
    default_object: Option<&str>,
    current_database: F,
) -> Result<SchemaReference, SQLError>
where
    F: FnOnce() -> Result<String, SQLError>,
{
    let (database, object) = match raw.split_once('.') {
        Some((database, object)) => (database.trim(), object.trim()),
        None => ("", raw.trim()),
    };

    let object = match (object, default_object) {
        ("", Some(default)) => default.trim(),
        (object, _) => object,
    };
    if object.is_empty() {
        return Err(SQLError::empty_parameter("table"));
    }
    check_identifier("table", object)?;

    let database = if database.is_empty() {
        current_database()?
    } else {
        database.to_string()
    };
    check_identifier("database", &database)?;

    Ok(SchemaReference::new(database, object))
}

/// The database that unqualified references resolve against.
///
/// This is explicit state threaded through every call instead of a lookup of
/// the connection's session state on each resolution.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SchemaContext {
    current_database: Option<String>,
}

impl SchemaContext {
    /// No database selected; only fully-qualified references resolve.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with_database(database: impl Into<String>) -> Self {
        Self {
            current_database: Some(database.into()),
        }
    }

    /// Capture the connection's currently selected database with one query.
    pub fn detect<C: Connection + ?Sized>(conn: &C) -> Result<Self, SQLError> {
        let current_database = probe::current_database(conn)?;
        debug!("Detected current database: {:?}", current_database);
        Ok(Self { current_database })
    }

    pub fn current_database(&self) -> Result<String, SQLError> {
        self.current_database
            .clone()
            .ok_or_else(|| SQLError::new(ErrorKind::NoSelectedDatabase, "no selected database"))
    }

    pub fn set_database(&mut self, database: Option<String>) {
        self.current_database = database;
    }

    pub fn resolve(&self, raw: &str) -> Result<SchemaReference, SQLError> {
        resolve(raw, None, || self.current_database())
    }

    pub fn resolve_with_default(
        &self,
        raw: &str,
        default_object: &str,
    ) -> Result<SchemaReference, SQLError> {
        resolve(raw, Some(default_object), || self.current_database())
    }
}
