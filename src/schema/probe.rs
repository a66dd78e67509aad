use std::fmt::Display;

use log::debug;

use super::reference::SchemaReference;
use crate::{
    connection::Connection,
    core::{Datum, ErrorKind, SQLError, Tuple},
};

pub const DATABASE_EXISTS_SQL: &str = "SELECT SCHEMA_NAME \
     FROM information_schema.SCHEMATA \
     WHERE SCHEMA_NAME = ?";

pub const TABLE_EXISTS_SQL: &str = "SELECT TABLE_NAME \
     FROM information_schema.TABLES \
     WHERE TABLE_SCHEMA = ? AND TABLE_NAME = ?";

pub const COLUMN_EXISTS_SQL: &str = "SELECT COLUMN_NAME \
     FROM information_schema.COLUMNS \
     WHERE TABLE_SCHEMA = ? AND TABLE_NAME = ? AND COLUMN_NAME = ?";

pub const INDEX_EXISTS_SQL: &str = "SELECT INDEX_NAME \
     FROM information_schema.STATISTICS \
     WHERE TABLE_SCHEMA = ? AND TABLE_NAME = ? AND INDEX_NAME = ?";

pub const EVENT_EXISTS_SQL: &str = "SELECT EVENT_NAME \
     FROM information_schema.EVENTS \
     WHERE EVENT_SCHEMA = ? AND EVENT_NAME = ?";

pub const CURRENT_DATABASE_SQL: &str = "SELECT SCHEMA_NAME \
     FROM information_schema.SCHEMATA \
     WHERE SCHEMA_NAME = DATABASE()";

pub const DESCRIBE_COLUMN_SQL: &str = "SELECT ORDINAL_POSITION, COLUMN_DEFAULT, IS_NULLABLE, \
     DATA_TYPE, CHARACTER_MAXIMUM_LENGTH, NUMERIC_PRECISION, NUMERIC_SCALE, \
     DATETIME_PRECISION, COLUMN_TYPE, COLUMN_KEY, EXTRA, COLUMN_COMMENT, GENERATION_EXPRESSION \
     FROM information_schema.COLUMNS \
     WHERE TABLE_SCHEMA = ? AND TABLE_NAME = ? AND COLUMN_NAME = ?";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ObjectKind {
    Database,
    Table,
    Column,
    Index,
    Event,
}

impl Display for ObjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ObjectKind::Database => write!(f, "database"),
            ObjectKind::Table => write!(f, "table"),
            ObjectKind::Column => write!(f, "column"),
            ObjectKind::Index => write!(f, "index"),
            ObjectKind::Event => write!(f, "event"),
        }
    }
}

/// A resolved object whose existence can be checked in the catalog.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Target {
    Database(String),
    Table(SchemaReference),
    Column(SchemaReference, String),
    Index(SchemaReference, String),
    /// Events live directly in a database; the reference's object is the
    /// event name.
    Event(SchemaReference),
}

impl Target {
    pub fn kind(&self) -> ObjectKind {
        match self {
            Target::Database(_) => ObjectKind::Database,
            Target::Table(_) => ObjectKind::Table,
            Target::Column(..) => ObjectKind::Column,
            Target::Index(..) => ObjectKind::Index,
            Target::Event(_) => ObjectKind::Event,
        }
    }

    fn existence_query(&self) -> (&'static str, Vec<Datum>) {
        match self {
            Target::Database(database) => (DATABASE_EXISTS_SQL, vec![database.as_str().into()]),
            Target::Table(table) => (
                TABLE_EXISTS_SQL,
                vec![table.database.as_str().into(), table.object.as_str().into()],
            ),
            Target::Column(table, column) => (
                COLUMN_EXISTS_SQL,
                vec![
                    table.database.as_str().into(),
                    table.object.as_str().into(),
                    column.as_str().into(),
                ],
            ),
            Target::Index(table, index) => (
                INDEX_EXISTS_SQL,
                vec![
                    table.database.as_str().into(),
                    table.object.as_str().into(),
                    index.as_str().into(),
                ],
            ),
            Target::Event(event) => (
                EVENT_EXISTS_SQL,
                vec![event.database.as_str().into(), event.object.as_str().into()],
            ),
        }
    }
}

impl Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Target::Database(database) => write!(f, "database {}", database),
            Target::Table(table) => write!(f, "table {}", table),
            Target::Column(table, column) => write!(f, "column {} of {}", column, table),
            Target::Index(table, index) => write!(f, "index {} on {}", index, table),
            Target::Event(event) => write!(f, "event {}", event),
        }
    }
}

/// Run a catalog query, wrapping engine failures so they are never mistaken
/// for an empty result.
pub fn query_catalog<C: Connection + ?Sized>(
    conn: &C,
    sql: &str,
    params: &[Datum],
    what: impl Display,
) -> Result<Option<Tuple>, SQLError> {
    conn.query_row(sql, params).map_err(|e| {
        SQLError::wrap(
            ErrorKind::CatalogQueryFailed,
            format!("failed to query catalog for {}", what),
            e,
        )
    })
}

/// Check whether `target` exists: no row means absent, a row means present,
/// a failed query is an error.
pub fn exists<C: Connection + ?Sized>(conn: &C, target: &Target) -> Result<bool, SQLError> {
    let (sql, params) = target.existence_query();
    let present = query_catalog(conn, sql, &params, target)?.is_some();

    debug!("Probed {}: {}", target, if present { "present" } else { "absent" });

    Ok(present)
}

/// The connection's currently selected database, `None` when nothing is
/// selected.
pub fn current_database<C: Connection + ?Sized>(conn: &C) -> Result<Option<String>, SQLError> {
    let row = query_catalog(conn, CURRENT_DATABASE_SQL, &[], "current database")?;
    Ok(row.and_then(|row| row.get(0).and_then(Datum::to_text)))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColumnKey {
    None,
    Primary,
    Unique,
    /// First column of a non-unique index.
    Multiple,
}

impl ColumnKey {
    pub fn parse(value: &str) -> Self {
        match value {
            "PRI" => ColumnKey::Primary,
            "UNI" => ColumnKey::Unique,
            "MUL" => ColumnKey::Multiple,
            _ => ColumnKey::None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnKey::None => "",
            ColumnKey::Primary => "PRI",
            ColumnKey::Unique => "UNI",
            ColumnKey::Multiple => "MUL",
        }
    }
}

/// Catalog snapshot of one column.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DescribeColumn {
    pub ordinal_position: u64,
    pub default: Option<String>,
    pub nullable: bool,
    pub data_type: String,
    pub character_maximum_length: Option<u64>,
    pub numeric_precision: Option<u64>,
    pub numeric_scale: Option<u64>,
    pub datetime_precision: Option<u64>,
    pub column_type: String,
    pub key: ColumnKey,
    pub extra: String,
    pub comment: String,
    pub generation_expression: String,
}

impl TryFrom<&Tuple> for DescribeColumn {
    type Error = SQLError;

    fn try_from(row: &Tuple) -> Result<Self, Self::Error> {
        let malformed = |index: usize, what: &str| {
            SQLError::new(
                ErrorKind::CatalogQueryFailed,
                format!("column description field {} is {}", index, what),
            )
        };
        let field = |index: usize| row.get(index).ok_or_else(|| malformed(index, "missing"));
        let text = |index: usize| -> Result<String, SQLError> {
            field(index)?
                .to_text()
                .ok_or_else(|| malformed(index, "NULL"))
        };
        let number = |index: usize| -> Result<Option<u64>, SQLError> {
            let datum = field(index)?;
            if datum.is_null() {
                return Ok(None);
            }
            datum
                .to_u64()
                .map(Some)
                .ok_or_else(|| malformed(index, "not a number"))
        };

        Ok(DescribeColumn {
            ordinal_position: number(0)?.ok_or_else(|| malformed(0, "NULL"))?,
            default: field(1)?.to_text(),
            nullable: text(2)?.eq_ignore_ascii_case("YES"),
            data_type: text(3)?,
            character_maximum_length: number(4)?,
            numeric_precision: number(5)?,
            numeric_scale: number(6)?,
            datetime_precision: number(7)?,
            column_type: text(8)?,
            key: ColumnKey::parse(&text(9)?),
            extra: text(10)?,
            comment: text(11)?,
            generation_expression: text(12)?,
        })
    }
}

/// Read the catalog row of `column`, `None` when the column does not exist.
pub fn describe_column<C: Connection + ?Sized>(
    conn: &C,
    table: &SchemaReference,
    column: &str,
) -> Result<Option<DescribeColumn>, SQLError> {
    let target = Target::Column(table.clone(), column.to_string());
    let params: [Datum; 3] = [
        table.database.as_str().into(),
        table.object.as_str().into(),
        column.into(),
    ];

    query_catalog(conn, DESCRIBE_COLUMN_SQL, &params, &target)?
        .as_ref()
        .map(DescribeColumn::try_from)
        .transpose()
}

/// Run a `COUNT` query and read its single value.
pub fn count<C: Connection + ?Sized>(
    conn: &C,
    sql: &str,
    params: &[Datum],
    what: impl Display,
) -> Result<u64, SQLError> {
    let row = query_catalog(conn, sql, params, &what)?;
    row.and_then(|row| row.get(0).and_then(Datum::to_u64))
        .ok_or_else(|| {
            SQLError::new(
                ErrorKind::CatalogQueryFailed,
                format!("count of {} returned no value", what),
            )
        })
}
