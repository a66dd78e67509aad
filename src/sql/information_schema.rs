use std::collections::HashMap;

use crate::{
    catalog::{
        defs::{ColumnDefinition, TableDefinition},
        Catalog,
    },
    core::{BaseType, Datum, ErrorKind, SQLError, Tuple},
};

pub const INFORMATION_SCHEMA: &str = "information_schema";

const CATALOG_NAME: &str = "def";

lazy_static! {
    static ref BUILTIN_VIEWS: ViewRegistry = {
        let mut registry = ViewRegistry::default();

        registry.register(
            "SCHEMATA",
            &[
                "CATALOG_NAME",
                "SCHEMA_NAME",
                "DEFAULT_CHARACTER_SET_NAME",
                "DEFAULT_COLLATION_NAME",
            ],
            schemata,
        );
        registry.register(
            "TABLES",
            &[
                "TABLE_CATALOG",
                "TABLE_SCHEMA",
                "TABLE_NAME",
                "TABLE_TYPE",
                "ENGINE",
            ],
            tables,
        );
        registry.register(
            "COLUMNS",
            &[
                "TABLE_CATALOG",
                "TABLE_SCHEMA",
                "TABLE_NAME",
                "COLUMN_NAME",
                "ORDINAL_POSITION",
                "COLUMN_DEFAULT",
                "IS_NULLABLE",
                "DATA_TYPE",
                "CHARACTER_MAXIMUM_LENGTH",
                "NUMERIC_PRECISION",
                "NUMERIC_SCALE",
                "DATETIME_PRECISION",
                "COLUMN_TYPE",
                "COLUMN_KEY",
                "EXTRA",
                "COLUMN_COMMENT",
                "GENERATION_EXPRESSION",
            ],
            columns,
        );
        registry.register(
            "STATISTICS",
            &[
                "TABLE_CATALOG",
                "TABLE_SCHEMA",
                "TABLE_NAME",
                "NON_UNIQUE",
                "INDEX_NAME",
                "SEQ_IN_INDEX",
                "COLUMN_NAME",
                "INDEX_TYPE",
            ],
            statistics,
        );
        registry.register(
            "EVENTS",
            &["EVENT_CATALOG", "EVENT_SCHEMA", "EVENT_NAME", "STATUS"],
            events,
        );
        registry.register(
            "PROCESSLIST",
            &["ID", "USER", "HOST", "DB", "COMMAND"],
            processlist,
        );
        // Transactions are not modelled, the view is always empty.
        registry.register("INNODB_TRX", &["TRX_ID", "TRX_STATE"], |_| vec![]);

        registry
    };
}

pub struct View {
    pub name: &'static str,
    pub columns: &'static [&'static str],
    pub rows: fn(&Catalog) -> Vec<Tuple>,
}

impl View {
    /// Position of a column, matched case-insensitively.
    pub fn column_index(&self, column: &str) -> Result<usize, SQLError> {
        self.columns
            .iter()
            .position(|c| c.eq_ignore_ascii_case(column))
            .ok_or_else(|| {
                SQLError::new(
                    ErrorKind::CatalogError,
                    format!("Unknown column '{}' in '{}'", column, self.name),
                )
            })
    }
}

#[derive(Default)]
pub struct ViewRegistry {
    /// upper-cased view name -> view
    pub views: HashMap<String, View>,
}

impl ViewRegistry {
    pub fn builtin() -> &'static ViewRegistry {
        &BUILTIN_VIEWS
    }

    pub fn register(
        &mut self,
        name: &'static str,
        columns: &'static [&'static str],
        rows: fn(&Catalog) -> Vec<Tuple>,
    ) {
        self.views
            .insert(name.to_string(), View { name, columns, rows });
    }

    pub fn lookup(&self, name: &str) -> Option<&View> {
        self.views.get(&name.to_ascii_uppercase())
    }
}

fn text(value: &str) -> Datum {
    Datum::from(value)
}

fn int(value: usize) -> Datum {
    Datum::Int(value as i64)
}

fn schemata(catalog: &Catalog) -> Vec<Tuple> {
    catalog
        .schemas
        .iter()
        .map(|schema| {
            Tuple::new(vec![
                text(CATALOG_NAME),
                text(&schema.name),
                text("utf8mb4"),
                text("utf8mb4_0900_ai_ci"),
            ])
        })
        .collect()
}

fn tables(catalog: &Catalog) -> Vec<Tuple> {
    let mut rows = vec![];
    for schema in &catalog.schemas {
        for table in &schema.tables {
            rows.push(Tuple::new(vec![
                text(CATALOG_NAME),
                text(&schema.name),
                text(&table.name),
                text("BASE TABLE"),
                text("InnoDB"),
            ]));
        }
    }
    rows
}

fn columns(catalog: &Catalog) -> Vec<Tuple> {
    let mut rows = vec![];
    for schema in &catalog.schemas {
        for table in &schema.tables {
            for (position, column) in table.columns.iter().enumerate() {
                rows.push(column_row(&schema.name, table, position + 1, column));
            }
        }
    }
    rows
}

fn column_row(
    schema_name: &str,
    table: &TableDefinition,
    position: usize,
    column: &ColumnDefinition,
) -> Tuple {
    let data_type = column.data_type;
    let base = data_type.base;

    let character_maximum_length = match base {
        BaseType::Char => Datum::Int(i64::from(data_type.size.unwrap_or(1))),
        BaseType::Varchar => Datum::from(data_type.size.map(i64::from)),
        BaseType::Text => Datum::Int(65535),
        _ => Datum::Null,
    };
    let (numeric_precision, numeric_scale) = match base {
        BaseType::TinyInt => (Datum::Int(3), Datum::Int(0)),
        BaseType::SmallInt => (Datum::Int(5), Datum::Int(0)),
        BaseType::Int => (Datum::Int(10), Datum::Int(0)),
        BaseType::BigInt => (Datum::Int(19), Datum::Int(0)),
        BaseType::Float => (Datum::Int(12), Datum::Null),
        BaseType::Double => (Datum::Int(22), Datum::Null),
        _ => (Datum::Null, Datum::Null),
    };
    let datetime_precision = match base {
        BaseType::Datetime | BaseType::Timestamp => Datum::Int(0),
        _ => Datum::Null,
    };

    Tuple::new(vec![
        text(CATALOG_NAME),
        text(schema_name),
        text(&table.name),
        text(&column.name),
        int(position),
        Datum::from(column.default.clone()),
        text(if column.nullable() { "YES" } else { "NO" }),
        text(&base.keyword().to_ascii_lowercase()),
        character_maximum_length,
        numeric_precision,
        numeric_scale,
        datetime_precision,
        text(&data_type.to_string().to_ascii_lowercase()),
        text(table.column_key(&column.name)),
        text(if column.auto_increment {
            "auto_increment"
        } else {
            ""
        }),
        text(&column.comment),
        text(""),
    ])
}

fn statistics(catalog: &Catalog) -> Vec<Tuple> {
    let mut rows = vec![];
    for schema in &catalog.schemas {
        for table in &schema.tables {
            for index in &table.indexes {
                for (seq, column) in index.columns.iter().enumerate() {
                    rows.push(Tuple::new(vec![
                        text(CATALOG_NAME),
                        text(&schema.name),
                        text(&table.name),
                        int(usize::from(!index.unique)),
                        text(&index.name),
                        int(seq + 1),
                        text(column),
                        text(if index.fulltext { "FULLTEXT" } else { "BTREE" }),
                    ]));
                }
            }
        }
    }
    rows
}

fn events(catalog: &Catalog) -> Vec<Tuple> {
    let mut rows = vec![];
    for schema in &catalog.schemas {
        for event in &schema.events {
            rows.push(Tuple::new(vec![
                text(CATALOG_NAME),
                text(&schema.name),
                text(&event.name),
                text(&event.status),
            ]));
        }
    }
    rows
}

fn processlist(catalog: &Catalog) -> Vec<Tuple> {
    catalog
        .processes
        .iter()
        .map(|process| {
            Tuple::new(vec![
                Datum::Int(process.id as i64),
                text("root"),
                text("localhost"),
                Datum::from(process.database.clone()),
                text("Query"),
            ])
        })
        .collect()
}
