use std::{collections::HashSet, fmt::Display};

use super::{
    ident::{check_identifier, DefaultLiteral},
    record::{Field, FieldKind},
    reference::SchemaReference,
    tag::{Tag, TagOption},
};
use crate::core::{BaseType, ErrorKind, SQLError, SqlType};

/// One column definition of a `CREATE TABLE` or `ALTER TABLE ... ADD`.
///
/// The type and the default are only set through the builder methods, so the
/// rendered default always matches the rendered type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnSpec {
    pub name: String,
    sql_type: SqlType,
    pub is_primary_key: bool,
    pub is_unique: bool,
    pub is_auto_increment: bool,
    pub is_not_null: bool,
    default: Option<(String, DefaultLiteral)>,
}

impl ColumnSpec {
    pub fn new(name: impl Into<String>, sql_type: SqlType) -> Self {
        Self {
            name: name.into(),
            sql_type,
            is_primary_key: false,
            is_unique: false,
            is_auto_increment: false,
            is_not_null: false,
            default: None,
        }
    }

    pub fn primary_key(mut self) -> Self {
        self.is_primary_key = true;
        self
    }

    pub fn unique(mut self) -> Self {
        self.is_unique = true;
        self
    }

    pub fn auto_increment(mut self) -> Self {
        self.is_auto_increment = true;
        self
    }

    pub fn not_null(mut self) -> Self {
        self.is_not_null = true;
        self
    }

    /// Set the default, formatted for the column's type.
    pub fn with_default(mut self, raw: &str) -> Result<Self, SQLError> {
        let literal = DefaultLiteral::format(&self.sql_type, raw)?;
        self.default = Some((raw.to_string(), literal));
        Ok(self)
    }

    /// Change the type. A default already set is formatted again for the new
    /// type and the change is refused when it no longer fits.
    pub fn with_type(mut self, sql_type: SqlType) -> Result<Self, SQLError> {
        if let Some((raw, literal)) = &mut self.default {
            *literal = DefaultLiteral::format(&sql_type, raw)?;
        }
        self.sql_type = sql_type;
        Ok(self)
    }

    pub fn sql_type(&self) -> &SqlType {
        &self.sql_type
    }

    pub fn default(&self) -> Option<&DefaultLiteral> {
        self.default.as_ref().map(|(_, literal)| literal)
    }
}

/// Renders `name TYPE[ PRIMARY KEY][ UNIQUE][ AUTO_INCREMENT][ NOT NULL][ DEFAULT v]`.
impl Display for ColumnSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.name, self.sql_type)?;
        if self.is_primary_key {
            write!(f, " PRIMARY KEY")?;
        }
        if self.is_unique {
            write!(f, " UNIQUE")?;
        }
        if self.is_auto_increment {
            write!(f, " AUTO_INCREMENT")?;
        }
        if self.is_not_null {
            write!(f, " NOT NULL")?;
        }
        if let Some(default) = self.default() {
            write!(f, " DEFAULT {}", default)?;
        }
        Ok(())
    }
}

/// Map a field kind to its column type. Nullable wrappers map like the
/// wrapped kind.
pub fn sql_type_of(kind: &FieldKind) -> Result<SqlType, SQLError> {
    let base = match kind {
        FieldKind::Bool => BaseType::TinyInt,
        FieldKind::Int | FieldKind::UInt => BaseType::Int,
        FieldKind::Float32 => BaseType::Float,
        FieldKind::Float64 => BaseType::Double,
        FieldKind::Text => BaseType::Varchar,
        FieldKind::Timestamp => BaseType::Datetime,
        FieldKind::Optional(inner) => return sql_type_of(inner),
        FieldKind::Record(_) | FieldKind::Other(_) => {
            return Err(SQLError::new(
                ErrorKind::UnsupportedFieldType,
                format!("unsupported type for mysql: {}", kind),
            ))
        }
    };
    Ok(SqlType::new(base))
}

/// Synthesize the column list of a record, in declaration order, with
/// embedded records flattened in place.
pub fn synthesize(fields: &[Field]) -> Result<Vec<ColumnSpec>, SQLError> {
    let mut columns = vec![];
    synthesize_into(fields, &mut columns)?;

    let mut seen = HashSet::new();
    if let Some(duplicate) = columns.iter().find(|c| !seen.insert(c.name.as_str())) {
        return Err(SQLError::new(
            ErrorKind::MalformedTagOption,
            format!("duplicate column name: {}", duplicate.name),
        ));
    }

    Ok(columns)
}

fn synthesize_into(fields: &[Field], columns: &mut Vec<ColumnSpec>) -> Result<(), SQLError> {
    for field in fields {
        match (&field.kind, field.embedded) {
            (FieldKind::Record(nested), true) => synthesize_into(nested, columns)?,
            _ => columns.push(synthesize_field(field)?),
        }
    }
    Ok(())
}

fn synthesize_field(field: &Field) -> Result<ColumnSpec, SQLError> {
    let mut sql_type = sql_type_of(&field.kind)?;
    let tag = Tag::parse(&field.name, &field.tag)?;

    let name = tag
        .column_name
        .unwrap_or_else(|| field.name.to_lowercase());
    check_identifier("column", &name).map_err(|e| {
        SQLError::new(
            ErrorKind::MalformedTagOption,
            format!("field {}: {}", field.name, e.message),
        )
    })?;

    let mut column = ColumnSpec::new(name, sql_type);
    let mut default = None;
    for option in tag.options {
        match option {
            TagOption::Size(size) => sql_type = sql_type.with_size(size),
            TagOption::Default(value) => default = Some(value),
            TagOption::PrimaryKey => column.is_primary_key = true,
            TagOption::AutoIncrement => column.is_auto_increment = true,
            TagOption::Unique => column.is_unique = true,
            TagOption::NotNull => column.is_not_null = true,
        }
    }
    column.sql_type = sql_type;

    match default {
        Some(raw) => column.with_default(&raw).map_err(|e| {
            SQLError::new(
                ErrorKind::MalformedTagOption,
                format!("field {}: {}", field.name, e.message),
            )
        }),
        None => Ok(column),
    }
}

pub fn create_database_sql(database: &str, if_not_exists: bool) -> String {
    if if_not_exists {
        format!("CREATE DATABASE IF NOT EXISTS {}", database)
    } else {
        format!("CREATE DATABASE {}", database)
    }
}

pub fn drop_database_sql(database: &str, if_exists: bool) -> String {
    if if_exists {
        format!("DROP DATABASE IF EXISTS {}", database)
    } else {
        format!("DROP DATABASE {}", database)
    }
}

/// Always the `IF NOT EXISTS` form; whether it may run is decided by the
/// caller's precondition.
pub fn create_table_sql(table: &SchemaReference, columns: &[ColumnSpec]) -> String {
    let columns = columns
        .iter()
        .map(ColumnSpec::to_string)
        .collect::<Vec<_>>()
        .join(",");
    format!("CREATE TABLE IF NOT EXISTS {}({});", table, columns)
}

pub fn drop_table_sql(table: &SchemaReference, if_exists: bool) -> String {
    if if_exists {
        format!("DROP TABLE IF EXISTS {}", table)
    } else {
        format!("DROP TABLE {}", table)
    }
}

pub fn add_column_sql(table: &SchemaReference, column: &ColumnSpec) -> String {
    format!("ALTER TABLE {} ADD {}", table, column)
}

pub fn drop_column_sql(table: &SchemaReference, column: &str) -> String {
    format!("ALTER TABLE {} DROP COLUMN {}", table, column)
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IndexOptions {
    pub unique: bool,
    pub fulltext: bool,
}

pub fn create_index_sql(
    table: &SchemaReference,
    index: &str,
    columns: &[String],
    options: IndexOptions,
) -> String {
    let mut sql = String::from("CREATE");
    if options.unique {
        sql.push_str(" UNIQUE");
    }
    if options.fulltext {
        sql.push_str(" FULLTEXT");
    }
    format!("{} INDEX {} ON {}({})", sql, index, table, columns.join(","))
}

pub fn drop_index_sql(table: &SchemaReference, index: &str) -> String {
    format!("DROP INDEX {} ON {}", index, table)
}

#[cfg(test)]
mod tests {
    use std::time::SystemTime;

    use super::*;
    use crate::schema::record::Record;

    fn user_record() -> Record {
        Record::builder("User")
            .field::<i32>("id", "id, primarykey, autoincrement, notnull")
            .field::<String>("Name", ",unique, default:zhang, notnull, size:20")
            .build()
            .unwrap()
    }

    #[test]
    fn test_synthesize_columns_in_declaration_order() {
        let columns = user_record()
            .columns()
            .iter()
            .map(ColumnSpec::to_string)
            .collect::<Vec<_>>();

        assert_eq!(
            columns,
            vec![
                "id INT PRIMARY KEY AUTO_INCREMENT NOT NULL",
                "name VARCHAR(20) UNIQUE NOT NULL DEFAULT 'zhang'",
            ]
        );
    }

    #[test]
    fn test_create_table_statement() {
        let record = user_record();
        let sql = create_table_sql(&SchemaReference::new("db1", "user"), record.columns());

        assert_eq!(
            sql,
            "CREATE TABLE IF NOT EXISTS db1.user(\
             id INT PRIMARY KEY AUTO_INCREMENT NOT NULL,\
             name VARCHAR(20) UNIQUE NOT NULL DEFAULT 'zhang');"
        );
    }

    #[test]
    fn test_type_mapping() {
        let record = Record::builder("AllTypes")
            .field::<bool>("Active", "")
            .field::<u64>("Count", "")
            .field::<f32>("Ratio", "")
            .field::<f64>("Score", "")
            .field::<String>("Label", "")
            .field::<SystemTime>("CreatedAt", "created_at, notnull")
            .field::<Option<i8>>("Level", "")
            .build()
            .unwrap();

        let columns = record
            .columns()
            .iter()
            .map(ColumnSpec::to_string)
            .collect::<Vec<_>>();
        assert_eq!(
            columns,
            vec![
                "active TINYINT",
                "count INT",
                "ratio FLOAT",
                "score DOUBLE",
                "label VARCHAR",
                "created_at DATETIME NOT NULL",
                "level INT",
            ]
        );
    }

    #[test]
    fn test_embedded_records_are_spliced_in_place() {
        let timestamps = Record::builder("Timestamps")
            .field::<SystemTime>("CreatedAt", "created_at")
            .field::<Option<SystemTime>>("UpdatedAt", "updated_at")
            .build()
            .unwrap();
        let audited = Record::builder("Audited")
            .field::<String>("Author", "")
            .embed(&timestamps)
            .build()
            .unwrap();
        let post = Record::builder("Post")
            .field::<i64>("Id", ",primarykey")
            .embed(&audited)
            .field::<String>("Title", ",size:80")
            .build()
            .unwrap();

        let names = post
            .columns()
            .iter()
            .map(|c| c.name.as_str())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["id", "author", "created_at", "updated_at", "title"]);
    }

    #[test]
    fn test_default_literal_follows_type() {
        let record = Record::builder("Counter")
            .field::<i32>("Value", ",default:0")
            .field::<String>("Kind", ",default:it's")
            .build()
            .unwrap();

        assert_eq!(record.columns()[0].to_string(), "value INT DEFAULT 0");
        assert_eq!(
            record.columns()[1].to_string(),
            "kind VARCHAR DEFAULT 'it''s'"
        );
    }

    #[test]
    fn test_changing_type_reformats_default() {
        let int = SqlType::new(BaseType::Int);
        let varchar = SqlType::new(BaseType::Varchar).with_size(3);

        let column = ColumnSpec::new("x", int)
            .with_default("5")
            .unwrap()
            .with_type(varchar)
            .unwrap();
        assert_eq!(column.sql_type(), &varchar);
        assert_eq!(column.default().unwrap().as_sql(), "'5'");
        assert_eq!(column.to_string(), "x VARCHAR(3) DEFAULT '5'");

        let column = column.with_type(int).unwrap();
        assert_eq!(column.to_string(), "x INT DEFAULT 5");

        let err = ColumnSpec::new("kind", varchar)
            .with_default("it's")
            .unwrap()
            .with_type(int)
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::MalformedTagOption);

        let column = ColumnSpec::new("y", int).with_type(varchar).unwrap();
        assert_eq!(column.default(), None);
        assert_eq!(column.to_string(), "y VARCHAR(3)");
    }

    #[test]
    fn test_unsupported_field_types() {
        let err = Record::builder("Bad")
            .field_of_kind("Payload", FieldKind::Other("Vec<u8>".to_string()), "")
            .build()
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnsupportedFieldType);

        let nested = user_record();
        let err = Record::builder("Bad")
            .field_of_kind("Owner", FieldKind::Record(nested.fields().to_vec()), "")
            .build()
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnsupportedFieldType);

        let err = Record::builder("Bad")
            .field_of_kind(
                "Owner",
                FieldKind::Optional(Box::new(FieldKind::Record(nested.fields().to_vec()))),
                "",
            )
            .build()
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnsupportedFieldType);
    }

    #[test]
    fn test_malformed_descriptions() {
        for (field, tag) in [
            ("Name", ",size"),
            ("Name", ",notnull:true"),
            ("Name", ",nullable"),
            ("Name", "bad-name"),
            ("Näme", ""),
        ] {
            let err = Record::builder("Bad")
                .field::<String>(field, tag)
                .build()
                .unwrap_err();
            assert_eq!(err.kind, ErrorKind::MalformedTagOption, "tag: {:?}", tag);
        }

        let err = Record::builder("Bad")
            .field::<i32>("Value", ",default:1;DROP TABLE x")
            .build()
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::MalformedTagOption);

        let err = Record::builder("Bad")
            .field::<i32>("Id", "")
            .field::<i64>("Other", "id")
            .build()
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::MalformedTagOption);
    }

    #[test]
    fn test_statement_forms() {
        let table = SchemaReference::new("db1", "t1");

        assert_eq!(create_database_sql("db1", false), "CREATE DATABASE db1");
        assert_eq!(
            create_database_sql("db1", true),
            "CREATE DATABASE IF NOT EXISTS db1"
        );
        assert_eq!(drop_database_sql("db1", true), "DROP DATABASE IF EXISTS db1");
        assert_eq!(drop_table_sql(&table, false), "DROP TABLE db1.t1");
        assert_eq!(
            add_column_sql(
                &table,
                &ColumnSpec::new("age", SqlType::new(BaseType::Int))
                    .not_null()
                    .with_default("18")
                    .unwrap()
            ),
            "ALTER TABLE db1.t1 ADD age INT NOT NULL DEFAULT 18"
        );
        assert_eq!(
            drop_column_sql(&table, "age"),
            "ALTER TABLE db1.t1 DROP COLUMN age"
        );
        assert_eq!(
            create_index_sql(
                &table,
                "idx_name",
                &["a".to_string(), "b".to_string()],
                IndexOptions {
                    unique: true,
                    fulltext: false
                }
            ),
            "CREATE UNIQUE INDEX idx_name ON db1.t1(a,b)"
        );
        assert_eq!(
            create_index_sql(
                &table,
                "ft_body",
                &["body".to_string()],
                IndexOptions {
                    unique: false,
                    fulltext: true
                }
            ),
            "CREATE FULLTEXT INDEX ft_body ON db1.t1(body)"
        );
        assert_eq!(drop_index_sql(&table, "idx_name"), "DROP INDEX idx_name ON db1.t1");
    }
}
