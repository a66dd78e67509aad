use crate::core::SqlType;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnDefinition {
    pub name: String,
    pub data_type: SqlType,
    pub primary_key: bool,
    pub unique: bool,
    pub auto_increment: bool,
    pub not_null: bool,
    /// Default value as stored, without quotes.
    pub default: Option<String>,
    pub comment: String,
}

impl ColumnDefinition {
    pub fn new(name: impl Into<String>, data_type: SqlType) -> Self {
        Self {
            name: name.into(),
            data_type,
            primary_key: false,
            unique: false,
            auto_increment: false,
            not_null: false,
            default: None,
            comment: String::new(),
        }
    }

    pub fn nullable(&self) -> bool {
        !self.not_null && !self.primary_key
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexDefinition {
    pub name: String,
    pub columns: Vec<String>,
    pub unique: bool,
    pub fulltext: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableDefinition {
    pub name: String,
    pub columns: Vec<ColumnDefinition>,
    pub indexes: Vec<IndexDefinition>,
}

impl TableDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: vec![],
            indexes: vec![],
        }
    }

    pub fn find_column(&self, name: &str) -> Option<&ColumnDefinition> {
        self.columns.iter().find(|c| c.name.eq_ignore_ascii_case(name))
    }

    pub fn find_index(&self, name: &str) -> Option<&IndexDefinition> {
        self.indexes.iter().find(|i| i.name.eq_ignore_ascii_case(name))
    }

    /// Key role of a column: `PRI`, `UNI`, `MUL` or empty, decided by the
    /// indexes it leads.
    pub fn column_key(&self, column: &str) -> &'static str {
        let leading = self
            .indexes
            .iter()
            .filter(|index| {
                index
                    .columns
                    .first()
                    .map_or(false, |c| c.eq_ignore_ascii_case(column))
            })
            .collect::<Vec<_>>();

        if leading.iter().any(|index| index.name == "PRIMARY") {
            "PRI"
        } else if leading
            .iter()
            .any(|index| index.unique && index.columns.len() == 1)
        {
            "UNI"
        } else if !leading.is_empty() {
            "MUL"
        } else {
            ""
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventDefinition {
    pub name: String,
    pub status: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SchemaDefinition {
    pub name: String,
    pub tables: Vec<TableDefinition>,
    pub events: Vec<EventDefinition>,
}

/// One open session, as listed by PROCESSLIST.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProcessDefinition {
    pub id: u64,
    pub database: Option<String>,
}
