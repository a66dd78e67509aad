use std::{fmt::Display, time::SystemTime};

use super::ddl::{synthesize, ColumnSpec};
use crate::core::{ErrorKind, SQLError};

/// The shape of a record field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldKind {
    Bool,
    Int,
    UInt,
    Float32,
    Float64,
    Text,
    Timestamp,
    /// A nullable wrapper; maps like the wrapped kind.
    Optional(Box<FieldKind>),
    /// A nested record. Only valid as an embedded field.
    Record(Vec<Field>),
    /// Anything else, named for error messages.
    Other(String),
}

impl Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldKind::Bool => write!(f, "bool"),
            FieldKind::Int => write!(f, "int"),
            FieldKind::UInt => write!(f, "uint"),
            FieldKind::Float32 => write!(f, "float32"),
            FieldKind::Float64 => write!(f, "float64"),
            FieldKind::Text => write!(f, "string"),
            FieldKind::Timestamp => write!(f, "timestamp"),
            FieldKind::Optional(inner) => write!(f, "optional {}", inner),
            FieldKind::Record(_) => write!(f, "record"),
            FieldKind::Other(name) => write!(f, "{}", name),
        }
    }
}

/// Rust types that can back a column.
pub trait FieldType {
    fn field_kind() -> FieldKind;
}

macro_rules! impl_field_type {
    ($kind:expr => $($t:ty),+) => {
        $(
            impl FieldType for $t {
                fn field_kind() -> FieldKind {
                    $kind
                }
            }
        )+
    };
}

impl_field_type!(FieldKind::Bool => bool);
impl_field_type!(FieldKind::Int => i8, i16, i32, i64, i128, isize);
impl_field_type!(FieldKind::UInt => u8, u16, u32, u64, u128, usize);
impl_field_type!(FieldKind::Float32 => f32);
impl_field_type!(FieldKind::Float64 => f64);
impl_field_type!(FieldKind::Text => String, &str);
impl_field_type!(FieldKind::Timestamp => SystemTime);

impl<T: FieldType> FieldType for Option<T> {
    fn field_kind() -> FieldKind {
        FieldKind::Optional(Box::new(T::field_kind()))
    }
}

/// One declared field of a record, with its tag.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub kind: FieldKind,
    pub tag: String,
    /// Embedded fields splice the nested record's columns in place.
    pub embedded: bool,
}

/// A validated record description and the columns synthesized from it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Record {
    name: String,
    fields: Vec<Field>,
    columns: Vec<ColumnSpec>,
}

impl Record {
    pub fn builder(name: impl Into<String>) -> RecordBuilder {
        RecordBuilder::new(name)
    }

    /// Describe a record from a dynamically built kind. Only
    /// `FieldKind::Record` with at least one field is accepted.
    pub fn describe(name: impl Into<String>, kind: FieldKind) -> Result<Self, SQLError> {
        let name = name.into();
        match kind {
            FieldKind::Record(fields) => Self::new(name, fields),
            other => Err(SQLError::new(
                ErrorKind::UnsupportedFieldType,
                format!("{} ({}) is not a record", name, other),
            )),
        }
    }

    fn new(name: String, fields: Vec<Field>) -> Result<Self, SQLError> {
        if fields.is_empty() {
            return Err(SQLError::new(
                ErrorKind::UnsupportedFieldType,
                format!("record {} has no field", name),
            ));
        }
        let columns = synthesize(&fields)?;

        Ok(Self {
            name,
            fields,
            columns,
        })
    }

    /// The record name, used as table name when a reference omits it.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }
}

/// Declares a record field by field. Tags are parsed and the columns are
/// synthesized once, in [`RecordBuilder::build`].
#[derive(Clone, Debug)]
pub struct RecordBuilder {
    name: String,
    fields: Vec<Field>,
}

impl RecordBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: vec![],
        }
    }

    pub fn field<T: FieldType>(self, name: &str, tag: &str) -> Self {
        self.field_of_kind(name, T::field_kind(), tag)
    }

    pub fn field_of_kind(mut self, name: &str, kind: FieldKind, tag: &str) -> Self {
        self.fields.push(Field {
            name: name.to_string(),
            kind,
            tag: tag.to_string(),
            embedded: false,
        });
        self
    }

    /// Embed another record; its columns appear at this position.
    pub fn embed(mut self, record: &Record) -> Self {
        self.fields.push(Field {
            name: record.name.clone(),
            kind: FieldKind::Record(record.fields.clone()),
            tag: String::new(),
            embedded: true,
        });
        self
    }

    pub fn build(self) -> Result<Record, SQLError> {
        Record::new(self.name, self.fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_kinds_from_rust_types() {
        assert_eq!(bool::field_kind(), FieldKind::Bool);
        assert_eq!(u16::field_kind(), FieldKind::UInt);
        assert_eq!(<&str>::field_kind(), FieldKind::Text);
        assert_eq!(
            Option::<SystemTime>::field_kind(),
            FieldKind::Optional(Box::new(FieldKind::Timestamp))
        );
    }

    #[test]
    fn test_record_without_fields_is_rejected() {
        let err = Record::builder("Empty").build().unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnsupportedFieldType);
    }

    #[test]
    fn test_non_record_kind_is_rejected() {
        let err = Record::describe("Count", FieldKind::Int).unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnsupportedFieldType);

        let err = Record::describe("Empty", FieldKind::Record(vec![])).unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnsupportedFieldType);
    }

    #[test]
    fn test_describe_dynamic_record() {
        let record = Record::describe(
            "Tag",
            FieldKind::Record(vec![Field {
                name: "Label".to_string(),
                kind: FieldKind::Text,
                tag: ",size:16".to_string(),
                embedded: false,
            }]),
        )
        .unwrap();

        assert_eq!(record.name(), "Tag");
        assert_eq!(record.columns()[0].to_string(), "label VARCHAR(16)");
    }
}
