//! Schema reference resolution, existence checks and guarded DDL.

pub mod action;
pub mod activity;
pub mod ddl;
pub mod event;
pub mod ident;
pub mod manager;
pub mod probe;
pub mod record;
pub mod reference;
pub mod tag;

pub use action::{Outcome, Shape};
pub use ddl::{ColumnSpec, IndexOptions};
pub use event::EventStatus;
pub use manager::SchemaManager;
pub use probe::{ColumnKey, DescribeColumn, ObjectKind, Target};
pub use record::{Field, FieldKind, FieldType, Record, RecordBuilder};
pub use reference::{resolve, SchemaContext, SchemaReference};
