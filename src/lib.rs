#[macro_use]
extern crate lazy_static;

pub mod catalog;
pub mod cli;
pub mod connection;
pub mod core;
pub mod schema;
pub mod sql;
pub mod util;

pub use connection::Connection;
pub use schema::{Outcome, SchemaContext, SchemaManager};
