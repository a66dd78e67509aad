//! An in-memory server: a shared catalog, the DDL forms the schema helpers
//! emit, and the `information_schema` views they read.

pub mod information_schema;
pub mod parser;
pub mod session;
pub mod statement;

use std::sync::{Arc, Mutex};

pub use session::{QueryResult, SQLKind, Session};

use crate::{
    catalog::Catalog,
    core::{ErrorKind, SQLError},
};

/// Owns the catalog shared by every session it opens.
#[derive(Clone, Default)]
pub struct Engine {
    catalog: Arc<Mutex<Catalog>>,
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self) -> Result<Session, SQLError> {
        Session::new(self.catalog.clone())
    }

    /// Apply `f` to the catalog directly, bypassing SQL.
    pub fn with_catalog<T>(
        &self,
        f: impl FnOnce(&mut Catalog) -> Result<T, SQLError>,
    ) -> Result<T, SQLError> {
        let mut catalog = self
            .catalog
            .lock()
            .map_err(|_| SQLError::new(ErrorKind::RuntimeError, "catalog lock poisoned"))?;
        f(&mut catalog)
    }
}
