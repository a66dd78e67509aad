use crate::core::{Datum, SQLError, Tuple};

/// The database capability the schema helpers run on.
///
/// Implementations own the connection lifecycle, timeouts and cancellation.
/// Parameters are bound positionally to `?` placeholders.
pub trait Connection {
    /// Execute a query and return its first row, or `None` when it produced
    /// no rows.
    fn query_row(&self, sql: &str, params: &[Datum]) -> Result<Option<Tuple>, SQLError>;

    /// Execute a statement, returning the number of affected rows.
    fn execute(&self, sql: &str) -> Result<u64, SQLError>;
}

impl<C: Connection + ?Sized> Connection for &C {
    fn query_row(&self, sql: &str, params: &[Datum]) -> Result<Option<Tuple>, SQLError> {
        (**self).query_row(sql, params)
    }

    fn execute(&self, sql: &str) -> Result<u64, SQLError> {
        (**self).execute(sql)
    }
}
