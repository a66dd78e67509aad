use super::{manager::SchemaManager, probe::count};
use crate::{connection::Connection, core::SQLError};

pub const NUM_PROCESS_SQL: &str = "SELECT COUNT(0) FROM information_schema.PROCESSLIST";

pub const NUM_TRANSACTION_SQL: &str = "SELECT COUNT(0) FROM information_schema.INNODB_TRX";

impl<'a, C: Connection + ?Sized> SchemaManager<'a, C> {
    /// Number of connections open on the server.
    pub fn num_process(&self) -> Result<u64, SQLError> {
        count(self.connection(), NUM_PROCESS_SQL, &[], "processes")
    }

    /// Number of transactions currently running.
    pub fn num_transaction(&self) -> Result<u64, SQLError> {
        count(self.connection(), NUM_TRANSACTION_SQL, &[], "transactions")
    }
}
