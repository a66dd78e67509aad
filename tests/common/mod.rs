#![allow(dead_code)]

use std::cell::{Cell, RefCell};

use leischema::{
    core::{Datum, SQLError, Tuple},
    schema::Record,
    sql::{Engine, Session},
    Connection,
};

/// Passes everything through and records what reached the engine.
pub struct RecordingConnection<'a> {
    inner: &'a Session,
    pub queries: Cell<usize>,
    pub executed: RefCell<Vec<String>>,
}

impl<'a> RecordingConnection<'a> {
    pub fn new(inner: &'a Session) -> Self {
        Self {
            inner,
            queries: Cell::new(0),
            executed: RefCell::new(vec![]),
        }
    }

    pub fn executed(&self) -> Vec<String> {
        self.executed.borrow().clone()
    }

    pub fn calls(&self) -> usize {
        self.queries.get() + self.executed.borrow().len()
    }
}

impl Connection for RecordingConnection<'_> {
    fn query_row(&self, sql: &str, params: &[Datum]) -> Result<Option<Tuple>, SQLError> {
        self.queries.set(self.queries.get() + 1);
        self.inner.query_row(sql, params)
    }

    fn execute(&self, sql: &str) -> Result<u64, SQLError> {
        self.executed.borrow_mut().push(sql.to_string());
        Connection::execute(self.inner, sql)
    }
}

/// Lets a second session run the same statement between the probe and the
/// statement of the first, the interleaving two concurrent callers can hit.
pub struct RacingConnection<'a> {
    inner: &'a Session,
    rival: &'a Session,
    raced: Cell<bool>,
}

impl<'a> RacingConnection<'a> {
    pub fn new(inner: &'a Session, rival: &'a Session) -> Self {
        Self {
            inner,
            rival,
            raced: Cell::new(false),
        }
    }
}

impl Connection for RacingConnection<'_> {
    fn query_row(&self, sql: &str, params: &[Datum]) -> Result<Option<Tuple>, SQLError> {
        self.inner.query_row(sql, params)
    }

    fn execute(&self, sql: &str) -> Result<u64, SQLError> {
        if !self.raced.replace(true) {
            Connection::execute(self.rival, sql)?;
        }
        Connection::execute(self.inner, sql)
    }
}

/// Every catalog query fails.
pub struct BrokenConnection;

impl Connection for BrokenConnection {
    fn query_row(&self, _sql: &str, _params: &[Datum]) -> Result<Option<Tuple>, SQLError> {
        Err(SQLError::new(
            leischema::core::ErrorKind::RuntimeError,
            "connection reset",
        ))
    }

    fn execute(&self, _sql: &str) -> Result<u64, SQLError> {
        panic!("nothing may be executed after a failed probe")
    }
}

/// An engine with database `app` selected on the returned session.
pub fn engine_with_app() -> (Engine, Session) {
    let engine = Engine::new();
    let session = engine.session().unwrap();
    session.execute("CREATE DATABASE app").unwrap();
    session.execute("USE app").unwrap();
    (engine, session)
}

pub fn user_record() -> Record {
    Record::builder("users")
        .field::<i32>("id", "id, primarykey, autoincrement, notnull")
        .field::<String>("Name", ",unique, default:zhang, notnull, size:20")
        .build()
        .unwrap()
}
