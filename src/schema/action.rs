use log::{debug, info, warn};

use super::probe::{exists, Target};
use crate::{
    connection::Connection,
    core::{ErrorKind, SQLError},
};

/// The four ways a create or drop can be guarded by an existence check.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shape {
    /// Present: nothing to do. Absent: create.
    CreateIfNotExist,
    /// Present: `AlreadyExists` error. Absent: create.
    CreateExclusive,
    /// Absent: nothing to do. Present: drop.
    DropIfExist,
    /// Absent: `NotExist` error. Present: drop.
    DropExclusive,
}

impl Shape {
    fn creates(&self) -> bool {
        matches!(self, Shape::CreateIfNotExist | Shape::CreateExclusive)
    }
}

/// What an action did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The statement was sent and succeeded.
    Executed,
    /// Nothing was sent, the object was already there.
    AlreadyExists,
    /// Nothing was sent, the object was already gone.
    NotExist,
}

/// Probe `target`, then send `statement` only when the precondition of
/// `shape` holds.
///
/// The probe and the statement are not atomic. A concurrent caller may create
/// or drop the object in between; the engine's error is then returned as
/// `StatementExecutionFailed`, never turned into success.
pub fn run<C: Connection + ?Sized>(
    conn: &C,
    shape: Shape,
    target: &Target,
    statement: &str,
) -> Result<Outcome, SQLError> {
    let present = exists(conn, target)?;

    match (shape, present) {
        (Shape::CreateIfNotExist, true) => {
            debug!("Skipping create, {} already exists", target);
            return Ok(Outcome::AlreadyExists);
        }
        (Shape::DropIfExist, false) => {
            debug!("Skipping drop, {} does not exist", target);
            return Ok(Outcome::NotExist);
        }
        (Shape::CreateExclusive, true) => {
            warn!("Refusing to create {}: already exists", target);
            return Err(SQLError::new(
                ErrorKind::AlreadyExists,
                format!("{} already exists", target),
            ));
        }
        (Shape::DropExclusive, false) => {
            warn!("Refusing to drop {}: does not exist", target);
            return Err(SQLError::new(
                ErrorKind::NotExist,
                format!("{} does not exist", target),
            ));
        }
        _ => {}
    }

    info!(
        "{} {}: {}",
        if shape.creates() { "Creating" } else { "Dropping" },
        target,
        statement
    );
    conn.execute(statement).map_err(|e| {
        SQLError::wrap(
            ErrorKind::StatementExecutionFailed,
            format!("failed to execute `{}`", statement),
            e,
        )
    })?;

    Ok(Outcome::Executed)
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::{
        core::{Datum, Tuple},
        schema::reference::SchemaReference,
    };

    /// Reports a fixed probe answer and records executed statements.
    struct MockConnection {
        probe: Result<bool, SQLError>,
        execute_error: Option<SQLError>,
        executed: RefCell<Vec<String>>,
    }

    impl MockConnection {
        fn with_probe(probe: Result<bool, SQLError>) -> Self {
            Self {
                probe,
                execute_error: None,
                executed: RefCell::new(vec![]),
            }
        }
    }

    impl Connection for MockConnection {
        fn query_row(&self, _sql: &str, _params: &[Datum]) -> Result<Option<Tuple>, SQLError> {
            match &self.probe {
                Ok(true) => Ok(Some(Tuple::new(vec!["t1".into()]))),
                Ok(false) => Ok(None),
                Err(e) => Err(e.clone()),
            }
        }

        fn execute(&self, sql: &str) -> Result<u64, SQLError> {
            self.executed.borrow_mut().push(sql.to_string());
            match &self.execute_error {
                Some(e) => Err(e.clone()),
                None => Ok(0),
            }
        }
    }

    fn target() -> Target {
        Target::Table(SchemaReference::new("db1", "t1"))
    }

    #[test]
    fn test_shapes_against_present_object() {
        let conn = MockConnection::with_probe(Ok(true));

        assert_eq!(
            run(&conn, Shape::CreateIfNotExist, &target(), "CREATE").unwrap(),
            Outcome::AlreadyExists
        );
        assert_eq!(
            run(&conn, Shape::CreateExclusive, &target(), "CREATE")
                .unwrap_err()
                .kind,
            ErrorKind::AlreadyExists
        );
        assert!(conn.executed.borrow().is_empty());

        assert_eq!(
            run(&conn, Shape::DropIfExist, &target(), "DROP IF").unwrap(),
            Outcome::Executed
        );
        assert_eq!(
            run(&conn, Shape::DropExclusive, &target(), "DROP").unwrap(),
            Outcome::Executed
        );
        assert_eq!(*conn.executed.borrow(), vec!["DROP IF", "DROP"]);
    }

    #[test]
    fn test_shapes_against_absent_object() {
        let conn = MockConnection::with_probe(Ok(false));

        assert_eq!(
            run(&conn, Shape::DropIfExist, &target(), "DROP IF").unwrap(),
            Outcome::NotExist
        );
        assert_eq!(
            run(&conn, Shape::DropExclusive, &target(), "DROP")
                .unwrap_err()
                .kind,
            ErrorKind::NotExist
        );
        assert!(conn.executed.borrow().is_empty());

        assert_eq!(
            run(&conn, Shape::CreateIfNotExist, &target(), "CREATE IF").unwrap(),
            Outcome::Executed
        );
        assert_eq!(
            run(&conn, Shape::CreateExclusive, &target(), "CREATE").unwrap(),
            Outcome::Executed
        );
        assert_eq!(*conn.executed.borrow(), vec!["CREATE IF", "CREATE"]);
    }

    #[test]
    fn test_probe_failure_prevents_statement() {
        let conn = MockConnection::with_probe(Err(SQLError::new(
            ErrorKind::RuntimeError,
            "lost connection",
        )));

        for shape in [
            Shape::CreateIfNotExist,
            Shape::CreateExclusive,
            Shape::DropIfExist,
            Shape::DropExclusive,
        ] {
            let err = run(&conn, shape, &target(), "STMT").unwrap_err();
            assert_eq!(err.kind, ErrorKind::CatalogQueryFailed);
        }
        assert!(conn.executed.borrow().is_empty());
    }

    #[test]
    fn test_engine_error_is_surfaced() {
        let mut conn = MockConnection::with_probe(Ok(false));
        conn.execute_error = Some(SQLError::new(
            ErrorKind::CatalogError,
            "Table 't1' already exists",
        ));

        let err = run(&conn, Shape::CreateIfNotExist, &target(), "CREATE").unwrap_err();
        assert_eq!(err.kind, ErrorKind::StatementExecutionFailed);
        assert_eq!(err.cause.unwrap().kind, ErrorKind::CatalogError);
    }
}
