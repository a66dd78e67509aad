use std::{fmt::Display, str::FromStr};

use super::{
    ident::required_identifier,
    manager::SchemaManager,
    probe::{count, exists, query_catalog, Target},
    reference::SchemaReference,
};
use crate::{
    connection::Connection,
    core::{Datum, ErrorKind, SQLError},
};

pub const EVENT_STATUS_SQL: &str = "SELECT STATUS \
     FROM information_schema.EVENTS \
     WHERE EVENT_SCHEMA = ? AND EVENT_NAME = ?";

pub const NUM_EVENTS_SQL: &str = "SELECT COUNT(0) FROM information_schema.EVENTS";

pub const NUM_EVENTS_WITH_STATUS_SQL: &str = "SELECT COUNT(0) \
     FROM information_schema.EVENTS \
     WHERE STATUS = ?";

pub const NUM_EVENTS_IN_DATABASE_WITH_STATUS_SQL: &str = "SELECT COUNT(0) \
     FROM information_schema.EVENTS \
     WHERE EVENT_SCHEMA = ? AND STATUS = ?";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventStatus {
    Enabled,
    Disabled,
    /// Disabled on a replica.
    SlavesideDisabled,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventStatus::Enabled => "ENABLED",
            EventStatus::Disabled => "DISABLED",
            EventStatus::SlavesideDisabled => "SLAVESIDE_DISABLED",
        }
    }
}

impl Display for EventStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EventStatus {
    type Err = SQLError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ENABLED" | "ENABLE" => Ok(EventStatus::Enabled),
            "DISABLED" | "DISABLE" => Ok(EventStatus::Disabled),
            "SLAVESIDE_DISABLED" => Ok(EventStatus::SlavesideDisabled),
            other => Err(SQLError::new(
                ErrorKind::TypeError,
                format!("unknown event status: {}", other),
            )),
        }
    }
}

impl<'a, C: Connection + ?Sized> SchemaManager<'a, C> {
    /// Blank `database` means the current database.
    fn event_reference(&self, database: &str, event: &str) -> Result<SchemaReference, SQLError> {
        let event = required_identifier("event", event)?;
        let database = if database.trim().is_empty() {
            self.context().current_database()?
        } else {
            required_identifier("database", database)?
        };
        Ok(SchemaReference::new(database, event))
    }

    pub fn event_exists(&self, database: &str, event: &str) -> Result<bool, SQLError> {
        let event = self.event_reference(database, event)?;
        exists(self.connection(), &Target::Event(event))
    }

    /// Status of an event, `None` if it does not exist.
    pub fn event_status(
        &self,
        database: &str,
        event: &str,
    ) -> Result<Option<EventStatus>, SQLError> {
        let event = self.event_reference(database, event)?;
        let params: [Datum; 2] = [event.database.as_str().into(), event.object.as_str().into()];
        let target = Target::Event(event);

        let row = query_catalog(self.connection(), EVENT_STATUS_SQL, &params, &target)?;
        row.and_then(|row| row.get(0).and_then(Datum::to_text))
            .map(|status| {
                status.parse::<EventStatus>().map_err(|e| {
                    SQLError::wrap(
                        ErrorKind::CatalogQueryFailed,
                        format!("unexpected status of {}", target),
                        e,
                    )
                })
            })
            .transpose()
    }

    /// Number of events in all databases.
    pub fn num_events(&self) -> Result<u64, SQLError> {
        count(self.connection(), NUM_EVENTS_SQL, &[], "events")
    }

    pub fn num_events_with_status(&self, status: EventStatus) -> Result<u64, SQLError> {
        count(
            self.connection(),
            NUM_EVENTS_WITH_STATUS_SQL,
            &[Datum::from(status.as_str())],
            format!("{} events", status),
        )
    }

    /// Blank `database` means the current database.
    pub fn num_events_in_database_with_status(
        &self,
        database: &str,
        status: EventStatus,
    ) -> Result<u64, SQLError> {
        let database = if database.trim().is_empty() {
            self.context().current_database()?
        } else {
            required_identifier("database", database)?
        };
        count(
            self.connection(),
            NUM_EVENTS_IN_DATABASE_WITH_STATUS_SQL,
            &[Datum::from(database.as_str()), Datum::from(status.as_str())],
            format!("{} events in {}", status, database),
        )
    }
}
