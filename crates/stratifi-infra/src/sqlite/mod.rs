//! SQLite storage layer.
//!
//! Repository implementations backed by SQLite with WAL mode and split
//! read/write connection pools.

use chrono::{DateTime, SecondsFormat, Utc};
use stratifi_types::error::RepositoryError;

pub mod agent;
pub mod chat;
pub mod pool;
pub mod user;

pub(crate) fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Query(format!("invalid datetime: {e}")))
}

/// Fixed-width UTC timestamps, so string order matches time order.
pub(crate) fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

/// Map a write error, turning unique-constraint violations into `Conflict`.
pub(crate) fn write_error(e: sqlx::Error, what: &str) -> RepositoryError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            RepositoryError::Conflict(what.to_string())
        }
        _ => RepositoryError::Query(e.to_string()),
    }
}

/// Comma-separated `?` placeholders for an `IN (...)` clause.
pub(crate) fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}
