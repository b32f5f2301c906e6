//! SQLite storage layer.
//!
//! Repository implementations backed by SQLite with WAL mode and split
//! read/write connection pools. Feeds render their keyset range queries
//! through [`range`].

pub mod chat;
pub mod message;
pub mod pool;
pub mod range;
pub mod user;

use chrono::{DateTime, SecondsFormat, Utc};
use uuid::Uuid;

use chatbox_types::error::RepositoryError;

// ---------------------------------------------------------------------------
// Column encoding shared by all repositories
// ---------------------------------------------------------------------------

/// Fixed-width RFC 3339 with microseconds, so stored text sorts
/// chronologically.
pub(crate) fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Query(format!("invalid datetime: {e}")))
}

pub(crate) fn parse_uuid(s: &str, column: &str) -> Result<Uuid, RepositoryError> {
    Uuid::parse_str(s).map_err(|e| RepositoryError::Query(format!("invalid {column}: {e}")))
}

/// Map a write error, reporting UNIQUE violations as `Conflict`.
pub(crate) fn write_error(e: sqlx::Error, conflict: impl FnOnce() -> String) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e {
        if db_err.message().contains("UNIQUE") {
            return RepositoryError::Conflict(conflict());
        }
    }
    RepositoryError::Query(e.to_string())
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::pool::DatabasePool;

    pub(crate) async fn test_pool() -> DatabasePool {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let url = format!("sqlite://{}?mode=rwc", db_path.display());
        // Leak tempdir so it lives for the test
        std::mem::forget(dir);
        DatabasePool::new(&url).await.unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_datetime_text_is_fixed_width() {
        let whole = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let frac = Utc.timestamp_opt(1_700_000_000, 5_000).unwrap();
        assert_eq!(format_datetime(&whole), "2023-11-14T22:13:20.000000Z");
        assert_eq!(format_datetime(&frac), "2023-11-14T22:13:20.000005Z");
        assert!(format_datetime(&whole) < format_datetime(&frac));
    }

    #[test]
    fn test_datetime_roundtrip() {
        let ts = Utc.timestamp_opt(1_700_000_000, 123_456_000).unwrap();
        assert_eq!(parse_datetime(&format_datetime(&ts)).unwrap(), ts);
        assert!(parse_datetime("yesterday").is_err());
    }
}
