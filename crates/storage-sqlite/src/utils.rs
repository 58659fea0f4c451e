//! Helpers shared by the repositories: timestamp encoding and IN-list chunking.

use chrono::{DateTime, SecondsFormat, Utc};
use eventcast_core::errors::{DatabaseError, Error, Result};

/// Maximum number of parameters for SQLite IN (...) queries.
///
/// SQLite limits bound parameters per statement (SQLITE_MAX_VARIABLE_NUMBER,
/// typically 999). Lists are split into chunks of 500 to stay well clear.
pub const SQLITE_MAX_PARAMS_CHUNK: usize = 500;

pub fn chunk_for_sqlite<T>(items: &[T]) -> impl Iterator<Item = &[T]> {
    items.chunks(SQLITE_MAX_PARAMS_CHUNK)
}

/// Encodes a timestamp as fixed-width RFC 3339 text.
///
/// Every stored timestamp uses the same width and UTC suffix so that string
/// comparison in SQL orders them chronologically.
pub fn to_db_time(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn from_db_time(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|at| at.with_timezone(&Utc))
        .map_err(|e| {
            Error::Database(DatabaseError::Internal(format!(
                "Invalid stored timestamp '{}': {}",
                value, e
            )))
        })
}

pub fn from_db_time_opt(value: Option<&str>) -> Result<Option<DateTime<Utc>>> {
    value.map(from_db_time).transpose()
}

/// Parses a stored enum label, reporting corrupt rows as internal errors.
pub fn parse_label<T>(value: &str) -> Result<T>
where
    T: std::str::FromStr<Err = Error>,
{
    value.parse::<T>().map_err(|_| {
        Error::Database(DatabaseError::Internal(format!(
            "Unknown stored value '{}'",
            value
        )))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_chunk_for_sqlite_over_limit() {
        let items: Vec<i32> = (0..1200).collect();
        let chunks: Vec<_> = chunk_for_sqlite(&items).collect();
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[2].len(), 200);
    }

    #[test]
    fn test_db_time_is_fixed_width_and_ordered() {
        let early = Utc.with_ymd_and_hms(2026, 3, 2, 9, 5, 0).unwrap();
        let late = early + chrono::Duration::milliseconds(1500);

        let (a, b) = (to_db_time(early), to_db_time(late));

        assert_eq!(a, "2026-03-02T09:05:00.000Z");
        assert_eq!(a.len(), b.len());
        assert!(a < b);
        assert_eq!(from_db_time(&b).unwrap(), late);
    }

    #[test]
    fn test_corrupt_time_is_internal_error() {
        assert!(matches!(
            from_db_time("yesterday"),
            Err(Error::Database(DatabaseError::Internal(_)))
        ));
    }
}
