//! Repository implementations for database access
//!
//! Each repository borrows the pool and follows these patterns:
//! - Existence is checked by the mutating statement itself (rows affected / RETURNING)
//! - Multi-step operations use a transaction
//! - Timestamps are stored as fixed-width RFC 3339 text

pub mod listings;
pub mod enquiries;

use chrono::{DateTime, SecondsFormat, Utc};

pub use listings::ListingRepo;
pub use enquiries::EnquiryRepo;

/// Database error type
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("not found: {resource} '{id}'")]
    NotFound { resource: &'static str, id: String },

    #[error("corrupt {resource} row {id}: {reason}")]
    Corrupt {
        resource: &'static str,
        id: i64,
        reason: String,
    },
}

/// Current time truncated to what the text column round-trips.
pub(crate) fn now() -> DateTime<Utc> {
    let text = encode_timestamp(Utc::now());
    DateTime::parse_from_rfc3339(&text)
        .map(|t| t.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

/// Fixed-width UTC form, so lexical order equals time order.
pub(crate) fn encode_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn decode_timestamp(
    resource: &'static str,
    id: i64,
    text: &str,
) -> Result<DateTime<Utc>, DbError> {
    DateTime::parse_from_rfc3339(text)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| DbError::Corrupt {
            resource,
            id,
            reason: format!("bad created_at '{}': {}", text, e),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn timestamps_are_fixed_width() {
        let a = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
        let b = a + chrono::Duration::microseconds(1);
        let (ea, eb) = (encode_timestamp(a), encode_timestamp(b));
        assert_eq!(ea, "2025-01-02T03:04:05.000000Z");
        assert_eq!(ea.len(), eb.len());
        assert!(ea < eb);
        assert_eq!(decode_timestamp("listing", 1, &eb).unwrap(), b);
    }

    #[test]
    fn bad_timestamp_is_corrupt() {
        let err = decode_timestamp("listing", 9, "yesterday").unwrap_err();
        assert!(matches!(err, DbError::Corrupt { id: 9, .. }));
    }

    #[test]
    fn now_round_trips() {
        let at = now();
        assert_eq!(decode_timestamp("listing", 1, &encode_timestamp(at)).unwrap(), at);
    }
}
