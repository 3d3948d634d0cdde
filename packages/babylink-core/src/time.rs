//! Time helpers shared by storage and the chat layer.
//!
//! Timestamps are stored as Unix milliseconds and exposed as
//! `chrono::DateTime<Utc>`.

use chrono::{DateTime, TimeZone, Utc};

/// Returns the current Unix timestamp in milliseconds.
pub fn now_timestamp_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Convert stored milliseconds back to a UTC timestamp.
///
/// Returns `None` for values outside chrono's representable range.
pub fn from_millis(millis: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_millis_opt(millis).single()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_timestamp_millis_is_reasonable() {
        let ts = now_timestamp_millis();
        // Should be after 2024-01-01 in millis
        assert!(ts > 1704067200_000, "Timestamp {} is too old", ts);
    }

    #[test]
    fn test_from_millis_round_trip() {
        let dt = from_millis(1_717_000_000_123).unwrap();
        assert_eq!(dt.timestamp_millis(), 1_717_000_000_123);
        assert!(from_millis(i64::MAX).is_none());
    }
}
