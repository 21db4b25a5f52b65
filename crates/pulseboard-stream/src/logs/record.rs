//! Normalization of raw inbound payloads into canonical log records.
//!
//! Inbound log payloads arrive in two shapes: serialized JSON text, or an
//! already-structured object with optional `message` / `timestamp` /
//! `severity` fields. [`LogRecord::normalize`] converts either shape into a
//! [`LogRecord`], substituting defaults for anything missing or malformed:
//!
//! - undecodable text is kept verbatim as the message, stamped with the
//!   ingestion time and `info` severity;
//! - an absent or empty message becomes the `"no message"` sentinel;
//! - an absent or unparsable timestamp becomes the ingestion time;
//! - severity goes through [`Severity::normalize`].
//!
//! The transform is total: no payload shape makes it fail, so one malformed
//! event can never drop or corrupt the rest of a batch.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::clock::Clock;
use crate::logs::constants::NO_MESSAGE_SENTINEL;
use crate::logs::severity::Severity;

/// A fully normalized log record.
///
/// Every record held by the log buffer satisfies these invariants: the
/// message is non-empty, the timestamp is a concrete UTC instant, and the
/// severity is canonical. Records are immutable after creation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    /// Log message text, never empty.
    pub message: String,
    /// Record timestamp; the source's own when parsable, otherwise the
    /// ingestion time.
    pub timestamp: DateTime<Utc>,
    /// Canonical severity.
    pub severity: Severity,
}

impl LogRecord {
    /// Identity key for deduplication.
    ///
    /// Two records with identical timestamp and message are duplicates
    /// regardless of source order.
    #[must_use]
    pub fn identity(&self) -> (DateTime<Utc>, &str) {
        (self.timestamp, self.message.as_str())
    }

    /// Converts a raw inbound payload into a canonical record.
    ///
    /// Total function: every JSON shape produces a record and nothing is
    /// ever raised. Reads the ambient clock only when a timestamp default
    /// is needed.
    #[must_use]
    pub fn normalize(raw: &Value, clock: &dyn Clock) -> LogRecord {
        match raw {
            Value::String(text) => match serde_json::from_str::<Value>(text) {
                // Serialized text must decode to a record-shaped object;
                // a bare number or array is just a message.
                Ok(decoded @ Value::Object(_)) => Self::from_object(&decoded, clock),
                _ => LogRecord {
                    message: text.clone(),
                    timestamp: clock.now_utc(),
                    severity: Severity::Info,
                },
            },
            Value::Object(_) => Self::from_object(raw, clock),
            Value::Null => LogRecord {
                message: NO_MESSAGE_SENTINEL.to_string(),
                timestamp: clock.now_utc(),
                severity: Severity::Unknown,
            },
            // Numbers, booleans, arrays: keep the JSON text as the message.
            other => LogRecord {
                message: other.to_string(),
                timestamp: clock.now_utc(),
                severity: Severity::Info,
            },
        }
    }

    fn from_object(raw: &Value, clock: &dyn Clock) -> LogRecord {
        let message = raw
            .get("message")
            .and_then(Value::as_str)
            .filter(|text| !text.is_empty())
            .unwrap_or(NO_MESSAGE_SENTINEL)
            .to_string();

        let timestamp = raw
            .get("timestamp")
            .and_then(Value::as_str)
            .and_then(|text| DateTime::parse_from_rfc3339(text).ok())
            .map_or_else(|| clock.now_utc(), |parsed| parsed.with_timezone(&Utc));

        let severity = Severity::normalize(raw.get("severity"));

        LogRecord {
            message,
            timestamp,
            severity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::test_support::FixedClock;
    use serde_json::json;

    fn clock() -> FixedClock {
        FixedClock::at("2025-06-01T12:00:00Z")
    }

    #[test]
    fn test_plain_text_wrapped_verbatim() {
        let clock = clock();
        let record = LogRecord::normalize(&json!("not json"), &clock);

        assert_eq!(record.message, "not json");
        assert_eq!(record.timestamp, clock.now);
        assert_eq!(record.severity, Severity::Info);
    }

    #[test]
    fn test_serialized_object_is_decoded() {
        let clock = clock();
        let raw = json!(r#"{"message":"oom","severity":2,"timestamp":"2025-05-31T08:15:00Z"}"#);
        let record = LogRecord::normalize(&raw, &clock);

        assert_eq!(record.message, "oom");
        assert_eq!(record.severity, Severity::Warn);
        assert_eq!(record.timestamp.to_rfc3339(), "2025-05-31T08:15:00+00:00");
    }

    #[test]
    fn test_serialized_non_object_stays_text() {
        let clock = clock();
        // "3" decodes as a JSON number, not a record shape
        let record = LogRecord::normalize(&json!("3"), &clock);

        assert_eq!(record.message, "3");
        assert_eq!(record.severity, Severity::Info);
    }

    #[test]
    fn test_structured_object_fields_taken_when_present() {
        let clock = clock();
        let raw = json!({
            "message": "disk almost full",
            "timestamp": "2025-05-30T23:59:59+02:00",
            "severity": "ERROR",
        });
        let record = LogRecord::normalize(&raw, &clock);

        assert_eq!(record.message, "disk almost full");
        assert_eq!(record.severity, Severity::Error);
        // normalized to UTC
        assert_eq!(record.timestamp.to_rfc3339(), "2025-05-30T21:59:59+00:00");
    }

    #[test]
    fn test_missing_fields_get_defaults() {
        let clock = clock();
        let record = LogRecord::normalize(&json!({}), &clock);

        assert_eq!(record.message, NO_MESSAGE_SENTINEL);
        assert_eq!(record.timestamp, clock.now);
        assert_eq!(record.severity, Severity::Unknown);
    }

    #[test]
    fn test_empty_message_counts_as_absent() {
        let clock = clock();
        let record = LogRecord::normalize(&json!({"message": ""}), &clock);
        assert_eq!(record.message, NO_MESSAGE_SENTINEL);
    }

    #[test]
    fn test_non_string_message_counts_as_absent() {
        let clock = clock();
        let record = LogRecord::normalize(&json!({"message": 42}), &clock);
        assert_eq!(record.message, NO_MESSAGE_SENTINEL);
    }

    #[test]
    fn test_unparsable_timestamp_defaults_to_now() {
        let clock = clock();
        let raw = json!({"message": "boot", "timestamp": "yesterday-ish"});
        let record = LogRecord::normalize(&raw, &clock);

        assert_eq!(record.message, "boot");
        assert_eq!(record.timestamp, clock.now);
    }

    #[test]
    fn test_null_payload() {
        let clock = clock();
        let record = LogRecord::normalize(&Value::Null, &clock);

        assert_eq!(record.message, NO_MESSAGE_SENTINEL);
        assert_eq!(record.severity, Severity::Unknown);
    }

    #[test]
    fn test_numeric_payload_kept_as_text() {
        let clock = clock();
        let record = LogRecord::normalize(&json!(17), &clock);
        assert_eq!(record.message, "17");
        assert_eq!(record.severity, Severity::Info);
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let clock = clock();
        let raw = json!({
            "message": "cache evicted",
            "timestamp": "2025-05-31T10:00:00Z",
            "severity": 3,
        });
        let first = LogRecord::normalize(&raw, &clock);

        #[allow(clippy::unwrap_used)]
        let reserialized = serde_json::to_value(&first).unwrap();
        let second = LogRecord::normalize(&reserialized, &clock);

        assert_eq!(first, second);
    }

    #[test]
    fn test_idempotence_for_unknown_severity() {
        let clock = clock();
        let first = LogRecord::normalize(&json!({"message": "m"}), &clock);
        assert_eq!(first.severity, Severity::Unknown);

        #[allow(clippy::unwrap_used)]
        let reserialized = serde_json::to_value(&first).unwrap();
        let second = LogRecord::normalize(&reserialized, &clock);
        assert_eq!(first, second);
    }

    #[test]
    fn test_identity_key() {
        let clock = clock();
        let a = LogRecord::normalize(&json!({"message": "m", "severity": 1}), &clock);
        let b = LogRecord::normalize(&json!({"message": "m", "severity": 3}), &clock);

        // severity does not participate in identity
        assert_eq!(a.identity(), b.identity());
    }
}
