//! Canonical severity levels for inbound log records.
//!
//! Upstream sources encode severity inconsistently: numeric codes (`3`, `2`,
//! `1`), numeric-looking strings (`"3"`), words in mixed case (`"ERROR"`,
//! `"Warning"`), or nothing at all. [`Severity::normalize`] maps all of them
//! onto the canonical set {error, warn, info, unknown}.
//!
//! The numeric codes form an ordered precedence (3 is most severe) and each
//! code maps one-to-one: `3` → error, `2` → warn, `1` → info. Every other
//! input degrades to [`Severity::Unknown`] rather than failing; the mapping
//! is total and never panics.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Canonical severity of a log record.
///
/// Serialized as its lowercase string form (`"error"`, `"warn"`, `"info"`,
/// `"unknown"`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Failure conditions reported by the source.
    Error,
    /// Hazardous situations that may lead to errors.
    Warn,
    /// Routine informational records.
    Info,
    /// Severity absent or not recognized.
    #[default]
    Unknown,
}

impl AsRef<str> for Severity {
    fn as_ref(&self) -> &str {
        match self {
            Severity::Error => "error",
            Severity::Warn => "warn",
            Severity::Info => "info",
            Severity::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl Severity {
    /// Maps a raw severity field onto the canonical set.
    ///
    /// Accepts numeric codes, numeric-looking strings, words in any case,
    /// `null`, or an absent field. Pure and total: unrecognized input always
    /// degrades to [`Severity::Unknown`] instead of failing.
    #[must_use]
    pub fn normalize(raw: Option<&Value>) -> Severity {
        match raw {
            Some(Value::Number(code)) => match code.as_u64() {
                Some(3) => Severity::Error,
                Some(2) => Severity::Warn,
                Some(1) => Severity::Info,
                _ => Severity::Unknown,
            },
            Some(Value::String(word)) => Self::from_text(word),
            // null, booleans, arrays, objects, or no field at all
            _ => Severity::Unknown,
        }
    }

    // Case-insensitive word and numeric-string matching. Each code has its
    // own arm; codes must never fall through to a more severe level.
    fn from_text(text: &str) -> Severity {
        match text.trim().to_lowercase().as_str() {
            "3" | "error" => Severity::Error,
            "2" | "warn" | "warning" => Severity::Warn,
            "1" | "info" => Severity::Info,
            _ => Severity::Unknown,
        }
    }
}

/// Parses severities from strings with case-insensitive matching.
///
/// Unlike [`Severity::normalize`], this rejects unrecognized input so callers
/// that want strict parsing (configuration, tests) can tell the difference.
impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match Severity::from_text(s) {
            Severity::Unknown if !s.trim().eq_ignore_ascii_case("unknown") => Err(format!(
                "Invalid severity: '{s}'. Valid severities are: error, warn, info, unknown",
            )),
            severity => Ok(severity),
        }
    }
}

/// Deserializes severities leniently from any JSON shape.
///
/// This implementation never fails: invalid or unexpected input is reported
/// via `tracing` and degrades to [`Severity::Unknown`], so a malformed field
/// cannot reject the record that carries it.
impl<'de> Deserialize<'de> for Severity {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        let severity = Severity::normalize(Some(&value));
        if severity == Severity::Unknown && value != Value::Null {
            tracing::debug!("Unrecognized severity value {:?}, using unknown", value);
        }
        Ok(severity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_numeric_codes_map_one_to_one() {
        assert_eq!(Severity::normalize(Some(&json!(3))), Severity::Error);
        assert_eq!(Severity::normalize(Some(&json!(2))), Severity::Warn);
        assert_eq!(Severity::normalize(Some(&json!(1))), Severity::Info);
    }

    // The upstream source collapsed every numeric code to the most severe
    // level via fallthrough matching. These pin the corrected mapping.
    #[test]
    fn test_code_two_is_warn_not_error() {
        assert_eq!(Severity::normalize(Some(&json!(2))), Severity::Warn);
        assert_ne!(Severity::normalize(Some(&json!(2))), Severity::Error);
    }

    #[test]
    fn test_code_one_is_info_not_error() {
        assert_eq!(Severity::normalize(Some(&json!(1))), Severity::Info);
        assert_ne!(Severity::normalize(Some(&json!(1))), Severity::Error);
    }

    #[test]
    fn test_numeric_strings() {
        assert_eq!(Severity::normalize(Some(&json!("3"))), Severity::Error);
        assert_eq!(Severity::normalize(Some(&json!("2"))), Severity::Warn);
        assert_eq!(Severity::normalize(Some(&json!("1"))), Severity::Info);
    }

    #[test]
    fn test_words_are_case_insensitive() {
        assert_eq!(Severity::normalize(Some(&json!("ERROR"))), Severity::Error);
        assert_eq!(Severity::normalize(Some(&json!("Warn"))), Severity::Warn);
        assert_eq!(
            Severity::normalize(Some(&json!("warning"))),
            Severity::Warn
        );
        assert_eq!(Severity::normalize(Some(&json!("info"))), Severity::Info);
    }

    #[test]
    fn test_absent_and_null_are_unknown() {
        assert_eq!(Severity::normalize(None), Severity::Unknown);
        assert_eq!(Severity::normalize(Some(&Value::Null)), Severity::Unknown);
    }

    #[test]
    fn test_unrecognized_degrades_to_unknown() {
        assert_eq!(Severity::normalize(Some(&json!(0))), Severity::Unknown);
        assert_eq!(Severity::normalize(Some(&json!(4))), Severity::Unknown);
        assert_eq!(Severity::normalize(Some(&json!(-2))), Severity::Unknown);
        assert_eq!(Severity::normalize(Some(&json!(2.5))), Severity::Unknown);
        assert_eq!(
            Severity::normalize(Some(&json!("critical"))),
            Severity::Unknown
        );
        assert_eq!(Severity::normalize(Some(&json!(true))), Severity::Unknown);
        assert_eq!(Severity::normalize(Some(&json!([2]))), Severity::Unknown);
    }

    #[test]
    fn test_from_str_strict() {
        assert_eq!(Severity::from_str("error"), Ok(Severity::Error));
        assert_eq!(Severity::from_str("WARNING"), Ok(Severity::Warn));
        assert_eq!(Severity::from_str("unknown"), Ok(Severity::Unknown));
        assert!(Severity::from_str("critical").is_err());
    }

    #[test]
    fn test_serde_round_trip_lowercase() {
        #[allow(clippy::unwrap_used)]
        let serialized = serde_json::to_string(&Severity::Warn).unwrap();
        assert_eq!(serialized, "\"warn\"");

        #[allow(clippy::unwrap_used)]
        let deserialized: Severity = serde_json::from_str("\"warn\"").unwrap();
        assert_eq!(deserialized, Severity::Warn);
    }

    #[test]
    fn test_lenient_deserialize_never_fails() {
        #[allow(clippy::unwrap_used)]
        let severity: Severity = serde_json::from_value(json!("bogus")).unwrap();
        assert_eq!(severity, Severity::Unknown);

        #[allow(clippy::unwrap_used)]
        let severity: Severity = serde_json::from_value(json!(2)).unwrap();
        assert_eq!(severity, Severity::Warn);
    }
}
