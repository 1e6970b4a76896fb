//! Timestamp Helpers
//!
//! Every timestamp persisted by the marketplace is an RFC 3339 string in UTC
//! with a fixed microsecond precision. Fixed width keeps lexicographic order
//! equal to chronological order, which the document store relies on when it
//! sorts by `createdAt` or `timestamp`.

use chrono::{DateTime, SecondsFormat, Utc};

/// Format a timestamp the way it is stored
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse a stored timestamp
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|ts| ts.with_timezone(&Utc))
}

/// Serde adapter for `Option<DateTime<Utc>>` fields
///
/// Use together with `#[serde(default, skip_serializing_if = "Option::is_none")]`.
pub mod optional {
    use chrono::{DateTime, Utc};
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(ts) => serializer.serialize_str(&super::format_timestamp(ts)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            Some(raw) => super::parse_timestamp(&raw)
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("invalid timestamp: {raw}"))),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_has_fixed_width() {
        let whole = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let fractional = whole + chrono::Duration::microseconds(1500);
        assert_eq!(format_timestamp(&whole), "2024-05-01T12:00:00.000000Z");
        assert_eq!(format_timestamp(&fractional), "2024-05-01T12:00:00.001500Z");
        assert!(format_timestamp(&whole) < format_timestamp(&fractional));
    }

    #[test]
    fn test_parse_roundtrip() {
        let ts = Utc.with_ymd_and_hms(2023, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(parse_timestamp(&format_timestamp(&ts)), Some(ts));
        assert_eq!(parse_timestamp("yesterday"), None);
    }
}
