//! Date parsing shared by request inputs and query filters.
//!
//! Clients send either full RFC 3339 timestamps or bare `YYYY-MM-DD` dates.
//! A bare date means midnight UTC of that day, so a window ending on
//! `2024-01-31` stops at the first instant of the 31st.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, de};

/// Parses an RFC 3339 timestamp or a `YYYY-MM-DD` date (midnight UTC).
#[must_use]
pub fn parse_flexible(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(value) {
        return Some(timestamp.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Serde adapter for a required flexible date field.
pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_flexible(&raw).ok_or_else(|| de::Error::custom(format!("invalid date: {raw}")))
}

/// Serde adapter for an optional flexible date field. Empty strings count as absent.
pub fn deserialize_option<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => parse_flexible(&raw)
            .map(Some)
            .ok_or_else(|| de::Error::custom(format!("invalid date: {raw}"))),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_bare_date_is_midnight_utc() {
        let parsed = parse_flexible("2024-01-31").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 1, 31, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_rfc3339_offset_is_normalised() {
        let parsed = parse_flexible("2024-01-15T10:30:00+02:00").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 1, 15, 8, 30, 0).unwrap());
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(parse_flexible("next tuesday").is_none());
        assert!(parse_flexible("2024-13-01").is_none());
    }

    #[derive(Deserialize)]
    struct Window {
        #[serde(deserialize_with = "deserialize")]
        start: DateTime<Utc>,
        #[serde(default, deserialize_with = "deserialize_option")]
        end: Option<DateTime<Utc>>,
    }

    #[test]
    fn test_serde_adapters() {
        let window: Window = serde_json::from_str(r#"{"start":"2024-01-01","end":""}"#).unwrap();
        assert_eq!(window.start, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        assert!(window.end.is_none());

        let window: Window = serde_json::from_str(r#"{"start":"2024-01-01"}"#).unwrap();
        assert!(window.end.is_none());

        let bad: std::result::Result<Window, _> = serde_json::from_str(r#"{"start":"soon"}"#);
        assert!(bad.is_err());
    }
}
