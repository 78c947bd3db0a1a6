//! Lenient serde adapters for hand-edited and externally produced JSON.
//!
//! Day-files are written by more than one program. Timestamps arrive either as
//! RFC 3339 strings or as naive `YYYY-MM-DDTHH:MM:SS` strings (read as UTC),
//! and ids arrive either as numbers or as numeric strings. Empty strings are
//! read as absent. Everything is written back as RFC 3339 with millisecond
//! precision and a `Z` suffix.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serializer};

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

/// Parse a timestamp in any of the accepted shapes.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use cyclelog_core::serde_helpers::parse_timestamp;
///
/// let expected = Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap();
/// assert_eq!(parse_timestamp("2024-01-01T08:00:00.000Z"), Some(expected));
/// assert_eq!(parse_timestamp("2024-01-01T08:00:00"), Some(expected));
/// assert_eq!(parse_timestamp("yesterday"), None);
/// ```
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Render a timestamp the way every Cyclelog file stores it.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// `Option<DateTime<Utc>>` fields.
pub mod timestamp_opt {
    use super::*;

    /// Serialize as RFC 3339 or `null`.
    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(ts) => serializer.serialize_str(&format_timestamp(ts)),
            None => serializer.serialize_none(),
        }
    }

    /// Deserialize from a string, `null` or an empty string.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => parse_timestamp(s)
                .map(Some)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {}", s))),
        }
    }
}

/// Required `DateTime<Utc>` fields.
pub mod timestamp {
    use super::*;

    /// Serialize as RFC 3339.
    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format_timestamp(value))
    }

    /// Deserialize from a string in any accepted shape.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse_timestamp(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {}", raw)))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IdRepr {
    Number(i64),
    Text(String),
}

impl IdRepr {
    fn into_id<E: serde::de::Error>(self) -> Result<Option<i64>, E> {
        match self {
            IdRepr::Number(n) => Ok(Some(n)),
            IdRepr::Text(s) if s.trim().is_empty() => Ok(None),
            IdRepr::Text(s) => s
                .trim()
                .parse()
                .map(Some)
                .map_err(|_| E::custom(format!("invalid id: {}", s))),
        }
    }
}

/// `Option<i64>` id fields that may be numbers, numeric strings or `null`.
pub mod id_opt {
    use super::*;

    /// Serialize as a number or `null`.
    pub fn serialize<S>(value: &Option<i64>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(id) => serializer.serialize_i64(*id),
            None => serializer.serialize_none(),
        }
    }

    /// Deserialize from a number, numeric string or `null`.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<IdRepr>::deserialize(deserializer)? {
            Some(repr) => repr.into_id(),
            None => Ok(None),
        }
    }
}

/// Required `i64` id fields that may be numbers or numeric strings.
pub mod id {
    use super::*;

    /// Serialize as a number.
    pub fn serialize<S>(value: &i64, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_i64(*value)
    }

    /// Deserialize from a number or numeric string.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<i64, D::Error>
    where
        D: Deserializer<'de>,
    {
        IdRepr::deserialize(deserializer)?
            .into_id()?
            .ok_or_else(|| serde::de::Error::custom("empty id"))
    }
}
