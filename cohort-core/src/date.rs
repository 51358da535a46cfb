//! ISO-style date handling for clinical records.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Serialize, Serializer};

/// A date as it appeared in the source file, paired with its parsed instant.
///
/// Ordering logic must go through [`ClinicalDate::instant`]; the raw text is
/// kept because trend points are keyed by the exact source string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClinicalDate {
    raw: String,
    instant: DateTime<Utc>,
}

impl ClinicalDate {
    /// Parse a date-only, RFC 3339 or naive date-time string.
    ///
    /// Date-only values resolve to midnight UTC and naive date-times are read
    /// as UTC.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        let instant = parse_instant(trimmed)?;
        Some(Self {
            raw: raw.to_string(),
            instant,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn instant(&self) -> DateTime<Utc> {
        self.instant
    }
}

impl fmt::Display for ClinicalDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl Serialize for ClinicalDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

fn parse_instant(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }

    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|naive| naive.and_utc())
}
