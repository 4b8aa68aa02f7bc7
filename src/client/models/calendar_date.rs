//! # Calendar Date
//!
//! Date-only value object exchanged with the server as `YYYY-MM-DD`.
//!
//! A `CalendarDate` may be invalid: user input or a malformed server value is
//! kept as raw text instead of failing the whole decode, and invalid dates are
//! transmitted as `null`.

use chrono::{DateTime, NaiveDate};
use std::fmt;

/// Wire date format used by every date-only field
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Date-only value with validity tracking
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CalendarDate {
    /// Well-formed calendar date
    Valid(NaiveDate),
    /// Text that could not be read as a date
    Invalid(String),
}

impl CalendarDate {
    /// Parse a date from text.
    ///
    /// Accepts `YYYY-MM-DD` and RFC 3339 date-times (only the date part is
    /// kept). Anything else produces an invalid date, never an error.
    pub fn parse(text: &str) -> Self {
        let trimmed = text.trim();
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, DATE_FORMAT) {
            return Self::Valid(date);
        }
        if let Ok(date_time) = DateTime::parse_from_rfc3339(trimmed) {
            return Self::Valid(date_time.date_naive());
        }
        tracing::debug!("Unparseable calendar date: {:?}", text);
        Self::Invalid(text.to_string())
    }

    /// Build a date from year, month and day; out-of-range parts give an invalid date
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Self {
        match NaiveDate::from_ymd_opt(year, month, day) {
            Some(date) => Self::Valid(date),
            None => Self::Invalid(format!("{year:04}-{month:02}-{day:02}")),
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }

    /// The underlying date when valid
    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            Self::Valid(date) => Some(*date),
            Self::Invalid(_) => None,
        }
    }

    /// Format to the wire representation; `None` when invalid
    pub fn format(&self) -> Option<String> {
        let date = self.date()?;
        Some(date.format(DATE_FORMAT).to_string())
    }
}

impl From<NaiveDate> for CalendarDate {
    fn from(date: NaiveDate) -> Self {
        Self::Valid(date)
    }
}

impl fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Valid(date) => write!(f, "{}", date.format(DATE_FORMAT)),
            Self::Invalid(raw) => write!(f, "Invalid date ({raw})"),
        }
    }
}

/// Serde adapter for `Option<CalendarDate>` fields.
///
/// Use with `#[serde(default, with = "wire_date")]`. Missing, null and invalid
/// dates serialize as `null`.
pub mod wire_date {
    use super::CalendarDate;
    use serde::{Deserialize, Deserializer, Serializer};

    /// Client to server: valid dates become `YYYY-MM-DD`, everything else `null`
    pub fn to_wire(value: Option<&CalendarDate>) -> Option<String> {
        value.and_then(CalendarDate::format)
    }

    /// Server to client: `null` stays absent, strings are parsed
    pub fn from_wire(value: Option<&str>) -> Option<CalendarDate> {
        value.map(CalendarDate::parse)
    }

    pub fn serialize<S>(value: &Option<CalendarDate>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match to_wire(value.as_ref()) {
            Some(text) => serializer.serialize_str(&text),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<CalendarDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        Ok(from_wire(raw.as_deref()))
    }
}
