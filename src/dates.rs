//! Date normalisation
//!
//! Every comparison in this crate is made between calendar dates: the time-of-day (and the time zone) of any
//! timestamp is dropped first.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone};
use serde::{Deserialize, Deserializer, Serializer};

use crate::error::ValidationError;

/// Something that can be reduced to a calendar date
pub trait CalendarDate {
    /// The calendar date, ignoring any time-of-day component
    fn calendar_date(&self) -> NaiveDate;
}

impl CalendarDate for NaiveDate {
    fn calendar_date(&self) -> NaiveDate {
        *self
    }
}

impl CalendarDate for NaiveDateTime {
    fn calendar_date(&self) -> NaiveDate {
        self.date()
    }
}

impl<Tz: TimeZone> CalendarDate for DateTime<Tz> {
    fn calendar_date(&self) -> NaiveDate {
        self.naive_local().date()
    }
}

impl<T: CalendarDate> CalendarDate for &T {
    fn calendar_date(&self) -> NaiveDate {
        (*self).calendar_date()
    }
}

/// Parse the date formats the backend is known to send.
///
/// Accepted: `2024-03-04`, `2024-03-04T08:00:00`, `2024-03-04T08:00:00.000` and RFC 3339 (`2024-03-04T08:00:00+01:00`, `...Z`).
pub fn parse_calendar_date(text: &str) -> Result<NaiveDate, ValidationError> {
    let text = text.trim();

    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Ok(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Ok(dt.calendar_date());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(dt.date());
    }

    Err(ValidationError::MalformedDate(text.to_string()))
}

/// Used to support serde (`#[serde(with = "crate::dates::calendar_date")]`)
pub mod calendar_date {
    use super::*;

    pub fn serialize<S>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&date.format("%Y-%m-%d").to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        parse_calendar_date(&text).map_err(serde::de::Error::custom)
    }
}

/// Same as [`calendar_date`], for optional fields
pub mod optional_calendar_date {
    use super::*;

    pub fn serialize<S>(date: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match date {
            Some(d) => serializer.serialize_some(&d.format("%Y-%m-%d").to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            None => Ok(None),
            Some(text) => parse_calendar_date(&text).map(Some).map_err(serde::de::Error::custom),
        }
    }
}
