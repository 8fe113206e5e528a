//! Validation failures
//!
//! Anything that goes through the network or the filesystem returns a `Box<dyn Error>`.
//! This type is reserved to the failures that are caused by the caller's input itself.

use std::fmt::{Display, Formatter};

use chrono::NaiveDate;

/// An input that cannot be accepted as-is
#[derive(Clone, Debug, PartialEq)]
pub enum ValidationError {
    /// A string could not be understood as a calendar date
    MalformedDate(String),
    /// A date range ends before it starts
    InvertedRange { start: NaiveDate, end: NaiveDate },
    /// A registration form field is missing or invalid
    InvalidField { field: &'static str, reason: String },
    /// A cancelled course cannot have its completion status toggled
    CancelledCourse(String),
    /// No course with this ID is known locally
    UnknownCourse(String),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::MalformedDate(s) => write!(f, "Malformed date {:?}", s),
            ValidationError::InvertedRange{ start, end } => write!(f, "Date range ends ({}) before it starts ({})", end, start),
            ValidationError::InvalidField{ field, reason } => write!(f, "Invalid field '{}': {}", field, reason),
            ValidationError::CancelledCourse(id) => write!(f, "Course {} is cancelled, its status cannot be changed", id),
            ValidationError::UnknownCourse(id) => write!(f, "No course {} in the local cache", id),
        }
    }
}

impl std::error::Error for ValidationError {}
