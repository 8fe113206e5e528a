//! Timetables ("emplois du temps"), i.e. the date ranges a program has a published schedule for

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::dates::CalendarDate;
use crate::error::ValidationError;

/// The ID of a timetable, as given by the backend
pub type PeriodId = String;
/// The ID of a program ("filière"), as given by the backend
pub type ProgramId = String;

/// Where a timetable is in its lifecycle. This lifecycle is owned by the backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PublicationStatus {
    /// Still being edited, not visible to students
    #[serde(rename = "BROUILLON")]
    Draft,
    #[serde(rename = "PUBLIE")]
    Published,
    /// The period is over
    #[serde(rename = "CLOS")]
    Closed,
}

/// A date range for which a timetable exists
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SchedulePeriod {
    id: PeriodId,
    #[serde(rename = "dateDebut", with = "crate::dates::calendar_date")]
    start_date: NaiveDate,
    #[serde(rename = "dateFin", with = "crate::dates::calendar_date")]
    end_date: NaiveDate,
    #[serde(rename = "statutEdt")]
    publication_status: PublicationStatus,
    #[serde(rename = "idFiliere")]
    program_id: ProgramId,
    #[serde(rename = "datePublication", default, skip_serializing_if = "Option::is_none", with = "crate::dates::optional_calendar_date")]
    publication_date: Option<NaiveDate>,
}

impl SchedulePeriod {
    /// Create a period. Fails in case `end_date` is before `start_date`
    pub fn new<S: ToString, P: ToString>(id: S, start_date: NaiveDate, end_date: NaiveDate, publication_status: PublicationStatus, program_id: P) -> Result<Self, ValidationError> {
        if end_date < start_date {
            return Err(ValidationError::InvertedRange{ start: start_date, end: end_date });
        }

        Ok(Self {
            id: id.to_string(),
            start_date,
            end_date,
            publication_status,
            program_id: program_id.to_string(),
            publication_date: None,
        })
    }

    pub fn with_publication_date(mut self, date: NaiveDate) -> Self {
        self.publication_date = Some(date);
        self
    }

    pub fn id(&self) -> &PeriodId                          { &self.id }
    pub fn start_date(&self) -> NaiveDate                  { self.start_date }
    pub fn end_date(&self) -> NaiveDate                    { self.end_date }
    pub fn publication_status(&self) -> PublicationStatus  { self.publication_status }
    pub fn program_id(&self) -> &ProgramId                 { &self.program_id }
    pub fn publication_date(&self) -> Option<NaiveDate>    { self.publication_date }

    pub fn is_published(&self) -> bool {
        self.publication_status == PublicationStatus::Published
    }

    /// Whether `when` falls in `[start_date, end_date]`. Both bounds are whole days.
    pub fn contains<D: CalendarDate>(&self, when: D) -> bool {
        let day = when.calendar_date();
        self.start_date <= day && day <= self.end_date
    }

    /// Number of calendar days in this period, both bounds included (0 for a range that is inverted)
    pub fn day_count(&self) -> i64 {
        let span: Duration = self.end_date - self.start_date;
        std::cmp::max(span.num_days() + 1, 0)
    }
}
