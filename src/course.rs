//! Course occurrences ("cours"), i.e. a single scheduled course within a timetable

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::period::PeriodId;

/// The ID of a course occurrence, as given by the backend
pub type CourseId = String;

/// Coarse half-day bucket ("créneau")
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeSlot {
    #[serde(rename = "MATIN")]
    Morning,
    #[serde(rename = "SOIR")]
    Evening,
}

impl TimeSlot {
    pub fn label(&self) -> &'static str {
        match self {
            TimeSlot::Morning => "Matin",
            TimeSlot::Evening => "Soir",
        }
    }
}

/// Whether a course actually took place
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompletionStatus {
    #[serde(rename = "PLANIFIE")]
    Planned,
    #[serde(rename = "FAIT")]
    Done,
    #[serde(rename = "NON_FAIT")]
    NotDone,
    #[serde(rename = "ANNULE")]
    Cancelled,
}

impl CompletionStatus {
    pub fn is_done(&self) -> bool {
        match self {
            CompletionStatus::Done => true,
            _ => false,
        }
    }

    /// The status a toggle switches to.
    ///
    /// A done course becomes "not done", a planned or not-done course becomes "done". Cancelled courses cannot be toggled.
    pub fn toggled(&self) -> Option<Self> {
        match self {
            CompletionStatus::Done => Some(CompletionStatus::NotDone),
            CompletionStatus::Planned | CompletionStatus::NotDone => Some(CompletionStatus::Done),
            CompletionStatus::Cancelled => None,
        }
    }
}

/// Whether the teacher will be there
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TeacherAvailability {
    #[serde(rename = "DISPONIBLE")]
    Available,
    #[serde(rename = "INDISPONIBLE")]
    Unavailable,
}

impl TeacherAvailability {
    pub fn is_available(&self) -> bool {
        *self == TeacherAvailability::Available
    }

    pub fn toggled(&self) -> Self {
        match self {
            TeacherAvailability::Available => TeacherAvailability::Unavailable,
            TeacherAvailability::Unavailable => TeacherAvailability::Available,
        }
    }
}

/// A single scheduled course instance within a timetable
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CourseOccurrence {
    id: CourseId,
    #[serde(with = "crate::dates::calendar_date")]
    date: NaiveDate,
    /// The backend spells it this way
    #[serde(rename = "crenau")]
    time_slot: TimeSlot,
    #[serde(rename = "statutCours")]
    completion_status: CompletionStatus,
    #[serde(rename = "disponibiliteProf")]
    teacher_availability: TeacherAvailability,
    #[serde(rename = "idSalle")]
    room_id: String,
    #[serde(rename = "idMatiere")]
    subject_id: String,
    #[serde(rename = "idEmploiDuTemps")]
    period_id: PeriodId,
}

impl CourseOccurrence {
    /// Create a new planned course, with an available teacher
    pub fn new<S: ToString>(id: S, date: NaiveDate, time_slot: TimeSlot, room_id: S, subject_id: S, period_id: S) -> Self {
        Self::new_with_parameters(
            id.to_string(), date, time_slot,
            CompletionStatus::Planned, TeacherAvailability::Available,
            room_id.to_string(), subject_id.to_string(), period_id.to_string(),
        )
    }

    pub fn new_with_parameters(id: CourseId, date: NaiveDate, time_slot: TimeSlot,
                               completion_status: CompletionStatus, teacher_availability: TeacherAvailability,
                               room_id: String, subject_id: String, period_id: PeriodId,
                            ) -> Self
    {
        Self {
            id,
            date,
            time_slot,
            completion_status,
            teacher_availability,
            room_id,
            subject_id,
            period_id,
        }
    }

    pub fn id(&self) -> &CourseId       { &self.id          }
    pub fn date(&self) -> NaiveDate     { self.date         }
    pub fn time_slot(&self) -> TimeSlot { self.time_slot    }
    pub fn room_id(&self) -> &str       { &self.room_id     }
    pub fn subject_id(&self) -> &str    { &self.subject_id  }
    pub fn period_id(&self) -> &PeriodId                        { &self.period_id }
    pub fn completion_status(&self) -> CompletionStatus         { self.completion_status }
    pub fn teacher_availability(&self) -> TeacherAvailability   { self.teacher_availability }

    pub fn is_cancelled(&self) -> bool {
        self.completion_status == CompletionStatus::Cancelled
    }

    /// Set the completion status
    pub fn set_completion_status(&mut self, new_status: CompletionStatus) {
        self.completion_status = new_status;
    }

    /// Switch between "done" and "not done".
    /// Returns the new status, or an error in case this course is cancelled
    pub fn toggle_completion_status(&mut self) -> Result<CompletionStatus, ValidationError> {
        match self.completion_status.toggled() {
            None => Err(ValidationError::CancelledCourse(self.id.clone())),
            Some(new_status) => {
                self.completion_status = new_status;
                Ok(new_status)
            },
        }
    }

    /// Set the teacher availability
    pub fn set_teacher_availability(&mut self, availability: TeacherAvailability) {
        self.teacher_availability = availability;
    }

    /// Switch the teacher availability, and return the new one
    pub fn toggle_teacher_availability(&mut self) -> TeacherAvailability {
        self.teacher_availability = self.teacher_availability.toggled();
        self.teacher_availability
    }
}


/// Whether an assessment took place
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssessmentStatus {
    #[serde(rename = "FAIT")]
    Done,
    #[serde(rename = "NON_FAIT")]
    NotDone,
    #[serde(rename = "ANNULE")]
    Cancelled,
}

/// An exam or assignment slot ("devoir") within a timetable
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    pub id: String,
    #[serde(with = "crate::dates::calendar_date")]
    pub date: NaiveDate,
    #[serde(rename = "crenau")]
    pub time_slot: TimeSlot,
    /// Duration, in hours
    #[serde(rename = "duree")]
    pub duration: u32,
    #[serde(rename = "statutDevoir")]
    pub status: AssessmentStatus,
    #[serde(rename = "idSalle")]
    pub room_id: String,
    #[serde(rename = "idMatiere")]
    pub subject_id: String,
    #[serde(rename = "idEmploiDuTemps")]
    pub period_id: PeriodId,
}
