use std::error::Error;

use async_trait::async_trait;

use crate::course::{Assessment, CourseId, CourseOccurrence};
use crate::period::{PeriodId, ProgramId, SchedulePeriod};

/// A remote source of timetables (usually the backend, see [`Client`](crate::client::Client))
#[async_trait]
pub trait TimetableSource {
    /// Returns the published timetables of a program.
    /// Timetables that are still drafts, or that are closed, are not part of the result
    async fn fetch_published_periods(&self, program_id: &ProgramId) -> Result<Vec<SchedulePeriod>, Box<dyn Error>>;

    /// Returns the courses of a timetable
    async fn fetch_occurrences(&self, period_id: &PeriodId, program_id: &ProgramId) -> Result<Vec<CourseOccurrence>, Box<dyn Error>>;

    /// Returns the assessments ("devoirs") of a timetable
    async fn fetch_assessments(&self, period_id: &PeriodId, program_id: &ProgramId) -> Result<Vec<Assessment>, Box<dyn Error>>;

    /// Ask the source to switch the completion status of a course
    async fn update_occurrence_status(&mut self, occurrence_id: &CourseId) -> Result<(), Box<dyn Error>>;

    /// Ask the source to switch the teacher availability of a course
    async fn update_teacher_availability(&mut self, occurrence_id: &CourseId) -> Result<(), Box<dyn Error>>;
}
