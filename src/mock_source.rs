//! An in-memory [`TimetableSource`], that mimics the backend in tests

use std::collections::HashMap;
use std::error::Error;
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;

use crate::course::{Assessment, CourseId, CourseOccurrence};
use crate::mock_behaviour::MockBehaviour;
use crate::period::{PeriodId, ProgramId, SchedulePeriod};
use crate::traits::TimetableSource;

/// A fake backend.
///
/// Just like the real one, it owns the state of the courses: status updates are applied here first.
#[derive(Debug, Default)]
pub struct MockSource {
    periods: HashMap<ProgramId, Vec<SchedulePeriod>>,
    occurrences: Vec<CourseOccurrence>,
    assessments: Vec<Assessment>,

    mock_behaviour: Option<Arc<Mutex<MockBehaviour>>>,
    n_period_fetches: AtomicU32,
}

fn check(behaviour: &Option<Arc<Mutex<MockBehaviour>>>, action: fn(&mut MockBehaviour) -> Result<(), Box<dyn Error>>) -> Result<(), Box<dyn Error>> {
    match behaviour {
        None => Ok(()),
        Some(b) => {
            let mut b = b.lock().map_err(|_| "poisoned mock behaviour")?;
            action(&mut b)
        },
    }
}

impl MockSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a behaviour that can make some calls fail
    pub fn set_mock_behaviour(&mut self, behaviour: Option<Arc<Mutex<MockBehaviour>>>) {
        self.mock_behaviour = behaviour;
    }

    /// Add a timetable (whatever its publication status)
    pub fn add_period(&mut self, period: SchedulePeriod) {
        self.periods.entry(period.program_id().clone()).or_default().push(period);
    }

    pub fn add_occurrence(&mut self, occurrence: CourseOccurrence) {
        self.occurrences.push(occurrence);
    }

    pub fn add_assessment(&mut self, assessment: Assessment) {
        self.assessments.push(assessment);
    }

    pub fn remove_periods(&mut self, program_id: &ProgramId) {
        self.periods.remove(program_id);
    }

    /// The server-side state of a course
    pub fn occurrence(&self, id: &str) -> Option<&CourseOccurrence> {
        self.occurrences.iter().find(|occ| occ.id() == id)
    }

    fn occurrence_mut(&mut self, id: &str) -> Result<&mut CourseOccurrence, Box<dyn Error>> {
        self.occurrences.iter_mut()
            .find(|occ| occ.id() == id)
            .ok_or_else(|| format!("HTTP 404: no course {}", id).into())
    }

    /// How many times timetables have been requested
    pub fn period_fetch_count(&self) -> u32 {
        self.n_period_fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TimetableSource for MockSource {
    async fn fetch_published_periods(&self, program_id: &ProgramId) -> Result<Vec<SchedulePeriod>, Box<dyn Error>> {
        self.n_period_fetches.fetch_add(1, Ordering::SeqCst);
        check(&self.mock_behaviour, MockBehaviour::can_fetch_periods)?;

        Ok(self.periods.get(program_id)
            .map(|periods| periods.iter().filter(|p| p.is_published()).cloned().collect())
            .unwrap_or_default())
    }

    async fn fetch_occurrences(&self, period_id: &PeriodId, _program_id: &ProgramId) -> Result<Vec<CourseOccurrence>, Box<dyn Error>> {
        check(&self.mock_behaviour, MockBehaviour::can_fetch_occurrences)?;

        Ok(self.occurrences.iter()
            .filter(|occ| occ.period_id() == period_id)
            .cloned()
            .collect())
    }

    async fn fetch_assessments(&self, period_id: &PeriodId, _program_id: &ProgramId) -> Result<Vec<Assessment>, Box<dyn Error>> {
        check(&self.mock_behaviour, MockBehaviour::can_fetch_assessments)?;

        Ok(self.assessments.iter()
            .filter(|a| &a.period_id == period_id)
            .cloned()
            .collect())
    }

    async fn update_occurrence_status(&mut self, occurrence_id: &CourseId) -> Result<(), Box<dyn Error>> {
        check(&self.mock_behaviour, MockBehaviour::can_update_status)?;

        self.occurrence_mut(occurrence_id)?
            .toggle_completion_status()?;
        Ok(())
    }

    async fn update_teacher_availability(&mut self, occurrence_id: &CourseId) -> Result<(), Box<dyn Error>> {
        check(&self.mock_behaviour, MockBehaviour::can_update_availability)?;

        self.occurrence_mut(occurrence_id)?
            .toggle_teacher_availability();
        Ok(())
    }
}
