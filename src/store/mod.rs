//! This modules holds the state a timetable front-end displays
//!
//! It combines a remote [`TimetableSource`] and a local [`Cache`], and re-runs the [`ScheduleWindowResolver`]
//! whenever the data changes.

use std::error::Error;
use std::time::Duration;

use chrono::NaiveDate;
use tokio::sync::watch;

use crate::cache::Cache;
use crate::calendar_day::CalendarDay;
use crate::course::{Assessment, CompletionStatus, CourseId, CourseOccurrence, TeacherAvailability};
use crate::dates::CalendarDate;
use crate::error::ValidationError;
use crate::period::{ProgramId, SchedulePeriod};
use crate::resolver::ScheduleWindowResolver;
use crate::traits::TimetableSource;

pub mod refresh_progress;
use refresh_progress::RefreshProgress;
use refresh_progress::{FeedbackSender, RefreshEvent, RefreshStep};


/// The timetable of a program, as currently displayed.
///
/// `remote` is usually a [`Client`](crate::client::Client). It is the only owner of the data: the local cache is only
/// updated once the remote has accepted a change.
#[derive(Debug)]
pub struct TimetableStore<S>
where
    S: TimetableSource,
{
    /// The remote source (usually a server)
    remote: S,
    /// The local cache
    local: Cache,

    program_id: ProgramId,
    resolver: ScheduleWindowResolver,

    active_period: Option<SchedulePeriod>,
    days: Vec<CalendarDay>,
    selected_day: Option<CalendarDay>,
}

impl<S> TimetableStore<S>
where
    S: TimetableSource,
{
    /// Create a store for a program.
    ///
    /// Nothing is displayed until [`Self::load_from_cache`] or [`Self::refresh`] is called.
    pub fn new(remote: S, local: Cache, program_id: ProgramId) -> Self {
        Self::new_with_resolver(remote, local, program_id, ScheduleWindowResolver::default())
    }

    pub fn new_with_resolver(remote: S, local: Cache, program_id: ProgramId, resolver: ScheduleWindowResolver) -> Self {
        Self {
            remote, local, program_id, resolver,
            active_period: None,
            days: Vec::new(),
            selected_day: None,
        }
    }

    /// Returns the data source described as `local`
    pub fn local(&self) -> &Cache { &self.local }
    /// Returns the data source described as `local`
    pub fn local_mut(&mut self) -> &mut Cache { &mut self.local }
    /// Returns the data source described as `remote`.
    ///
    /// Apart from tests, there are very few (if any) reasons to access `remote` directly.
    pub fn remote(&self) -> &S { &self.remote }
    /// Returns the data source described as `remote`, mutably. This is mostly useful to alter mocked sources in tests
    pub fn remote_mut(&mut self) -> &mut S { &mut self.remote }

    pub fn program_id(&self) -> &ProgramId { &self.program_id }
    pub fn resolver(&self) -> &ScheduleWindowResolver { &self.resolver }

    /// The timetable that is displayed. `None` means there is nothing to display
    pub fn active_period(&self) -> Option<&SchedulePeriod> { self.active_period.as_ref() }
    /// The days of the active timetable
    pub fn days(&self) -> &[CalendarDay] { &self.days }
    pub fn selected_day(&self) -> Option<&CalendarDay> { self.selected_day.as_ref() }

    /// Display what the local cache contains, without waiting for the network
    pub fn load_from_cache<D: CalendarDate>(&mut self, now: D) {
        self.resolve_view(now.calendar_date());
    }

    /// Re-run the resolver over the cached timetables.
    ///
    /// The day grid is only rebuilt (and the day matching `today` selected) when the active timetable changes.
    /// Returns whether it changed.
    fn resolve_view(&mut self, today: NaiveDate) -> bool {
        let periods = self.local.periods(&self.program_id);
        let new_active = self.resolver.select_active_period(periods, today).cloned();

        if new_active == self.active_period {
            return false;
        }

        self.days = match &new_active {
            None => Vec::new(),
            Some(period) => self.resolver.enumerate_days(period).collect(),
        };
        self.selected_day = self.resolver.find_day_matching(&self.days, today)
            .or_else(|| self.days.first())
            .cloned();
        self.active_period = new_active;
        true
    }

    /// Fetches fresh data from `remote`, stores it in `local`, and updates what is displayed.
    ///
    /// It returns whether the refresh was totally successful (details about errors are logged using the `log::*` macros).
    /// In case of errors, the previously cached data is kept and still displayed.
    pub async fn refresh<D: CalendarDate>(&mut self, now: D) -> bool {
        let mut progress = RefreshProgress::new();
        self.run_refresh(now.calendar_date(), &mut progress).await
    }

    /// Same as [`Self::refresh`], and provide feeedback to the user about the progress.
    pub async fn refresh_with_feedback<D: CalendarDate>(&mut self, now: D, feedback_sender: FeedbackSender) -> bool {
        let mut progress = RefreshProgress::new_with_feedback_channel(feedback_sender);
        self.run_refresh(now.calendar_date(), &mut progress).await
    }

    async fn run_refresh(&mut self, today: NaiveDate, progress: &mut RefreshProgress) -> bool {
        progress.info(&format!("Refreshing the timetable of program {}", self.program_id));
        progress.feedback(RefreshEvent::Started);

        // Step 1 - the list of timetables
        match self.remote.fetch_published_periods(&self.program_id).await {
            Err(err) if self.local.periods(&self.program_id).is_empty() => {
                progress.fail(RefreshStep::Periods, &format!("Unable to fetch the timetables of {}: {}. There is nothing to display", self.program_id, err));
            },
            Err(err) => {
                progress.fall_back(RefreshStep::Periods, &format!("Unable to fetch the timetables of {}: {}. Using the cached ones", self.program_id, err));
            },
            Ok(periods) => {
                progress.debug(&format!("{} published timetables", periods.len()));
                progress.feedback(RefreshEvent::Fetched{ step: RefreshStep::Periods, count: periods.len() });
                self.local.set_periods(&self.program_id, periods);
            },
        }

        // Step 2 - which one is displayed
        let previous_id = self.active_period.as_ref().map(|p| p.id().clone());
        if self.resolve_view(today) {
            match &self.active_period {
                None => progress.info("No timetable to display"),
                Some(period) if Some(period.id()) != previous_id.as_ref() => {
                    progress.info(&format!("Timetable {} ({} to {}) is now displayed", period.id(), period.start_date(), period.end_date()));
                    progress.feedback(RefreshEvent::NewPeriod{ period_id: period.id().clone() });
                },
                Some(period) => progress.debug(&format!("Timetable {} has changed", period.id())),
            }
        }

        if let Some(period_id) = self.active_period.as_ref().map(|p| p.id().clone()) {
            // Step 3 - its courses
            match self.remote.fetch_occurrences(&period_id, &self.program_id).await {
                Err(err) => {
                    progress.fall_back(RefreshStep::Courses, &format!("Unable to fetch the courses of timetable {}: {}. Using the cached ones", period_id, err));
                },
                Ok(occurrences) => {
                    progress.feedback(RefreshEvent::Fetched{ step: RefreshStep::Courses, count: occurrences.len() });
                    self.local.set_occurrences(&self.program_id, &period_id, occurrences);
                },
            }

            // Step 4 - its assessments
            match self.remote.fetch_assessments(&period_id, &self.program_id).await {
                Err(err) => {
                    progress.fall_back(RefreshStep::Assessments, &format!("Unable to fetch the assessments of timetable {}: {}. Using the cached ones", period_id, err));
                },
                Ok(assessments) => {
                    progress.feedback(RefreshEvent::Fetched{ step: RefreshStep::Assessments, count: assessments.len() });
                    self.local.set_assessments(&self.program_id, &period_id, assessments);
                },
            }
        }

        if progress.is_success() {
            self.local.update_last_refresh(&self.program_id, None);
        }
        progress.feedback(RefreshEvent::Finished{ success: progress.is_success() });
        progress.is_success()
    }

    /// Refreshes every `interval` (starting now), until `stop` turns `true` or its sender is dropped.
    ///
    /// The selected day only moves when another timetable becomes active: a refresh after midnight keeps
    /// the previous day selected. Call [`Self::select_day`] to follow the date.
    pub async fn refresh_periodically(&mut self, interval: Duration, mut stop: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(interval);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if self.refresh(chrono::Local::now()).await == false {
                        log::warn!("Periodic refresh did not complete, the next one will try again");
                    }
                },
                changed = stop.changed() => {
                    if changed.is_err() || *stop.borrow() {
                        log::debug!("Stopping periodic refreshes");
                        break;
                    }
                },
            }
        }
    }

    /// Selects the day of the grid matching `target`. Returns `None` (and keeps the current selection) if there is none
    pub fn select_day<D: CalendarDate>(&mut self, target: D) -> Option<&CalendarDay> {
        let day = self.resolver.find_day_matching(&self.days, target)?.clone();
        self.selected_day = Some(day);
        self.selected_day.as_ref()
    }

    /// The courses of the active timetable on the selected day. This is empty when nothing is selected
    pub fn courses_for_selected_day(&self) -> Vec<&CourseOccurrence> {
        match (&self.active_period, &self.selected_day) {
            (Some(period), Some(day)) => {
                self.resolver.occurrences_on_day(self.local.occurrences(&self.program_id), day)
                    .into_iter()
                    .filter(|course| course.period_id() == period.id())
                    .collect()
            },
            _ => Vec::new(),
        }
    }

    /// The assessments of the active timetable on the selected day
    pub fn assessments_for_selected_day(&self) -> Vec<&Assessment> {
        match (&self.active_period, &self.selected_day) {
            (Some(period), Some(day)) => {
                self.local.assessments(&self.program_id).iter()
                    .filter(|a| &a.period_id == period.id() && a.date == day.date())
                    .collect()
            },
            _ => Vec::new(),
        }
    }

    fn known_course(&self, id: &CourseId) -> Result<&CourseOccurrence, ValidationError> {
        self.local.occurrence(&self.program_id, id)
            .ok_or_else(|| ValidationError::UnknownCourse(id.clone()))
    }

    /// Switches a course between "done" and "not done", on the remote first, then locally.
    /// Returns the new status
    pub async fn toggle_course_status(&mut self, id: &CourseId) -> Result<CompletionStatus, Box<dyn Error>> {
        if self.known_course(id)?.completion_status().toggled().is_none() {
            return Err(ValidationError::CancelledCourse(id.clone()).into());
        }

        self.remote.update_occurrence_status(id).await?;

        let course = self.local.occurrence_mut(&self.program_id, id)
            .ok_or_else(|| ValidationError::UnknownCourse(id.clone()))?;
        let new_status = course.toggle_completion_status()?;
        log::info!("Course {} is now {:?}", id, new_status);
        Ok(new_status)
    }

    /// Switches the teacher availability of a course, on the remote first, then locally.
    /// Returns the new availability
    pub async fn toggle_teacher_availability(&mut self, id: &CourseId) -> Result<TeacherAvailability, Box<dyn Error>> {
        self.known_course(id)?;

        self.remote.update_teacher_availability(id).await?;

        let course = self.local.occurrence_mut(&self.program_id, id)
            .ok_or_else(|| ValidationError::UnknownCourse(id.clone()))?;
        let new_availability = course.toggle_teacher_availability();
        log::info!("Teacher of course {} is now {:?}", id, new_availability);
        Ok(new_availability)
    }
}

#[cfg(test)]
mod tests;
