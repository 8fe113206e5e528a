//! Resolution of the timetable to display
//!
//! Given the timetables published for a program and the current date, this module picks the active timetable,
//! lists the days it covers and filters the courses of a given day. \
//! Everything here is pure and synchronous: the data must be fetched beforehand (see [`crate::store`]).

use chrono::{Datelike, Duration, NaiveDate, Weekday};

use crate::calendar_day::CalendarDay;
use crate::course::CourseOccurrence;
use crate::dates::CalendarDate;
use crate::period::SchedulePeriod;

/// Turns a list of timetables into a day grid and a per-day list of courses
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScheduleWindowResolver {
    excluded_weekday: Weekday,
}

impl Default for ScheduleWindowResolver {
    /// A resolver that skips the rest day set in [`crate::config::REST_DAY`]
    fn default() -> Self {
        Self::new(crate::config::rest_day())
    }
}

impl ScheduleWindowResolver {
    pub fn new(excluded_weekday: Weekday) -> Self {
        Self { excluded_weekday }
    }

    pub fn excluded_weekday(&self) -> Weekday {
        self.excluded_weekday
    }

    /// Returns the timetable that contains `now`.
    ///
    /// In case several periods contain `now`, the first one (in input order) wins.
    /// In case none does, this falls back to the first period. This returns `None` only if `periods` is empty.
    pub fn select_active_period<'a, D: CalendarDate>(&self, periods: &'a [SchedulePeriod], now: D) -> Option<&'a SchedulePeriod> {
        let today = now.calendar_date();

        match periods.iter().find(|p| p.contains(today)) {
            Some(period) => Some(period),
            None => {
                let fallback = periods.first();
                if let Some(p) = fallback {
                    log::debug!("No timetable contains {}, falling back to {}", today, p.id());
                }
                fallback
            }
        }
    }

    /// Walks every date of `period` (both bounds included), skipping the excluded weekday
    pub fn enumerate_days(&self, period: &SchedulePeriod) -> Days {
        Days {
            next: Some(period.start_date()),
            end: period.end_date(),
            excluded_weekday: self.excluded_weekday,
        }
    }

    /// Returns the day of `days` that has the same date as `target`
    pub fn find_day_matching<'a, D: CalendarDate>(&self, days: &'a [CalendarDay], target: D) -> Option<&'a CalendarDay> {
        let target = target.calendar_date();
        days.iter().find(|day| day.date() == target)
    }

    /// Returns the courses that happen on `day`, in input order
    pub fn occurrences_on_day<'a>(&self, occurrences: &'a [CourseOccurrence], day: &CalendarDay) -> Vec<&'a CourseOccurrence> {
        occurrences.iter()
            .filter(|occ| occ.date() == day.date())
            .collect()
    }
}


/// Iterator over the days of a timetable, see [`ScheduleWindowResolver::enumerate_days`]
#[derive(Debug)]
pub struct Days {
    next: Option<NaiveDate>,
    end: NaiveDate,
    excluded_weekday: Weekday,
}

impl Iterator for Days {
    type Item = CalendarDay;

    fn next(&mut self) -> Option<CalendarDay> {
        loop {
            let current = self.next.filter(|d| *d <= self.end)?;
            self.next = current.checked_add_signed(Duration::days(1));

            if current.weekday() != self.excluded_weekday {
                return Some(CalendarDay::new(current));
            }
        }
    }
}

impl std::iter::FusedIterator for Days {}
