//! An entry of the day grid that is displayed for a timetable

use chrono::{Datelike, NaiveDate, Weekday};

/// A day of the active timetable. This is derived data, it is never persisted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CalendarDay {
    date: NaiveDate,
    day_name: &'static str,
    display_label: String,
}

impl CalendarDay {
    pub fn new(date: NaiveDate) -> Self {
        let day_name = french_day_name(date.weekday());
        let display_label = format!("{} {} {}", day_name, date.day(), french_month_name(date.month()));
        Self { date, day_name, display_label }
    }

    pub fn date(&self) -> NaiveDate        { self.date }
    /// e.g. `Lundi`
    pub fn day_name(&self) -> &str         { self.day_name }
    /// e.g. `Lundi 4 mars`
    pub fn display_label(&self) -> &str    { &self.display_label }
}

/// "Lundi", "Mardi"...
pub fn french_day_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Lundi",
        Weekday::Tue => "Mardi",
        Weekday::Wed => "Mercredi",
        Weekday::Thu => "Jeudi",
        Weekday::Fri => "Vendredi",
        Weekday::Sat => "Samedi",
        Weekday::Sun => "Dimanche",
    }
}

fn french_month_name(month: u32) -> &'static str {
    const MONTHS: [&str; 12] = [
        "janvier", "février", "mars", "avril", "mai", "juin",
        "juillet", "août", "septembre", "octobre", "novembre", "décembre",
    ];
    MONTHS[(month as usize - 1) % 12]
}
