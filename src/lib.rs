//! This crate provides a way to display the timetable ("emploi du temps") of a school program.
//!
//! It provides a client for the school REST API in the [`client`] module, that can be used as a stand-alone module.
//!
//! Because the connection to the server may be slow, and a user-frendly app may want to quicky display cached data on startup, this crate also provides a local cache for timetable data in the [`cache`] module.
//!
//! These two data sources are combined in a [`TimetableStore`](store::TimetableStore), that fetches the data, keeps the cache up to date
//! and tells which timetable, which days and which courses should be displayed. \
//! This last part is a pure computation, available on its own in the [`resolver`] module.

pub mod traits;

pub mod error;
pub use error::ValidationError;
pub mod dates;
pub mod period;
pub use period::SchedulePeriod;
pub mod course;
pub use course::CourseOccurrence;
pub mod calendar_day;
pub use calendar_day::CalendarDay;
pub mod resolver;
pub use resolver::ScheduleWindowResolver;
pub mod shared;
pub mod auth;

pub mod resource;
pub mod client;
pub mod cache;
pub mod store;
pub use store::TimetableStore;

#[cfg(any(test, feature = "mock_source"))]
pub mod mock_behaviour;
#[cfg(any(test, feature = "mock_source"))]
pub mod mock_source;

pub mod config;
pub mod utils;

/// A store that talks to the actual backend and keeps a local cache
pub type EdtStore = TimetableStore<client::Client>;
