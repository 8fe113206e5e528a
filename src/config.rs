//! Support for library configuration options

use std::sync::{Arc, Mutex};
use once_cell::sync::Lazy;
use chrono::Weekday;

/// The root URL of the REST API. Every endpoint is relative to it.
/// Feel free to override it when initing this library.
pub static API_BASE_URL: Lazy<Arc<Mutex<String>>> = Lazy::new(|| Arc::new(Mutex::new("http://localhost:8086/api".to_string())));

/// The day of the week that has no courses, and that is hidden from the day grid.
/// Feel free to override it when initing this library.
pub static REST_DAY: Lazy<Arc<Mutex<Weekday>>> = Lazy::new(|| Arc::new(Mutex::new(Weekday::Sun)));

/// The current value of [`API_BASE_URL`]
pub fn api_base_url() -> String {
    match API_BASE_URL.lock() {
        Ok(url) => url.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    }
}

/// The current value of [`REST_DAY`]
pub fn rest_day() -> Weekday {
    match REST_DAY.lock() {
        Ok(day) => *day,
        Err(poisoned) => *poisoned.into_inner(),
    }
}
