//! A term of refreshes against a mocked backend, as a front-end would run them
#![cfg(feature = "integration_tests")]

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use chrono::{NaiveDate, Weekday};

use edt_fridge::cache::Cache;
use edt_fridge::course::{CompletionStatus, TimeSlot};
use edt_fridge::mock_behaviour::MockBehaviour;
use edt_fridge::mock_source::MockSource;
use edt_fridge::period::PublicationStatus;
use edt_fridge::{CourseOccurrence, ScheduleWindowResolver, SchedulePeriod, TimetableStore};

const PROGRAM: &str = "fil-gl-m1";

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn cache_folder(name: &str) -> PathBuf {
    let path = std::env::temp_dir().join(name);
    let _ = std::fs::remove_dir_all(&path);
    path
}

fn course_ids(store: &TimetableStore<MockSource>) -> Vec<String> {
    store.courses_for_selected_day().iter().map(|c| c.id().clone()).collect()
}

#[tokio::test]
async fn a_term_of_refreshes() {
    let _ = env_logger::builder().is_test(true).try_init();

    let behaviour = Arc::new(Mutex::new(MockBehaviour::new()));
    let mut source = MockSource::new();
    source.set_mock_behaviour(Some(Arc::clone(&behaviour)));
    source.add_period(SchedulePeriod::new("w1", ymd(2024, 9, 2), ymd(2024, 9, 7), PublicationStatus::Published, PROGRAM).unwrap());
    source.add_period(SchedulePeriod::new("w2", ymd(2024, 9, 9), ymd(2024, 9, 14), PublicationStatus::Draft, PROGRAM).unwrap());
    source.add_occurrence(CourseOccurrence::new("rust-1", ymd(2024, 9, 3), TimeSlot::Morning, "b12", "rust", "w1"));
    source.add_occurrence(CourseOccurrence::new("db-1", ymd(2024, 9, 3), TimeSlot::Evening, "b14", "databases", "w1"));
    source.add_occurrence(CourseOccurrence::new("rust-2", ymd(2024, 9, 10), TimeSlot::Morning, "b12", "rust", "w2"));

    let folder = cache_folder("edt-fridge-integration-term");
    let mut store = TimetableStore::new_with_resolver(source, Cache::new(&folder), PROGRAM.to_string(), ScheduleWindowResolver::new(Weekday::Sun));

    // First week. The second one is still a draft
    assert!(store.refresh(ymd(2024, 9, 3)).await);
    assert_eq!(store.active_period().unwrap().id(), "w1");
    assert_eq!(course_ids(&store), vec!["rust-1", "db-1"]);

    // The teacher marks the morning course as done
    assert_eq!(store.toggle_course_status(&"rust-1".to_string()).await.unwrap(), CompletionStatus::Done);
    store.local().save_to_folder().unwrap();

    // The app restarts offline, on the Monday of the second week: the draft is unknown, the first week is displayed
    *behaviour.lock().unwrap() = MockBehaviour::fail_now(1);
    let cache = Cache::from_folder(&folder).unwrap();
    let offline_source = {
        let mut s = MockSource::new();
        s.set_mock_behaviour(Some(Arc::clone(&behaviour)));
        s
    };
    let mut restarted = TimetableStore::new_with_resolver(offline_source, cache, PROGRAM.to_string(), ScheduleWindowResolver::new(Weekday::Sun));
    restarted.load_from_cache(ymd(2024, 9, 9));
    assert_eq!(restarted.active_period().unwrap().id(), "w1");
    assert_eq!(restarted.selected_day().unwrap().date(), ymd(2024, 9, 2));

    assert!(restarted.refresh(ymd(2024, 9, 9)).await == false);
    assert_eq!(restarted.active_period().unwrap().id(), "w1");
    restarted.select_day(ymd(2024, 9, 3));
    let done = restarted.courses_for_selected_day()[0].completion_status();
    assert_eq!(done, CompletionStatus::Done);

    // Back on the original backend, which has published the second week in the meantime
    store.remote_mut().remove_periods(&PROGRAM.to_string());
    store.remote_mut().add_period(SchedulePeriod::new("w1", ymd(2024, 9, 2), ymd(2024, 9, 7), PublicationStatus::Published, PROGRAM).unwrap());
    store.remote_mut().add_period(SchedulePeriod::new("w2", ymd(2024, 9, 9), ymd(2024, 9, 14), PublicationStatus::Published, PROGRAM).unwrap());
    assert!(store.refresh(ymd(2024, 9, 10)).await);
    assert_eq!(store.active_period().unwrap().id(), "w2");
    assert_eq!(store.days().len(), 6);
    assert_eq!(store.selected_day().unwrap().display_label(), "Mardi 10 septembre");
    assert_eq!(course_ids(&store), vec!["rust-2"]);

    // The first week is still published, its courses stay cached
    assert_eq!(store.local().occurrences(&PROGRAM.to_string()).len(), 3);

    // Once it is closed, they are dropped
    store.remote_mut().remove_periods(&PROGRAM.to_string());
    store.remote_mut().add_period(SchedulePeriod::new("w1", ymd(2024, 9, 2), ymd(2024, 9, 7), PublicationStatus::Closed, PROGRAM).unwrap());
    store.remote_mut().add_period(SchedulePeriod::new("w2", ymd(2024, 9, 9), ymd(2024, 9, 14), PublicationStatus::Published, PROGRAM).unwrap());
    assert!(store.refresh(ymd(2024, 9, 10)).await);
    let cached: Vec<&str> = store.local().occurrences(&PROGRAM.to_string()).iter().map(|c| c.id().as_str()).collect();
    assert_eq!(cached, vec!["rust-2"]);
}
