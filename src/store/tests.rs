use std::path::Path;
use std::sync::{Arc, Mutex};

use chrono::{NaiveDate, Weekday};

use super::*;
use crate::course::{AssessmentStatus, TimeSlot};
use crate::mock_behaviour::MockBehaviour;
use crate::mock_source::MockSource;
use crate::period::PublicationStatus;

const PROGRAM: &str = "fil-info-l3";

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Two published weeks of March 2024, a draft for April, and a few courses
fn populated_source() -> MockSource {
    let mut source = MockSource::new();
    source.add_period(SchedulePeriod::new("week-10", ymd(2024, 3, 4), ymd(2024, 3, 9), PublicationStatus::Published, PROGRAM).unwrap());
    source.add_period(SchedulePeriod::new("week-11", ymd(2024, 3, 11), ymd(2024, 3, 16), PublicationStatus::Published, PROGRAM).unwrap());
    source.add_period(SchedulePeriod::new("april", ymd(2024, 4, 1), ymd(2024, 4, 27), PublicationStatus::Draft, PROGRAM).unwrap());

    source.add_occurrence(CourseOccurrence::new("maths", ymd(2024, 3, 5), TimeSlot::Morning, "s101", "m-maths", "week-10"));
    source.add_occurrence(CourseOccurrence::new("physics", ymd(2024, 3, 5), TimeSlot::Evening, "s102", "m-phys", "week-10"));
    source.add_occurrence(CourseOccurrence::new("english", ymd(2024, 3, 6), TimeSlot::Morning, "s103", "m-eng", "week-10"));
    source.add_occurrence(CourseOccurrence::new_with_parameters(
        "law".to_string(), ymd(2024, 3, 7), TimeSlot::Morning,
        CompletionStatus::Cancelled, TeacherAvailability::Unavailable,
        "s303".to_string(), "m-law".to_string(), "week-10".to_string()));
    source.add_occurrence(CourseOccurrence::new("networks", ymd(2024, 3, 12), TimeSlot::Morning, "lab1", "m-net", "week-11"));
    source
}

fn store_with(source: MockSource) -> TimetableStore<MockSource> {
    TimetableStore::new_with_resolver(source, Cache::new(Path::new("unused")), PROGRAM.to_string(), ScheduleWindowResolver::new(Weekday::Sun))
}

fn ids(courses: &[&CourseOccurrence]) -> Vec<String> {
    courses.iter().map(|c| c.id().clone()).collect()
}

#[tokio::test]
async fn refresh_selects_today() {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut store = store_with(populated_source());
    assert!(store.active_period().is_none());
    assert!(store.courses_for_selected_day().is_empty());

    let tuesday_morning = ymd(2024, 3, 5).and_hms_opt(7, 45, 0).unwrap();
    assert!(store.refresh(tuesday_morning).await);

    assert_eq!(store.active_period().unwrap().id(), "week-10");
    assert_eq!(store.days().len(), 6);
    assert_eq!(store.selected_day().unwrap().display_label(), "Mardi 5 mars");
    assert_eq!(ids(&store.courses_for_selected_day()), vec!["maths", "physics"]);
    assert!(store.local().last_refresh(&PROGRAM.to_string()).is_some());

    // Drafts are never cached
    assert_eq!(store.local().periods(&PROGRAM.to_string()).len(), 2);
}

#[tokio::test]
async fn select_another_day() {
    let mut store = store_with(populated_source());
    store.refresh(ymd(2024, 3, 5)).await;

    assert_eq!(store.select_day(ymd(2024, 3, 6)).unwrap().day_name(), "Mercredi");
    assert_eq!(ids(&store.courses_for_selected_day()), vec!["english"]);

    // Outside of the grid: the selection does not move
    assert!(store.select_day(ymd(2024, 3, 10)).is_none());
    assert_eq!(store.selected_day().unwrap().date(), ymd(2024, 3, 6));

    store.select_day(ymd(2024, 3, 9));
    assert!(store.courses_for_selected_day().is_empty());
}

#[tokio::test]
async fn out_of_range_falls_back_to_the_first_timetable() {
    let mut store = store_with(populated_source());
    assert!(store.refresh(ymd(2024, 6, 1)).await);

    assert_eq!(store.active_period().unwrap().id(), "week-10");
    // Today is not in the grid: the first day is selected
    assert_eq!(store.selected_day().unwrap().date(), ymd(2024, 3, 4));
}

#[tokio::test]
async fn no_timetable_is_an_empty_state() {
    let mut store = store_with(MockSource::new());
    assert!(store.refresh(ymd(2024, 3, 5)).await);

    assert!(store.active_period().is_none());
    assert!(store.days().is_empty());
    assert!(store.selected_day().is_none());
    assert!(store.courses_for_selected_day().is_empty());
}

#[tokio::test]
async fn new_timetable_is_reported() {
    let mut store = store_with(populated_source());
    let (sender, receiver) = refresh_progress::feedback_channel();

    assert!(store.refresh(ymd(2024, 3, 5)).await);
    assert_eq!(*receiver.borrow(), RefreshEvent::NotStarted);

    // The following week, the same data resolves to another timetable
    assert!(store.refresh_with_feedback(ymd(2024, 3, 12), sender).await);
    assert_eq!(*receiver.borrow(), RefreshEvent::Finished{ success: true });
    assert_eq!(store.active_period().unwrap().id(), "week-11");
    assert_eq!(store.selected_day().unwrap().date(), ymd(2024, 3, 12));
    assert_eq!(ids(&store.courses_for_selected_day()), vec!["networks"]);
}

#[tokio::test]
async fn same_timetable_keeps_the_selection() {
    let mut store = store_with(populated_source());
    store.refresh(ymd(2024, 3, 5)).await;
    store.select_day(ymd(2024, 3, 8));

    store.refresh(ymd(2024, 3, 6)).await;
    assert_eq!(store.selected_day().unwrap().date(), ymd(2024, 3, 8));
}

#[tokio::test]
async fn failed_refresh_keeps_cached_data() {
    let _ = env_logger::builder().is_test(true).try_init();

    let behaviour = Arc::new(Mutex::new(MockBehaviour::new()));
    let mut source = populated_source();
    source.set_mock_behaviour(Some(Arc::clone(&behaviour)));
    let mut store = store_with(source);

    assert!(store.refresh(ymd(2024, 3, 5)).await);

    *behaviour.lock().unwrap() = MockBehaviour::fail_now(1);
    assert!(store.refresh(ymd(2024, 3, 5)).await == false);
    assert_eq!(store.active_period().unwrap().id(), "week-10");
    assert_eq!(ids(&store.courses_for_selected_day()), vec!["maths", "physics"]);

    // Only the courses fail this time
    *behaviour.lock().unwrap() = MockBehaviour{ fetch_occurrences_behaviour: (0, 1), ..MockBehaviour::default() };
    assert!(store.refresh(ymd(2024, 3, 5)).await == false);
    assert_eq!(store.local().occurrences(&PROGRAM.to_string()).len(), 4);
}

#[tokio::test]
async fn load_from_cache_without_network() {
    let mut warm = store_with(populated_source());
    warm.refresh(ymd(2024, 3, 5)).await;
    let cache_path = std::env::temp_dir().join("edt-fridge-test-store-cache");
    let _ = std::fs::remove_dir_all(&cache_path);
    let mut cache = Cache::new(&cache_path);
    cache.set_periods(&PROGRAM.to_string(), warm.local().periods(&PROGRAM.to_string()).to_vec());
    cache.set_occurrences(&PROGRAM.to_string(), &"week-10".to_string(), warm.local().occurrences(&PROGRAM.to_string()).to_vec());
    cache.save_to_folder().unwrap();

    let offline = MockSource::new();
    let cache = Cache::from_folder(&cache_path).unwrap();
    let mut cold = TimetableStore::new_with_resolver(offline, cache, PROGRAM.to_string(), ScheduleWindowResolver::new(Weekday::Sun));
    cold.load_from_cache(ymd(2024, 3, 5));
    assert_eq!(cold.remote().period_fetch_count(), 0);
    assert_eq!(cold.active_period().unwrap().id(), "week-10");
    assert_eq!(ids(&cold.courses_for_selected_day()), vec!["maths", "physics"]);
}

#[tokio::test]
async fn toggles_reach_the_remote_then_the_cache() {
    let mut store = store_with(populated_source());
    store.refresh(ymd(2024, 3, 5)).await;
    let maths = "maths".to_string();

    assert_eq!(store.toggle_course_status(&maths).await.unwrap(), CompletionStatus::Done);
    assert_eq!(store.remote().occurrence("maths").unwrap().completion_status(), CompletionStatus::Done);
    assert_eq!(store.local().occurrence(&PROGRAM.to_string(), &maths).unwrap().completion_status(), CompletionStatus::Done);

    assert_eq!(store.toggle_teacher_availability(&maths).await.unwrap(), TeacherAvailability::Unavailable);
    assert_eq!(store.remote().occurrence("maths").unwrap().teacher_availability(), TeacherAvailability::Unavailable);

    // A refresh brings back the very same data
    let before = store.local().occurrences(&PROGRAM.to_string()).to_vec();
    store.refresh(ymd(2024, 3, 5)).await;
    assert_eq!(store.local().occurrences(&PROGRAM.to_string()), &before[..]);
}

#[tokio::test]
async fn failed_toggle_leaves_the_cache_untouched() {
    let behaviour = Arc::new(Mutex::new(MockBehaviour::new()));
    let mut source = populated_source();
    source.set_mock_behaviour(Some(Arc::clone(&behaviour)));
    let mut store = store_with(source);
    store.refresh(ymd(2024, 3, 5)).await;

    *behaviour.lock().unwrap() = MockBehaviour::fail_now(1);
    let maths = "maths".to_string();
    assert!(store.toggle_course_status(&maths).await.is_err());
    assert!(store.toggle_teacher_availability(&maths).await.is_err());

    let local = store.local().occurrence(&PROGRAM.to_string(), &maths).unwrap();
    assert_eq!(local.completion_status(), CompletionStatus::Planned);
    assert_eq!(local.teacher_availability(), TeacherAvailability::Available);
}

#[tokio::test]
async fn invalid_toggles() {
    let mut store = store_with(populated_source());
    store.refresh(ymd(2024, 3, 5)).await;

    let err = store.toggle_course_status(&"law".to_string()).await.unwrap_err();
    assert!(err.to_string().contains("cancelled"));
    assert_eq!(store.remote().occurrence("law").unwrap().completion_status(), CompletionStatus::Cancelled);

    let err = store.toggle_teacher_availability(&"nope".to_string()).await.unwrap_err();
    assert!(err.to_string().contains("No course nope"));
}

#[tokio::test]
async fn periodic_refresh_until_stopped() {
    let (stop_sender, stop_receiver) = tokio::sync::watch::channel(false);
    let mut store = store_with(populated_source());

    let stopper = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(120)).await;
        let _ = stop_sender.send(true);
    });
    store.refresh_periodically(Duration::from_millis(20), stop_receiver).await;
    stopper.await.unwrap();

    assert!(store.remote().period_fetch_count() >= 2);
    assert!(store.active_period().is_some());
}

fn assessment(id: &str, date: NaiveDate, period_id: &str) -> Assessment {
    Assessment {
        id: id.to_string(), date, time_slot: TimeSlot::Evening, duration: 2,
        status: AssessmentStatus::NotDone,
        room_id: "amphi".to_string(), subject_id: "m-maths".to_string(), period_id: period_id.to_string(),
    }
}

#[tokio::test]
async fn replaced_timetable_hides_its_courses() {
    let mut source = MockSource::new();
    source.add_period(SchedulePeriod::new("v1", ymd(2024, 3, 4), ymd(2024, 3, 9), PublicationStatus::Published, PROGRAM).unwrap());
    source.add_occurrence(CourseOccurrence::new("old-maths", ymd(2024, 3, 5), TimeSlot::Morning, "s101", "m-maths", "v1"));
    source.add_assessment(assessment("old-exam", ymd(2024, 3, 5), "v1"));
    let mut store = store_with(source);

    assert!(store.refresh(ymd(2024, 3, 5)).await);
    assert_eq!(ids(&store.courses_for_selected_day()), vec!["old-maths"]);

    // v1 is closed and v2 is published over the same week
    store.remote_mut().remove_periods(&PROGRAM.to_string());
    store.remote_mut().add_period(SchedulePeriod::new("v1", ymd(2024, 3, 4), ymd(2024, 3, 9), PublicationStatus::Closed, PROGRAM).unwrap());
    store.remote_mut().add_period(SchedulePeriod::new("v2", ymd(2024, 3, 4), ymd(2024, 3, 9), PublicationStatus::Published, PROGRAM).unwrap());
    store.remote_mut().add_occurrence(CourseOccurrence::new("new-maths", ymd(2024, 3, 5), TimeSlot::Morning, "s101", "m-maths", "v2"));

    assert!(store.refresh(ymd(2024, 3, 5)).await);
    assert_eq!(store.active_period().unwrap().id(), "v2");
    assert_eq!(ids(&store.courses_for_selected_day()), vec!["new-maths"]);
    assert!(store.assessments_for_selected_day().is_empty());

    // Nothing of v1 is left in the cache
    let cached = store.local().occurrences(&PROGRAM.to_string());
    assert!(cached.iter().all(|c| c.period_id() == "v2"));
    assert!(store.local().assessments(&PROGRAM.to_string()).is_empty());
}

#[tokio::test]
async fn courses_of_other_cached_timetables_are_not_shown() {
    // A course filed under another (still published) timetable, on a day of the active one
    let mut source = populated_source();
    source.add_occurrence(CourseOccurrence::new("misfiled", ymd(2024, 3, 5), TimeSlot::Morning, "s101", "m-maths", "week-11"));
    let mut store = store_with(source);

    store.refresh(ymd(2024, 3, 12)).await;
    store.refresh(ymd(2024, 3, 5)).await;
    assert_eq!(store.active_period().unwrap().id(), "week-10");
    assert!(store.local().occurrence(&PROGRAM.to_string(), &"misfiled".to_string()).is_some());
    assert_eq!(ids(&store.courses_for_selected_day()), vec!["maths", "physics"]);
}

#[tokio::test]
async fn assessments_of_the_selected_day() {
    let mut source = populated_source();
    source.add_assessment(assessment("midterm", ymd(2024, 3, 6), "week-10"));
    source.add_assessment(assessment("final", ymd(2024, 3, 13), "week-11"));
    let mut store = store_with(source);

    assert!(store.refresh(ymd(2024, 3, 5)).await);
    assert!(store.assessments_for_selected_day().is_empty());

    store.select_day(ymd(2024, 3, 6));
    let ids: Vec<&str> = store.assessments_for_selected_day().iter().map(|a| a.id.as_str()).collect();
    assert_eq!(ids, vec!["midterm"]);

    // Only the active timetable is fetched
    assert_eq!(store.local().assessments(&PROGRAM.to_string()).len(), 1);
}

#[tokio::test]
async fn failed_assessments_keep_the_cached_ones() {
    let behaviour = Arc::new(Mutex::new(MockBehaviour::new()));
    let mut source = populated_source();
    source.add_assessment(assessment("midterm", ymd(2024, 3, 5), "week-10"));
    source.set_mock_behaviour(Some(Arc::clone(&behaviour)));
    let mut store = store_with(source);
    assert!(store.refresh(ymd(2024, 3, 5)).await);

    *behaviour.lock().unwrap() = MockBehaviour{ fetch_assessments_behaviour: (0, 1), ..MockBehaviour::default() };
    let (sender, receiver) = refresh_progress::feedback_channel();
    assert!(store.refresh_with_feedback(ymd(2024, 3, 5), sender).await == false);
    assert_eq!(*receiver.borrow(), RefreshEvent::Finished{ success: false });
    assert_eq!(store.assessments_for_selected_day().len(), 1);
}

#[tokio::test]
async fn nothing_cached_and_no_network() {
    let mut source = populated_source();
    let offline = MockBehaviour{ fetch_periods_behaviour: (0, 1), ..MockBehaviour::default() };
    source.set_mock_behaviour(Some(Arc::new(Mutex::new(offline))));
    let mut store = store_with(source);

    assert!(store.refresh(ymd(2024, 3, 5)).await == false);
    assert!(store.active_period().is_none());
    assert!(store.local().last_refresh(&PROGRAM.to_string()).is_none());

    // The network is back
    assert!(store.refresh(ymd(2024, 3, 5)).await);
    assert_eq!(store.active_period().unwrap().id(), "week-10");
}
