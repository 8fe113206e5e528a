//! Some utility functions

use crate::course::{Assessment, AssessmentStatus, CompletionStatus, CourseOccurrence};
use crate::store::TimetableStore;
use crate::traits::TimetableSource;

/// A debug utility that pretty-prints the day grid of a store, and the courses of the selected day
pub fn print_store<S: TimetableSource>(store: &TimetableStore<S>) {
    let period = match store.active_period() {
        None => {
            println!("No timetable for program {}", store.program_id());
            return;
        },
        Some(p) => p,
    };
    println!("EDT {} ({} -> {})", period.id(), period.start_date(), period.end_date());

    let selected = store.selected_day().map(|d| d.date());
    for day in store.days() {
        let marker = if Some(day.date()) == selected { ">" } else { " " };
        println!("  {} {}", marker, day.display_label());
    }

    if let Some(day) = store.selected_day() {
        println!("{}", day.display_label());
        let courses = store.courses_for_selected_day();
        if courses.is_empty() {
            println!("    (no courses)");
        }
        for course in courses {
            print_course(course);
        }
        for assessment in store.assessments_for_selected_day() {
            print_assessment(assessment);
        }
    }
}

pub fn print_course(course: &CourseOccurrence) {
    let completion = match course.completion_status() {
        CompletionStatus::Planned => " ",
        CompletionStatus::Done => "✓",
        CompletionStatus::NotDone => "✗",
        CompletionStatus::Cancelled => "x",
    };
    let availability = if course.teacher_availability().is_available() { "=" } else { "!" };
    println!("    {}{} {:<5} {}\troom {}\t{}", completion, availability, course.time_slot().label(), course.subject_id(), course.room_id(), course.id());
}

pub fn print_assessment(assessment: &Assessment) {
    let status = match assessment.status {
        AssessmentStatus::Done => "✓",
        AssessmentStatus::NotDone => " ",
        AssessmentStatus::Cancelled => "x",
    };
    println!("    {}  {:<5} {} (devoir, {}h)\troom {}\t{}", status, assessment.time_slot.label(), assessment.subject_id, assessment.duration, assessment.room_id, assessment.id);
}
