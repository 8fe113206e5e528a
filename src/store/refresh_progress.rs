//! Utilities to track the progression of a refresh

use std::fmt::{Display, Error, Formatter};

/// What a refresh fetches, in this order
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefreshStep {
    Periods,
    Courses,
    Assessments,
}

impl Display for RefreshStep {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        match self {
            RefreshStep::Periods => write!(f, "timetables"),
            RefreshStep::Courses => write!(f, "courses"),
            RefreshStep::Assessments => write!(f, "assessments"),
        }
    }
}

/// An event that happens during a refresh
#[derive(Clone, Debug, PartialEq)]
pub enum RefreshEvent {
    NotStarted,
    /// Nothing has been fetched yet
    Started,
    /// A step has completed
    Fetched{ step: RefreshStep, count: usize },
    /// Another timetable has become the active one
    NewPeriod{ period_id: String },
    Finished{ success: bool },
}

impl Display for RefreshEvent {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        match self {
            RefreshEvent::NotStarted => write!(f, "Not started"),
            RefreshEvent::Started => write!(f, "Refreshing..."),
            RefreshEvent::Fetched{step, count} => write!(f, "{} {} fetched", count, step),
            RefreshEvent::NewPeriod{period_id} => write!(f, "Now displaying timetable {}", period_id),
            RefreshEvent::Finished{ success: true } => write!(f, "Up to date"),
            RefreshEvent::Finished{ success: false } => write!(f, "Some data could not be refreshed"),
        }
    }
}

impl Default for RefreshEvent {
    fn default() -> Self {
        Self::NotStarted
    }
}


/// See [`feedback_channel`]
pub type FeedbackSender = tokio::sync::watch::Sender<RefreshEvent>;
/// See [`feedback_channel`]
pub type FeedbackReceiver = tokio::sync::watch::Receiver<RefreshEvent>;

/// Create a feeback channel, that can be used to follow a refresh from another task
pub fn feedback_channel() -> (FeedbackSender, FeedbackReceiver) {
    tokio::sync::watch::channel(RefreshEvent::default())
}


/// Tracks which steps of a refresh failed, and forwards events to the feedback channel (if any)
pub struct RefreshProgress {
    failed_steps: Vec<RefreshStep>,
    feedback_channel: Option<FeedbackSender>,
}

impl RefreshProgress {
    pub fn new() -> Self {
        Self { failed_steps: Vec::new(), feedback_channel: None }
    }
    pub fn new_with_feedback_channel(channel: FeedbackSender) -> Self {
        Self { failed_steps: Vec::new(), feedback_channel: Some(channel) }
    }

    pub fn is_success(&self) -> bool {
        self.failed_steps.is_empty()
    }

    pub fn failed_steps(&self) -> &[RefreshStep] {
        &self.failed_steps
    }

    /// A step failed, and there is no cached data to display instead
    pub fn fail(&mut self, step: RefreshStep, text: &str) {
        log::error!("{}", text);
        self.failed_steps.push(step);
    }
    /// A step failed, the cached data is displayed instead
    pub fn fall_back(&mut self, step: RefreshStep, text: &str) {
        log::warn!("{}", text);
        self.failed_steps.push(step);
    }
    pub fn info(&mut self, text: &str) {
        log::info!("{}", text);
    }
    pub fn debug(&mut self, text: &str) {
        log::debug!("{}", text);
    }

    /// Send an event to the listener (if any)
    pub fn feedback(&mut self, event: RefreshEvent) {
        if let Some(sender) = &self.feedback_channel {
            // Nobody listening anymore is fine
            let _ = sender.send(event);
        }
    }
}
