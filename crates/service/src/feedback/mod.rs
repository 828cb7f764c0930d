//! Feedback lifecycle: domain types, clock, and the service enforcing
//! submission and triage rules.

pub mod clock;
pub mod domain;
pub mod service;

pub use clock::{Clock, ManualClock, SystemClock};
pub use domain::{
    FeedbackCategory, FeedbackRecord, FeedbackStatus, FeedbackSubmission, ListFilter, RecordState,
    YearOfStudy, HARASSMENT_WARNING,
};
pub use service::{FeedbackService, FeedbackSettings};
