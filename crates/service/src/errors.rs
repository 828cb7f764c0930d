use thiserror::Error;
use uuid::Uuid;

/// Raw failures of the persisted medium. These never leave the service
/// layer; `FeedbackService` logs them and reports `PersistenceFailed`.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("stored records are corrupt: {0}")]
    StorageCorrupt(String),
    #[error("storage write failed: {0}")]
    StorageWriteFailed(String),
}

/// Why a submission was rejected. Display strings are shown to students as is.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubmissionError {
    #[error("Please wait a moment before submitting another feedback.")]
    RateLimited,
    #[error("Message must be between {min} and {max} characters.")]
    InvalidMessage { min: usize, max: usize },
    #[error("Category is required.")]
    MissingCategory,
    #[error("Failed to save feedback. Please try again.")]
    PersistenceFailed,
}

/// Failures of the admin status/archive operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UpdateError {
    #[error("Record not found")]
    NotFound(Uuid),
    #[error("Failed to save changes. Please try again.")]
    PersistenceFailed,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ListError {
    #[error("Failed to fetch records.")]
    PersistenceFailed,
}

impl SubmissionError {
    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            SubmissionError::RateLimited => 2001,
            SubmissionError::InvalidMessage { .. } => 2002,
            SubmissionError::MissingCategory => 2003,
            SubmissionError::PersistenceFailed => 2100,
        }
    }
}

impl UpdateError {
    pub fn code(&self) -> u16 {
        match self {
            UpdateError::NotFound(_) => 3001,
            UpdateError::PersistenceFailed => 3100,
        }
    }
}

impl ListError {
    pub fn code(&self) -> u16 {
        match self {
            ListError::PersistenceFailed => 4100,
        }
    }
}
