use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use common::types::ErrorBody;
use service::errors::{ListError, SubmissionError, UpdateError};
use thiserror::Error;
use tracing::error;

/// Error response carrying a status and a displayable message.
#[derive(Debug)]
pub struct JsonApiError {
    status: StatusCode,
    message: String,
    code: Option<u16>,
}

impl JsonApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self { status, message: message.into(), code: None }
    }

    pub fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "Unauthorized")
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(status = %self.status, error = %self.message, "request failed");
        }
        let mut body = ErrorBody::new(self.message);
        if let Some(code) = self.code {
            body = body.with_code(code);
        }
        (self.status, Json(body)).into_response()
    }
}

impl From<SubmissionError> for JsonApiError {
    fn from(e: SubmissionError) -> Self {
        let status = match e {
            SubmissionError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            SubmissionError::InvalidMessage { .. } | SubmissionError::MissingCategory => {
                StatusCode::BAD_REQUEST
            }
            SubmissionError::PersistenceFailed => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self { status, message: e.to_string(), code: Some(e.code()) }
    }
}

impl From<UpdateError> for JsonApiError {
    fn from(e: UpdateError) -> Self {
        let status = match e {
            UpdateError::NotFound(_) => StatusCode::NOT_FOUND,
            UpdateError::PersistenceFailed => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self { status, message: e.to_string(), code: Some(e.code()) }
    }
}

impl From<ListError> for JsonApiError {
    fn from(e: ListError) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: e.to_string(),
            code: Some(e.code()),
        }
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("storage unavailable: {0}")]
    Storage(String),
    #[error(transparent)]
    Any(#[from] anyhow::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn domain_errors_map_to_statuses() {
        let status = |e: JsonApiError| e.status();
        assert_eq!(status(SubmissionError::RateLimited.into()), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(status(SubmissionError::MissingCategory.into()), StatusCode::BAD_REQUEST);
        assert_eq!(status(UpdateError::NotFound(Uuid::nil()).into()), StatusCode::NOT_FOUND);
        assert_eq!(
            JsonApiError::from(ListError::PersistenceFailed).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
