use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use service::feedback::{
    FeedbackCategory, FeedbackRecord, FeedbackStatus, FeedbackSubmission, YearOfStudy,
    HARASSMENT_WARNING,
};

use crate::errors::JsonApiError;
use crate::routes::auth::ServerState;

/// Fixed choices and limits the submission form renders.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    pub categories: Vec<&'static str>,
    pub years_of_study: Vec<&'static str>,
    pub statuses: Vec<&'static str>,
    pub min_chars: usize,
    pub max_chars: usize,
    pub harassment_warning: &'static str,
}

pub async fn catalog(State(state): State<ServerState>) -> Json<Catalog> {
    let settings = state.feedback.settings();
    Json(Catalog {
        categories: FeedbackCategory::ALL.iter().map(|c| c.label()).collect(),
        years_of_study: YearOfStudy::ALL.iter().map(|y| y.label()).collect(),
        statuses: FeedbackStatus::ALL.iter().map(|s| s.label()).collect(),
        min_chars: settings.min_chars,
        max_chars: settings.max_chars,
        harassment_warning: HARASSMENT_WARNING,
    })
}

/// Anonymous submission endpoint.
pub async fn submit(
    State(state): State<ServerState>,
    Json(submission): Json<FeedbackSubmission>,
) -> Result<(StatusCode, Json<FeedbackRecord>), JsonApiError> {
    let record = state.feedback.submit(submission).await?;
    Ok((StatusCode::CREATED, Json(record)))
}
