use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use service::feedback::{FeedbackRecord, FeedbackStatus, ListFilter};
use uuid::Uuid;

use crate::errors::JsonApiError;
use crate::routes::auth::ServerState;

#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: FeedbackStatus,
}

/// Active records, newest first, optionally filtered by `category` / `status`.
pub async fn list_feedback(
    State(state): State<ServerState>,
    Query(filter): Query<ListFilter>,
) -> Result<Json<Vec<FeedbackRecord>>, JsonApiError> {
    let records = state.feedback.list_active(&filter).await?;
    Ok(Json(records))
}

pub async fn update_status(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(input): Json<StatusUpdate>,
) -> Result<StatusCode, JsonApiError> {
    state.feedback.update_status(id, input.status).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Soft delete: the record is archived, not erased.
pub async fn delete_feedback(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, JsonApiError> {
    state.feedback.soft_delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
