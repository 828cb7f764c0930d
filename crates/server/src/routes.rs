pub mod admin;
pub mod auth;
pub mod feedback;

use axum::{
    middleware,
    routing::{delete, get, patch, post},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use common::types::Health;

use self::auth::ServerState;

pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// Build the full application router: public submission routes, admin login,
/// and the token-guarded admin routes.
pub fn build_router(state: ServerState, cors: CorsLayer) -> Router {
    let public = Router::new()
        .route("/health", get(health))
        .route("/api/catalog", get(feedback::catalog))
        .route("/api/feedback", post(feedback::submit))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout));

    let admin_routes = Router::new()
        .route("/admin/feedback", get(admin::list_feedback))
        .route("/admin/feedback/:id/status", patch(admin::update_status))
        .route("/admin/feedback/:id", delete(admin::delete_feedback))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::require_admin));

    public
        .merge(admin_routes)
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
