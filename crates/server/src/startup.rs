use std::{net::SocketAddr, sync::Arc};

use axum::Router;
use common::{env::ensure_data_dir, utils::logging::init_logging_from_env};
use configs::AppConfig;
use dotenvy::dotenv;
use rand::{distributions::Alphanumeric, Rng};
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::auth::ConfiguredAdmin;
use crate::errors::StartupError;
use crate::routes::{self, auth};
use service::{
    feedback::{FeedbackService, FeedbackSettings, SystemClock},
    storage::JsonFileRecordStore,
};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

fn bind_addr(cfg: &AppConfig) -> Result<SocketAddr, StartupError> {
    format!("{}:{}", cfg.server.host, cfg.server.port)
        .parse()
        .map_err(|e| StartupError::InvalidConfig(format!("bad bind address: {e}")))
}

/// Session tokens from a random secret do not survive a restart.
fn jwt_secret(cfg: &AppConfig) -> String {
    if !cfg.admin.jwt_secret.trim().is_empty() {
        return cfg.admin.jwt_secret.clone();
    }
    warn!("no JWT secret configured; using a random one for this process");
    rand::thread_rng().sample_iter(&Alphanumeric).take(48).map(char::from).collect()
}

pub fn feedback_settings(cfg: &configs::FeedbackConfig) -> FeedbackSettings {
    FeedbackSettings {
        rate_limit_ms: cfg.rate_limit_ms,
        min_chars: cfg.min_chars,
        max_chars: cfg.max_chars,
    }
}

/// Open storage and the feedback service, and assemble the shared state.
pub async fn build_state(cfg: &AppConfig) -> Result<auth::ServerState, StartupError> {
    let store = JsonFileRecordStore::new(cfg.storage.records_path(), cfg.storage.marker_path())
        .await
        .map_err(|e| StartupError::Storage(e.to_string()))?;
    let settings = feedback_settings(&cfg.feedback);
    let feedback = FeedbackService::open(store, settings, Arc::new(SystemClock))
        .await
        .map_err(|e| StartupError::Storage(e.to_string()))?;
    let gate = ConfiguredAdmin::new(cfg.admin.username.clone(), &cfg.admin.password_hash)?;

    Ok(auth::ServerState {
        feedback: Arc::new(feedback),
        gate: Arc::new(gate),
        auth: auth::ServerAuthConfig {
            jwt_secret: jwt_secret(cfg),
            token_ttl_hours: cfg.admin.token_ttl_hours,
        },
    })
}

/// Public entry: build the app and run the HTTP server
pub async fn run() -> anyhow::Result<()> {
    dotenv().ok();
    init_logging_from_env();

    let cfg = AppConfig::load_and_validate()?;
    ensure_data_dir(&cfg.storage.data_dir).await?;

    let state = build_state(&cfg).await?;
    let app: Router = routes::build_router(state, build_cors());

    let addr = bind_addr(&cfg)?;
    info!(%addr, records = %cfg.storage.records_path().display(), "starting feedback portal");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "cannot listen for Ctrl+C; running until killed");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
