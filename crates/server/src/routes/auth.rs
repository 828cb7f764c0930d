use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, StatusCode},
    middleware::Next,
    response::Response,
    Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::{
    decode, encode, Algorithm, DecodingKey, EncodingKey, Header as JwtHeader, Validation,
};
use serde::{Deserialize, Serialize};
use service::{feedback::FeedbackService, storage::JsonFileRecordStore};
use tracing::{debug, info, warn};

use crate::auth::AdminGate;
use crate::errors::JsonApiError;

/// Cookie carrying the admin session token.
pub const TOKEN_COOKIE: &str = "admin_token";

pub type Feedback = FeedbackService<JsonFileRecordStore>;

#[derive(Clone)]
pub struct ServerAuthConfig {
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
}

#[derive(Clone)]
pub struct ServerState {
    pub feedback: Arc<Feedback>,
    pub gate: Arc<dyn AdminGate>,
    pub auth: ServerAuthConfig,
}

#[derive(Debug, Deserialize)]
pub struct LoginInput {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginOutput {
    pub username: String,
    pub token: String,
    pub expires_at: i64,
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    iat: usize,
    exp: usize,
}

/// When a session issued at `now` expires, or `None` if the TTL does not fit.
pub fn session_expiry(now: DateTime<Utc>, ttl_hours: i64) -> Option<DateTime<Utc>> {
    now.checked_add_signed(TimeDelta::try_hours(ttl_hours)?)
}

pub async fn login(
    State(state): State<ServerState>,
    jar: CookieJar,
    Json(input): Json<LoginInput>,
) -> Result<(CookieJar, Json<LoginOutput>), JsonApiError> {
    if !state.gate.verify(&input.username, &input.password).await {
        warn!(username = %input.username, "admin login rejected");
        return Err(JsonApiError::new(StatusCode::UNAUTHORIZED, "Invalid username or password"));
    }

    let now = Utc::now();
    let exp = session_expiry(now, state.auth.token_ttl_hours).ok_or_else(|| {
        JsonApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "session lifetime out of range")
    })?;
    let claims = Claims {
        sub: input.username.clone(),
        iat: now.timestamp() as usize,
        exp: exp.timestamp() as usize,
    };
    let key = EncodingKey::from_secret(state.auth.jwt_secret.as_bytes());
    let token = encode(&JwtHeader::default(), &claims, &key).map_err(|e| {
        let msg = format!("token generation failed: {e}");
        JsonApiError::new(StatusCode::INTERNAL_SERVER_ERROR, msg)
    })?;

    let mut cookie = Cookie::new(TOKEN_COOKIE, token.clone());
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_secure(false);
    cookie.set_same_site(SameSite::Lax);
    let jar = jar.add(cookie);

    info!(username = %input.username, "admin_logged_in");
    let out = LoginOutput { username: input.username, token, expires_at: exp.timestamp() };
    Ok((jar, Json(out)))
}

pub async fn logout(jar: CookieJar) -> (CookieJar, StatusCode) {
    let mut cookie = Cookie::from(TOKEN_COOKIE);
    cookie.set_path("/");
    (jar.remove(cookie), StatusCode::NO_CONTENT)
}

/// Middleware for `/admin`: accept `Authorization: Bearer <token>` or the
/// session cookie; anything missing, malformed or expired is 401.
pub async fn require_admin(
    State(state): State<ServerState>,
    jar: CookieJar,
    req: Request,
    next: Next,
) -> Result<Response, JsonApiError> {
    let bearer = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::to_string);
    let token = bearer
        .or_else(|| jar.get(TOKEN_COOKIE).map(|c| c.value().to_string()))
        .filter(|t| !t.is_empty());

    let Some(token) = token else {
        warn!(path = %req.uri().path(), "missing admin token");
        return Err(JsonApiError::unauthorized());
    };

    let key = DecodingKey::from_secret(state.auth.jwt_secret.as_bytes());
    let validation = Validation::new(Algorithm::HS256);
    match decode::<Claims>(&token, &key, &validation) {
        Ok(data) => {
            debug!(sub = %data.claims.sub, path = %req.uri().path(), "admin token accepted");
            Ok(next.run(req).await)
        }
        Err(e) => {
            warn!(error = %e, path = %req.uri().path(), "invalid admin token");
            Err(JsonApiError::unauthorized())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_expiry_rejects_out_of_range_ttl() {
        let now = Utc::now();
        assert_eq!(session_expiry(now, 2), Some(now + TimeDelta::hours(2)));
        assert_eq!(session_expiry(now, 10_000_000_000_000), None);
        assert_eq!(session_expiry(now, i64::MAX), None);
    }
}
