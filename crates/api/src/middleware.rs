use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::Utc;

use bloglist_auth::JwtCodec;
use bloglist_infra::Database;

use crate::app::errors::ApiError;
use crate::context::CurrentUser;

#[derive(Clone)]
pub struct AuthState {
    pub jwt: Arc<dyn JwtCodec>,
    pub db: Database,
}

/// Resolve a bearer token to a [`CurrentUser`] extension.
///
/// Requests without a token pass through untouched; handlers that need an
/// identity reject them when extracting [`CurrentUser`]. A token that is
/// present but invalid, expired, or names a deleted user is rejected here.
pub async fn user_extractor(
    State(state): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(token) = extract_bearer(req.headers()) else {
        return Ok(next.run(req).await);
    };

    let claims = state.jwt.decode(token, Utc::now())?;

    let user = state
        .db
        .users()
        .get(claims.id)
        .await?
        .ok_or_else(|| ApiError::InvalidToken("token user not found".to_string()))?;

    let current = CurrentUser::from(&user);
    tracing::debug!(
        user_id = %current.id(),
        username = %current.username(),
        name = ?current.name(),
        "request authenticated"
    );
    req.extensions_mut().insert(current);

    Ok(next.run(req).await)
}

/// One structured log line per request.
pub async fn request_logger(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_owned();
    let started = Instant::now();

    let res = next.run(req).await;

    tracing::info!(
        %method,
        path = %path,
        status = res.status().as_u16(),
        latency_ms = started.elapsed().as_millis() as u64,
        "request"
    );
    res
}

/// A known path hit with a method it does not route is an unknown endpoint too.
pub async fn unrouted_method(req: Request, next: Next) -> Response {
    let res = next.run(req).await;
    if res.status() == StatusCode::METHOD_NOT_ALLOWED {
        return ApiError::UnknownEndpoint.into_response();
    }
    res
}

/// `Authorization: Bearer <token>`; anything else counts as no token.
fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let header = headers.get(axum::http::header::AUTHORIZATION)?;
    let header = header.to_str().ok()?;

    let token = header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))?
        .trim();

    (!token.is_empty()).then_some(token)
}
