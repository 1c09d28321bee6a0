use axum::http::StatusCode;

use crate::app::errors::ApiError;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

/// Router fallback.
pub async fn unknown_endpoint() -> ApiError {
    ApiError::UnknownEndpoint
}
