//! Typed API errors and their single translation to HTTP responses.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use bloglist_auth::{PasswordError, TokenError};
use bloglist_core::{DomainError, RegistrationDraft, ValidationFailure};
use bloglist_infra::StoreError;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("malformatted id")]
    MalformedId,

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    InvalidBody(String),

    #[error("{0}")]
    InvalidToken(String),

    #[error("token expired")]
    TokenExpired,

    #[error("token missing or invalid")]
    MissingToken,

    #[error("{0}")]
    NotOwner(&'static str),

    #[error("invalid username or password")]
    InvalidCredentials,

    #[error("{0}")]
    NotFound(String),

    #[error("unknown endpoint")]
    UnknownEndpoint,

    /// Detail is logged, never sent to the client.
    #[error("internal server error")]
    Internal(String),
}

impl ApiError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn internal(detail: impl core::fmt::Display) -> Self {
        Self::Internal(detail.to_string())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MalformedId | ApiError::Validation(_) | ApiError::InvalidBody(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::InvalidToken(_)
            | ApiError::TokenExpired
            | ApiError::MissingToken
            | ApiError::NotOwner(_)
            | ApiError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) | ApiError::UnknownEndpoint => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            ApiError::Internal(detail) => tracing::error!(%status, detail = %detail, "request failed"),
            _ if status == StatusCode::UNAUTHORIZED => {
                tracing::warn!(%status, error = %self, "request unauthorized")
            }
            _ => tracing::debug!(%status, error = %self, "request rejected"),
        }

        (status, axum::Json(json!({ "error": self.to_string() }))).into_response()
    }
}

impl From<ValidationFailure> for ApiError {
    fn from(value: ValidationFailure) -> Self {
        ApiError::Validation(value.to_string())
    }
}

impl From<DomainError> for ApiError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::Validation(failure) => failure.into(),
            DomainError::InvalidId(_) => ApiError::MalformedId,
            DomainError::NotOwner => ApiError::NotOwner("only the creator can modify a blog"),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Duplicate { field: "username", value } => {
                RegistrationDraft::duplicate_username(value).into()
            }
            StoreError::Duplicate { field, value } => {
                ApiError::Validation(format!("duplicate {field}: {value}"))
            }
            StoreError::NotFound(what) => ApiError::NotFound(format!("{what} not found")),
            err @ StoreError::Backend { .. } => ApiError::internal(err),
        }
    }
}

impl From<TokenError> for ApiError {
    fn from(value: TokenError) -> Self {
        match value {
            TokenError::Expired => ApiError::TokenExpired,
            err @ TokenError::Encoding(_) => ApiError::internal(err),
            err => ApiError::InvalidToken(err.to_string()),
        }
    }
}

impl From<PasswordError> for ApiError {
    fn from(value: PasswordError) -> Self {
        ApiError::internal(value)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(value: JsonRejection) -> Self {
        ApiError::InvalidBody(value.body_text())
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(value: tokio::task::JoinError) -> Self {
        ApiError::internal(value)
    }
}
