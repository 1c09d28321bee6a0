use std::sync::Arc;

use axum::{Json, Router, extract::Extension, response::IntoResponse, routing::post};

use crate::app::dto::{self, ApiJson, LoginRequest};
use crate::app::errors::{ApiError, ApiResult};
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new().route("/api/login", post(login))
}

/// Exchange credentials for a bearer token.
///
/// Unknown users and wrong passwords are indistinguishable to the caller.
pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    ApiJson(body): ApiJson<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    let Some(user) = services.db.users().find_by_username(&body.username).await? else {
        tracing::warn!(username = %body.username, "login for unknown user");
        return Err(ApiError::InvalidCredentials);
    };

    if !services
        .verify_password(body.password, user.password_hash.clone())
        .await?
    {
        tracing::warn!(user_id = %user.id, "login with wrong password");
        return Err(ApiError::InvalidCredentials);
    }

    let token = services.issue_token(&user)?;
    Ok(Json(dto::login_to_json(&token, &user)))
}
