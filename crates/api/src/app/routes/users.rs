use std::sync::Arc;

use axum::{
    Json, Router,
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};

use bloglist_core::{RegistrationDraft, User};

use crate::app::dto::{self, ApiJson};
use crate::app::errors::ApiResult;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new().route("/api/users", get(list_users).post(create_user))
}

pub async fn create_user(
    Extension(services): Extension<Arc<AppServices>>,
    ApiJson(body): ApiJson<RegistrationDraft>,
) -> ApiResult<impl IntoResponse> {
    let registration = body.validate()?;

    let password_hash = services.hash_password(registration.password).await?;
    let user = User::new(registration.username, registration.name, password_hash);
    services.db.users().insert(&user).await?;

    tracing::info!(user_id = %user.id, username = %user.username, "user registered");
    Ok((StatusCode::CREATED, Json(dto::user_to_json(&user))))
}

pub async fn list_users(Extension(services): Extension<Arc<AppServices>>) -> ApiResult<impl IntoResponse> {
    let users = services.db.users().list().await?;
    let blogs = services.db.blogs().list().await?;
    let by_id = dto::index_blogs(&blogs);

    let items = users
        .iter()
        .map(|user| dto::user_with_blogs_to_json(user, &by_id))
        .collect::<Vec<_>>();

    Ok(Json(items))
}
