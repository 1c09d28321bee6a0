use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
};

use bloglist_core::{Blog, BlogDraft, BlogId};

use crate::app::dto::{self, ApiJson};
use crate::app::errors::{ApiError, ApiResult};
use crate::app::services::AppServices;
use crate::authz::{BlogAction, authorize_blog};
use crate::context::CurrentUser;

pub fn public_router() -> Router {
    Router::new()
        .route("/api/blogs", get(list_blogs))
        .route("/api/blogs/:id", get(get_blog))
}

pub fn protected_router() -> Router {
    Router::new()
        .route("/api/blogs", post(create_blog))
        .route("/api/blogs/:id", put(update_blog).delete(delete_blog))
}

pub async fn list_blogs(Extension(services): Extension<Arc<AppServices>>) -> ApiResult<impl IntoResponse> {
    let blogs = services.db.blogs().list().await?;
    let users = services.db.users().list().await?;
    let owners = dto::index_users(&users);

    let items = blogs
        .iter()
        .map(|blog| {
            let owner = owners.get(&blog.user).copied();
            if owner.is_none() {
                tracing::warn!(blog_id = %blog.id, user_id = %blog.user, "blog owner not found");
            }
            dto::blog_with_owner_to_json(blog, owner)
        })
        .collect::<Vec<_>>();

    Ok(Json(items))
}

pub async fn get_blog(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let blog = find_blog(&services, &id).await?;
    let owner = services.db.users().get(blog.user).await?;
    if owner.is_none() {
        tracing::warn!(blog_id = %blog.id, user_id = %blog.user, "blog owner not found");
    }

    Ok(Json(dto::blog_with_owner_to_json(&blog, owner.as_ref())))
}

pub async fn create_blog(
    Extension(services): Extension<Arc<AppServices>>,
    user: CurrentUser,
    ApiJson(body): ApiJson<BlogDraft>,
) -> ApiResult<impl IntoResponse> {
    let fields = body.validate()?;
    let blog = Blog::new(user.id(), fields);

    services.db.blogs().insert(&blog).await?;

    tracing::info!(
        blog_id = %blog.id,
        user_id = %user.id(),
        username = %user.username(),
        "blog created"
    );
    Ok((StatusCode::CREATED, Json(dto::blog_to_json(&blog))))
}

pub async fn update_blog(
    Extension(services): Extension<Arc<AppServices>>,
    user: CurrentUser,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<BlogDraft>,
) -> ApiResult<impl IntoResponse> {
    let mut blog = find_blog(&services, &id).await?;
    authorize_blog(&user, &blog, BlogAction::Update)?;

    blog.overwrite(body.validate()?);
    if !services.db.blogs().update(&blog).await? {
        return Err(blog_not_found());
    }

    Ok(Json(dto::blog_to_json(&blog)))
}

pub async fn delete_blog(
    Extension(services): Extension<Arc<AppServices>>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let blog = find_blog(&services, &id).await?;
    authorize_blog(&user, &blog, BlogAction::Delete)?;

    if !services.db.blogs().delete(blog.id).await? {
        return Err(blog_not_found());
    }

    tracing::info!(
        blog_id = %blog.id,
        user_id = %user.id(),
        username = %user.username(),
        "blog deleted"
    );
    Ok(StatusCode::NO_CONTENT)
}

async fn find_blog(services: &AppServices, raw_id: &str) -> ApiResult<Blog> {
    let id: BlogId = raw_id.parse()?;
    services.db.blogs().get(id).await?.ok_or_else(blog_not_found)
}

fn blog_not_found() -> ApiError {
    ApiError::not_found("blog not found")
}
