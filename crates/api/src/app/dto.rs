//! Request extractors/DTOs and JSON response shapes.

use std::collections::HashMap;

use axum::extract::FromRequest;
use serde::Deserialize;
use serde_json::{Value, json};

use bloglist_core::{Blog, BlogId, User, UserId};

use crate::app::errors::ApiError;

/// `axum::Json` whose rejection is reported as [`ApiError::InvalidBody`].
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Blog with its owner as a bare id (create/update responses).
pub fn blog_to_json(blog: &Blog) -> Value {
    json!({
        "id": blog.id.to_string(),
        "title": blog.title,
        "author": blog.author,
        "url": blog.url,
        "likes": blog.likes,
        "user": blog.user.to_string(),
    })
}

/// Blog with the owner joined in; `user` is `null` when the owner is gone.
pub fn blog_with_owner_to_json(blog: &Blog, owner: Option<&User>) -> Value {
    let user = owner.map(|u| {
        json!({
            "username": u.username,
            "name": u.name,
            "id": u.id.to_string(),
        })
    });

    json!({
        "id": blog.id.to_string(),
        "title": blog.title,
        "author": blog.author,
        "url": blog.url,
        "likes": blog.likes,
        "user": user,
    })
}

fn blog_summary_to_json(blog: &Blog) -> Value {
    json!({
        "id": blog.id.to_string(),
        "title": blog.title,
        "author": blog.author,
        "url": blog.url,
        "likes": blog.likes,
    })
}

/// User with owned blog ids (registration response). Never includes the hash.
pub fn user_to_json(user: &User) -> Value {
    json!({
        "id": user.id.to_string(),
        "username": user.username,
        "name": user.name,
        "blogs": user.blogs.iter().map(ToString::to_string).collect::<Vec<_>>(),
    })
}

/// User with owned blogs joined in, in ownership order.
pub fn user_with_blogs_to_json(user: &User, blogs: &HashMap<BlogId, &Blog>) -> Value {
    let owned = user
        .blogs
        .iter()
        .filter_map(|id| blogs.get(id))
        .map(|b| blog_summary_to_json(b))
        .collect::<Vec<_>>();

    json!({
        "id": user.id.to_string(),
        "username": user.username,
        "name": user.name,
        "blogs": owned,
    })
}

pub fn login_to_json(token: &str, user: &User) -> Value {
    json!({
        "token": token,
        "username": user.username,
        "name": user.name,
    })
}

pub fn index_users(users: &[User]) -> HashMap<UserId, &User> {
    users.iter().map(|u| (u.id, u)).collect()
}

pub fn index_blogs(blogs: &[Blog]) -> HashMap<BlogId, &Blog> {
    blogs.iter().map(|b| (b.id, b)).collect()
}
