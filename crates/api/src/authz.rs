//! Ownership guard for blog mutations.
//!
//! The rule itself lives on [`Blog::ensure_owner`]; this maps a denial to the
//! per-action message the API reports.

use bloglist_core::{Blog, DomainError};

use crate::app::errors::ApiError;
use crate::context::CurrentUser;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlogAction {
    Update,
    Delete,
}

impl BlogAction {
    fn denial(self) -> &'static str {
        match self {
            BlogAction::Update => "only the creator can update a blog",
            BlogAction::Delete => "only the creator can delete a blog",
        }
    }
}

/// Check that `user` may perform `action` on `blog`.
pub fn authorize_blog(user: &CurrentUser, blog: &Blog, action: BlogAction) -> Result<(), ApiError> {
    blog.ensure_owner(user.id()).map_err(|err| match err {
        DomainError::NotOwner => {
            tracing::warn!(
                user_id = %user.id(),
                blog_id = %blog.id,
                ?action,
                "non-owner blog mutation denied"
            );
            ApiError::NotOwner(action.denial())
        }
        other => other.into(),
    })
}
