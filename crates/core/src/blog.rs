//! Blog post model.

use serde::{Deserialize, Serialize};

use crate::entity::Entity;
use crate::error::{DomainError, DomainResult};
use crate::id::{BlogId, UserId};
use crate::validation::{ValidationFailure, Validator};

/// A blog post, owned by exactly one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blog {
    pub id: BlogId,
    pub title: String,
    pub author: Option<String>,
    pub url: String,
    pub likes: i64,
    pub user: UserId,
}

impl Blog {
    pub fn new(owner: UserId, fields: BlogFields) -> Self {
        Self {
            id: BlogId::new(),
            title: fields.title,
            author: fields.author,
            url: fields.url,
            likes: fields.likes,
            user: owner,
        }
    }

    pub fn is_owned_by(&self, user: UserId) -> bool {
        self.user == user
    }

    /// Overwrite every editable field (PUT semantics).
    pub fn overwrite(&mut self, fields: BlogFields) {
        self.title = fields.title;
        self.author = fields.author;
        self.url = fields.url;
        self.likes = fields.likes;
    }

    /// Guard for mutations that only the owner may perform.
    pub fn ensure_owner(&self, user: UserId) -> DomainResult<()> {
        if self.is_owned_by(user) {
            Ok(())
        } else {
            Err(DomainError::NotOwner)
        }
    }
}

impl Entity for Blog {
    type Id = BlogId;

    fn id(&self) -> BlogId {
        self.id
    }
}

/// Unvalidated blog input as received from a client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BlogDraft {
    pub title: Option<String>,
    pub author: Option<String>,
    pub url: Option<String>,
    pub likes: Option<i64>,
}

/// Validated blog fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlogFields {
    pub title: String,
    pub author: Option<String>,
    pub url: String,
    pub likes: i64,
}

impl BlogDraft {
    pub const MODEL: &'static str = "Blog";

    /// `title` and `url` must be non-blank; `likes` defaults to 0 and may not be negative.
    pub fn validate(self) -> Result<BlogFields, ValidationFailure> {
        let mut v = Validator::new(Self::MODEL);

        let title = v.required("title", self.title);
        let url = v.required("url", self.url);
        let likes = self.likes.unwrap_or(0);
        v.at_least("likes", likes, 0);

        v.finish()?;

        Ok(BlogFields {
            title,
            author: self.author,
            url,
            likes,
        })
    }
}
