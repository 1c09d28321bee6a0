//! `bloglist-core` — domain building blocks for the blog list service.
//!
//! This crate contains **pure domain** types and validation (no HTTP, no storage).

pub mod blog;
pub mod entity;
pub mod error;
pub mod id;
pub mod user;
pub mod validation;

pub use blog::{Blog, BlogDraft, BlogFields};
pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{BlogId, UserId};
pub use user::{Registration, RegistrationDraft, User};
pub use validation::{FieldViolation, ValidationFailure};
