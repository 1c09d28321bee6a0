//! Persistence for blogs and users.
//!
//! Handlers talk to the [`Database`] handle, which hides the backend behind the
//! [`BlogRepository`] and [`UserRepository`] traits. The handle is constructed
//! explicitly at startup and passed into the app; there is no global connection.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use bloglist_core::{Blog, BlogId, User, UserId};

pub mod in_memory;
pub mod postgres;

pub use in_memory::InMemoryDatabase;
pub use postgres::PostgresDatabase;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A uniqueness constraint was violated.
    #[error("duplicate {field}: {value}")]
    Duplicate { field: &'static str, value: String },

    /// A referenced record does not exist.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// The backend failed (connection, query, poisoned lock, ...).
    #[error("store error in {operation}: {message}")]
    Backend {
        operation: &'static str,
        message: String,
    },
}

impl StoreError {
    pub fn backend(operation: &'static str, message: impl Into<String>) -> Self {
        Self::Backend {
            operation,
            message: message.into(),
        }
    }
}

#[async_trait]
pub trait BlogRepository: Send + Sync {
    /// All blogs in insertion order.
    async fn list(&self) -> Result<Vec<Blog>, StoreError>;

    async fn get(&self, id: BlogId) -> Result<Option<Blog>, StoreError>;

    /// Persist `blog` and append it to its owner's blogs in one write.
    ///
    /// Fails with [`StoreError::NotFound`] when the owner does not exist.
    async fn insert(&self, blog: &Blog) -> Result<(), StoreError>;

    /// Replace a stored blog. Returns `false` if it does not exist.
    async fn update(&self, blog: &Blog) -> Result<bool, StoreError>;

    /// Remove the blog and its entry in the owner's blogs.
    /// Returns `false` if nothing was deleted.
    async fn delete(&self, id: BlogId) -> Result<bool, StoreError>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// All users in registration order, each with its owned blog ids.
    async fn list(&self) -> Result<Vec<User>, StoreError>;

    async fn get(&self, id: UserId) -> Result<Option<User>, StoreError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    /// Fails with [`StoreError::Duplicate`] when the username is taken.
    async fn insert(&self, user: &User) -> Result<(), StoreError>;
}

/// Explicit persistence handle shared by all requests.
#[derive(Clone)]
pub struct Database {
    blogs: Arc<dyn BlogRepository>,
    users: Arc<dyn UserRepository>,
}

impl Database {
    pub fn new(blogs: Arc<dyn BlogRepository>, users: Arc<dyn UserRepository>) -> Self {
        Self { blogs, users }
    }

    /// Process-local backend (dev/test).
    pub fn in_memory() -> Self {
        let db = Arc::new(InMemoryDatabase::new());
        Self::new(db.clone(), db)
    }

    /// Connect to PostgreSQL and make sure the schema exists.
    pub async fn postgres(database_url: &str) -> Result<Self, StoreError> {
        let db = Arc::new(PostgresDatabase::connect(database_url).await?);
        db.ensure_schema().await?;
        Ok(Self::new(db.clone(), db))
    }

    pub fn blogs(&self) -> &dyn BlogRepository {
        self.blogs.as_ref()
    }

    pub fn users(&self) -> &dyn UserRepository {
        self.users.as_ref()
    }
}

impl core::fmt::Debug for Database {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Database").finish_non_exhaustive()
    }
}
