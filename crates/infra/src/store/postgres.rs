//! PostgreSQL backend.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError |
//! |------------|----------------------|------------|
//! | Database (unique violation on `users.username`) | `23505` | `Duplicate` |
//! | Database (foreign key violation) | `23503` | `NotFound("user")` |
//! | anything else | — | `Backend` |
//!
//! Owned-blog order is kept in `user_blogs.position`. A blog and its
//! `user_blogs` row are inserted in one transaction; deleting a blog cascades
//! to that row.

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{FromRow, PgPool, Row};
use tracing::instrument;
use uuid::Uuid;

use bloglist_core::{Blog, BlogId, User, UserId};

use super::{BlogRepository, StoreError, UserRepository};

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id            UUID PRIMARY KEY,
        username      TEXT NOT NULL UNIQUE,
        name          TEXT NULL,
        password_hash TEXT NOT NULL,
        created_at    TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS blogs (
        id         UUID PRIMARY KEY,
        title      TEXT NOT NULL,
        author     TEXT NULL,
        url        TEXT NOT NULL,
        likes      BIGINT NOT NULL DEFAULT 0 CHECK (likes >= 0),
        user_id    UUID NOT NULL REFERENCES users (id),
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS user_blogs (
        user_id  UUID NOT NULL REFERENCES users (id) ON DELETE CASCADE,
        blog_id  UUID NOT NULL REFERENCES blogs (id) ON DELETE CASCADE,
        position BIGSERIAL,
        PRIMARY KEY (user_id, blog_id)
    )
    "#,
];

/// PostgreSQL-backed blogs and users.
///
/// Uses a SQLx connection pool, so it is `Send + Sync` and cheap to share.
#[derive(Debug, Clone)]
pub struct PostgresDatabase {
    pool: PgPool,
}

impl PostgresDatabase {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }

    /// Create tables if they do not exist yet.
    #[instrument(skip_all, err)]
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| map_sqlx_error("ensure_schema", e))?;
        }
        Ok(())
    }

    async fn owned_blogs(&self, user: UserId) -> Result<Vec<BlogId>, StoreError> {
        let rows = sqlx::query("SELECT blog_id FROM user_blogs WHERE user_id = $1 ORDER BY position ASC")
            .bind(user.as_uuid())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("owned_blogs", e))?;

        rows.iter()
            .map(|row| {
                row.try_get::<Uuid, _>("blog_id")
                    .map(BlogId::from_uuid)
                    .map_err(|e| map_sqlx_error("owned_blogs", e))
            })
            .collect()
    }

    async fn user_from_row(&self, row: &PgRow) -> Result<User, StoreError> {
        let mut user = UserRow::from_row(row)
            .map_err(|e| map_sqlx_error("decode_user", e))?
            .into_user();
        user.blogs = self.owned_blogs(user.id).await?;
        Ok(user)
    }
}

#[async_trait]
impl BlogRepository for PostgresDatabase {
    #[instrument(skip_all, err)]
    async fn list(&self) -> Result<Vec<Blog>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, title, author, url, likes, user_id
            FROM blogs
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_blogs", e))?;

        rows.iter()
            .map(|row| {
                BlogRow::from_row(row)
                    .map(BlogRow::into_blog)
                    .map_err(|e| map_sqlx_error("list_blogs", e))
            })
            .collect()
    }

    #[instrument(skip_all, fields(blog_id = %id), err)]
    async fn get(&self, id: BlogId) -> Result<Option<Blog>, StoreError> {
        let row = sqlx::query("SELECT id, title, author, url, likes, user_id FROM blogs WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_blog", e))?;

        row.map(|row| {
            BlogRow::from_row(&row)
                .map(BlogRow::into_blog)
                .map_err(|e| map_sqlx_error("get_blog", e))
        })
        .transpose()
    }

    #[instrument(skip_all, fields(blog_id = %blog.id), err)]
    async fn insert(&self, blog: &Blog) -> Result<(), StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("insert_blog", e))?;

        sqlx::query(
            r#"
            INSERT INTO blogs (id, title, author, url, likes, user_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(blog.id.as_uuid())
        .bind(&blog.title)
        .bind(&blog.author)
        .bind(&blog.url)
        .bind(blog.likes)
        .bind(blog.user.as_uuid())
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("insert_blog", e))?;

        sqlx::query(
            r#"
            INSERT INTO user_blogs (user_id, blog_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, blog_id) DO NOTHING
            "#,
        )
        .bind(blog.user.as_uuid())
        .bind(blog.id.as_uuid())
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("insert_blog", e))?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("insert_blog", e))?;
        Ok(())
    }

    #[instrument(skip_all, fields(blog_id = %blog.id), err)]
    async fn update(&self, blog: &Blog) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE blogs
            SET title = $2, author = $3, url = $4, likes = $5
            WHERE id = $1
            "#,
        )
        .bind(blog.id.as_uuid())
        .bind(&blog.title)
        .bind(&blog.author)
        .bind(&blog.url)
        .bind(blog.likes)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_blog", e))?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip_all, fields(blog_id = %id), err)]
    async fn delete(&self, id: BlogId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM blogs WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_blog", e))?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl UserRepository for PostgresDatabase {
    #[instrument(skip_all, err)]
    async fn list(&self) -> Result<Vec<User>, StoreError> {
        let rows = sqlx::query(
            "SELECT id, username, name, password_hash FROM users ORDER BY created_at ASC, id ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_users", e))?;

        let links = sqlx::query("SELECT user_id, blog_id FROM user_blogs ORDER BY position ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_users", e))?;

        let mut owned: HashMap<Uuid, Vec<BlogId>> = HashMap::new();
        for link in &links {
            let user_id: Uuid = link
                .try_get("user_id")
                .map_err(|e| map_sqlx_error("list_users", e))?;
            let blog_id: Uuid = link
                .try_get("blog_id")
                .map_err(|e| map_sqlx_error("list_users", e))?;
            owned.entry(user_id).or_default().push(BlogId::from_uuid(blog_id));
        }

        rows.iter()
            .map(|row| {
                let mut user = UserRow::from_row(row)
                    .map_err(|e| map_sqlx_error("list_users", e))?
                    .into_user();
                user.blogs = owned.remove(user.id.as_uuid()).unwrap_or_default();
                Ok(user)
            })
            .collect()
    }

    #[instrument(skip_all, fields(user_id = %id), err)]
    async fn get(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let row = sqlx::query("SELECT id, username, name, password_hash FROM users WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_user", e))?;

        match row {
            Some(row) => Ok(Some(self.user_from_row(&row).await?)),
            None => Ok(None),
        }
    }

    #[instrument(skip_all, fields(username = %username), err)]
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let row = sqlx::query("SELECT id, username, name, password_hash FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_user_by_username", e))?;

        match row {
            Some(row) => Ok(Some(self.user_from_row(&row).await?)),
            None => Ok(None),
        }
    }

    #[instrument(skip_all, fields(user_id = %user.id), err)]
    async fn insert(&self, user: &User) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO users (id, username, name, password_hash) VALUES ($1, $2, $3, $4)")
            .bind(user.id.as_uuid())
            .bind(&user.username)
            .bind(&user.name)
            .bind(&user.password_hash)
            .execute(&self.pool)
            .await
            .map_err(|e| match map_sqlx_error("insert_user", e) {
                StoreError::Duplicate { field, .. } => StoreError::Duplicate {
                    field,
                    value: user.username.clone(),
                },
                other => other,
            })?;
        Ok(())
    }
}

struct BlogRow {
    id: Uuid,
    title: String,
    author: Option<String>,
    url: String,
    likes: i64,
    user_id: Uuid,
}

impl<'r> sqlx::FromRow<'r, PgRow> for BlogRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(BlogRow {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            author: row.try_get("author")?,
            url: row.try_get("url")?,
            likes: row.try_get("likes")?,
            user_id: row.try_get("user_id")?,
        })
    }
}

impl BlogRow {
    fn into_blog(self) -> Blog {
        Blog {
            id: BlogId::from_uuid(self.id),
            title: self.title,
            author: self.author,
            url: self.url,
            likes: self.likes,
            user: UserId::from_uuid(self.user_id),
        }
    }
}

struct UserRow {
    id: Uuid,
    username: String,
    name: Option<String>,
    password_hash: String,
}

impl<'r> sqlx::FromRow<'r, PgRow> for UserRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(UserRow {
            id: row.try_get("id")?,
            username: row.try_get("username")?,
            name: row.try_get("name")?,
            password_hash: row.try_get("password_hash")?,
        })
    }
}

impl UserRow {
    fn into_user(self) -> User {
        User {
            id: UserId::from_uuid(self.id),
            username: self.username,
            name: self.name,
            password_hash: self.password_hash,
            blogs: Vec::new(),
        }
    }
}

fn map_sqlx_error(operation: &'static str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => match db_err.code().as_deref() {
            Some("23505") => StoreError::Duplicate {
                field: "username",
                value: String::new(),
            },
            Some("23503") => StoreError::NotFound("user"),
            _ => StoreError::backend(operation, db_err.message().to_string()),
        },
        sqlx::Error::PoolClosed => StoreError::backend(operation, "connection pool closed"),
        other => StoreError::backend(operation, other.to_string()),
    }
}
