//! Infrastructure wiring shared by every handler.

use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;

use bloglist_auth::{Hs256JwtCodec, JwtCodec, TokenClaims};
use bloglist_core::User;
use bloglist_infra::Database;

use crate::app::errors::ApiResult;
use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppServices {
    pub db: Database,
    pub jwt: Arc<dyn JwtCodec>,
    pub token_ttl: chrono::Duration,
    pub bcrypt_cost: u32,
}

impl AppServices {
    pub fn new(db: Database, jwt: Arc<dyn JwtCodec>, token_ttl: chrono::Duration, bcrypt_cost: u32) -> Self {
        Self {
            db,
            jwt,
            token_ttl,
            bcrypt_cost,
        }
    }

    /// In-memory store with an HS256 codec (tests/dev).
    pub fn in_memory(jwt_secret: &str, bcrypt_cost: u32) -> Self {
        Self::new(
            Database::in_memory(),
            Arc::new(Hs256JwtCodec::new(jwt_secret)),
            chrono::Duration::seconds(crate::config::DEFAULT_TOKEN_TTL_SECS),
            bcrypt_cost,
        )
    }

    pub async fn hash_password(&self, password: String) -> ApiResult<String> {
        let cost = self.bcrypt_cost;
        let hash =
            tokio::task::spawn_blocking(move || bloglist_auth::hash_password(&password, cost)).await??;
        Ok(hash)
    }

    pub async fn verify_password(&self, password: String, hash: String) -> ApiResult<bool> {
        let ok = tokio::task::spawn_blocking(move || bloglist_auth::verify_password(&password, &hash))
            .await??;
        Ok(ok)
    }

    pub fn issue_token(&self, user: &User) -> ApiResult<String> {
        let claims = TokenClaims::issue(user.id, user.username.clone(), Utc::now(), self.token_ttl);
        Ok(self.jwt.encode(&claims)?)
    }
}

/// Wire services from configuration. PostgreSQL when `DATABASE_URL` is set.
pub async fn build_services(config: &AppConfig) -> anyhow::Result<AppServices> {
    let db = match &config.database_url {
        Some(url) => {
            tracing::info!("using postgres store");
            Database::postgres(url)
                .await
                .context("failed to connect to postgres")?
        }
        None => {
            tracing::info!("DATABASE_URL not set; using in-memory store");
            Database::in_memory()
        }
    };

    Ok(AppServices::new(
        db,
        Arc::new(Hs256JwtCodec::new(&config.jwt_secret)),
        config.token_ttl(),
        config.bcrypt_cost,
    ))
}
