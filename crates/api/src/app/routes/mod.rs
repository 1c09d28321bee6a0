use axum::{Router, routing::get};

pub mod blogs;
pub mod login;
pub mod system;
pub mod users;

/// Endpoints that never require an identity.
pub fn public_router() -> Router {
    Router::new()
        .route("/health", get(system::health))
        .merge(blogs::public_router())
        .merge(users::router())
        .merge(login::router())
}

/// Endpoints that act on behalf of the bearer token's user.
pub fn protected_router() -> Router {
    Router::new().merge(blogs::protected_router())
}
