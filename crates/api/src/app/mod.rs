//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: persistence and token/credential wiring
//! - `routes/`: HTTP routes + handlers (one file per resource)
//! - `dto.rs`: request extractors and JSON response shapes
//! - `errors.rs`: `ApiError` and its HTTP translation

use std::sync::Arc;

use axum::{Extension, Router};
use tower::ServiceBuilder;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs` and tests).
pub fn build_app(services: services::AppServices) -> Router {
    let auth_state = middleware::AuthState {
        jwt: services.jwt.clone(),
        db: services.db.clone(),
    };

    // Protected routes: a presented token must be valid and name a live user.
    let protected = routes::protected_router().layer(axum::middleware::from_fn_with_state(
        auth_state,
        middleware::user_extractor,
    ));

    Router::new()
        .merge(routes::public_router())
        .merge(protected)
        .fallback(routes::system::unknown_endpoint)
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn(middleware::request_logger))
                .layer(axum::middleware::from_fn(middleware::unrouted_method))
                .layer(Extension(Arc::new(services))),
        )
}
