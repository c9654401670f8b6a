//! HTTP API application wiring (Axum router + job manager wiring).
//!
//! - `services.rs`: builds the two tiers from configuration
//! - `routes/`: HTTP routes + handlers
//! - `dto.rs`: query parameters and report bodies
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router, routing::get};
use tower::ServiceBuilder;

use crate::config::ServerConfig;
use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(config: &ServerConfig) -> Router {
    let services = Arc::new(services::build_services(config));
    build_app_with_services(services)
}

/// Build the router around already-constructed services.
pub fn build_app_with_services(services: Arc<services::JobServices>) -> Router {
    Router::new()
        .route("/health", get(routes::system::health))
        .merge(routes::router())
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn(middleware::request_id_middleware))
                .layer(Extension(services)),
        )
}
