use axum::Router;

pub mod admin;
pub mod jobs;
pub mod system;

/// Router for all job and diagnostics endpoints.
pub fn router() -> Router {
    Router::new()
        .nest("/api", jobs::router())
        .nest("/admin", admin::router())
}
