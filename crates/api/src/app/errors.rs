use axum::extract::rejection::QueryRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use jobcache_core::DomainError;
use jobcache_jobs::JobError;

/// A job that completed with a failure is a server-side error.
pub fn job_error_to_response(err: &JobError) -> axum::response::Response {
    json_error(StatusCode::INTERNAL_SERVER_ERROR, "job_failed", err.to_string())
}

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    match err {
        DomainError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        DomainError::InvalidKind(kind) => json_error(
            StatusCode::NOT_FOUND,
            "unknown_kind",
            format!("unknown api kind: {kind}"),
        ),
    }
}

/// A query string axum could not deserialize (e.g. a repeated `companyId`).
pub fn query_rejection_to_response(rejection: &QueryRejection) -> axum::response::Response {
    json_error(StatusCode::BAD_REQUEST, "validation_error", rejection.body_text())
}

pub fn caller_cancelled() -> axum::response::Response {
    json_error(StatusCode::REQUEST_TIMEOUT, "request_timeout", "request cancelled")
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
