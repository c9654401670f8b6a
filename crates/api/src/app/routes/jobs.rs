//! `GET /api/{financials,sales,employee}?companyId=<id>`

use std::sync::Arc;

use axum::{
    Router,
    extract::{Extension, Path, Query, rejection::QueryRejection},
    http::{StatusCode, header},
    response::IntoResponse,
    routing::get,
};

use jobcache_core::ApiKind;
use jobcache_jobs::JobOutcome;

use crate::app::{dto::JobQuery, errors, services::JobServices};
use crate::context::RequestContext;

pub fn router() -> Router {
    Router::new().route("/:kind", get(get_job_result))
}

/// Start or join the job for (companyId, kind) and wait for its outcome.
pub async fn get_job_result(
    Extension(services): Extension<Arc<JobServices>>,
    Extension(request): Extension<RequestContext>,
    Path(kind): Path<String>,
    query: Result<Query<JobQuery>, QueryRejection>,
) -> axum::response::Response {
    let Query(query) = match query {
        Ok(query) => query,
        Err(rejection) => return errors::query_rejection_to_response(&rejection),
    };
    let kind: ApiKind = match kind.parse() {
        Ok(kind) => kind,
        Err(e) => return errors::domain_error_to_response(e),
    };
    let subject = match query.subject() {
        Ok(subject) => subject,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let ctx = services.caller_context(&request);
    let job = services.derived.get_or_create(&ctx, &subject, kind);

    match job.await_completion(&ctx).await {
        JobOutcome::Success(payload) => {
            tracing::debug!(subject = %subject, kind = %kind, request_id = %request.request_id(), "job succeeded");
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "application/json")],
                payload.to_string(),
            )
                .into_response()
        }
        JobOutcome::Failure(err) => {
            tracing::warn!(subject = %subject, kind = %kind, request_id = %request.request_id(), error = %err, "job failed");
            errors::job_error_to_response(&err)
        }
        JobOutcome::CallerCancelled => {
            tracing::info!(subject = %subject, kind = %kind, request_id = %request.request_id(), "request gave up waiting");
            errors::caller_cancelled()
        }
    }
}
