//! Read-only diagnostics for the two tiers.

use std::sync::Arc;

use axum::{Json, Router, extract::Extension, routing::get};

use crate::app::dto::{JobsReport, TierReport};
use crate::app::services::JobServices;

pub fn router() -> Router {
    Router::new().route("/jobs", get(get_jobs_report))
}

/// GET /admin/jobs
///
/// Counters and live entries per tier. Reading does not evict anything.
pub async fn get_jobs_report(Extension(services): Extension<Arc<JobServices>>) -> Json<JobsReport> {
    Json(JobsReport {
        base: TierReport::new(services.base.stats(), services.base.snapshots()),
        derived: TierReport::new(services.derived.stats(), services.derived.snapshots()),
    })
}
