use std::sync::Arc;
use std::time::Duration;

use jobcache_jobs::{
    BaseJobManager, CallerContext, DerivedJobManager, SimulatedBaseComputation,
    SimulatedDerivedComputation,
};

use crate::config::ServerConfig;
use crate::context::RequestContext;

/// Long-lived state shared by all handlers.
#[derive(Debug, Clone)]
pub struct JobServices {
    pub base: Arc<BaseJobManager>,
    pub derived: Arc<DerivedJobManager>,
    pub request_timeout: Option<Duration>,
}

impl JobServices {
    pub fn new(
        base: Arc<BaseJobManager>,
        derived: Arc<DerivedJobManager>,
        request_timeout: Option<Duration>,
    ) -> Self {
        Self {
            base,
            derived,
            request_timeout,
        }
    }

    /// Caller context for one request: its id plus the configured wait timeout.
    ///
    /// If the client disconnects, axum drops the handler future, which drops
    /// only that request's wait.
    pub fn caller_context(&self, request: &RequestContext) -> CallerContext {
        let ctx = CallerContext::background().with_request_id(request.request_id());
        match self.request_timeout {
            Some(timeout) => ctx.with_timeout(timeout),
            None => ctx,
        }
    }
}

/// Wire the base and derived tiers with the simulated computations.
pub fn build_services(config: &ServerConfig) -> JobServices {
    let base = Arc::new(BaseJobManager::new(
        &config.policy,
        Arc::new(SimulatedBaseComputation::new(config.base_latency)),
    ));
    let derived = Arc::new(DerivedJobManager::new(
        &config.policy,
        Arc::clone(&base),
        Arc::new(SimulatedDerivedComputation::new(config.derived_latency)),
    ));

    JobServices::new(base, derived, config.request_timeout)
}
