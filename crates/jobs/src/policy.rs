//! Deadlines and TTLs shared by both tiers.

use std::any::Any;
use std::future::Future;
use std::time::Duration;

use tokio::task::JoinError;
use tokio::time::Instant;

use crate::error::JobError;

/// Timing policy for the two tiers.
///
/// Deadlines are owned by the workers: they start when the worker starts and
/// are unaffected by any caller's cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobPolicy {
    /// How long a completed base record is reused.
    pub base_ttl: Duration,
    /// How long a completed derived record is reused.
    pub derived_ttl: Duration,
    /// Ceiling on one base computation.
    pub base_deadline: Duration,
    /// Ceiling on a derived worker: waiting for its base plus its own work.
    pub derived_deadline: Duration,
}

impl Default for JobPolicy {
    fn default() -> Self {
        Self {
            base_ttl: Duration::from_secs(5 * 60),
            derived_ttl: Duration::from_secs(5 * 60),
            base_deadline: Duration::from_secs(20),
            derived_deadline: Duration::from_secs(30),
        }
    }
}

impl JobPolicy {
    pub fn with_ttls(mut self, base: Duration, derived: Duration) -> Self {
        self.base_ttl = base;
        self.derived_ttl = derived;
        self
    }

    pub fn with_deadlines(mut self, base: Duration, derived: Duration) -> Self {
        self.base_deadline = base;
        self.derived_deadline = derived;
        self
    }
}

/// Run `work` on its own task until it finishes or `deadline` passes.
///
/// On expiry the task is aborted and the result is
/// `ComputationTimeout { deadline: budget }`. A panic inside `work` becomes
/// `WorkerPanicked` instead of leaving the record pending forever.
pub(crate) async fn run_with_deadline<F>(
    deadline: Instant,
    budget: Duration,
    work: F,
) -> Result<String, JobError>
where
    F: Future<Output = Result<String, JobError>> + Send + 'static,
{
    let mut task = tokio::spawn(work);

    match tokio::time::timeout_at(deadline, &mut task).await {
        Ok(Ok(outcome)) => outcome,
        Ok(Err(join_err)) => Err(JobError::WorkerPanicked(join_error_message(join_err))),
        Err(_elapsed) => {
            task.abort();
            Err(JobError::ComputationTimeout { deadline: budget })
        }
    }
}

fn join_error_message(err: JoinError) -> String {
    if err.is_cancelled() {
        return "task cancelled".to_string();
    }
    match err.try_into_panic() {
        Ok(payload) => panic_message(payload.as_ref()),
        Err(err) => err.to_string(),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
