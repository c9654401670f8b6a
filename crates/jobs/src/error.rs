//! Terminal failures recorded on a job.

use std::time::Duration;

use thiserror::Error;

/// Failure stored on a completed job record.
///
/// `Clone + PartialEq` so a base failure can be copied verbatim into every
/// dependent derived record and compared by callers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JobError {
    /// The worker's own deadline elapsed before the computation finished.
    #[error("computation timed out after {deadline:?}")]
    ComputationTimeout { deadline: Duration },

    /// A derived worker's deadline elapsed while its base job was still pending.
    #[error("timeout waiting for base job")]
    DependencyWaitTimeout,

    /// The computation itself reported a failure.
    #[error("computation failed: {0}")]
    Computation(String),

    /// The computation panicked; the record is failed instead of left pending.
    #[error("worker panicked: {0}")]
    WorkerPanicked(String),
}

impl JobError {
    pub fn computation(msg: impl Into<String>) -> Self {
        Self::Computation(msg.into())
    }
}
