//! The computations behind each tier.

use std::time::Duration;

use async_trait::async_trait;
use jobcache_core::{ApiKind, SubjectId, base_payload, combine};

use crate::error::JobError;

/// Dependency-free computation keyed by subject.
#[async_trait]
pub trait BaseComputation: Send + Sync + 'static {
    async fn compute(&self, subject: &SubjectId) -> Result<String, JobError>;
}

/// Computation for one kind, given the subject's base result.
#[async_trait]
pub trait DerivedComputation: Send + Sync + 'static {
    async fn derive(&self, kind: ApiKind, base_result: &str) -> Result<String, JobError>;
}

/// Stand-in for an expensive upstream fetch: waits `latency`, then returns
/// `base-data-for-<subject>`.
#[derive(Debug, Clone, Copy)]
pub struct SimulatedBaseComputation {
    latency: Duration,
}

impl SimulatedBaseComputation {
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }
}

impl Default for SimulatedBaseComputation {
    fn default() -> Self {
        Self::new(Duration::from_secs(10))
    }
}

#[async_trait]
impl BaseComputation for SimulatedBaseComputation {
    async fn compute(&self, subject: &SubjectId) -> Result<String, JobError> {
        tokio::time::sleep(self.latency).await;
        Ok(base_payload(subject))
    }
}

/// Waits `latency`, then combines kind and base result deterministically.
#[derive(Debug, Clone, Copy)]
pub struct SimulatedDerivedComputation {
    latency: Duration,
}

impl SimulatedDerivedComputation {
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }
}

impl Default for SimulatedDerivedComputation {
    fn default() -> Self {
        Self::new(Duration::from_secs(10))
    }
}

#[async_trait]
impl DerivedComputation for SimulatedDerivedComputation {
    async fn derive(&self, kind: ApiKind, base_result: &str) -> Result<String, JobError> {
        tokio::time::sleep(self.latency).await;
        Ok(combine(kind, base_result))
    }
}
