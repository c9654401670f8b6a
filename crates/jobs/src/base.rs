//! Base tier: jobs keyed by subject, no dependencies.

use std::sync::Arc;
use std::time::Duration;

use jobcache_core::SubjectId;
use tokio::time::Instant;
use tracing::{Instrument, info, info_span, warn};

use crate::computation::BaseComputation;
use crate::context::CallerContext;
use crate::policy::{JobPolicy, run_with_deadline};
use crate::record::{JobRecord, JobSnapshot};
use crate::stats::TierStats;
use crate::table::{JobTable, Lookup};

pub type BaseJob = JobRecord<SubjectId>;

/// Owns the shared, dependency-free computation for each subject.
pub struct BaseJobManager {
    table: JobTable<SubjectId>,
    deadline: Duration,
    computation: Arc<dyn BaseComputation>,
}

impl BaseJobManager {
    pub fn new(policy: &JobPolicy, computation: Arc<dyn BaseComputation>) -> Self {
        Self {
            table: JobTable::new("base", policy.base_ttl),
            deadline: policy.base_deadline,
            computation,
        }
    }

    /// Return the live base job for `subject`, starting one if needed.
    ///
    /// Never blocks on the computation; wait with
    /// [`JobRecord::await_completion`]. `ctx` is used for log correlation
    /// only: the worker is not bound to it. Must be called from within a Tokio
    /// runtime.
    pub fn get_or_create(&self, ctx: &CallerContext, subject: &SubjectId) -> Arc<BaseJob> {
        match self.table.get_or_insert(subject) {
            Lookup::Existing(job) => {
                info!(subject = %subject, request_id = %ctx.request_id(), "base job cache hit");
                job
            }
            Lookup::Created(job) => {
                info!(subject = %subject, request_id = %ctx.request_id(), "base job created");
                self.spawn_worker(ctx, Arc::clone(&job));
                job
            }
        }
    }

    fn spawn_worker(&self, ctx: &CallerContext, job: Arc<BaseJob>) {
        let span = info_span!(
            "base_job",
            subject = %job.key(),
            request_id = %ctx.request_id()
        );
        let computation = Arc::clone(&self.computation);
        let budget = self.deadline;

        tokio::spawn(
            async move {
                info!("base job started");
                let deadline = Instant::now() + budget;
                let subject = job.key().clone();

                let outcome = run_with_deadline(deadline, budget, async move {
                    computation.compute(&subject).await
                })
                .await;

                match &outcome {
                    Ok(_) => info!("base job completed"),
                    Err(err) => warn!(error = %err, "base job failed"),
                }
                job.complete(outcome);
            }
            .instrument(span),
        );
    }

    /// Peek at the record currently mapped for `subject`.
    pub fn get(&self, subject: &SubjectId) -> Option<Arc<BaseJob>> {
        self.table.get(subject)
    }

    /// Number of base records in the map.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn ttl(&self) -> Duration {
        self.table.ttl()
    }

    pub fn stats(&self) -> TierStats {
        self.table.stats()
    }

    pub fn snapshots(&self) -> Vec<JobSnapshot> {
        self.table.snapshots()
    }
}

impl std::fmt::Debug for BaseJobManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BaseJobManager")
            .field("ttl", &self.table.ttl())
            .field("deadline", &self.deadline)
            .field("live", &self.table.len())
            .finish()
    }
}
