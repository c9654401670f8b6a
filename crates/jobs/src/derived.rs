//! Derived tier: jobs keyed by (subject, kind), chained on the base tier.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use jobcache_core::{ApiKind, SubjectId};
use tokio::time::Instant;
use tracing::{Instrument, info, info_span, warn};

use crate::base::BaseJobManager;
use crate::computation::DerivedComputation;
use crate::context::CallerContext;
use crate::error::JobError;
use crate::policy::{JobPolicy, run_with_deadline};
use crate::record::{JobRecord, JobSnapshot};
use crate::stats::TierStats;
use crate::table::{JobTable, Lookup};

/// Composite key of a derived job.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DerivedKey {
    pub subject: SubjectId,
    pub kind: ApiKind,
}

impl DerivedKey {
    pub fn new(subject: SubjectId, kind: ApiKind) -> Self {
        Self { subject, kind }
    }
}

impl fmt::Display for DerivedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.subject, self.kind)
    }
}

pub type DerivedJob = JobRecord<DerivedKey>;

/// Owns per-kind computations, each depending on its subject's base job.
pub struct DerivedJobManager {
    table: JobTable<DerivedKey>,
    base: Arc<BaseJobManager>,
    deadline: Duration,
    computation: Arc<dyn DerivedComputation>,
}

impl DerivedJobManager {
    pub fn new(
        policy: &JobPolicy,
        base: Arc<BaseJobManager>,
        computation: Arc<dyn DerivedComputation>,
    ) -> Self {
        Self {
            table: JobTable::new("derived", policy.derived_ttl),
            base,
            deadline: policy.derived_deadline,
            computation,
        }
    }

    /// Return the live derived job for (`subject`, `kind`), starting one if needed.
    ///
    /// Same protocol as the base tier, with its own map and TTL.
    pub fn get_or_create(
        &self,
        ctx: &CallerContext,
        subject: &SubjectId,
        kind: ApiKind,
    ) -> Arc<DerivedJob> {
        let key = DerivedKey::new(subject.clone(), kind);

        match self.table.get_or_insert(&key) {
            Lookup::Existing(job) => {
                info!(subject = %subject, kind = %kind, request_id = %ctx.request_id(), "derived job cache hit");
                job
            }
            Lookup::Created(job) => {
                info!(subject = %subject, kind = %kind, request_id = %ctx.request_id(), "derived job created");
                self.spawn_worker(ctx, Arc::clone(&job));
                job
            }
        }
    }

    fn spawn_worker(&self, ctx: &CallerContext, job: Arc<DerivedJob>) {
        let span = info_span!(
            "derived_job",
            subject = %job.key().subject,
            kind = %job.key().kind,
            request_id = %ctx.request_id()
        );
        let worker_ctx = ctx.detached();
        let base = Arc::clone(&self.base);
        let computation = Arc::clone(&self.computation);
        let budget = self.deadline;

        tokio::spawn(
            async move {
                info!("derived job started");
                let deadline = Instant::now() + budget;
                let DerivedKey { subject, kind } = job.key().clone();

                let base_job = base.get_or_create(&worker_ctx, &subject);

                let base_outcome = tokio::select! {
                    biased;
                    () = base_job.completion().wait() => base_job.outcome(),
                    () = tokio::time::sleep_until(deadline) => None,
                };

                let outcome = match base_outcome {
                    None => Err(JobError::DependencyWaitTimeout),
                    Some(Err(err)) => {
                        warn!(error = %err, "base job failed, propagating");
                        Err(err)
                    }
                    Some(Ok(base_result)) => {
                        run_with_deadline(deadline, budget, async move {
                            computation.derive(kind, &base_result).await
                        })
                        .await
                    }
                };

                match &outcome {
                    Ok(_) => info!("derived job completed"),
                    Err(err) => warn!(error = %err, "derived job failed"),
                }
                job.complete(outcome);
            }
            .instrument(span),
        );
    }

    /// Peek at the record currently mapped for (`subject`, `kind`).
    pub fn get(&self, subject: &SubjectId, kind: ApiKind) -> Option<Arc<DerivedJob>> {
        self.table.get(&DerivedKey::new(subject.clone(), kind))
    }

    /// Number of derived records in the map.
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

impl fmt::Debug for DerivedJobManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DerivedJobManager")
            .field("ttl", &self.table.ttl())
            .field("deadline", &self.deadline)
            .field("live", &self.table.len())
            .finish()
    }
}
