//! Job record: one attempt to produce a result for a key.

use std::fmt::Display;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::time::Instant;
use tracing::warn;

use crate::completion::Completion;
use crate::context::CallerContext;
use crate::error::JobError;
use crate::lock;

/// What a waiting caller gets back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    Success(Arc<str>),
    Failure(JobError),
    /// The caller's own context fired first. Not stored on the record.
    CallerCancelled,
}

/// Lifecycle state of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    Pending,
    Succeeded,
    Failed,
}

#[derive(Debug)]
struct Terminal {
    outcome: Result<Arc<str>, JobError>,
    completed_at: Instant,
}

/// State of one computation attempt.
///
/// Pending until its worker calls `complete`, then immutable. The record lock
/// only guards the terminal state; the manager's map lock is separate.
#[derive(Debug)]
pub struct JobRecord<K> {
    key: K,
    created_at: Instant,
    created_at_utc: DateTime<Utc>,
    terminal: Mutex<Option<Terminal>>,
    completion: Completion,
}

impl<K> JobRecord<K> {
    pub(crate) fn new(key: K) -> Self {
        Self {
            key,
            created_at: Instant::now(),
            created_at_utc: Utc::now(),
            terminal: Mutex::new(None),
            completion: Completion::new(),
        }
    }

    pub fn key(&self) -> &K {
        &self.key
    }

    pub fn completion(&self) -> &Completion {
        &self.completion
    }

    pub fn completed_at(&self) -> Option<Instant> {
        lock(&self.terminal).as_ref().map(|t| t.completed_at)
    }

    pub fn state(&self) -> JobState {
        match lock(&self.terminal).as_ref() {
            None => JobState::Pending,
            Some(Terminal { outcome: Ok(_), .. }) => JobState::Succeeded,
            Some(Terminal { outcome: Err(_), .. }) => JobState::Failed,
        }
    }

    /// Completed more than `ttl` before `now`. Pending records never expire.
    pub fn is_expired(&self, ttl: Duration, now: Instant) -> bool {
        self.completed_at()
            .is_some_and(|completed_at| now.saturating_duration_since(completed_at) > ttl)
    }

    /// Non-blocking peek at the terminal outcome; `None` while pending.
    pub fn outcome(&self) -> Option<Result<Arc<str>, JobError>> {
        lock(&self.terminal).as_ref().map(|t| t.outcome.clone())
    }

    /// Wait for the record to complete, or for the caller to give up.
    ///
    /// Never mutates the record; giving up affects only this caller.
    pub async fn await_completion(&self, ctx: &CallerContext) -> JobOutcome {
        tokio::select! {
            biased;
            () = self.completion.wait() => {}
            () = ctx.cancelled() => return JobOutcome::CallerCancelled,
        }

        match self.outcome() {
            Some(Ok(result)) => JobOutcome::Success(result),
            Some(Err(err)) => JobOutcome::Failure(err),
            None => unreachable!("completion signaled before the terminal state was written"),
        }
    }

    /// Write the terminal state, then signal waiters.
    ///
    /// Called once, by the record's own worker.
    pub(crate) fn complete(&self, outcome: Result<String, JobError>) {
        {
            let mut terminal = lock(&self.terminal);
            debug_assert!(terminal.is_none(), "job record completed twice");
            if terminal.is_some() {
                warn!("ignoring second completion of a job record");
                return;
            }
            *terminal = Some(Terminal {
                outcome: outcome.map(Arc::from),
                completed_at: Instant::now(),
            });
        }
        self.completion.signal();
    }
}

/// Serializable view of a record for diagnostics.
#[derive(Debug, Clone, Serialize)]
pub struct JobSnapshot {
    pub key: String,
    pub state: JobState,
    pub created_at: DateTime<Utc>,
    pub age_ms: u64,
    pub completed_ms_ago: Option<u64>,
    pub error: Option<String>,
}

impl<K: Display> JobRecord<K> {
    pub fn snapshot(&self) -> JobSnapshot {
        let now = Instant::now();
        let terminal = lock(&self.terminal);
        let (state, completed_ms_ago, error) = match terminal.as_ref() {
            None => (JobState::Pending, None, None),
            Some(t) => {
                let ago = millis(now.saturating_duration_since(t.completed_at));
                match &t.outcome {
                    Ok(_) => (JobState::Succeeded, Some(ago), None),
                    Err(err) => (JobState::Failed, Some(ago), Some(err.to_string())),
                }
            }
        };

        JobSnapshot {
            key: self.key.to_string(),
            state,
            created_at: self.created_at_utc,
            age_ms: millis(now.saturating_duration_since(self.created_at)),
            completed_ms_ago,
            error,
        }
    }
}

fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}
