//! Two-tier single-flight job cache.
//!
//! ## Design
//!
//! - One live record per key; concurrent callers collapse onto it
//! - Completed records (success or failure) are reused until their TTL elapses
//! - Eviction is lazy: the next lookup after expiry replaces the record
//! - Derived jobs depend on exactly one base job and never re-trigger it
//! - Workers run under their own deadline, never a caller's cancellation
//!
//! ## Components
//!
//! - `Completion`: one-shot, multi-waiter completion signal
//! - `JobRecord`: state of one computation attempt
//! - `JobTable`: key → record map with TTL and hit/miss/eviction counters
//! - `BaseJobManager`: jobs keyed by subject
//! - `DerivedJobManager`: jobs keyed by (subject, kind), chained on the base tier
//! - `CallerContext`: a caller's own cancellation and wait timeout

use std::sync::{Mutex, MutexGuard, PoisonError};

pub mod base;
pub mod completion;
pub mod computation;
pub mod context;
pub mod derived;
pub mod error;
pub mod policy;
pub mod record;
pub mod stats;
pub mod table;


pub use base::{BaseJob, BaseJobManager};
pub use completion::Completion;
pub use computation::{
    BaseComputation, DerivedComputation, SimulatedBaseComputation, SimulatedDerivedComputation,
};
pub use context::CallerContext;
pub use derived::{DerivedJob, DerivedJobManager, DerivedKey};
pub use error::JobError;
pub use policy::JobPolicy;
pub use record::{JobOutcome, JobRecord, JobSnapshot, JobState};
pub use stats::TierStats;
pub use table::{JobTable, Lookup};

/// Lock a std mutex, recovering the guard if a previous holder panicked.
///
/// Every critical section in this crate is a handful of field writes, so a
/// poisoned lock still guards consistent data.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
