//! Deterministic payloads produced by the computations.
//!
//! Both functions are pure: the derived payload depends on nothing but the kind
//! and the base payload it was computed from.

use crate::id::SubjectId;
use crate::kind::ApiKind;

/// Payload of the base computation for a subject.
pub fn base_payload(subject: &SubjectId) -> String {
    format!("base-data-for-{subject}")
}

/// Combine a kind with the base payload into the derived payload.
pub fn combine(kind: ApiKind, base_result: &str) -> String {
    format!("{}-result-using-{}", kind.as_str(), base_result)
}
