//! `jobcache-core`: domain primitives shared by the job engine and the transport.
//!
//! This crate contains **pure domain** types (no async, no IO): the subject
//! identifier, the closed set of API kinds, and the deterministic payload
//! functions the computations produce.

pub mod error;
pub mod id;
pub mod kind;
pub mod payload;

pub use error::DomainError;
pub use id::SubjectId;
pub use kind::ApiKind;
pub use payload::{base_payload, combine};
