//! Domain error model.

use thiserror::Error;

/// Domain-level error.
///
/// These never reach the job engine: inputs are validated at the transport
/// boundary and only well-formed values are handed to the managers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. empty subject id).
    #[error("validation failed: {0}")]
    Validation(String),

    /// The requested API kind is not part of the supported set.
    #[error("unknown api kind: {0}")]
    InvalidKind(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_kind(msg: impl Into<String>) -> Self {
        Self::InvalidKind(msg.into())
    }
}
