//! Tracing/logging setup shared by the binaries.

pub mod tracing;

pub use tracing::{LogFormat, LogFormatError};

/// Initialize process-wide tracing in the given output format.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init(format: LogFormat) {
    tracing::init(format);
}
