//! Tracing and logging setup shared by tests, benches and embedding binaries.
//!
//! Library crates only emit `tracing` events; installing a subscriber is the
//! caller's job, done through here.

/// Initialize process-wide observability (tracing/logging).
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init();
}

/// Tracing configuration (filters, formats).
pub mod tracing;

pub use self::tracing::{LogFormat, ObservabilityConfig, ObservabilityError, init_with};
