//! Tracing/logging setup shared by binaries and tests.

/// Subscriber setup (filters, output format).
pub mod tracing;

pub use crate::tracing::LogFormat;

/// Initialize process-wide logging with the format from `PAYDESK_LOG_FORMAT`.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    crate::tracing::init(LogFormat::from_env());
}

/// Initialize process-wide logging with an explicit format.
pub fn init_with(format: LogFormat) {
    crate::tracing::init(format);
}
