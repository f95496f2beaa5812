//! Tracing and logging setup shared by the billing binaries.

/// Initialize process-wide tracing with the format chosen by
/// `BILLFORGE_LOG_FORMAT` (JSON unless it says `pretty`).
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init(tracing::LogFormat::from_env());
}

/// Tracing configuration (filters, formats, spans).
pub mod tracing;

pub use self::tracing::{LogFormat, UnknownLogFormat, session_span};
