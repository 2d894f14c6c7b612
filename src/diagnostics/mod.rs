//! Diagnostic sink for per-file messages.
//!
//! Ingestion reports both informational and error messages through a single
//! injectable capability. Reporting is fire-and-forget: a sink never fails
//! and never panics back into the caller.
//!
//! - [`NoopSink`]: drops everything (the default)
//! - [`TracingSink`]: forwards to `tracing` under the `tagwright::report` target
//! - any `Fn(&str)` closure

/// Receiver of human-readable diagnostics.
pub trait DiagnosticSink {
    fn report(&self, message: &str);
}

/// Sink that discards all messages.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl DiagnosticSink for NoopSink {
    fn report(&self, _message: &str) {}
}

/// Sink that logs every message at info level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&self, message: &str) {
        tracing::info!(target: "tagwright::report", "{}", message);
    }
}

impl<F> DiagnosticSink for F
where
    F: Fn(&str),
{
    fn report(&self, message: &str) {
        self(message)
    }
}
