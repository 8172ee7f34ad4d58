use std::fmt;

/// Closed set of log severities understood by every sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
    /// Bookkeeping lines (loading, refresh notices).
    System,
    /// Lines emitted by the swap orchestrator.
    Swap,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Success => "success",
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::System => "system",
            Severity::Swap => "swap",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Append-only log consumer.
///
/// Lines are never dropped or rewritten; only an explicit [`LogSink::clear`]
/// empties the sequence.
pub trait LogSink: Send + Sync {
    fn emit(&self, severity: Severity, text: &str);

    fn clear(&self);
}

/// Sink that only forwards to `tracing`. Used where no dashboard exists.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn emit(&self, severity: Severity, text: &str) {
        crate::utils::logger::trace_line(severity, text);
    }

    fn clear(&self) {}
}
