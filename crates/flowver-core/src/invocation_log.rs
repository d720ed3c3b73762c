//! Host-facing log sink scoped to one invocation.
//!
//! The host hands a [`LogSink`] to [`InvocationScope::acquire`]. Pipeline
//! code only sees the borrowed [`InvocationLog`]. Dropping or releasing the
//! scope resets the sink exactly once, whichever path the invocation took.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// Severity understood by the host build system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// Destination for messages produced during an invocation.
pub trait LogSink: Send + Sync {
    fn log(&self, severity: Severity, message: &str);

    /// A line addressed to the CI server (service message, workflow command).
    fn service_message(&self, line: &str) {
        self.log(Severity::Info, line);
    }

    /// Called once when the invocation ends.
    fn reset(&self) {}
}

/// Forwards everything to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn log(&self, severity: Severity, message: &str) {
        match severity {
            Severity::Info => tracing::info!("{message}"),
            Severity::Warning => tracing::warn!("{message}"),
            Severity::Error => tracing::error!("{message}"),
        }
    }
}

/// One recorded message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub severity: Severity,
    pub message: String,
}

/// In-memory sink for tests and embedding hosts.
#[derive(Debug, Default)]
pub struct MemorySink {
    entries: Mutex<Vec<LogEntry>>,
    service_lines: Mutex<Vec<String>>,
    resets: AtomicUsize,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn messages(&self, severity: Severity) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|e| e.severity == severity)
            .map(|e| e.message)
            .collect()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.messages(Severity::Warning)
    }

    pub fn errors(&self) -> Vec<String> {
        self.messages(Severity::Error)
    }

    pub fn service_lines(&self) -> Vec<String> {
        self.service_lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn reset_count(&self) -> usize {
        self.resets.load(Ordering::SeqCst)
    }
}

impl LogSink for MemorySink {
    fn log(&self, severity: Severity, message: &str) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(LogEntry {
                severity,
                message: message.to_string(),
            });
    }

    fn service_message(&self, line: &str) {
        self.service_lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(line.to_string());
    }

    fn reset(&self) {
        self.resets.fetch_add(1, Ordering::SeqCst);
    }
}

impl<T: LogSink + ?Sized> LogSink for Arc<T> {
    fn log(&self, severity: Severity, message: &str) {
        (**self).log(severity, message)
    }

    fn service_message(&self, line: &str) {
        (**self).service_message(line)
    }

    fn reset(&self) {
        (**self).reset()
    }
}

/// Logging handle threaded through one invocation.
pub struct InvocationLog {
    sink: Box<dyn LogSink>,
}

impl InvocationLog {
    pub fn info(&self, message: impl AsRef<str>) {
        self.sink.log(Severity::Info, message.as_ref());
    }

    pub fn warn(&self, message: impl AsRef<str>) {
        self.sink.log(Severity::Warning, message.as_ref());
    }

    pub fn error(&self, message: impl AsRef<str>) {
        self.sink.log(Severity::Error, message.as_ref());
    }

    pub fn service_message(&self, line: impl AsRef<str>) {
        self.sink.service_message(line.as_ref());
    }
}

/// Owns the sink for the lifetime of one invocation.
pub struct InvocationScope {
    log: InvocationLog,
    released: bool,
}

impl InvocationScope {
    /// Wire `sink` as the active sink for this invocation.
    pub fn acquire(sink: impl LogSink + 'static) -> Self {
        Self {
            log: InvocationLog {
                sink: Box::new(sink),
            },
            released: false,
        }
    }

    pub fn log(&self) -> &InvocationLog {
        &self.log
    }

    /// End the invocation and reset the sink.
    pub fn release(mut self) {
        self.reset_once();
    }

    fn reset_once(&mut self) {
        if !self.released {
            self.released = true;
            self.log.sink.reset();
        }
    }
}

impl Drop for InvocationScope {
    fn drop(&mut self) {
        self.reset_once();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn release_resets_exactly_once() {
        let sink = Arc::new(MemorySink::new());
        let scope = InvocationScope::acquire(sink.clone());
        scope.log().info("hello");
        scope.release();
        assert_eq!(sink.reset_count(), 1);
        assert_eq!(sink.messages(Severity::Info), vec!["hello"]);
    }

    #[test]
    fn drop_resets_exactly_once() {
        let sink = Arc::new(MemorySink::new());
        {
            let scope = InvocationScope::acquire(sink.clone());
            scope.log().warn("careful");
        }
        assert_eq!(sink.reset_count(), 1);
        assert_eq!(sink.warnings(), vec!["careful"]);
    }

    #[test]
    fn reset_on_panic_path() {
        let sink = Arc::new(MemorySink::new());
        let captured = sink.clone();
        let result = std::panic::catch_unwind(move || {
            let _scope = InvocationScope::acquire(captured);
            panic!("boom");
        });
        assert!(result.is_err());
        assert_eq!(sink.reset_count(), 1);
    }

    #[test]
    fn sequential_invocations_do_not_share_state() {
        let first = Arc::new(MemorySink::new());
        let second = Arc::new(MemorySink::new());

        let scope = InvocationScope::acquire(first.clone());
        scope.log().error("first failed");
        scope.release();

        let scope = InvocationScope::acquire(second.clone());
        scope.log().info("second ok");
        scope.release();

        assert_eq!(first.entries().len(), 1);
        assert_eq!(second.errors().len(), 0);
        assert_eq!(first.reset_count(), 1);
        assert_eq!(second.reset_count(), 1);
    }

    #[test]
    fn service_lines_are_kept_apart() {
        let sink = Arc::new(MemorySink::new());
        let scope = InvocationScope::acquire(sink.clone());
        scope.log().service_message("##teamcity[buildNumber '1.0.0']");
        drop(scope);
        assert_eq!(sink.service_lines(), vec!["##teamcity[buildNumber '1.0.0']"]);
        assert!(sink.entries().is_empty());
    }
}
