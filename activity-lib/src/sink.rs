//! Failure notifications

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

/// Notification severity (affects styling on the host side).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Severity {
    #[default]
    Info,
    Success,
    Warning,
    Error,
}

/// A notification raised by the table controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorReport {
    /// Title to display (single line).
    pub title: String,
    /// Body text (can be multi-line).
    pub message: String,
    /// Severity level.
    pub severity: Severity,
}

impl ErrorReport {
    /// Creates an error-level report.
    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            severity: Severity::Error,
        }
    }
}

/// Receives failure reports. Fire-and-forget: the controller never looks at
/// what the sink does with a report.
///
/// Hosts typically forward reports to their toast/notification system.
pub trait ErrorSink: Send + Sync {
    /// Delivers a report.
    fn report(&self, report: ErrorReport);
}

impl<T: ErrorSink + ?Sized> ErrorSink for Arc<T> {
    fn report(&self, report: ErrorReport) {
        (**self).report(report)
    }
}

/// Writes reports to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogErrorSink;

impl ErrorSink for LogErrorSink {
    fn report(&self, report: ErrorReport) {
        let level = match report.severity {
            Severity::Error => log::Level::Error,
            Severity::Warning => log::Level::Warn,
            Severity::Info | Severity::Success => log::Level::Info,
        };
        log::log!(level, "{}: {}", report.title, report.message);
    }
}

/// Keeps every report it receives.
///
/// # Example
///
/// ```
/// use activity_lib::sink::{CollectingErrorSink, ErrorReport, ErrorSink};
///
/// let sink = CollectingErrorSink::new();
/// sink.report(ErrorReport::error("Load failed", "timeout"));
/// assert_eq!(sink.len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct CollectingErrorSink {
    reports: Mutex<Vec<ErrorReport>>,
}

impl CollectingErrorSink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the reports received so far.
    pub fn reports(&self) -> Vec<ErrorReport> {
        self.lock().clone()
    }

    /// Returns the number of reports received.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns `true` if no report was received.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, Vec<ErrorReport>> {
        self.reports.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl ErrorSink for CollectingErrorSink {
    fn report(&self, report: ErrorReport) {
        self.lock().push(report);
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    #[test]
    fn test_reports_survive_poisoned_lock() {
        let sink = Arc::new(CollectingErrorSink::new());
        sink.report(ErrorReport::error("first", "a"));

        let poisoner = Arc::clone(&sink);
        let result = thread::spawn(move || {
            let _guard = poisoner.reports.lock().unwrap();
            panic!("poison the lock");
        })
        .join();
        assert!(result.is_err());
        assert!(sink.reports.is_poisoned());

        sink.report(ErrorReport::error("second", "b"));
        let titles: Vec<_> = sink.reports().into_iter().map(|r| r.title).collect();
        assert_eq!(titles, ["first", "second"]);
        assert_eq!(sink.len(), 2);
    }

    #[test]
    fn test_log_sink_accepts_reports() {
        let sink: Arc<dyn ErrorSink> = Arc::new(LogErrorSink);
        sink.report(ErrorReport::error("Failed to load activities", "timeout"));
    }
}
