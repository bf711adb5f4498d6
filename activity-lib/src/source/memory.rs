//! In-memory record source

use std::sync::Mutex;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use async_trait::async_trait;

use super::RecordSource;
use crate::error::FetchError;
use crate::model::Record;

#[derive(Debug, Clone)]
enum Outcome {
    Records(Vec<Record>),
    Failure {
        message: String,
        trace: Option<String>,
    },
}

/// A record source that answers from memory.
///
/// Counts its fetches and remembers the last scope it was asked for, which
/// makes it useful for hosts without a backend and for tests.
///
/// # Example
///
/// ```
/// use activity_lib::model::Record;
/// use activity_lib::source::StaticRecordSource;
///
/// let source = StaticRecordSource::new(vec![Record::with_id("Event", "a1")]);
/// assert_eq!(source.fetch_count(), 0);
/// ```
#[derive(Debug)]
pub struct StaticRecordSource {
    outcome: Mutex<Outcome>,
    fetches: AtomicUsize,
    last_scope: Mutex<Option<String>>,
}

impl StaticRecordSource {
    /// Creates a source that returns `records`.
    pub fn new(records: Vec<Record>) -> Self {
        Self::with_outcome(Outcome::Records(records))
    }

    /// Creates a source whose fetches fail with a backend error.
    pub fn failing(message: impl Into<String>, trace: Option<String>) -> Self {
        Self::with_outcome(Outcome::Failure {
            message: message.into(),
            trace,
        })
    }

    fn with_outcome(outcome: Outcome) -> Self {
        Self {
            outcome: Mutex::new(outcome),
            fetches: AtomicUsize::new(0),
            last_scope: Mutex::new(None),
        }
    }

    /// Replaces the records served by later fetches.
    pub fn set_records(&self, records: Vec<Record>) {
        if let Ok(mut outcome) = self.outcome.lock() {
            *outcome = Outcome::Records(records);
        }
    }

    /// Makes later fetches fail.
    pub fn set_failure(&self, message: impl Into<String>, trace: Option<String>) {
        if let Ok(mut outcome) = self.outcome.lock() {
            *outcome = Outcome::Failure {
                message: message.into(),
                trace,
            };
        }
    }

    /// Returns how many fetches were issued.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    /// Returns the scope id of the last fetch.
    pub fn last_scope(&self) -> Option<String> {
        self.last_scope.lock().ok().and_then(|s| s.clone())
    }
}

#[async_trait]
impl RecordSource for StaticRecordSource {
    async fn fetch(&self, scope_id: &str) -> Result<Vec<Record>, FetchError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_scope.lock() {
            *last = Some(scope_id.to_string());
        }

        let outcome = self
            .outcome
            .lock()
            .map(|o| o.clone())
            .map_err(|_| FetchError::backend("record source state poisoned"))?;

        match outcome {
            Outcome::Records(records) => Ok(records),
            Outcome::Failure {
                message,
                trace: Some(trace),
            } => Err(FetchError::backend_with_trace(message, trace)),
            Outcome::Failure {
                message,
                trace: None,
            } => Err(FetchError::backend(message)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_serves_records_and_counts() {
        let source = StaticRecordSource::new(vec![Record::with_id("Event", "a1")]);

        let records = source.fetch("001").await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(source.fetch_count(), 1);
        assert_eq!(source.last_scope().as_deref(), Some("001"));
    }

    #[tokio::test]
    async fn test_failure_carries_trace() {
        let source = StaticRecordSource::failing("x", Some("y".to_string()));

        let err = source.fetch("001").await.unwrap_err();
        assert_eq!(err.message(), "x");
        assert_eq!(err.trace(), Some("y"));
    }

    #[tokio::test]
    async fn test_outcome_can_change() {
        let source = StaticRecordSource::failing("down", None);
        assert!(source.fetch("s").await.is_err());

        source.set_records(vec![]);
        assert!(source.fetch("s").await.unwrap().is_empty());

        source.set_failure("down again", None);
        assert!(source.fetch("s").await.is_err());
        assert_eq!(source.fetch_count(), 3);
    }
}
