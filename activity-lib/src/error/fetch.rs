//! Record fetch error types

use std::time::Duration;

/// Errors that can occur while loading records from a
/// [`RecordSource`](crate::source::RecordSource).
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// HTTP error response without a structured backend error body.
    #[error("HTTP {status}: {message}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Response body or reason phrase.
        message: String,
    },

    /// The backend rejected the request with a structured error.
    #[error("{message}")]
    Backend {
        /// Human-readable error message.
        message: String,
        /// Diagnostic trace (server stack trace or error code), if any.
        trace: Option<String>,
    },

    /// Network error during the fetch.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The fetch did not complete in time.
    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    /// Invalid URL provided.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Failed to parse the response.
    #[error("Response parse error: {message}")]
    Parse {
        /// Description of the parse error.
        message: String,
        /// Raw response body, if available.
        body: Option<String>,
    },
}

impl FetchError {
    /// Creates a backend error without a trace.
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
            trace: None,
        }
    }

    /// Creates a backend error with a diagnostic trace.
    pub fn backend_with_trace(message: impl Into<String>, trace: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
            trace: Some(trace.into()),
        }
    }

    /// Creates a new HTTP error.
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            message: message.into(),
        }
    }

    /// Creates a new parse error with the raw response body.
    pub fn parse_with_body(message: impl Into<String>, body: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
            body: Some(body.into()),
        }
    }

    /// Returns the human-readable message.
    pub fn message(&self) -> String {
        match self {
            Self::Backend { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    /// Returns the backend's diagnostic trace, if the error carries one.
    pub fn trace(&self) -> Option<&str> {
        match self {
            Self::Backend { trace, .. } => trace.as_deref(),
            _ => None,
        }
    }

    /// Returns the raw body of a response that failed to parse.
    ///
    /// The body is kept for logging and never shown in [`detail`](Self::detail).
    pub fn body(&self) -> Option<&str> {
        match self {
            Self::Parse { body, .. } => body.as_deref(),
            _ => None,
        }
    }

    /// Returns the HTTP status code if this is an HTTP error.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            Self::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Returns the message and trace joined the way they are shown to the user.
    pub fn detail(&self) -> String {
        match self.trace() {
            Some(trace) => format!("{}\n{}", self.message(), trace),
            None => self.message(),
        }
    }
}
