//! Table controller configuration

use std::time::Duration;

use super::Direction;

/// Configuration for a [`TableController`](super::TableController).
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use activity_lib::table::TableConfig;
///
/// let config = TableConfig::default()
///     .with_scope_id("001A000001")
///     .with_fetch_timeout(Duration::from_secs(10));
/// ```
#[derive(Debug, Clone)]
pub struct TableConfig {
    /// Scope passed to the record source (the id of the record the table is shown on).
    ///
    /// Default: empty
    pub scope_id: String,

    /// Upper bound for one load. Expiry fails the load.
    ///
    /// Default: 30 seconds
    pub fetch_timeout: Duration,

    /// Direction used when a sort is requested without one.
    ///
    /// Default: ascending
    pub default_direction: Direction,

    /// Title of the notification raised when a load fails.
    ///
    /// Default: "Failed to load activities"
    pub error_title: String,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            scope_id: String::new(),
            fetch_timeout: Duration::from_secs(30),
            default_direction: Direction::Asc,
            error_title: "Failed to load activities".to_string(),
        }
    }
}

impl TableConfig {
    /// Creates a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the scope id.
    pub fn with_scope_id(mut self, scope_id: impl Into<String>) -> Self {
        self.scope_id = scope_id.into();
        self
    }

    /// Sets the fetch timeout.
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// Sets the default sort direction.
    pub fn with_default_direction(mut self, direction: Direction) -> Self {
        self.default_direction = direction;
        self
    }

    /// Sets the failure notification title.
    pub fn with_error_title(mut self, title: impl Into<String>) -> Self {
        self.error_title = title.into();
        self
    }
}
