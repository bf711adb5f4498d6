//! Substring filtering over rows

use crate::error::FilterEvaluationError;
use crate::model::FieldKey;
use crate::model::Row;
use crate::model::Value;

/// Which fields a filter query is tested against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterPolicy {
    /// Match against a single field.
    Field(FieldKey),
    /// Match if any field of the row matches.
    AnyField,
}

impl Default for FilterPolicy {
    fn default() -> Self {
        FilterPolicy::Field(FieldKey::Subject)
    }
}

/// Whether containment tests distinguish case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseSensitivity {
    Sensitive,
    Insensitive,
}

/// Filters rows by substring containment.
///
/// `FieldFilter` compares case-sensitively; `AnyField` ignores case. Either
/// default can be overridden with [`with_case_sensitivity`](Self::with_case_sensitivity).
///
/// # Example
///
/// ```
/// use activity_lib::model::{FieldKey, Record};
/// use activity_lib::table::{FilterEngine, RowProjector};
///
/// let rows = RowProjector::new().project_all(vec![
///     Record::with_id("Event", "1").set("Subject", "Kickoff"),
///     Record::with_id("Event", "2").set("Subject", "Review"),
/// ]);
///
/// let engine = FilterEngine::field(FieldKey::Subject);
/// assert_eq!(engine.filter(&rows, "Kick").len(), 1);
/// assert_eq!(engine.filter(&rows, "").len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct FilterEngine {
    policy: FilterPolicy,
    case: CaseSensitivity,
}

impl Default for FilterEngine {
    fn default() -> Self {
        Self::new(FilterPolicy::default())
    }
}

impl FilterEngine {
    /// Creates an engine for the given policy with its default case sensitivity.
    pub fn new(policy: FilterPolicy) -> Self {
        let case = match policy {
            FilterPolicy::Field(_) => CaseSensitivity::Sensitive,
            FilterPolicy::AnyField => CaseSensitivity::Insensitive,
        };
        Self { policy, case }
    }

    /// Creates a single-field engine.
    pub fn field(field: FieldKey) -> Self {
        Self::new(FilterPolicy::Field(field))
    }

    /// Creates an any-field engine.
    pub fn any_field() -> Self {
        Self::new(FilterPolicy::AnyField)
    }

    /// Overrides case sensitivity.
    pub fn with_case_sensitivity(mut self, case: CaseSensitivity) -> Self {
        self.case = case;
        self
    }

    /// Returns the policy.
    pub fn policy(&self) -> &FilterPolicy {
        &self.policy
    }

    /// Returns the rows matching `query`, in their original order.
    ///
    /// An empty query matches every row. The input is left untouched.
    pub fn filter(&self, rows: &[Row], query: &str) -> Vec<Row> {
        if query.is_empty() {
            return rows.to_vec();
        }
        let needle = self.normalize(query);
        rows.iter()
            .filter(|row| self.matches(row, &needle))
            .cloned()
            .collect()
    }

    fn matches(&self, row: &Row, needle: &str) -> bool {
        match &self.policy {
            FilterPolicy::Field(field) => row
                .get(field)
                .is_some_and(|value| self.test_field(field.name(), value, needle)),
            FilterPolicy::AnyField => row
                .values()
                .any(|(name, value)| self.test_field(name, value, needle)),
        }
    }

    fn test_field(&self, name: &str, value: &Value, needle: &str) -> bool {
        match self.contains(name, value, needle) {
            Ok(found) => found,
            Err(e) => {
                log::trace!("{}", e);
                false
            }
        }
    }

    fn contains(&self, name: &str, value: &Value, needle: &str) -> Result<bool, FilterEvaluationError> {
        let text = value
            .searchable_text()
            .ok_or_else(|| FilterEvaluationError::new(name, value.type_name()))?;
        Ok(self.normalize(&text).contains(needle))
    }

    fn normalize(&self, s: &str) -> String {
        match self.case {
            CaseSensitivity::Sensitive => s.to_string(),
            CaseSensitivity::Insensitive => s.to_lowercase(),
        }
    }
}
