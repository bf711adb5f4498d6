//! Per-record and per-field error types

/// A record is missing data the projector needs to derive a display field.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MalformedRecordError {
    /// The nested owner reference is absent or null.
    #[error("Record {record_id:?} has no '{field}' reference")]
    MissingOwner {
        record_id: Option<String>,
        field: String,
    },

    /// The owner reference exists but carries no display name.
    #[error("Owner of record {record_id:?} has no '{field}'")]
    MissingOwnerName {
        record_id: Option<String>,
        field: String,
    },

    /// The record has no identifier to build a link from.
    #[error("Record has no id")]
    MissingId,
}

/// A field value cannot be tested for substring containment.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Field '{field}' holds a {kind} value, which cannot be searched")]
pub struct FilterEvaluationError {
    /// The field that was tested.
    pub field: String,
    /// The value's type name.
    pub kind: &'static str,
}

impl FilterEvaluationError {
    /// Creates a new filter evaluation error.
    pub fn new(field: impl Into<String>, kind: &'static str) -> Self {
        Self {
            field: field.into(),
            kind,
        }
    }
}
