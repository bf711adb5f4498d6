//! Column descriptors handed to the rendering surface

use crate::model::FieldKey;
use crate::model::Row;
use crate::model::Value;

/// How a column's values are displayed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueKind {
    /// Plain text.
    Text,
    /// A link whose target is the column field and whose label is read from `label_field`.
    Url {
        /// Field shown as the link text.
        label_field: FieldKey,
    },
    /// A timestamp shown as `YYYY/M/D HH:MM` (24-hour clock).
    DateTime,
}

/// Static description of one table column.
///
/// Column specs are fixed when the controller is built; they never derive from data.
///
/// # Example
///
/// ```
/// use activity_lib::model::FieldKey;
/// use activity_lib::table::{ColumnSpec, ValueKind};
///
/// let column = ColumnSpec::new(FieldKey::custom("Location"), "Location", ValueKind::Text)
///     .sortable(false);
/// assert!(!column.sortable);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    /// Field the column reads (and sorts by).
    pub key: FieldKey,
    /// Header label.
    pub label: String,
    /// Display kind.
    pub kind: ValueKind,
    /// Whether the rendering surface may offer sorting on this column.
    pub sortable: bool,
}

impl ColumnSpec {
    /// Creates a sortable column.
    pub fn new(key: FieldKey, label: impl Into<String>, kind: ValueKind) -> Self {
        Self {
            key,
            label: label.into(),
            kind,
            sortable: true,
        }
    }

    /// Sets whether the column is sortable.
    pub fn sortable(mut self, sortable: bool) -> Self {
        self.sortable = sortable;
        self
    }

    /// Renders the cell text for a row.
    ///
    /// Url columns render their label field; missing values render empty.
    /// DateTime columns parse wire timestamps and show them in UTC. Every
    /// other column shows strings exactly as delivered.
    pub fn cell_text(&self, row: &Row) -> String {
        match &self.kind {
            ValueKind::Url { label_field } => row.get(label_field).map(display_text).unwrap_or_default(),
            ValueKind::DateTime => match row.get(&self.key) {
                Some(value) => match value.as_datetime() {
                    Some(dt) => dt.format("%Y/%-m/%-d %H:%M").to_string(),
                    None => display_text(value),
                },
                None => String::new(),
            },
            ValueKind::Text => row.get(&self.key).map(display_text).unwrap_or_default(),
        }
    }

    /// Returns the link target for a Url column, if the row has one.
    pub fn link_target<'a>(&self, row: &'a Row) -> Option<&'a str> {
        match self.kind {
            ValueKind::Url { .. } => row.get(&self.key).and_then(Value::as_str),
            _ => None,
        }
    }
}

/// The activity list columns: subject link, start, end, last modified, owner.
pub fn activity_columns() -> Vec<ColumnSpec> {
    vec![
        ColumnSpec::new(
            FieldKey::LinkUrl,
            "Subject",
            ValueKind::Url {
                label_field: FieldKey::Subject,
            },
        ),
        ColumnSpec::new(FieldKey::StartDateTime, "Start", ValueKind::DateTime),
        ColumnSpec::new(FieldKey::EndDateTime, "End", ValueKind::DateTime),
        ColumnSpec::new(FieldKey::LastModifiedDate, "Last Modified", ValueKind::DateTime),
        ColumnSpec::new(FieldKey::OwnerName, "Owner", ValueKind::Text),
    ]
}

fn display_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Int(n) => n.to_string(),
        Value::Long(n) => n.to_string(),
        Value::Float(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Date(d) => d.format("%Y/%-m/%-d").to_string(),
        Value::DateTime(dt) => dt.format("%Y/%-m/%-d %H:%M").to_string(),
        Value::Record(r) => r.id().unwrap_or_default().to_string(),
        Value::Records(r) => format!("{} records", r.len()),
        Value::Json(j) => j.to_string(),
    }
}
