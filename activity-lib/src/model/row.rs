//! Display rows

use super::FieldKey;
use super::Record;
use super::Value;

/// A record shaped for display.
///
/// Holds the source [`Record`] untouched plus the fields the projector derives
/// from it: the owner's display name and the link path to the record. Both are
/// computed from this row's own record only. Build rows with
/// [`RowProjector`](crate::table::RowProjector).
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    record: Record,
    owner_name: Value,
    link_url: Value,
}

impl Row {
    pub(crate) fn new(record: Record, owner_name: Value, link_url: Value) -> Self {
        Self {
            record,
            owner_name,
            link_url,
        }
    }

    /// Returns the source record.
    pub fn record(&self) -> &Record {
        &self.record
    }

    /// Returns the owner display name, if the record carried one.
    pub fn owner_name(&self) -> Option<&str> {
        self.owner_name.as_str()
    }

    /// Returns the link path (`/{id}`), if the record has an id.
    pub fn link_url(&self) -> Option<&str> {
        self.link_url.as_str()
    }

    /// Returns the value of a field.
    ///
    /// Derived fields always resolve (to `Null` when they could not be
    /// computed). Record fields resolve to `None` when the record lacks them.
    pub fn get(&self, field: &FieldKey) -> Option<&Value> {
        match field {
            FieldKey::OwnerName => Some(&self.owner_name),
            FieldKey::LinkUrl => Some(&self.link_url),
            other => self.record.get(other.name()),
        }
    }

    /// Iterates every field of the row, derived fields last.
    pub fn values(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.record
            .fields()
            .iter()
            .map(|(name, value)| (name.as_str(), value))
            .chain([("OwnerName", &self.owner_name), ("LinkUrl", &self.link_url)])
    }
}
