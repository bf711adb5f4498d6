//! Record to row projection

use crate::error::MalformedRecordError;
use crate::model::Record;
use crate::model::Row;
use crate::model::Value;

/// Shapes raw records into display rows.
///
/// Derives `OwnerName` from the nested owner reference (`Owner.Name` by
/// default) and `LinkUrl` as `/{id}`. Both depend only on the record being
/// projected.
///
/// # Example
///
/// ```
/// use activity_lib::model::Record;
/// use activity_lib::table::RowProjector;
///
/// let record = Record::with_id("Event", "a1")
///     .set("Subject", "S")
///     .set("Owner", Record::new("User").set("Name", "Alice"));
///
/// let row = RowProjector::new().project(record);
/// assert_eq!(row.link_url(), Some("/a1"));
/// assert_eq!(row.owner_name(), Some("Alice"));
/// ```
#[derive(Debug, Clone)]
pub struct RowProjector {
    owner_field: String,
    owner_name_field: String,
}

impl Default for RowProjector {
    fn default() -> Self {
        Self {
            owner_field: "Owner".to_string(),
            owner_name_field: "Name".to_string(),
        }
    }
}

impl RowProjector {
    /// Creates a projector reading `Owner.Name`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the field holding the nested owner reference.
    pub fn with_owner_field(mut self, field: impl Into<String>) -> Self {
        self.owner_field = field.into();
        self
    }

    /// Sets the field of the owner reference holding its display name.
    pub fn with_owner_name_field(mut self, field: impl Into<String>) -> Self {
        self.owner_name_field = field.into();
        self
    }

    /// Projects a record, leaving derived fields `Null` when they cannot be computed.
    pub fn project(&self, record: Record) -> Row {
        let owner_name = match self.owner_name(&record) {
            Ok(name) => Value::String(name.to_string()),
            Err(e) => {
                log::warn!("{}; OwnerName left empty", e);
                Value::Null
            }
        };
        let link_url = Self::link_url(&record).map_or(Value::Null, Value::String);

        Row::new(record, owner_name, link_url)
    }

    /// Projects a record, failing if the owner name or id is missing.
    pub fn try_project(&self, record: Record) -> Result<Row, MalformedRecordError> {
        let owner_name = self.owner_name(&record)?.to_string();
        let link_url = Self::link_url(&record).ok_or(MalformedRecordError::MissingId)?;

        Ok(Row::new(record, Value::String(owner_name), Value::String(link_url)))
    }

    /// Projects a batch of records, keeping their order.
    pub fn project_all(&self, records: Vec<Record>) -> Vec<Row> {
        records.into_iter().map(|r| self.project(r)).collect()
    }

    fn owner_name<'a>(&self, record: &'a Record) -> Result<&'a str, MalformedRecordError> {
        let owner = record
            .get_record(&self.owner_field)
            .ok()
            .flatten()
            .ok_or_else(|| MalformedRecordError::MissingOwner {
                record_id: record.id().map(str::to_string),
                field: self.owner_field.clone(),
            })?;

        owner
            .get_string(&self.owner_name_field)
            .ok()
            .flatten()
            .ok_or_else(|| MalformedRecordError::MissingOwnerName {
                record_id: record.id().map(str::to_string),
                field: self.owner_name_field.clone(),
            })
    }

    fn link_url(record: &Record) -> Option<String> {
        record.id().map(|id| format!("/{}", id))
    }
}
