//! Dynamic activity record

use std::collections::HashMap;

use chrono::DateTime;
use chrono::Utc;

use super::Value;
use crate::error::FieldError;

/// One activity as delivered by a [`RecordSource`](crate::source::RecordSource).
///
/// Fields are keyed by their backend names. Lookup relationships such as
/// `Owner` arrive as nested records.
///
/// # Example
///
/// ```
/// use activity_lib::model::Record;
///
/// let owner = Record::new("User").set("Name", "Alice");
/// let record = Record::with_id("Event", "a1")
///     .set("Subject", "Kickoff")
///     .set("Owner", owner);
///
/// assert_eq!(record.get_string("Subject").unwrap(), Some("Kickoff"));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    pub(crate) object_type: String,
    pub(crate) id: Option<String>,
    pub(crate) fields: HashMap<String, Value>,
}

impl Record {
    /// Creates an empty record of the given object type.
    pub fn new(object_type: impl Into<String>) -> Self {
        Self {
            object_type: object_type.into(),
            ..Self::default()
        }
    }

    /// Creates a record carrying `id`, both as metadata and as the `Id` field.
    pub fn with_id(object_type: impl Into<String>, id: impl Into<String>) -> Self {
        let id = id.into();
        let mut record = Self::new(object_type).set("Id", id.as_str());
        record.id = Some(id);
        record
    }

    pub fn object_type(&self) -> &str {
        &self.object_type
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn fields(&self) -> &HashMap<String, Value> {
        &self.fields
    }

    /// Sets a field value, replacing any previous one.
    pub fn set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    /// Reads a text field.
    ///
    /// Typed getters fail when the field is absent or holds another kind of
    /// value, and yield `Ok(None)` for an explicit null.
    pub fn get_string(&self, field: &str) -> Result<Option<&str>, FieldError> {
        self.typed(field, "string", |value| match value {
            Value::String(s) => Some(s.as_str()),
            _ => None,
        })
    }

    /// Reads a timestamp field.
    ///
    /// Backend timestamps arrive as text, so a string that parses as a
    /// timestamp or a calendar date is accepted here.
    pub fn get_datetime(&self, field: &str) -> Result<Option<DateTime<Utc>>, FieldError> {
        self.typed(field, "datetime", Value::as_datetime)
    }

    /// Reads a lookup relationship such as `Owner`.
    pub fn get_record(&self, field: &str) -> Result<Option<&Record>, FieldError> {
        self.typed(field, "record", |value| match value {
            Value::Record(r) => Some(r.as_ref()),
            _ => None,
        })
    }

    /// Reads a child relationship (`{"records": [...]}` on the wire).
    pub fn get_records(&self, field: &str) -> Result<Option<&[Record]>, FieldError> {
        self.typed(field, "records", |value| match value {
            Value::Records(r) => Some(r.as_slice()),
            _ => None,
        })
    }

    fn typed<'a, T>(
        &'a self,
        field: &str,
        expected: &'static str,
        read: impl FnOnce(&'a Value) -> Option<T>,
    ) -> Result<Option<T>, FieldError> {
        match self.fields.get(field) {
            None => Err(FieldError::missing(field)),
            Some(Value::Null) => Ok(None),
            Some(value) => match read(value) {
                Some(v) => Ok(Some(v)),
                None => Err(FieldError::type_mismatch(field, expected, value.type_name())),
            },
        }
    }
}
