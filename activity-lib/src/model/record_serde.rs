//! Custom serialization for Record to handle the backend JSON format.
//!
//! ## Read Format (Deserialization)
//!
//! Records arrive as flat JSON objects:
//! - `"attributes": {"type": "Event", "url": "..."}` carries the object type
//! - `"Id": "00U..."` is the record identifier
//! - Lookups are nested objects: `"Owner": {"attributes": {...}, "Name": "Alice"}`
//! - Child relationships: `"Attendees": {"totalSize": 1, "done": true, "records": [...]}`
//! - Timestamps and dates are plain strings
//!   (`"StartDateTime": "2024-02-01T09:00:00.000+0000"`) and are kept verbatim;
//!   [`Value::as_datetime`] reads them when a column needs a timestamp
//!
//! ## Write Format (Serialization)
//!
//! Serializes back to a flat object of field values, with nested records as
//! nested objects. `attributes` is not written.

use std::fmt;

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::Serializer;
use serde::de::MapAccess;
use serde::de::Visitor;
use serde::ser::SerializeMap;

use super::Record;
use super::Value;

// =============================================================================
// Serialization
// =============================================================================

impl Serialize for Record {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (key, value) in &self.fields {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

// =============================================================================
// Deserialization
// =============================================================================

impl<'de> Deserialize<'de> for Record {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(RecordVisitor)
    }
}

struct RecordVisitor;

impl<'de> Visitor<'de> for RecordVisitor {
    type Value = Record;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a map representing an activity record")
    }

    fn visit_map<M>(self, mut map: M) -> Result<Record, M::Error>
    where
        M: MapAccess<'de>,
    {
        let mut object = serde_json::Map::new();
        while let Some(key) = map.next_key::<String>()? {
            let value: serde_json::Value = map.next_value()?;
            object.insert(key, value);
        }
        Ok(record_from_object(object))
    }
}

/// Builds a record from a decoded JSON object.
fn record_from_object(object: serde_json::Map<String, serde_json::Value>) -> Record {
    let mut record = Record::new("");

    for (key, json_value) in object {
        if key == "attributes" {
            if let Some(object_type) = json_value.get("type").and_then(|t| t.as_str()) {
                record.object_type = object_type.to_string();
            }
            continue;
        }

        if key == "Id"
            && let serde_json::Value::String(id) = &json_value
        {
            record.id = Some(id.clone());
            record.fields.insert(key, Value::String(id.clone()));
            continue;
        }

        record.fields.insert(key, json_value_to_value(json_value));
    }

    record
}

/// Converts a serde_json::Value to our Value enum.
fn json_value_to_value(json: serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                if i >= i32::MIN as i64 && i <= i32::MAX as i64 {
                    Value::Int(i as i32)
                } else {
                    Value::Long(i)
                }
            } else if let Some(f) = n.as_f64() {
                Value::Float(f)
            } else {
                Value::Json(serde_json::Value::Number(n))
            }
        }
        serde_json::Value::String(s) => Value::String(s),
        serde_json::Value::Object(obj) => {
            // Child relationship query results wrap their rows in "records"
            if is_relationship_result(&obj) {
                match obj.get("records") {
                    Some(serde_json::Value::Array(items)) => Value::Records(
                        items
                            .iter()
                            .filter_map(|item| item.as_object().cloned())
                            .map(record_from_object)
                            .collect(),
                    ),
                    _ => Value::Json(serde_json::Value::Object(obj)),
                }
            } else {
                Value::Record(Box::new(record_from_object(obj)))
            }
        }
        serde_json::Value::Array(arr) => Value::Json(serde_json::Value::Array(arr)),
    }
}

fn is_relationship_result(obj: &serde_json::Map<String, serde_json::Value>) -> bool {
    obj.contains_key("records") && obj.contains_key("totalSize")
}
