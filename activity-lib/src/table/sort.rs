//! Single-key row sorting

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::DateTime;
use chrono::NaiveDate;
use chrono::NaiveTime;
use chrono::Utc;

use crate::model::FieldKey;
use crate::model::Row;
use crate::model::Value;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    /// Ascending order (A-Z, 0-9, oldest first).
    #[default]
    Asc,
    /// Descending order (Z-A, 9-0, newest first).
    Desc,
}

impl Direction {
    /// Returns the opposite direction.
    pub fn reversed(self) -> Self {
        match self {
            Direction::Asc => Direction::Desc,
            Direction::Desc => Direction::Asc,
        }
    }

    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Direction::Asc => ordering,
            Direction::Desc => ordering.reverse(),
        }
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(Direction::Asc),
            "desc" | "descending" => Ok(Direction::Desc),
            other => Err(format!("unknown sort direction '{}'", other)),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Asc => f.write_str("asc"),
            Direction::Desc => f.write_str("desc"),
        }
    }
}

/// A field value reduced to something with a well-defined order.
///
/// Values of the same kind compare naturally, all numeric widths compare as
/// numbers, and dates compare with timestamps as midnight UTC. Values of
/// different kinds order by kind: missing (absent field or null) first, then
/// booleans, numbers, text, dates/timestamps, and unorderable values last.
#[derive(Debug, Clone, PartialEq)]
pub enum SortValue<'a> {
    Missing,
    Bool(bool),
    Number(f64),
    Text(&'a str),
    Date(NaiveDate),
    DateTime(DateTime<Utc>),
    /// Nested records, collections and raw JSON.
    Unordered,
}

impl<'a> SortValue<'a> {
    /// Reduces an optional field value.
    pub fn of(value: Option<&'a Value>) -> Self {
        match value {
            None | Some(Value::Null) => SortValue::Missing,
            Some(Value::Bool(b)) => SortValue::Bool(*b),
            Some(Value::Int(n)) => SortValue::Number(f64::from(*n)),
            Some(Value::Long(n)) => SortValue::Number(*n as f64),
            Some(Value::Float(n)) => SortValue::Number(*n),
            Some(Value::String(s)) => SortValue::Text(s),
            Some(Value::Date(d)) => SortValue::Date(*d),
            Some(Value::DateTime(dt)) => SortValue::DateTime(*dt),
            Some(Value::Record(_) | Value::Records(_) | Value::Json(_)) => SortValue::Unordered,
        }
    }

    /// Reduces a value read from a timestamp column.
    ///
    /// Timestamps arrive as text, so strings that parse as a timestamp or a
    /// calendar date compare chronologically. Anything else reduces as in
    /// [`SortValue::of`].
    pub fn temporal(value: Option<&'a Value>) -> Self {
        match value {
            Some(Value::String(_)) => value
                .and_then(Value::as_datetime)
                .map_or_else(|| SortValue::of(value), SortValue::DateTime),
            _ => SortValue::of(value),
        }
    }

    /// Three-way comparison: `Greater` iff `self > other`, `Less` iff `other > self`,
    /// otherwise `Equal`. This is a total order, so it is safe to sort with.
    pub fn three_way(&self, other: &Self) -> Ordering {
        use SortValue::*;
        match (self, other) {
            (Bool(a), Bool(b)) => a.cmp(b),
            (Number(a), Number(b)) => a.total_cmp(b),
            (Text(a), Text(b)) => a.cmp(b),
            (Date(a), Date(b)) => a.cmp(b),
            (DateTime(a), DateTime(b)) => a.cmp(b),
            (Date(a), DateTime(b)) => midnight(a).cmp(b),
            (DateTime(a), Date(b)) => a.cmp(&midnight(b)),
            _ => self.rank().cmp(&other.rank()),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            SortValue::Missing => 0,
            SortValue::Bool(_) => 1,
            SortValue::Number(_) => 2,
            SortValue::Text(_) => 3,
            SortValue::Date(_) | SortValue::DateTime(_) => 4,
            SortValue::Unordered => 5,
        }
    }
}

fn midnight(date: &NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// Maps an extracted value before comparison.
pub type Primer = Arc<dyn Fn(&Value) -> Value + Send + Sync>;

/// Sorts rows by one field.
///
/// The sort is stable in both directions: rows that compare equal keep their
/// input order. Built-in timestamp fields, and any field registered with
/// [`SortEngine::with_datetime_field`], compare their text chronologically.
///
/// # Example
///
/// ```
/// use activity_lib::model::{FieldKey, Record};
/// use activity_lib::table::{Direction, RowProjector, SortEngine};
///
/// let rows = RowProjector::new().project_all(vec![
///     Record::with_id("Event", "1").set("Subject", "b"),
///     Record::with_id("Event", "2").set("Subject", "a"),
/// ]);
///
/// let sorted = SortEngine::new().sort(&rows, &FieldKey::Subject, Direction::Asc);
/// assert_eq!(sorted[0].record().id(), Some("2"));
/// ```
#[derive(Clone, Default)]
pub struct SortEngine {
    primer: Option<Primer>,
    datetime_fields: Vec<FieldKey>,
}

impl fmt::Debug for SortEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SortEngine")
            .field("primer", &self.primer.is_some())
            .field("datetime_fields", &self.datetime_fields)
            .finish()
    }
}

impl SortEngine {
    /// Creates an engine comparing raw field values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Maps every extracted value through `primer` before comparing.
    ///
    /// Absent fields reach the primer as [`Value::Null`].
    pub fn with_primer<F>(mut self, primer: F) -> Self
    where
        F: Fn(&Value) -> Value + Send + Sync + 'static,
    {
        self.primer = Some(Arc::new(primer));
        self
    }

    /// Compares `field` as a timestamp.
    pub fn with_datetime_field(mut self, field: FieldKey) -> Self {
        if !self.is_temporal(&field) {
            self.datetime_fields.push(field);
        }
        self
    }

    fn is_temporal(&self, field: &FieldKey) -> bool {
        field.is_datetime() || self.datetime_fields.contains(field)
    }

    /// Returns a sorted copy of `rows`. The input is left untouched.
    pub fn sort(&self, rows: &[Row], field: &FieldKey, direction: Direction) -> Vec<Row> {
        let mut sorted = rows.to_vec();
        sorted.sort_by(|a, b| self.compare(a, b, field, direction));
        sorted
    }

    /// Compares two rows on `field`.
    pub fn compare(&self, a: &Row, b: &Row, field: &FieldKey, direction: Direction) -> Ordering {
        let temporal = self.is_temporal(field);
        let ordering = match &self.primer {
            Some(primer) => {
                let a = primer(a.get(field).unwrap_or(&Value::Null));
                let b = primer(b.get(field).unwrap_or(&Value::Null));
                reduce(temporal, Some(&a)).three_way(&reduce(temporal, Some(&b)))
            }
            None => reduce(temporal, a.get(field)).three_way(&reduce(temporal, b.get(field))),
        };
        direction.apply(ordering)
    }
}

fn reduce(temporal: bool, value: Option<&Value>) -> SortValue<'_> {
    if temporal {
        SortValue::temporal(value)
    } else {
        SortValue::of(value)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::model::Record;
    use crate::table::RowProjector;

    fn rows_with(field: &str, values: Vec<Value>) -> Vec<Row> {
        let records = values
            .into_iter()
            .enumerate()
            .map(|(i, v)| Record::with_id("Event", i.to_string()).set(field, v))
            .collect();
        RowProjector::new().project_all(records)
    }

    fn ids(rows: &[Row]) -> Vec<&str> {
        rows.iter().map(|r| r.record().id().unwrap()).collect()
    }

    fn day(y: i32, m: u32, d: u32) -> Value {
        Value::DateTime(Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap())
    }

    #[test]
    fn test_sort_datetimes_ascending() {
        let rows = rows_with(
            "StartDateTime",
            vec![day(2024, 2, 1), day(2024, 1, 1), day(2024, 3, 1)],
        );
        let sorted = SortEngine::new().sort(&rows, &FieldKey::StartDateTime, Direction::Asc);

        let starts: Vec<_> = sorted
            .iter()
            .map(|r| r.get(&FieldKey::StartDateTime).cloned().unwrap())
            .collect();
        assert_eq!(starts, [day(2024, 1, 1), day(2024, 2, 1), day(2024, 3, 1)]);
    }

    #[test]
    fn test_descending_reverses_ascending_without_ties() {
        let rows = rows_with("Subject", vec!["c".into(), "a".into(), "d".into(), "b".into()]);
        let engine = SortEngine::new();

        let asc = engine.sort(&rows, &FieldKey::Subject, Direction::Asc);
        let desc = engine.sort(&asc, &FieldKey::Subject, Direction::Desc);

        let mut reversed = asc.clone();
        reversed.reverse();
        assert_eq!(desc, reversed);
    }

    #[test]
    fn test_sort_does_not_mutate_input() {
        let rows = rows_with("Subject", vec!["b".into(), "a".into()]);
        let before = rows.clone();
        let _ = SortEngine::new().sort(&rows, &FieldKey::Subject, Direction::Asc);
        assert_eq!(rows, before);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let rows = rows_with("Subject", vec!["x".into(), "a".into(), "x".into(), "x".into()]);
        let engine = SortEngine::new();

        assert_eq!(ids(&engine.sort(&rows, &FieldKey::Subject, Direction::Asc)), ["1", "0", "2", "3"]);
        assert_eq!(ids(&engine.sort(&rows, &FieldKey::Subject, Direction::Desc)), ["0", "2", "3", "1"]);
    }

    #[test]
    fn test_missing_values_sort_first_ascending() {
        let rows = rows_with("Subject", vec!["b".into(), Value::Null, "a".into()]);
        let absent = RowProjector::new().project(Record::with_id("Event", "m"));
        let all: Vec<Row> = rows.into_iter().chain([absent]).collect();

        let engine = SortEngine::new();
        assert_eq!(ids(&engine.sort(&all, &FieldKey::Subject, Direction::Asc)), ["1", "m", "2", "0"]);
        assert_eq!(ids(&engine.sort(&all, &FieldKey::Subject, Direction::Desc)), ["0", "2", "1", "m"]);
    }

    #[test]
    fn test_numbers_compare_across_widths() {
        let rows = rows_with(
            "Amount",
            vec![Value::Long(5_000_000_000), Value::Int(7), Value::Float(7.5)],
        );
        let sorted = SortEngine::new().sort(&rows, &FieldKey::custom("Amount"), Direction::Asc);
        assert_eq!(ids(&sorted), ["1", "2", "0"]);
    }

    #[test]
    fn test_mixed_kinds_order_by_kind() {
        let text = SortValue::Text("a");
        let number = SortValue::Number(1.0);
        assert_eq!(number.three_way(&text), Ordering::Less);
        assert_eq!(text.three_way(&number), Ordering::Greater);
        assert_eq!(SortValue::Missing.three_way(&SortValue::Bool(false)), Ordering::Less);
        assert_eq!(SortValue::Unordered.three_way(&SortValue::Unordered), Ordering::Equal);
    }

    #[test]
    fn test_dates_compare_with_timestamps() {
        let date = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        let morning = Utc.with_ymd_and_hms(2024, 2, 1, 9, 0, 0).unwrap();
        let midnight = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();

        assert_eq!(SortValue::Date(date).three_way(&SortValue::DateTime(morning)), Ordering::Less);
        assert_eq!(SortValue::DateTime(midnight).three_way(&SortValue::Date(date)), Ordering::Equal);
    }

    #[test]
    fn test_nan_sorts_without_panicking() {
        let rows = rows_with(
            "Amount",
            vec![Value::Float(f64::NAN), Value::Float(1.0), Value::Float(-1.0)],
        );
        let sorted = SortEngine::new().sort(&rows, &FieldKey::custom("Amount"), Direction::Asc);
        assert_eq!(ids(&sorted), ["2", "1", "0"]);
    }

    #[test]
    fn test_primer_normalizes_before_compare() {
        let rows = rows_with("Subject", vec!["beta".into(), "Alpha".into(), "Gamma".into()]);
        let plain = SortEngine::new().sort(&rows, &FieldKey::Subject, Direction::Asc);
        assert_eq!(ids(&plain), ["1", "2", "0"]);

        let engine = SortEngine::new().with_primer(|v| match v {
            Value::String(s) => Value::String(s.to_lowercase()),
            other => other.clone(),
        });
        let primed = engine.sort(&rows, &FieldKey::Subject, Direction::Asc);
        assert_eq!(ids(&primed), ["1", "0", "2"]);
    }

    #[test]
    fn test_primer_sees_absent_fields_as_null() {
        let rows = rows_with("Subject", vec!["b".into(), Value::Null, "a".into()]);
        let absent = RowProjector::new().project(Record::with_id("Event", "m"));
        let all: Vec<Row> = rows.into_iter().chain([absent]).collect();

        let engine = SortEngine::new().with_primer(|v| match v {
            Value::Null => Value::from("zzz"),
            other => other.clone(),
        });

        assert_eq!(ids(&engine.sort(&all, &FieldKey::Subject, Direction::Asc)), ["2", "0", "1", "m"]);
        assert_eq!(ids(&engine.sort(&all, &FieldKey::Subject, Direction::Desc)), ["1", "m", "0", "2"]);
    }

    #[test]
    fn test_wire_timestamps_sort_chronologically() {
        let rows = rows_with(
            "StartDateTime",
            vec![
                "2024-02-01T05:00:00.000+0900".into(),
                "2024-01-31T21:00:00.000+0000".into(),
                "2024-01-31".into(),
                Value::Null,
            ],
        );
        let sorted = SortEngine::new().sort(&rows, &FieldKey::StartDateTime, Direction::Asc);
        // 05:00+0900 is 20:00 UTC the day before
        assert_eq!(ids(&sorted), ["3", "2", "0", "1"]);
    }

    #[test]
    fn test_registered_datetime_field_parses_text() {
        let rows = rows_with(
            "ActivityDate",
            vec!["2024-10-02".into(), "2024-9-30".into()],
        );
        let key = FieldKey::custom("ActivityDate");

        let as_text = SortEngine::new().sort(&rows, &key, Direction::Asc);
        assert_eq!(ids(&as_text), ["0", "1"]);

        let as_dates = SortEngine::new()
            .with_datetime_field(key.clone())
            .sort(&rows, &key, Direction::Asc);
        assert_eq!(ids(&as_dates), ["1", "0"]);
    }

    #[test]
    fn test_unparseable_text_in_datetime_field_stays_text() {
        assert_eq!(
            SortValue::temporal(Some(&Value::from("TBD"))),
            SortValue::Text("TBD")
        );
        assert!(matches!(
            SortValue::temporal(Some(&Value::from("2024-02-01T09:00:00Z"))),
            SortValue::DateTime(_)
        ));
    }

    #[test]
    fn test_direction_parse_and_display() {
        assert_eq!("asc".parse::<Direction>().unwrap(), Direction::Asc);
        assert_eq!("DESC".parse::<Direction>().unwrap(), Direction::Desc);
        assert!("up".parse::<Direction>().is_err());
        assert_eq!(Direction::Desc.to_string(), "desc");
        assert_eq!(Direction::Asc.reversed(), Direction::Desc);
    }
}
