//! Field values stored in documents.
//!
//! [`Value`] is an explicit sum type over everything a document field may hold.
//! Point-in-time values carry their own variants ([`Value::Timestamp`] and
//! [`Value::Date`]) so comparison and copying switch on the tag instead of
//! probing the shape of the data. Untyped JSON input is tagged on the way in by
//! [`Value::from_json`].
//!
//! `Clone` on a [`Value`] is a full deep copy: nested arrays and maps are
//! duplicated, and timestamps are plain `Copy` values that keep converting to
//! dates after being copied.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use indexmap::IndexMap;
use serde_json::{Map as JsonMap, Number, Value as JsonValue};

use crate::{
    error::{DocumentStoreError, DocumentStoreResult},
    timestamp::Timestamp,
};

/// The fields of a single document, in insertion order.
pub type Fields = IndexMap<String, Value>;

/// A single field value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Explicit null.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integral number.
    Integer(i64),
    /// Floating point number.
    Double(f64),
    /// UTF-8 string.
    String(String),
    /// Ordered sequence of values.
    Array(Vec<Value>),
    /// Nested map of values.
    Map(Fields),
    /// Database timestamp.
    Timestamp(Timestamp),
    /// Native date.
    Date(DateTime<Utc>),
}

impl Value {
    /// Converts untyped JSON into a tagged value.
    ///
    /// An object holding exactly the integer keys `seconds` and `nanoseconds`
    /// (or the wire form `_seconds` and `_nanoseconds`) becomes a
    /// [`Value::Timestamp`]. Everything else maps structurally.
    pub fn from_json(json: JsonValue) -> Value {
        match json {
            JsonValue::Null => Value::Null,
            JsonValue::Bool(value) => Value::Bool(value),
            JsonValue::Number(number) => match number.as_i64() {
                Some(value) => Value::Integer(value),
                None => Value::Double(number.as_f64().unwrap_or(f64::NAN)),
            },
            JsonValue::String(value) => Value::String(value),
            JsonValue::Array(items) => Value::Array(
                items
                    .into_iter()
                    .map(Value::from_json)
                    .collect()
            ),
            JsonValue::Object(map) => match timestamp_from_json(&map) {
                Some(ts) => Value::Timestamp(ts),
                None => Value::Map(
                    map
                        .into_iter()
                        .map(|(k, v)| (k, Value::from_json(v)))
                        .collect()
                ),
            },
        }
    }

    /// Renders this value as JSON.
    ///
    /// Timestamps become `{ "seconds", "nanoseconds" }` objects, dates become
    /// RFC 3339 strings and non-finite doubles become `null`.
    pub fn to_json(&self) -> JsonValue {
        match self {
            Value::Null => JsonValue::Null,
            Value::Bool(value) => JsonValue::Bool(*value),
            Value::Integer(value) => JsonValue::Number((*value).into()),
            Value::Double(value) => Number::from_f64(*value)
                .map(JsonValue::Number)
                .unwrap_or(JsonValue::Null),
            Value::String(value) => JsonValue::String(value.clone()),
            Value::Array(items) => JsonValue::Array(items.iter().map(Value::to_json).collect()),
            Value::Map(fields) => fields_to_json(fields),
            Value::Timestamp(ts) => serde_json::json!({
                "seconds": ts.seconds(),
                "nanoseconds": ts.nanoseconds(),
            }),
            Value::Date(date) => JsonValue::String(date.to_rfc3339()),
        }
    }

    /// Interprets this value as a point in time, in milliseconds since the epoch.
    ///
    /// Timestamps, dates and strings that parse as a date qualify. Numbers never do.
    pub fn as_instant_millis(&self) -> Option<i64> {
        match self {
            Value::Timestamp(ts) => Some(ts.to_millis()),
            Value::Date(date) => Some(date.timestamp_millis()),
            Value::String(value) => parse_instant_millis(value),
            _ => None,
        }
    }

    /// Whether this is `Value::Null`.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Borrows the text of a string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(value) => Some(value),
            _ => None,
        }
    }

    /// Borrows the items of an array value.
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Borrows the fields of a map value.
    pub fn as_map(&self) -> Option<&Fields> {
        match self {
            Value::Map(fields) => Some(fields),
            _ => None,
        }
    }

    /// Returns the timestamp of a timestamp value. Dates are not converted.
    pub fn as_timestamp(&self) -> Option<Timestamp> {
        match self {
            Value::Timestamp(ts) => Some(*ts),
            _ => None,
        }
    }
}

/// Builds document fields from a JSON object.
///
/// # Errors
///
/// Returns [`DocumentStoreError::Serialization`] if `json` is not an object.
pub fn fields_from_json(json: JsonValue) -> DocumentStoreResult<Fields> {
    match Value::from_json(json) {
        Value::Map(fields) => Ok(fields),
        other => Err(DocumentStoreError::Serialization(format!(
            "expected a JSON object for document fields, found {}",
            other.to_json()
        ))),
    }
}

/// Renders document fields as a JSON object.
pub fn fields_to_json(fields: &Fields) -> JsonValue {
    JsonValue::Object(
        fields
            .iter()
            .map(|(k, v)| (k.clone(), v.to_json()))
            .collect()
    )
}

/// Resolves a field path against document fields.
///
/// A key matching `path` verbatim wins; otherwise a dotted path walks nested maps.
pub fn field_value<'a>(fields: &'a Fields, path: &str) -> Option<&'a Value> {
    if let Some(value) = fields.get(path) {
        return Some(value);
    }

    let mut segments = path.split('.');
    let mut current = fields.get(segments.next()?)?;

    for segment in segments {
        current = current.as_map()?.get(segment)?;
    }

    Some(current)
}

fn timestamp_from_json(map: &JsonMap<String, JsonValue>) -> Option<Timestamp> {
    if map.len() != 2 {
        return None;
    }

    let (seconds, nanoseconds) = match (map.get("seconds"), map.get("nanoseconds")) {
        (Some(s), Some(n)) => (s, n),
        _ => (map.get("_seconds")?, map.get("_nanoseconds")?),
    };

    let nanoseconds = u32::try_from(nanoseconds.as_u64()?).ok()?;

    Some(Timestamp::new(seconds.as_i64()?, nanoseconds))
}

fn parse_instant_millis(value: &str) -> Option<i64> {
    if let Ok(date) = DateTime::parse_from_rfc3339(value) {
        return Some(date.timestamp_millis());
    }

    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc().timestamp_millis());
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()?
        .and_hms_opt(0, 0, 0)
        .map(|naive| naive.and_utc().timestamp_millis())
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Integer(i64::from(value))
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::Integer(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Double(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<Timestamp> for Value {
    fn from(value: Timestamp) -> Self {
        Value::Timestamp(value)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(value: DateTime<Utc>) -> Self {
        Value::Date(value)
    }
}

impl From<Fields> for Value {
    fn from(value: Fields) -> Self {
        Value::Map(value)
    }
}

impl From<JsonValue> for Value {
    fn from(value: JsonValue) -> Self {
        Value::from_json(value)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::Array(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn timestamp_shaped_objects_are_tagged() {
        assert_eq!(
            Value::from_json(json!({ "seconds": 10, "nanoseconds": 5 })),
            Value::Timestamp(Timestamp::new(10, 5)),
        );
        assert_eq!(
            Value::from_json(json!({ "_seconds": 10, "_nanoseconds": 0 })).as_timestamp(),
            Some(Timestamp::from_millis(10_000)),
        );
    }

    #[test]
    fn objects_with_extra_keys_stay_maps() {
        let value = Value::from_json(json!({ "seconds": 10, "nanoseconds": 5, "label": "x" }));

        assert!(value.as_map().is_some());
    }

    #[test]
    fn clone_shares_no_nested_structure() {
        let original = Value::from_json(json!({ "tags": ["a", "b"], "inner": { "n": 1 } }));
        let mut copy = original.clone();

        if let Value::Map(fields) = &mut copy {
            fields.insert("tags".to_string(), Value::from(vec!["z"]));
        }

        assert_eq!(
            original.as_map().and_then(|f| f.get("tags")),
            Some(&Value::from(vec!["a", "b"])),
        );
    }

    #[test]
    fn instants_from_strings_and_dates() {
        let ts = Timestamp::from_millis(86_400_000);

        assert_eq!(Value::from("1970-01-02").as_instant_millis(), Some(86_400_000));
        assert_eq!(Value::from("1970-01-02T00:00:00Z").as_instant_millis(), Some(86_400_000));
        assert_eq!(Value::from("1970-01-02T00:00:00.5").as_instant_millis(), Some(86_400_500));
        assert_eq!(Value::from(ts).as_instant_millis(), Some(86_400_000));
        assert_eq!(Value::from(ts.to_date()).as_instant_millis(), Some(86_400_000));
        assert_eq!(Value::from("not a date").as_instant_millis(), None);
        assert_eq!(Value::from(86_400_000i64).as_instant_millis(), None);
    }

    #[test]
    fn dotted_paths_walk_nested_maps() {
        let fields = fields_from_json(json!({
            "address": { "city": "Oslo" },
            "a.b": "literal",
        }))
        .unwrap();

        assert_eq!(field_value(&fields, "address.city"), Some(&Value::from("Oslo")));
        assert_eq!(field_value(&fields, "a.b"), Some(&Value::from("literal")));
        assert_eq!(field_value(&fields, "address.zip"), None);
    }

    #[test]
    fn non_object_fields_are_rejected() {
        assert!(matches!(
            fields_from_json(json!([1, 2])),
            Err(DocumentStoreError::Serialization(_))
        ));
    }

    #[test]
    fn json_round_trip_keeps_timestamps() {
        let json = json!({ "at": { "seconds": 1, "nanoseconds": 2 }, "n": 1.5 });
        let fields = fields_from_json(json.clone()).unwrap();

        assert_eq!(fields_to_json(&fields), json);
    }
}
