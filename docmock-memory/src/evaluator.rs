//! Query directive evaluation for in-memory document filtering.
//!
//! This module provides the evaluation engine for filter directives and the
//! ordering used by `order_by`. When both sides of a filter comparison can be
//! read as a point in time (timestamp, date, or a string that parses as a date)
//! they are compared as millisecond instants; otherwise values compare by
//! their natural ordering.
//!
//! Ordering uses a total order over every value ([`SortKey`]) so that sorting
//! a collection with missing fields or mixed types stays consistent.

use std::{
    borrow::Cow,
    cmp::{Ordering, Reverse},
    collections::HashMap,
};

use docmock_core::{
    error::DocumentStoreError,
    query::{DOCUMENT_ID_FIELD, Filter, QueryVisitor, Sort, SortDirection, WhereOp},
    value::{Fields, Value, field_value},
};

/// Type-erased, comparable representation of field values.
///
/// Integers stay exact and widen to f64 only against a double; timestamps and
/// dates become millisecond instants.
#[derive(Debug)]
pub(crate) enum Comparable<'a> {
    /// Null value
    Null,
    /// Boolean value
    Bool(bool),
    /// Integer value
    Integer(i64),
    /// Floating point value
    Double(f64),
    /// Point in time, in milliseconds since the epoch
    Instant(i64),
    /// String value
    String(&'a str),
    /// Array of comparable values
    Array(Vec<Comparable<'a>>),
    /// Map of comparable values
    Map(HashMap<&'a str, Comparable<'a>>),
}

impl<'a> Comparable<'a> {
    /// Converts both sides, reading them as instants when both allow it.
    pub fn pair(left: &'a Value, right: &'a Value) -> (Comparable<'a>, Comparable<'a>) {
        match (left.as_instant_millis(), right.as_instant_millis()) {
            (Some(l), Some(r)) => (Comparable::Instant(l), Comparable::Instant(r)),
            _ => (Comparable::from(left), Comparable::from(right)),
        }
    }
}

impl<'a> From<&'a Value> for Comparable<'a> {
    fn from(value: &'a Value) -> Self {
        match value {
            Value::Null => Comparable::Null,
            Value::Bool(value) => Comparable::Bool(*value),
            Value::Integer(value) => Comparable::Integer(*value),
            Value::Double(value) => Comparable::Double(*value),
            Value::String(value) => Comparable::String(value),
            Value::Timestamp(ts) => Comparable::Instant(ts.to_millis()),
            Value::Date(date) => Comparable::Instant(date.timestamp_millis()),
            Value::Array(items) => Comparable::Array(
                items
                    .iter()
                    .map(Comparable::from)
                    .collect::<Vec<_>>()
            ),
            Value::Map(fields) => Comparable::Map(
                fields
                    .iter()
                    .map(|(k, v)| (k.as_str(), Comparable::from(v)))
                    .collect::<HashMap<_, _>>()
            ),
        }
    }
}

impl<'a> PartialEq for Comparable<'a> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Comparable::Null, Comparable::Null) => true,
            (Comparable::Bool(a), Comparable::Bool(b)) => a == b,
            (Comparable::Instant(a), Comparable::Instant(b)) => a == b,
            (Comparable::String(a), Comparable::String(b)) => a == b,
            (Comparable::Array(a), Comparable::Array(b)) => a == b,
            (Comparable::Map(a), Comparable::Map(b)) => a == b,
            _ => self.partial_cmp(other) == Some(Ordering::Equal),
        }
    }
}

impl<'a> PartialOrd for Comparable<'a> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Comparable::Null, Comparable::Null) => Some(Ordering::Equal),
            (Comparable::Bool(a), Comparable::Bool(b)) => a.partial_cmp(b),
            (Comparable::Integer(a), Comparable::Integer(b)) => a.partial_cmp(b),
            (Comparable::Integer(a), Comparable::Double(b)) => compare_integer_double(*a, *b),
            (Comparable::Double(a), Comparable::Integer(b)) => {
                compare_integer_double(*b, *a).map(Ordering::reverse)
            },
            (Comparable::Double(a), Comparable::Double(b)) => a.partial_cmp(b),
            (Comparable::Instant(a), Comparable::Instant(b)) => a.partial_cmp(b),
            (Comparable::String(a), Comparable::String(b)) => a.partial_cmp(b),
            _ => None,
        }
    }
}

/// Exact comparison of an integer with a double; `None` when the double is NaN.
fn compare_integer_double(integer: i64, double: f64) -> Option<Ordering> {
    // 2^63, the first double past i64::MAX. -2^63 is i64::MIN exactly.
    const BOUND: f64 = 9_223_372_036_854_775_808.0;

    if double.is_nan() {
        return None;
    }
    if double >= BOUND {
        return Some(Ordering::Less);
    }
    if double < -BOUND {
        return Some(Ordering::Greater);
    }

    let whole = double.trunc();
    match integer.cmp(&(whole as i64)) {
        Ordering::Equal => 0.0_f64.partial_cmp(&(double - whole)),
        ordering => Some(ordering),
    }
}

/// Equality with instant coercion.
pub(crate) fn values_equal(left: &Value, right: &Value) -> bool {
    let (left, right) = Comparable::pair(left, right);
    left == right
}

/// Ordering with instant coercion; `None` when the values are not comparable.
pub(crate) fn compare_values(left: &Value, right: &Value) -> Option<Ordering> {
    let (left, right) = Comparable::pair(left, right);
    left.partial_cmp(&right)
}

/// Owned sort key with a total order across every value type.
///
/// Types rank missing < null < bool < number < instant < string < array < map
/// and compare by value within a rank. Strings that parse as a date rank as
/// instants, decided per value. NaN sorts below every other number.
#[derive(Debug, Clone)]
pub(crate) enum SortKey {
    Missing,
    Null,
    Bool(bool),
    Integer(i64),
    Double(f64),
    Instant(i64),
    String(String),
    Array(Vec<SortKey>),
    /// Entries sorted by key.
    Map(Vec<(String, SortKey)>),
}

impl SortKey {
    pub fn new(value: Option<&Value>) -> Self {
        value.map_or(SortKey::Missing, SortKey::from)
    }

    fn rank(&self) -> u8 {
        match self {
            SortKey::Missing => 0,
            SortKey::Null => 1,
            SortKey::Bool(_) => 2,
            SortKey::Integer(_) | SortKey::Double(_) => 3,
            SortKey::Instant(_) => 4,
            SortKey::String(_) => 5,
            SortKey::Array(_) => 6,
            SortKey::Map(_) => 7,
        }
    }
}

impl From<&Value> for SortKey {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => SortKey::Null,
            Value::Bool(value) => SortKey::Bool(*value),
            Value::Integer(value) => SortKey::Integer(*value),
            Value::Double(value) => SortKey::Double(*value),
            Value::Timestamp(ts) => SortKey::Instant(ts.to_millis()),
            Value::Date(date) => SortKey::Instant(date.timestamp_millis()),
            Value::String(text) => match value.as_instant_millis() {
                Some(millis) => SortKey::Instant(millis),
                None => SortKey::String(text.clone()),
            },
            Value::Array(items) => SortKey::Array(items.iter().map(SortKey::from).collect()),
            Value::Map(fields) => {
                let mut entries = fields
                    .iter()
                    .map(|(key, value)| (key.clone(), SortKey::from(value)))
                    .collect::<Vec<_>>();
                entries.sort_by(|(a, _), (b, _)| a.cmp(b));
                SortKey::Map(entries)
            },
        }
    }
}

/// NaN first, then numeric order; -0.0 and 0.0 are equal.
fn compare_doubles(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
    }
}

impl Ord for SortKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SortKey::Bool(a), SortKey::Bool(b)) => a.cmp(b),
            (SortKey::Integer(a), SortKey::Integer(b)) => a.cmp(b),
            (SortKey::Double(a), SortKey::Double(b)) => compare_doubles(*a, *b),
            (SortKey::Integer(a), SortKey::Double(b)) => {
                compare_integer_double(*a, *b).unwrap_or(Ordering::Greater)
            },
            (SortKey::Double(a), SortKey::Integer(b)) => {
                compare_integer_double(*b, *a).map_or(Ordering::Less, Ordering::reverse)
            },
            (SortKey::Instant(a), SortKey::Instant(b)) => a.cmp(b),
            (SortKey::String(a), SortKey::String(b)) => a.cmp(b),
            (SortKey::Array(a), SortKey::Array(b)) => a.cmp(b),
            (SortKey::Map(a), SortKey::Map(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for SortKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for SortKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SortKey {}

/// Evaluates filter directives against a single document.
pub(crate) struct DocumentEvaluator<'a> {
    id: &'a str,
    fields: &'a Fields,
}

impl<'a> DocumentEvaluator<'a> {
    pub fn new(id: &'a str, fields: &'a Fields) -> Self {
        Self { id, fields }
    }

    /// Keeps the `(id, fields)` pairs matching every filter, preserving input order.
    pub fn filter_documents(
        documents: impl IntoIterator<Item = (&'a String, &'a Fields)>,
        filters: &[Filter],
    ) -> Vec<(String, Fields)> {
        documents
            .into_iter()
            .filter(|(id, fields)| {
                DocumentEvaluator::new(id, fields)
                    .visit_filters(filters)
                    .unwrap_or(false)
            })
            .map(|(id, fields)| (id.clone(), fields.clone()))
            .collect::<Vec<_>>()
    }

    /// Stable-sorts documents by the sort field.
    ///
    /// Ascending puts documents missing the field first; descending puts them last.
    pub fn sort_documents(documents: &mut [(String, Fields)], sort: &Sort) {
        let key = |(id, fields): &(String, Fields)| {
            SortKey::new(resolve_field(id, fields, &sort.field).as_deref())
        };

        match sort.direction {
            SortDirection::Asc => documents.sort_by_cached_key(key),
            SortDirection::Desc => documents.sort_by_cached_key(|document| Reverse(key(document))),
        }
    }
}

/// Looks up a field, mapping the document-id pseudo field to the id.
fn resolve_field<'a>(id: &str, fields: &'a Fields, field: &str) -> Option<Cow<'a, Value>> {
    if field == DOCUMENT_ID_FIELD {
        return Some(Cow::Owned(Value::String(id.to_string())));
    }

    field_value(fields, field).map(Cow::Borrowed)
}

impl<'a> QueryVisitor for DocumentEvaluator<'a> {
    type Error = DocumentStoreError;

    fn visit_field(&mut self, field: &str, op: &WhereOp, value: &Value) -> Result<bool, Self::Error> {
        let Some(field_value) = resolve_field(self.id, self.fields, field) else {
            // A missing field only satisfies the negative operators.
            return Ok(match op {
                WhereOp::Ne => true,
                WhereOp::NotIn => value.as_array().is_some(),
                _ => false,
            });
        };

        Ok(match op {
            WhereOp::Eq => values_equal(&field_value, value),
            WhereOp::Ne => !values_equal(&field_value, value),
            WhereOp::Lt => compare_values(&field_value, value) == Some(Ordering::Less),
            WhereOp::Lte => matches!(compare_values(&field_value, value), Some(Ordering::Less | Ordering::Equal)),
            WhereOp::Gt => compare_values(&field_value, value) == Some(Ordering::Greater),
            WhereOp::Gte => matches!(compare_values(&field_value, value), Some(Ordering::Greater | Ordering::Equal)),
            WhereOp::In => match value.as_array() {
                Some(values) => values
                    .iter()
                    .any(|item| values_equal(&field_value, item)),
                None => false,
            },
            WhereOp::NotIn => match value.as_array() {
                Some(values) => !values
                    .iter()
                    .any(|item| values_equal(&field_value, item)),
                None => false,
            },
            WhereOp::ArrayContains => match field_value.as_array() {
                Some(items) => items
                    .iter()
                    .any(|item| values_equal(item, value)),
                None => false,
            },
            WhereOp::ArrayContainsAny => match (field_value.as_array(), value.as_array()) {
                (Some(items), Some(values)) => items
                    .iter()
                    .any(|item| values.iter().any(|candidate| values_equal(item, candidate))),
                _ => false,
            },
            WhereOp::Unknown(_) => false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docmock_core::{timestamp::Timestamp, value::fields_from_json};
    use serde_json::json;

    fn matches(fields: serde_json::Value, filter: Filter) -> bool {
        let fields = fields_from_json(fields).unwrap();

        DocumentEvaluator::new("doc-1", &fields)
            .visit_filters(&[filter])
            .unwrap()
    }

    #[test]
    fn numbers_compare_across_integer_and_double() {
        assert!(matches(json!({ "n": 2 }), Filter::eq("n", 2.0)));
        assert!(matches(json!({ "n": 2 }), Filter::lt("n", 2.5)));
        assert!(!matches(json!({ "n": 3 }), Filter::lte("n", 2)));
    }

    #[test]
    fn timestamps_compare_against_dates_and_strings() {
        let day = Timestamp::from_millis(86_400_000);
        let mut fields = Fields::new();
        fields.insert("at".to_string(), Value::from(day));

        let mut evaluator = DocumentEvaluator::new("doc-1", &fields);

        assert!(evaluator.visit_filters(&[Filter::eq("at", day.to_date())]).unwrap());
        assert!(evaluator.visit_filters(&[Filter::lte("at", "1970-01-02")]).unwrap());
        assert!(evaluator.visit_filters(&[Filter::gt("at", "1970-01-01T12:00:00Z")]).unwrap());
        assert!(!evaluator.visit_filters(&[Filter::lt("at", Timestamp::from_millis(0))]).unwrap());
    }

    #[test]
    fn date_strings_compare_as_instants_not_text() {
        // As text the left side sorts after the right; as instants it is an hour earlier.
        assert!(matches(
            json!({ "at": "2024-01-01T10:00:00+02:00" }),
            Filter::lt("at", "2024-01-01T09:00:00Z"),
        ));
    }

    #[test]
    fn mismatched_types_never_order() {
        assert!(!matches(json!({ "n": "10" }), Filter::gt("n", 5)));
        assert!(!matches(json!({ "n": "10" }), Filter::lt("n", 5)));
    }

    #[test]
    fn document_id_pseudo_field() {
        assert!(matches(json!({}), Filter::eq(DOCUMENT_ID_FIELD, "doc-1")));
        assert!(matches(json!({}), Filter::any_of(DOCUMENT_ID_FIELD, vec!["doc-0", "doc-1"])));
    }

    #[test]
    fn membership_operators() {
        assert!(matches(json!({ "s": "a" }), Filter::any_of("s", vec!["a", "b"])));
        assert!(!matches(json!({ "s": "c" }), Filter::any_of("s", vec!["a", "b"])));
        assert!(matches(json!({ "s": "c" }), Filter::none_of("s", vec!["a", "b"])));
        assert!(!matches(json!({ "s": "a" }), Filter::any_of("s", "a")));
        assert!(!matches(json!({ "s": "a" }), Filter::none_of("s", "b")));
    }

    #[test]
    fn array_operators() {
        let doc = json!({ "tags": ["rust", "db"] });

        assert!(matches(doc.clone(), Filter::contains("tags", "rust")));
        assert!(!matches(doc.clone(), Filter::contains("tags", "go")));
        assert!(matches(doc.clone(), Filter::contains_any("tags", vec!["go", "db"])));
        assert!(!matches(doc.clone(), Filter::contains_any("tags", vec!["go"])));
        assert!(!matches(json!({ "tags": "rust" }), Filter::contains("tags", "rust")));
    }

    #[test]
    fn missing_fields_only_match_negative_operators() {
        assert!(!matches(json!({}), Filter::eq("x", 1)));
        assert!(!matches(json!({}), Filter::gte("x", 1)));
        assert!(matches(json!({}), Filter::ne("x", 1)));
        assert!(matches(json!({}), Filter::none_of("x", vec![1])));
    }

    #[test]
    fn unknown_operator_matches_nothing() {
        assert!(!matches(json!({ "x": 1 }), Filter::new("x", "nonexistent-op", 1)));
        assert!(!matches(json!({}), Filter::new("x", "nonexistent-op", 1)));
    }

    #[test]
    fn sort_is_stable_and_respects_direction() {
        let mut docs = vec![
            ("a".to_string(), fields_from_json(json!({ "n": 2 })).unwrap()),
            ("b".to_string(), fields_from_json(json!({ "n": 1 })).unwrap()),
            ("c".to_string(), fields_from_json(json!({ "n": 2 })).unwrap()),
        ];

        DocumentEvaluator::sort_documents(&mut docs, &Sort { field: "n".to_string(), direction: SortDirection::Desc });

        let ids = docs.iter().map(|(id, _)| id.as_str()).collect::<Vec<_>>();
        assert_eq!(ids, vec!["a", "c", "b"]);
    }

    fn sorted_ids(documents: Vec<serde_json::Value>, direction: SortDirection) -> Vec<String> {
        let mut docs = documents
            .into_iter()
            .enumerate()
            .map(|(i, fields)| (format!("d{i}"), fields_from_json(fields).unwrap()))
            .collect::<Vec<_>>();

        DocumentEvaluator::sort_documents(&mut docs, &Sort { field: "n".to_string(), direction });

        docs.into_iter().map(|(id, _)| id).collect()
    }

    #[test]
    fn large_integers_compare_exactly() {
        assert!(!matches(json!({ "n": 9_007_199_254_740_992_i64 }), Filter::eq("n", 9_007_199_254_740_993_i64)));
        assert!(matches(json!({ "n": 9_007_199_254_740_992_i64 }), Filter::lt("n", 9_007_199_254_740_993_i64)));
        assert!(matches(json!({ "n": i64::MAX }), Filter::lt("n", 9.3e18)));
        assert!(matches(json!({ "n": -3 }), Filter::lt("n", -2.5)));
        assert!(!matches(json!({ "n": 1 }), Filter::eq("n", f64::NAN)));
    }

    #[test]
    fn sort_places_missing_and_mixed_types_by_rank() {
        let docs = vec![
            json!({ "n": 3 }),
            json!({}),
            json!({ "n": 1 }),
            json!({ "n": "x" }),
            json!({ "n": 2.5 }),
            json!({ "n": null }),
        ];

        assert_eq!(sorted_ids(docs.clone(), SortDirection::Asc), vec!["d1", "d5", "d2", "d4", "d0", "d3"]);
        assert_eq!(sorted_ids(docs, SortDirection::Desc), vec!["d3", "d0", "d4", "d2", "d5", "d1"]);
    }

    #[test]
    fn sort_ranks_date_strings_as_instants() {
        let mut docs = vec![
            ("plain".to_string(), fields_from_json(json!({ "n": "apple" })).unwrap()),
            ("text-date".to_string(), fields_from_json(json!({ "n": "1970-01-03" })).unwrap()),
            ("stamp".to_string(), Fields::from([("n".to_string(), Value::from(Timestamp::from_millis(86_400_000)))])),
        ];

        DocumentEvaluator::sort_documents(&mut docs, &Sort { field: "n".to_string(), direction: SortDirection::Asc });

        let ids = docs.iter().map(|(id, _)| id.as_str()).collect::<Vec<_>>();
        assert_eq!(ids, vec!["stamp", "text-date", "plain"]);
    }

    #[test]
    fn sort_orders_large_mixed_collections() {
        let docs = (0..200_i64)
            .map(|i| match i % 4 {
                0 => json!({ "n": (i * 37) % 101 }),
                1 => json!({ "n": format!("s{}", (i * 13) % 50) }),
                2 => json!({}),
                _ => json!({ "n": ((i * 7) % 60) as f64 + 0.5 }),
            })
            .collect::<Vec<_>>();
        let mut docs = docs
            .into_iter()
            .enumerate()
            .map(|(i, fields)| (format!("d{i}"), fields_from_json(fields).unwrap()))
            .collect::<Vec<_>>();

        DocumentEvaluator::sort_documents(&mut docs, &Sort { field: "n".to_string(), direction: SortDirection::Asc });

        let values = docs.iter().map(|(_, fields)| fields.get("n")).collect::<Vec<_>>();
        let first_present = values.iter().position(Option::is_some).unwrap();
        assert_eq!(first_present, 50);
        assert!(values[first_present..].iter().all(Option::is_some));

        let numbers = values
            .iter()
            .flatten()
            .filter_map(|value| match value {
                Value::Integer(n) => Some(*n as f64),
                Value::Double(n) => Some(*n),
                _ => None,
            })
            .collect::<Vec<_>>();
        assert_eq!(numbers.len(), 100);
        assert!(numbers.windows(2).all(|pair| pair[0] <= pair[1]));

        let strings = values.iter().flatten().filter_map(|value| value.as_str()).collect::<Vec<_>>();
        assert_eq!(strings.len(), 50);
        assert!(strings.windows(2).all(|pair| pair[0] <= pair[1]));
        assert!(matches!(values.last(), Some(Some(Value::String(_)))));
    }
}
