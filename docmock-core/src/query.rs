//! Query directives: filters, ordering, offset and limit.
//!
//! A [`Query`] is a plain value describing a pending read over one collection.
//! Each chaining method consumes the query and returns the extended one; the
//! handle-level [`QueryRef`](crate::collection::QueryRef) clones before
//! chaining, so two continuations of a shared prefix never affect each other.
//!
//! # Query Building
//!
//! ```ignore
//! use docmock::query::{Query, Filter, SortDirection};
//!
//! let query = Query::new()
//!     .filter(Filter::eq("status", "active"))
//!     .filter(Filter::gte("age", 18))
//!     .sort("created_at", SortDirection::Desc)
//!     .limit(10);
//! ```
//!
//! # Operators
//!
//! [`WhereOp`] parses the textual operators used by the emulated client:
//! `==`, `!=`, `<`, `<=`, `>`, `>=`, `in`, `not-in`, `array-contains` and
//! `array-contains-any`. Any other text parses to [`WhereOp::Unknown`], which
//! matches no documents.

use std::fmt;

use crate::{
    error::DocumentStoreError,
    value::Value,
};

/// Pseudo field name that resolves to the document id instead of a stored field.
pub const DOCUMENT_ID_FIELD: &str = "__name__";

/// Sort direction for query results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    /// Ascending order (A to Z, 0 to 9, earliest to latest).
    #[default]
    Asc,
    /// Descending order (Z to A, 9 to 0, latest to earliest).
    Desc,
}

impl SortDirection {
    /// Parses `asc`/`desc` (and the long forms), case-insensitively.
    ///
    /// Anything unrecognized sorts ascending.
    pub fn parse(direction: &str) -> Self {
        match direction.to_ascii_lowercase().as_str() {
            "desc" | "descending" => SortDirection::Desc,
            _ => SortDirection::Asc,
        }
    }
}

impl From<&str> for SortDirection {
    fn from(direction: &str) -> Self {
        SortDirection::parse(direction)
    }
}

/// Sort specification for query results.
#[derive(Debug, Clone, PartialEq)]
pub struct Sort {
    /// The field name to sort by.
    pub field: String,
    /// The sort direction.
    pub direction: SortDirection,
}

/// Field comparison operators for filter directives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WhereOp {
    /// `==`
    Eq,
    /// `!=`
    Ne,
    /// `<`
    Lt,
    /// `<=`
    Lte,
    /// `>`
    Gt,
    /// `>=`
    Gte,
    /// `in`: field value is a member of the provided array.
    In,
    /// `not-in`: field value is not a member of the provided array.
    NotIn,
    /// `array-contains`: array field contains the value.
    ArrayContains,
    /// `array-contains-any`: array field shares at least one element with the provided array.
    ArrayContainsAny,
    /// Unrecognized operator text. Matches nothing.
    Unknown(String),
}

impl WhereOp {
    pub fn parse(op: &str) -> Self {
        match op {
            "==" => WhereOp::Eq,
            "!=" => WhereOp::Ne,
            "<" => WhereOp::Lt,
            "<=" => WhereOp::Lte,
            ">" => WhereOp::Gt,
            ">=" => WhereOp::Gte,
            "in" => WhereOp::In,
            "not-in" => WhereOp::NotIn,
            "array-contains" => WhereOp::ArrayContains,
            "array-contains-any" => WhereOp::ArrayContainsAny,
            other => WhereOp::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            WhereOp::Eq => "==",
            WhereOp::Ne => "!=",
            WhereOp::Lt => "<",
            WhereOp::Lte => "<=",
            WhereOp::Gt => ">",
            WhereOp::Gte => ">=",
            WhereOp::In => "in",
            WhereOp::NotIn => "not-in",
            WhereOp::ArrayContains => "array-contains",
            WhereOp::ArrayContainsAny => "array-contains-any",
            WhereOp::Unknown(other) => other,
        }
    }
}

impl From<&str> for WhereOp {
    fn from(op: &str) -> Self {
        WhereOp::parse(op)
    }
}

impl fmt::Display for WhereOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single filter directive: `field op value`.
///
/// # Example
///
/// ```ignore
/// use docmock::query::Filter;
///
/// let adults = Filter::gte("age", 18);
/// let tagged = Filter::new("tags", "array-contains", "rust");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    /// The field path to compare, or [`DOCUMENT_ID_FIELD`].
    pub field: String,
    /// The comparison operator.
    pub op: WhereOp,
    /// The value to compare against.
    pub value: Value,
}

impl Filter {
    /// Creates a filter from an operator given as text.
    pub fn new(field: impl Into<String>, op: impl Into<WhereOp>, value: impl Into<Value>) -> Self {
        Filter { field: field.into(), op: op.into(), value: value.into() }
    }

    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::new(field, WhereOp::Eq, value)
    }

    pub fn ne(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::new(field, WhereOp::Ne, value)
    }

    pub fn lt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::new(field, WhereOp::Lt, value)
    }

    pub fn lte(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::new(field, WhereOp::Lte, value)
    }

    pub fn gt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::new(field, WhereOp::Gt, value)
    }

    pub fn gte(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::new(field, WhereOp::Gte, value)
    }

    /// Matches documents whose field is one of `values`.
    pub fn any_of(field: impl Into<String>, values: impl Into<Value>) -> Self {
        Filter::new(field, WhereOp::In, values)
    }

    /// Matches documents whose field is none of `values`.
    pub fn none_of(field: impl Into<String>, values: impl Into<Value>) -> Self {
        Filter::new(field, WhereOp::NotIn, values)
    }

    /// Matches documents whose array field contains `value`.
    pub fn contains(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::new(field, WhereOp::ArrayContains, value)
    }

    /// Matches documents whose array field contains any of `values`.
    pub fn contains_any(field: impl Into<String>, values: impl Into<Value>) -> Self {
        Filter::new(field, WhereOp::ArrayContainsAny, values)
    }
}

/// An ordered chain of query directives over one collection.
///
/// Filters are conjunctive and evaluated in order. Ordering, offset and limit
/// hold at most one value each; setting one again replaces the previous value.
/// Evaluation always filters, then sorts, then skips `offset`, then truncates to `limit`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    /// Filter directives, all of which must match.
    pub filters: Vec<Filter>,
    /// Optional ordering of the results.
    pub sort: Option<Sort>,
    /// Number of ordered results to skip.
    pub offset: Option<usize>,
    /// Maximum number of results to return.
    pub limit: Option<usize>,
}

impl Query {
    /// Creates a query with no directives; it matches the whole collection.
    pub fn new() -> Self {
        Query::default()
    }

    /// Appends a filter directive.
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Sets the ordering, replacing any previous one.
    pub fn sort(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.sort = Some(Sort { field: field.into(), direction });
        self
    }

    /// Sets the number of results to skip, replacing any previous offset.
    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Sets the result limit, replacing any previous limit.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Evaluates filter directives against one candidate document.
///
/// Backends implement [`visit_field`](QueryVisitor::visit_field); the default
/// [`visit_filters`](QueryVisitor::visit_filters) combines the directives of a
/// query conjunctively and stops at the first miss.
pub trait QueryVisitor {
    type Error: Into<DocumentStoreError>;

    fn visit_field(
        &mut self,
        field: &str,
        op: &WhereOp,
        value: &Value,
    ) -> Result<bool, Self::Error>;

    fn visit_filters(&mut self, filters: &[Filter]) -> Result<bool, Self::Error> {
        for filter in filters {
            if !self.visit_field(&filter.field, &filter.op, &filter.value)? {
                return Ok(false);
            }
        }

        Ok(true)
    }
}
