/**
 * Document Queries
 *
 * Typed query description shared by every store implementation: equality,
 * inequality, range and `in` predicates over (optionally dotted) field paths,
 * ordering, offset and limit.
 *
 * # Matching Rules
 *
 * - A document lacking a filtered field never matches, `NotEqual` included
 * - Range predicates only compare values of the same JSON type
 * - Numbers compare by value, so `1500` equals `1500.0`
 * - A document lacking an ordered field is excluded from ordered queries
 * - Ties are broken by document id so results are deterministic
 */

use std::cmp::Ordering;

use serde_json::Value;

use super::{Document, Snapshot};

/// Filter predicate for a single field
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// field == value
    Equal(String, Value),
    /// field != value
    NotEqual(String, Value),
    /// field < value
    LessThan(String, Value),
    /// field <= value
    LessThanOrEqual(String, Value),
    /// field > value
    GreaterThan(String, Value),
    /// field >= value
    GreaterThanOrEqual(String, Value),
    /// field value is in list
    In(String, Vec<Value>),
}

impl Filter {
    pub fn field_path(&self) -> &str {
        match self {
            Filter::Equal(field, _)
            | Filter::NotEqual(field, _)
            | Filter::LessThan(field, _)
            | Filter::LessThanOrEqual(field, _)
            | Filter::GreaterThan(field, _)
            | Filter::GreaterThanOrEqual(field, _)
            | Filter::In(field, _) => field,
        }
    }

    /// Evaluate the filter against a document body
    pub fn matches(&self, doc: &Document) -> bool {
        let Some(actual) = lookup(doc, self.field_path()) else {
            return false;
        };
        match self {
            Filter::Equal(_, expected) => values_equal(actual, expected),
            Filter::NotEqual(_, expected) => !values_equal(actual, expected),
            Filter::LessThan(_, bound) => compare_values(actual, bound) == Some(Ordering::Less),
            Filter::LessThanOrEqual(_, bound) => matches!(
                compare_values(actual, bound),
                Some(Ordering::Less | Ordering::Equal)
            ),
            Filter::GreaterThan(_, bound) => {
                compare_values(actual, bound) == Some(Ordering::Greater)
            }
            Filter::GreaterThanOrEqual(_, bound) => matches!(
                compare_values(actual, bound),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            Filter::In(_, candidates) => candidates.iter().any(|c| values_equal(actual, c)),
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

impl Direction {
    /// Parse `asc`/`desc`, anything else is descending
    pub fn parse(raw: &str) -> Self {
        if raw.eq_ignore_ascii_case("asc") {
            Direction::Ascending
        } else {
            Direction::Descending
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub field: String,
    pub direction: Direction,
}

/// A query over one collection
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub collection: String,
    pub filters: Vec<Filter>,
    pub order_by: Vec<OrderBy>,
    pub offset: usize,
    pub limit: Option<usize>,
}

impl Query {
    pub fn collection(name: impl Into<String>) -> Self {
        Self {
            collection: name.into(),
            filters: Vec::new(),
            order_by: Vec::new(),
            offset: 0,
            limit: None,
        }
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn where_eq(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filter(Filter::Equal(field.into(), value.into()))
    }

    pub fn order_by(mut self, field: impl Into<String>, direction: Direction) -> Self {
        self.order_by.push(OrderBy {
            field: field.into(),
            direction,
        });
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Whether a document body satisfies every filter and has every ordered field
    pub fn matches(&self, doc: &Document) -> bool {
        self.filters.iter().all(|f| f.matches(doc))
            && self.order_by.iter().all(|o| lookup(doc, &o.field).is_some())
    }

    /// Sort, then apply offset and limit
    pub fn arrange(&self, mut snapshots: Vec<Snapshot>) -> Vec<Snapshot> {
        snapshots.sort_by(|a, b| {
            for order in &self.order_by {
                let ordering = match (lookup(&a.data, &order.field), lookup(&b.data, &order.field)) {
                    (Some(x), Some(y)) => compare_values(x, y).unwrap_or(Ordering::Equal),
                    _ => Ordering::Equal,
                };
                let ordering = match order.direction {
                    Direction::Ascending => ordering,
                    Direction::Descending => ordering.reverse(),
                };
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            a.id.cmp(&b.id)
        });

        let iter = snapshots.into_iter().skip(self.offset);
        match self.limit {
            Some(limit) => iter.take(limit).collect(),
            None => iter.collect(),
        }
    }
}

/// Resolve a dotted field path inside a document
pub fn lookup<'a>(doc: &'a Document, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let mut current = doc.get(segments.next()?)?;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

/// Order two values of the same JSON type
pub fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        (Value::Null, Value::Null) => Some(Ordering::Equal),
        _ => None,
    }
}

pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(_), Value::Number(_)) => compare_values(a, b) == Some(Ordering::Equal),
        _ => a == b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    fn snapshot(id: &str, value: Value) -> Snapshot {
        Snapshot {
            id: id.to_string(),
            data: doc(value),
        }
    }

    #[test]
    fn test_missing_field_never_matches() {
        let body = doc(json!({ "status": "active" }));
        assert!(!Filter::NotEqual("ownerId".into(), json!("u1")).matches(&body));
        assert!(!Filter::Equal("ownerId".into(), Value::Null).matches(&body));
    }

    #[test]
    fn test_numbers_compare_by_value() {
        let body = doc(json!({ "price": 1500 }));
        assert!(Filter::Equal("price".into(), json!(1500.0)).matches(&body));
        assert!(Filter::GreaterThanOrEqual("price".into(), json!(1000)).matches(&body));
        assert!(!Filter::LessThan("price".into(), json!(1500)).matches(&body));
    }

    #[test]
    fn test_range_ignores_mismatched_types() {
        let body = doc(json!({ "price": "1500" }));
        assert!(!Filter::GreaterThan("price".into(), json!(10)).matches(&body));
    }

    #[test]
    fn test_in_filter_and_dotted_path() {
        let body = doc(json!({ "category": "books", "settings": { "pushNotifications": false } }));
        assert!(Filter::In("category".into(), vec![json!("toys"), json!("books")]).matches(&body));
        assert!(Filter::Equal("settings.pushNotifications".into(), json!(false)).matches(&body));
    }

    #[test]
    fn test_arrange_orders_and_paginates() {
        let query = Query::collection("items")
            .order_by("price", Direction::Descending)
            .offset(1)
            .limit(2);
        let arranged = query.arrange(vec![
            snapshot("a", json!({ "price": 10 })),
            snapshot("b", json!({ "price": 30 })),
            snapshot("c", json!({ "price": 20 })),
            snapshot("d", json!({ "price": 20 })),
        ]);
        let ids: Vec<_> = arranged.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "d"]);
    }

    #[test]
    fn test_ordered_query_requires_field() {
        let query = Query::collection("items").order_by("createdAt", Direction::Ascending);
        assert!(!query.matches(&doc(json!({ "title": "x" }))));
        assert!(query.matches(&doc(json!({ "createdAt": "2024-01-01T00:00:00.000000Z" }))));
    }

    #[test]
    fn test_direction_parse() {
        assert_eq!(Direction::parse("ASC"), Direction::Ascending);
        assert_eq!(Direction::parse("desc"), Direction::Descending);
        assert_eq!(Direction::parse("sideways"), Direction::Descending);
    }
}
