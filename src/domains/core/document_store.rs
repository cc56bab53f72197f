use crate::errors::{StoreError, StoreResult};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::cmp::Ordering;

/// Field map of a stored document.
pub type Fields = Map<String, Value>;

/// Names of the collections the console reads and writes.
pub mod collections {
    pub const USERS: &str = "users";
    pub const PHARMACIES: &str = "pharmacies";
    pub const INDICATORS: &str = "indicators";
    pub const RELATIONS: &str = "relations";
    pub const ACTION_PLANS: &str = "actionPlans";
    pub const EVIDENCES: &str = "evidences";
}

/// A raw document as returned by a store: opaque id plus untyped fields.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub id: String,
    pub data: Fields,
}

impl StoredDocument {
    pub fn new(id: impl Into<String>, data: Fields) -> Self {
        Self { id: id.into(), data }
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.data.get(name)
    }
}

/// Equality predicates supported by the store.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Eq(String, Value),
    In(String, Vec<Value>),
}

impl Filter {
    pub fn matches(&self, data: &Fields) -> bool {
        match self {
            Filter::Eq(field, expected) => data.get(field) == Some(expected),
            Filter::In(field, allowed) => match data.get(field) {
                Some(value) => allowed.contains(value),
                None => false,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub field: String,
    pub direction: Direction,
}

/// Filters, sort keys and limit for a collection read.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub filters: Vec<Filter>,
    pub order_by: Vec<OrderBy>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn where_eq(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.filters.push(Filter::Eq(field.to_string(), value.into()));
        self
    }

    pub fn where_in<V: Into<Value>>(mut self, field: &str, values: impl IntoIterator<Item = V>) -> Self {
        let values = values.into_iter().map(Into::into).collect();
        self.filters.push(Filter::In(field.to_string(), values));
        self
    }

    pub fn order_by(mut self, field: &str, direction: Direction) -> Self {
        self.order_by.push(OrderBy {
            field: field.to_string(),
            direction,
        });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn matches(&self, data: &Fields) -> bool {
        self.filters.iter().all(|f| f.matches(data))
    }

    /// Filters, sorts and truncates a full collection scan.
    /// Sorting is stable so documents with equal keys keep store order.
    pub fn apply(&self, documents: Vec<StoredDocument>) -> Vec<StoredDocument> {
        let mut selected: Vec<StoredDocument> =
            documents.into_iter().filter(|d| self.matches(&d.data)).collect();

        if !self.order_by.is_empty() {
            selected.sort_by(|a, b| {
                for key in &self.order_by {
                    let ordering = compare_values(a.data.get(&key.field), b.data.get(&key.field));
                    let ordering = match key.direction {
                        Direction::Asc => ordering,
                        Direction::Desc => ordering.reverse(),
                    };
                    if ordering != Ordering::Equal {
                        return ordering;
                    }
                }
                Ordering::Equal
            });
        }

        if let Some(limit) = self.limit {
            selected.truncate(limit);
        }
        selected
    }
}

fn type_rank(value: Option<&Value>) -> u8 {
    match value {
        None | Some(Value::Null) => 0,
        Some(Value::Bool(_)) => 1,
        Some(Value::Number(_)) => 2,
        Some(Value::String(_)) => 3,
        Some(Value::Array(_)) => 4,
        Some(Value::Object(_)) => 5,
    }
}

/// Total order over field values: null < bool < number < string; a missing field sorts as null.
pub fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let x = x.as_f64().unwrap_or(0.0);
            let y = y.as_f64().unwrap_or(0.0);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

/// Async access to named collections of JSON documents.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Reads one document; `None` when the id does not exist.
    async fn get(&self, collection: &str, id: &str) -> StoreResult<Option<StoredDocument>>;

    async fn query(&self, collection: &str, query: &Query) -> StoreResult<Vec<StoredDocument>>;

    async fn count(&self, collection: &str, query: &Query) -> StoreResult<usize>;

    /// Inserts a document under a freshly generated id and returns the id.
    async fn add(&self, collection: &str, data: Fields) -> StoreResult<String>;

    /// Creates or replaces the document with the given id.
    async fn set(&self, collection: &str, id: &str, data: Fields) -> StoreResult<()>;

    /// Merges `patch` into an existing document. Fails with `NotFound` when absent.
    async fn update(&self, collection: &str, id: &str, patch: Fields) -> StoreResult<()>;

    /// Removes a document. Deleting a missing id is not an error.
    async fn delete(&self, collection: &str, id: &str) -> StoreResult<()>;
}

/// Typed shape of a stored document for one collection.
pub trait EntityDocument: Serialize + DeserializeOwned + Send + Sync {
    type Entity;

    const COLLECTION: &'static str;

    fn into_entity(self, id: String) -> StoreResult<Self::Entity>;
}

/// Decodes a raw document into its entity, rejecting unexpected shapes.
pub fn decode<D: EntityDocument>(document: StoredDocument) -> StoreResult<D::Entity> {
    let StoredDocument { id, data } = document;
    let typed: D = serde_json::from_value(Value::Object(data))
        .map_err(|e| StoreError::decode(D::COLLECTION, &id, e))?;
    typed.into_entity(id)
}

pub fn decode_all<D: EntityDocument>(documents: Vec<StoredDocument>) -> StoreResult<Vec<D::Entity>> {
    documents.into_iter().map(decode::<D>).collect()
}

/// Serializes a document or patch into a field map.
pub fn encode<T: Serialize>(value: &T) -> StoreResult<Fields> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::Encode(format!("expected an object, got {}", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(id: &str, value: Value) -> StoredDocument {
        match value {
            Value::Object(map) => StoredDocument::new(id, map),
            _ => panic!("fixture must be an object"),
        }
    }

    #[test]
    fn test_value_ordering() {
        let null = Value::Null;
        let t = json!(true);
        let n = json!(3);
        let s = json!("a");
        assert_eq!(compare_values(None, Some(&null)), Ordering::Equal);
        assert_eq!(compare_values(Some(&null), Some(&t)), Ordering::Less);
        assert_eq!(compare_values(Some(&t), Some(&n)), Ordering::Less);
        assert_eq!(compare_values(Some(&n), Some(&s)), Ordering::Less);
        assert_eq!(compare_values(Some(&json!(2.5)), Some(&json!(10))), Ordering::Less);
        assert_eq!(compare_values(Some(&json!("b")), Some(&json!("a"))), Ordering::Greater);
    }

    #[test]
    fn test_query_filters_sort_and_limit() {
        let docs = vec![
            doc("1", json!({"flowType": "faturamento", "name": "C"})),
            doc("2", json!({"flowType": "cupom", "name": "A"})),
            doc("3", json!({"flowType": "faturamento", "name": "A"})),
            doc("4", json!({"flowType": "faturamento"})),
        ];

        let query = Query::new()
            .where_eq("flowType", "faturamento")
            .order_by("name", Direction::Asc);
        let ids: Vec<String> = query.apply(docs.clone()).into_iter().map(|d| d.id).collect();
        assert_eq!(ids, vec!["4", "3", "1"]);

        let query = Query::new().order_by("name", Direction::Desc).limit(2);
        let ids: Vec<String> = query.apply(docs.clone()).into_iter().map(|d| d.id).collect();
        assert_eq!(ids, vec!["1", "2"]);

        let query = Query::new().where_in("name", ["A", "B"]);
        assert_eq!(query.apply(docs).len(), 2);
    }

    #[test]
    fn test_encode_rejects_non_objects() {
        assert!(encode(&json!({"a": 1})).is_ok());
        assert!(matches!(encode(&json!([1, 2])), Err(StoreError::Encode(_))));
    }
}
