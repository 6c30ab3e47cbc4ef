//! Metadata documents.
//!
//! A document is a flat or nested JSON object. The store treats it as opaque
//! except for equality filters and top-level field projection.

use crate::query::Filter;
use crate::store::MetaStoreResult;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Field every document is expected to carry as its identity
pub const ID_FIELD: &str = "_id";

/// A JSON object stored in a namespace
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document(Map<String, Value>);

impl Document {
    #[must_use]
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Builder-style insert
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert or replace a field, returning the previous value
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// String field, or `None` if absent or not a string
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Whether every field of `filter` is present here with an equal value
    #[must_use]
    pub fn matches(&self, filter: &Filter) -> bool {
        filter
            .fields()
            .all(|(key, expected)| self.0.get(key) == Some(expected))
    }

    /// Copy of this document restricted to `fields` plus the identity field
    #[must_use]
    pub fn project(&self, fields: &[String]) -> Self {
        let map = self
            .0
            .iter()
            .filter(|(key, _)| key.as_str() == ID_FIELD || fields.iter().any(|f| f == *key))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        Self(map)
    }

    /// Encode for storage
    pub fn to_bytes(&self) -> MetaStoreResult<Vec<u8>> {
        Ok(serde_json::to_vec(&self.0)?)
    }

    /// Decode a stored document
    pub fn from_bytes(bytes: &[u8]) -> MetaStoreResult<Self> {
        Ok(Self(serde_json::from_slice(bytes)?))
    }
}

impl From<Map<String, Value>> for Document {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_equality_filter() {
        let doc = Document::new().with("name", "a").with("size", 3);
        assert!(doc.matches(&Filter::all()));
        assert!(doc.matches(&Filter::equals("name", "a")));
        assert!(doc.matches(&Filter::equals("name", "a").and("size", 3)));
        assert!(!doc.matches(&Filter::equals("name", "b")));
        assert!(!doc.matches(&Filter::equals("owner", "root")));
    }

    #[test]
    fn test_project_keeps_id() {
        let doc = Document::new()
            .with(ID_FIELD, "42")
            .with("name", "a")
            .with("store", "s");
        let projected = doc.project(&["name".to_string()]);
        assert_eq!(projected.len(), 2);
        assert_eq!(projected.get_str(ID_FIELD), Some("42"));
        assert_eq!(projected.get_str("name"), Some("a"));
        assert!(!projected.contains_key("store"));
    }

    #[test]
    fn test_from_bytes_rejects_non_object() {
        assert!(Document::from_bytes(b"[1, 2]").is_err());
        assert!(Document::from_bytes(b"{\"name\": \"a\"}").is_ok());
    }
}
