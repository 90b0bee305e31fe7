//! Document collection trait

use std::fmt::Debug;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::domain::DomainError;

/// A schemaless document
pub type Document = Map<String, Value>;

/// Minimal document-store collaborator
///
/// Shares no state with the cache core.
#[async_trait]
pub trait DocumentCollection: Send + Sync + Debug {
    /// Sets the fields of `update` on every document whose fields equal
    /// those of `filter`, returning the number of matched documents
    async fn update_many(&self, filter: &Document, update: &Document) -> Result<u64, DomainError>;

    /// Returns every document matching `filter`
    async fn find(&self, filter: &Document) -> Result<Vec<Document>, DomainError>;
}

/// Checks if every field of `filter` is present with an equal value
pub fn matches_filter(document: &Document, filter: &Document) -> bool {
    filter
        .iter()
        .all(|(field, expected)| document.get(field) == Some(expected))
}

/// Replaces the topics of every school document named `name`
pub async fn update_topics<C>(collection: &C, name: &str, topics: &[String]) -> Result<u64, DomainError>
where
    C: DocumentCollection + ?Sized,
{
    let mut filter = Document::new();
    filter.insert("name".to_string(), Value::from(name));

    let mut update = Document::new();
    update.insert("topics".to_string(), Value::from(topics.to_vec()));

    collection.update_many(&filter, &update).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_matches_filter() {
        let document = doc(json!({"name": "Holberton", "city": "SF"}));

        assert!(matches_filter(&document, &doc(json!({"name": "Holberton"}))));
        assert!(matches_filter(&document, &Document::new()));
        assert!(!matches_filter(&document, &doc(json!({"name": "UCSF"}))));
        assert!(!matches_filter(&document, &doc(json!({"missing": 1}))));
    }
}
