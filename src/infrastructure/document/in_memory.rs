//! In-memory document collection

use std::sync::RwLock;

use async_trait::async_trait;
use tracing::debug;

use crate::domain::document::{matches_filter, Document, DocumentCollection};
use crate::domain::DomainError;

/// Thread-safe in-memory document collection
///
/// Useful for testing and development. Data is lost when the process terminates.
#[derive(Debug, Default)]
pub struct InMemoryCollection {
    documents: RwLock<Vec<Document>>,
}

impl InMemoryCollection {
    /// Creates a new empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a collection pre-populated with documents
    pub fn with_documents(documents: Vec<Document>) -> Self {
        Self {
            documents: RwLock::new(documents),
        }
    }

    /// Appends a document
    pub fn insert(&self, document: Document) -> Result<(), DomainError> {
        let mut documents = self.documents.write().map_err(|e| {
            DomainError::document(format!("Failed to acquire write lock: {}", e))
        })?;

        documents.push(document);
        Ok(())
    }
}

#[async_trait]
impl DocumentCollection for InMemoryCollection {
    async fn update_many(&self, filter: &Document, update: &Document) -> Result<u64, DomainError> {
        let mut documents = self.documents.write().map_err(|e| {
            DomainError::document(format!("Failed to acquire write lock: {}", e))
        })?;

        let mut matched = 0u64;

        for document in documents.iter_mut().filter(|d| matches_filter(d, filter)) {
            for (field, value) in update {
                document.insert(field.clone(), value.clone());
            }
            matched += 1;
        }

        debug!(matched, "Updated documents");
        Ok(matched)
    }

    async fn find(&self, filter: &Document) -> Result<Vec<Document>, DomainError> {
        let documents = self.documents.read().map_err(|e| {
            DomainError::document(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(documents
            .iter()
            .filter(|d| matches_filter(d, filter))
            .cloned()
            .collect())
    }
}
