//! Fetch collaborator trait

use std::fmt::Debug;

use async_trait::async_trait;

use crate::domain::DomainError;

#[cfg(test)]
use mockall::automock;

/// Fetches the body of a resource, typically over HTTP
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Fetcher: Send + Sync + Debug {
    async fn fetch(&self, resource: &str) -> Result<String, DomainError>;
}
