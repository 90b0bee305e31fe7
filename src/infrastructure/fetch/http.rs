//! HTTP fetcher using reqwest

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::domain::fetch::Fetcher;
use crate::domain::DomainError;

/// Fetches resource bodies with HTTP GET
///
/// The body is returned whatever the status code; only transport and
/// body-read failures are errors.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, DomainError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                DomainError::configuration(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self { client })
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, resource: &str) -> Result<String, DomainError> {
        let response = self
            .client
            .get(resource)
            .send()
            .await
            .map_err(|e| DomainError::fetch(resource, format!("Request failed: {}", e)))?;

        let status = response.status();

        let body = response
            .text()
            .await
            .map_err(|e| DomainError::fetch(resource, format!("Failed to read body: {}", e)))?;

        debug!(resource, status = status.as_u16(), bytes = body.len(), "Fetched resource");

        Ok(body)
    }
}
