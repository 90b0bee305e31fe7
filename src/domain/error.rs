use thiserror::Error;

/// Core domain errors
///
/// A missing key is not an error: lookups return `Ok(None)` instead.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Store unavailable: {message}")]
    StoreUnavailable { message: String },

    #[error("Decode error: {message}")]
    Decode { message: String },

    #[error("Fetch error: {resource} - {message}")]
    Fetch { resource: String, message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Document store error: {message}")]
    Document { message: String },
}

impl DomainError {
    pub fn store(message: impl Into<String>) -> Self {
        Self::StoreUnavailable {
            message: message.into(),
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    pub fn fetch(resource: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Fetch {
            resource: resource.into(),
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn document(message: impl Into<String>) -> Self {
        Self::Document {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error() {
        let error = DomainError::store("connection refused");
        assert_eq!(error.to_string(), "Store unavailable: connection refused");
    }

    #[test]
    fn test_decode_error() {
        let error = DomainError::decode("not an integer");
        assert_eq!(error.to_string(), "Decode error: not an integer");
    }

    #[test]
    fn test_fetch_error() {
        let error = DomainError::fetch("http://example.com", "timed out");
        assert_eq!(error.to_string(), "Fetch error: http://example.com - timed out");
    }
}
