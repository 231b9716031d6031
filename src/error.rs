//! Error types for federated query operations

use thiserror::Error;

/// Result type alias for federation operations
pub type Result<T> = std::result::Result<T, FederationError>;

/// Main error type for federated query operations
#[derive(Error, Debug)]
pub enum FederationError {
    /// Transport failure against a remote endpoint (non-2xx status or
    /// network error)
    #[error("Transport error: {0}")]
    Transport(String),

    /// Response failed SPARQL JSON results shape validation
    #[error("Malformed result: {0}")]
    MalformedResult(String),

    /// Local store failure (population or persistence)
    #[error("Store error: {0}")]
    Store(String),

    /// Configuration error (catalog or data source setup)
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<reqwest::Error> for FederationError {
    fn from(err: reqwest::Error) -> Self {
        FederationError::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for FederationError {
    fn from(err: serde_json::Error) -> Self {
        FederationError::MalformedResult(err.to_string())
    }
}

impl From<oxigraph::store::StorageError> for FederationError {
    fn from(err: oxigraph::store::StorageError) -> Self {
        FederationError::Store(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = FederationError::Transport("connection refused".to_string());
        assert_eq!(err.to_string(), "Transport error: connection refused");

        let err = FederationError::MalformedResult("missing 'head' property".to_string());
        assert_eq!(err.to_string(), "Malformed result: missing 'head' property");
    }
}
