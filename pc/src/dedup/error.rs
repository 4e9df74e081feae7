//! Deduplication error types

use std::sync::Arc;
use thiserror::Error;

use crate::transport::NetworkError;

/// Errors surfaced by the request deduplicator
///
/// Cloneable so one outcome can be handed to every caller sharing a call.
#[derive(Debug, Clone, Error)]
pub enum DedupError {
    /// The underlying call failed; every sharing caller gets the same `Arc`
    #[error("Network error: {0}")]
    Network(Arc<NetworkError>),

    #[error("Cannot fingerprint request body: {0}")]
    Serialization(String),

    #[error("Invalid watch pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },
}

impl DedupError {
    /// The shared network failure, if this is one
    pub fn network(&self) -> Option<&Arc<NetworkError>> {
        match self {
            DedupError::Network(e) => Some(e),
            _ => None,
        }
    }
}

impl From<NetworkError> for DedupError {
    fn from(err: NetworkError) -> Self {
        DedupError::Network(Arc::new(err))
    }
}

impl From<serde_json::Error> for DedupError {
    fn from(err: serde_json::Error) -> Self {
        DedupError::Serialization(err.to_string())
    }
}
