//! Network error types

use std::time::Duration;
use thiserror::Error;

/// Errors raised by the underlying network primitive
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("Failed to read response body: {0}")]
    Body(String),

    #[error("Request aborted: {0}")]
    Aborted(String),
}

impl NetworkError {
    /// Check if this error came from a timeout
    pub fn is_timeout(&self) -> bool {
        match self {
            NetworkError::Timeout(_) => true,
            NetworkError::Http(e) => e.is_timeout(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_url_message() {
        let err = NetworkError::InvalidUrl("/api/pagar".to_string());
        assert!(err.to_string().contains("/api/pagar"));
    }

    #[test]
    fn test_is_timeout() {
        assert!(NetworkError::Timeout(Duration::from_secs(30)).is_timeout());
        assert!(!NetworkError::Body("eof".to_string()).is_timeout());
        assert!(!NetworkError::Aborted("gone".to_string()).is_timeout());
    }
}
