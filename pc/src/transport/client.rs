//! Transport trait definition

use async_trait::async_trait;

use super::{NetworkError, RequestOptions, Response};

/// The network primitive the coordinator wraps
///
/// Every call is independent. Implementations must be shareable across tasks
/// since one in-flight call can be awaited by many submitters.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Perform one request and return its response
    async fn perform(&self, url: &str, options: &RequestOptions) -> Result<Response, NetworkError>;
}
