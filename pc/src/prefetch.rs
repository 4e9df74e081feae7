//! Fire-and-forget warm-up of resources the checkout flow needs next

use std::sync::Arc;

use futures::future::join_all;
use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::transport::{RequestOptions, Transport};

/// Outcome of one prefetch pass, for diagnostics only
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PrefetchReport {
    pub warmed: Vec<String>,
    pub failed: Vec<String>,
}

/// Fetches a fixed resource list in the background
pub struct Prefetcher {
    transport: Arc<dyn Transport>,
    resources: Vec<String>,
}

impl Prefetcher {
    pub fn new(transport: Arc<dyn Transport>, resources: Vec<String>) -> Self {
        debug!(count = resources.len(), "Prefetcher::new: called");
        Self { transport, resources }
    }

    pub fn resources(&self) -> &[String] {
        &self.resources
    }

    /// Start fetching every resource concurrently
    ///
    /// The returned handle may be dropped; the task keeps running. Failures
    /// and non-2xx statuses are logged and reported, never raised.
    pub fn start(&self) -> JoinHandle<PrefetchReport> {
        let transport = Arc::clone(&self.transport);
        let resources = self.resources.clone();

        tokio::spawn(async move {
            let fetches = resources.iter().map(|url| {
                let transport = Arc::clone(&transport);
                async move {
                    let ok = match transport.perform(url, &RequestOptions::get()).await {
                        Ok(resp) if resp.is_success() => true,
                        Ok(resp) => {
                            warn!(%url, status = resp.status, "Prefetcher: non-success status");
                            false
                        }
                        Err(e) => {
                            warn!(%url, error = %e, "Prefetcher: fetch failed");
                            false
                        }
                    };
                    (url.clone(), ok)
                }
            });

            let mut report = PrefetchReport::default();
            for (url, ok) in join_all(fetches).await {
                if ok {
                    report.warmed.push(url);
                } else {
                    report.failed.push(url);
                }
            }
            info!(
                warmed = report.warmed.len(),
                failed = report.failed.len(),
                "Prefetcher: pass complete"
            );
            report
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::client::mock::MockTransport;
    use crate::transport::{NetworkError, Response};
    use std::time::Duration;

    fn resources() -> Vec<String> {
        vec!["/js/checkout-new.js".to_string(), "/js/payment-status.js".to_string()]
    }

    #[tokio::test(start_paused = true)]
    async fn test_prefetch_fetches_every_resource() {
        let transport = Arc::new(MockTransport::new(Duration::from_millis(20)));
        let prefetcher = Prefetcher::new(transport.clone(), resources());

        let report = prefetcher.start().await.unwrap();

        assert_eq!(report.warmed, resources());
        assert!(report.failed.is_empty());
        assert_eq!(transport.call_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_prefetch_failures_are_reported_not_raised() {
        let transport = Arc::new(MockTransport::with_responder(Duration::ZERO, |url, _| {
            if url.ends_with("payment-status.js") {
                Ok(Response::new(404, "not found"))
            } else if url.ends_with("checkout-new.js") {
                Err(NetworkError::Aborted("offline".to_string()))
            } else {
                Ok(Response::new(200, ""))
            }
        }));
        let prefetcher = Prefetcher::new(transport, resources());

        let report = prefetcher.start().await.unwrap();

        assert!(report.warmed.is_empty());
        assert_eq!(report.failed.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_handle_keeps_running() {
        let transport = Arc::new(MockTransport::new(Duration::from_millis(50)));
        let prefetcher = Prefetcher::new(transport.clone(), resources());

        drop(prefetcher.start());
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert_eq!(transport.call_count(), 2);
    }

    #[tokio::test]
    async fn test_empty_resource_list() {
        let transport = Arc::new(MockTransport::new(Duration::ZERO));
        let report = Prefetcher::new(transport, vec![]).start().await.unwrap();
        assert_eq!(report, PrefetchReport::default());
    }
}
