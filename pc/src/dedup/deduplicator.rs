//! RequestDeduplicator - collapses concurrent identical payment submissions

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::stats::DedupCounters;
use super::{DedupError, DedupStats, Fingerprint, WatchList};
use crate::config::DedupConfig;
use crate::transport::{Method, RequestBody, RequestOptions, Response, Transport};

/// Outcome handed to every caller of one underlying call
pub type SubmitOutcome = Result<Arc<Response>, DedupError>;

type SharedCall = Shared<BoxFuture<'static, SubmitOutcome>>;

/// One in-flight (or recently settled) submission
struct PendingRequest {
    id: u64,
    call: SharedCall,
}

/// Wraps a [`Transport`] and deduplicates watched submissions
///
/// For URLs on the watch-list, submissions with the same [`Fingerprint`]
/// share a single underlying call while its entry lives: from the first
/// submission until `grace_window` after the call settles. Everything else
/// passes straight through to the transport.
pub struct RequestDeduplicator {
    transport: Arc<dyn Transport>,
    watch: WatchList,
    grace_window: Duration,
    pending: Arc<Mutex<HashMap<Fingerprint, PendingRequest>>>,
    next_id: AtomicU64,
    counters: Arc<DedupCounters>,
}

impl RequestDeduplicator {
    pub fn new(transport: Arc<dyn Transport>, watch: WatchList, grace_window: Duration) -> Self {
        debug!(patterns = watch.len(), ?grace_window, "RequestDeduplicator::new: called");
        Self {
            transport,
            watch,
            grace_window,
            pending: Arc::new(Mutex::new(HashMap::new())),
            next_id: AtomicU64::new(0),
            counters: Arc::new(DedupCounters::default()),
        }
    }

    /// Build from the `dedup` config section
    pub fn from_config(transport: Arc<dyn Transport>, config: &DedupConfig) -> Result<Self, DedupError> {
        let watch = WatchList::parse(&config.watch)?;
        Ok(Self::new(transport, watch, config.grace_window()))
    }

    pub fn is_watched(&self, url: &str) -> bool {
        self.watch.matches(url)
    }

    pub fn grace_window(&self) -> Duration {
        self.grace_window
    }

    /// Drop-in replacement for `Transport::perform`
    ///
    /// Watched URLs are deduplicated by fingerprint; the returned outcome is
    /// the same `Arc` every sharing caller receives. Dropping this future does
    /// not cancel the underlying call.
    pub async fn submit(&self, url: &str, options: RequestOptions) -> SubmitOutcome {
        DedupCounters::bump(&self.counters.submissions);

        if !self.watch.matches(url) {
            debug!(%url, "RequestDeduplicator::submit: not watched, passing through");
            DedupCounters::bump(&self.counters.passthrough);
            return self
                .transport
                .perform(url, &options)
                .await
                .map(Arc::new)
                .map_err(DedupError::from);
        }

        let key = Fingerprint::new(url, options.body.as_ref())?;
        let call = self.claim(key, url, options).await;
        call.await
    }

    /// Serialize `body` as JSON and submit it
    ///
    /// Values that cannot become JSON fail here with `Serialization` instead
    /// of silently skipping deduplication.
    pub async fn submit_json<T>(&self, url: &str, method: Method, body: &T) -> SubmitOutcome
    where
        T: Serialize + ?Sized,
    {
        let value = serde_json::to_value(body)?;
        let options = RequestOptions {
            method,
            body: Some(RequestBody::Json(value)),
            ..Default::default()
        };
        self.submit(url, options).await
    }

    /// Return the existing call for `key`, or start one and register it
    async fn claim(&self, key: Fingerprint, url: &str, options: RequestOptions) -> SharedCall {
        let mut pending = self.pending.lock().await;

        if let Some(entry) = pending.get(&key) {
            debug!(%url, id = entry.id, "RequestDeduplicator::claim: joining in-flight call");
            DedupCounters::bump(&self.counters.coalesced);
            return entry.call.clone();
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let transport = Arc::clone(&self.transport);
        let target = url.to_string();
        let call = async move {
            transport
                .perform(&target, &options)
                .await
                .map(Arc::new)
                .map_err(DedupError::from)
        }
        .boxed()
        .shared();

        pending.insert(
            key.clone(),
            PendingRequest {
                id,
                call: call.clone(),
            },
        );
        DedupCounters::bump(&self.counters.dispatched);
        info!(%url, id, "RequestDeduplicator::claim: dispatched new call");

        self.spawn_eviction(key, id, call.clone());
        call
    }

    /// Drive `call` to completion, then drop its entry after the grace window
    fn spawn_eviction(&self, key: Fingerprint, id: u64, call: SharedCall) {
        let pending = Arc::clone(&self.pending);
        let counters = Arc::clone(&self.counters);
        let grace_window = self.grace_window;

        tokio::spawn(async move {
            let outcome = call.await;
            debug!(id, ok = outcome.is_ok(), "RequestDeduplicator: call settled, grace window started");
            tokio::time::sleep(grace_window).await;

            let mut pending = pending.lock().await;
            if pending.get(&key).is_some_and(|entry| entry.id == id) {
                pending.remove(&key);
                DedupCounters::bump(&counters.evicted);
                debug!(id, url = key.url(), "RequestDeduplicator: entry evicted");
            }
        });
    }

    /// Number of entries currently held (in flight or inside the grace window)
    pub async fn pending_count(&self) -> usize {
        self.pending.lock().await.len()
    }

    pub fn stats(&self) -> DedupStats {
        self.counters.snapshot()
    }
}
