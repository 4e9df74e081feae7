//! CheckoutCoordinator - the object checkout code holds
//!
//! Owns one [`RequestDeduplicator`], one [`Prefetcher`] and the payload shape.
//! Checkout code submits through it instead of calling the transport
//! directly; there is no global state and nothing is patched in place.

use std::sync::Arc;

use serde_json::{Map, Value};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::config::Config;
use crate::dedup::{DedupError, DedupStats, RequestDeduplicator, SubmitOutcome};
use crate::form::PaymentForm;
use crate::payload::PayloadShape;
use crate::prefetch::{PrefetchReport, Prefetcher};
use crate::transport::{RequestOptions, Transport};

pub struct CheckoutCoordinator {
    dedup: RequestDeduplicator,
    prefetcher: Option<Prefetcher>,
    shape: PayloadShape,
    payment_endpoint: String,
    processing_label: String,
}

impl CheckoutCoordinator {
    /// Build every part from config around one shared transport
    pub fn new(config: &Config, transport: Arc<dyn Transport>) -> Result<Self, DedupError> {
        debug!("CheckoutCoordinator::new: called");
        let dedup = RequestDeduplicator::from_config(Arc::clone(&transport), &config.dedup)?;
        let prefetcher = config
            .prefetch
            .enabled
            .then(|| Prefetcher::new(Arc::clone(&transport), config.prefetch.resources.clone()));

        Ok(Self {
            dedup,
            prefetcher,
            shape: PayloadShape::from_config(&config.payment),
            payment_endpoint: config.payment.endpoint.clone(),
            processing_label: config.form.processing_label.clone(),
        })
    }

    /// Start background work: the resource prefetch, when enabled
    pub fn init(&self) -> Option<JoinHandle<PrefetchReport>> {
        info!(prefetch = self.prefetcher.is_some(), "CheckoutCoordinator::init: called");
        self.prefetcher.as_ref().map(Prefetcher::start)
    }

    /// Submit any request through the deduplicator
    pub async fn submit(&self, url: &str, options: RequestOptions) -> SubmitOutcome {
        self.dedup.submit(url, options).await
    }

    /// Shape a payment payload and POST it to the payment endpoint
    pub async fn submit_payment(&self, payload: &Map<String, Value>) -> SubmitOutcome {
        let shaped = self.shape.shape(payload);
        debug!(endpoint = %self.payment_endpoint, fields = shaped.len(), "CheckoutCoordinator::submit_payment: called");
        self.dedup
            .submit(&self.payment_endpoint, RequestOptions::post_json(Value::Object(shaped)))
            .await
    }

    pub fn shape_payload(&self, payload: &Map<String, Value>) -> Map<String, Value> {
        self.shape.shape(payload)
    }

    /// Apply the submit loading state when the form is a payment form
    pub fn on_form_submit(&self, form: &mut PaymentForm) -> bool {
        if !form.is_payment_form() {
            return false;
        }
        form.on_submit(&self.processing_label);
        true
    }

    pub fn payment_endpoint(&self) -> &str {
        &self.payment_endpoint
    }

    pub fn deduplicator(&self) -> &RequestDeduplicator {
        &self.dedup
    }

    pub fn stats(&self) -> DedupStats {
        self.dedup.stats()
    }
}
