//! paycoord - checkout payment request coordinator
//!
//! Sits between checkout code and the network. Concurrent identical payment
//! submissions collapse into one in-flight call whose outcome every caller
//! shares; dependent resources are pre-warmed; payment payloads are trimmed
//! to what the endpoint needs.
//!
//! # Modules
//!
//! - [`dedup`] - in-flight request deduplication (the core)
//! - [`transport`] - network primitive trait and reqwest implementation
//! - [`coordinator`] - the object checkout code holds
//! - [`prefetch`] - background resource warm-up
//! - [`form`] - payment form validation and loading state
//! - [`payload`] - payment payload shaping
//! - [`config`] - configuration types and loading
//! - [`cli`] - command-line interface
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use paycoord::{CheckoutCoordinator, Config, HttpTransport};
//!
//! let config = Config::load(None)?;
//! let transport = Arc::new(HttpTransport::from_config(&config.http)?);
//! let coordinator = CheckoutCoordinator::new(&config, transport)?;
//! coordinator.init();
//! let response = coordinator.submit_payment(&payload).await?;
//! ```

pub mod cli;
pub mod config;
pub mod coordinator;
pub mod dedup;
pub mod form;
pub mod payload;
pub mod prefetch;
pub mod transport;

// Re-export commonly used types
pub use config::{Config, DedupConfig, FormConfig, HttpConfig, PaymentConfig, PrefetchConfig};
pub use coordinator::CheckoutCoordinator;
pub use dedup::{DedupError, DedupStats, Fingerprint, RequestDeduplicator, SubmitOutcome, WatchList, WatchPattern};
pub use form::{FormField, PaymentForm, SubmitControl, validate_field};
pub use payload::PayloadShape;
pub use prefetch::{PrefetchReport, Prefetcher};
pub use transport::{HttpTransport, Method, NetworkError, RequestBody, RequestOptions, Response, Transport};
