//! In-flight request deduplication
//!
//! The core of paycoord. A [`RequestDeduplicator`] sits in front of a
//! [`Transport`](crate::transport::Transport) and guarantees that, for
//! watched URLs, at most one network call per [`Fingerprint`] is outstanding.
//!
//! ```text
//!  submit(url, body) ──► watched? ──no──► transport.perform ──► Response
//!                          │
//!                         yes
//!                          ▼
//!               Fingerprint(url, canonical body)
//!                          │
//!            ┌─── entry exists? ───┐
//!           yes                    no
//!            │                     │
//!     clone shared call     start call, insert entry,
//!            │              spawn eviction (settle + grace)
//!            └──────────┬──────────┘
//!                       ▼
//!            await shared outcome (same Arc for everyone)
//! ```

mod deduplicator;
mod error;
mod fingerprint;
mod stats;
mod watch;

pub use deduplicator::{RequestDeduplicator, SubmitOutcome};
pub use error::DedupError;
pub use fingerprint::{BodyKind, Fingerprint, canonical_json};
pub use stats::DedupStats;
pub use watch::{REGEX_PREFIX, WatchList, WatchPattern};

/// Grace window after settlement before an entry is evicted
pub const DEFAULT_GRACE_WINDOW_MS: u64 = 1000;

/// Payment submission endpoint watched by default
pub const DEFAULT_WATCH_PATTERN: &str = "/api/pagar";
