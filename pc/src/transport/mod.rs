//! Network primitive for paycoord
//!
//! The coordinator never talks to the network directly; it goes through a
//! [`Transport`]. Production uses [`HttpTransport`], tests inject mocks.

pub mod client;
mod error;
mod http;
mod types;

pub use client::Transport;
pub use error::NetworkError;
pub use http::HttpTransport;
pub use types::{Method, RequestBody, RequestOptions, Response};
