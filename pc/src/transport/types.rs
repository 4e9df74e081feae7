//! Request/response types for the network primitive
//!
//! These mirror the shape of a browser fetch call closely enough that checkout
//! code can swap a direct call for a deduplicated one without changing how it
//! builds requests or reads responses.

use std::collections::BTreeMap;
use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// HTTP method for an outgoing request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    #[default]
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Method {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "GET" => Ok(Method::Get),
            "POST" => Ok(Method::Post),
            "PUT" => Ok(Method::Put),
            "PATCH" => Ok(Method::Patch),
            "DELETE" => Ok(Method::Delete),
            other => Err(format!("Unsupported method: {}", other)),
        }
    }
}

/// Request body payload
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// Structured JSON, fingerprinted canonically
    Json(serde_json::Value),
    /// Pre-serialized text, fingerprinted verbatim
    Text(String),
}

/// Options for one outgoing request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestOptions {
    pub method: Method,
    pub headers: BTreeMap<String, String>,
    pub body: Option<RequestBody>,
}

impl RequestOptions {
    /// Plain GET with no body
    pub fn get() -> Self {
        Self::default()
    }

    /// POST carrying a JSON body
    pub fn post_json(body: serde_json::Value) -> Self {
        debug!("RequestOptions::post_json: called");
        Self {
            method: Method::Post,
            headers: BTreeMap::new(),
            body: Some(RequestBody::Json(body)),
        }
    }

    /// POST carrying a pre-serialized text body
    pub fn post_text(body: impl Into<String>) -> Self {
        debug!("RequestOptions::post_text: called");
        Self {
            method: Method::Post,
            headers: BTreeMap::new(),
            body: Some(RequestBody::Text(body.into())),
        }
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

/// Response from the network primitive
///
/// Non-2xx statuses are still responses; only transport failures are errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl Response {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: BTreeMap::new(),
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Deserialize the body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        debug!(status = self.status, body_len = self.body.len(), "Response::json: called");
        serde_json::from_str(&self.body)
    }
}
