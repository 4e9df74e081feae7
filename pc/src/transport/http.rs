//! reqwest-backed network primitive

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use super::{Method, NetworkError, RequestBody, RequestOptions, Response, Transport};
use crate::config::HttpConfig;

/// HTTP transport over a shared reqwest client
pub struct HttpTransport {
    http: Client,
    base_url: Option<String>,
    timeout: Duration,
}

impl HttpTransport {
    /// Create a transport from the `http` config section
    pub fn from_config(config: &HttpConfig) -> Result<Self, NetworkError> {
        debug!(?config, "HttpTransport::from_config: called");
        let timeout = Duration::from_millis(config.timeout_ms);

        let http = Client::builder()
            .timeout(timeout)
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            timeout,
        })
    }

    /// Resolve a possibly relative URL against the base URL
    pub fn resolve_url(&self, url: &str) -> Result<String, NetworkError> {
        resolve_url(self.base_url.as_deref(), url)
    }
}

fn resolve_url(base_url: Option<&str>, url: &str) -> Result<String, NetworkError> {
    if url.starts_with("http://") || url.starts_with("https://") {
        return Ok(url.to_string());
    }

    match base_url {
        Some(base) if url.starts_with('/') => Ok(format!("{}{}", base.trim_end_matches('/'), url)),
        Some(base) => Ok(format!("{}/{}", base.trim_end_matches('/'), url)),
        None => {
            debug!(%url, "resolve_url: relative URL without base-url");
            Err(NetworkError::InvalidUrl(format!(
                "{} (relative URL requires http.base-url, or use http:// or https://)",
                url
            )))
        }
    }
}

fn to_reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Patch => reqwest::Method::PATCH,
        Method::Delete => reqwest::Method::DELETE,
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn perform(&self, url: &str, options: &RequestOptions) -> Result<Response, NetworkError> {
        let full_url = self.resolve_url(url)?;
        debug!(%full_url, method = %options.method, "HttpTransport::perform: sending request");

        let mut builder = self.http.request(to_reqwest_method(options.method), &full_url);
        for (name, value) in &options.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder = match &options.body {
            Some(RequestBody::Json(value)) => builder.json(value),
            Some(RequestBody::Text(text)) => builder.body(text.clone()),
            None => builder,
        };

        let response = builder.send().await.map_err(|e| {
            debug!(%e, "HttpTransport::perform: request failed");
            if e.is_timeout() {
                NetworkError::Timeout(self.timeout)
            } else {
                NetworkError::Http(e)
            }
        })?;

        let status = response.status().as_u16();
        let headers: BTreeMap<String, String> = response
            .headers()
            .iter()
            .filter_map(|(name, value)| value.to_str().ok().map(|v| (name.to_string(), v.to_string())))
            .collect();

        let body = response.text().await.map_err(|e| NetworkError::Body(e.to_string()))?;
        debug!(%status, body_len = body.len(), "HttpTransport::perform: response received");

        Ok(Response { status, headers, body })
    }
}
