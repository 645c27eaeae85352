//! HTTP transport
//!
//! The request client never talks to the network itself; it hands an
//! [`OutgoingRequest`] to a [`Transport`] and gets a [`ResponseEnvelope`]
//! back. [`ReqwestTransport`] is the production implementation.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE},
    Method, StatusCode,
};
use tracing::{debug, trace};

use crate::{
    config::TransportConfig,
    error::{RestError, Result},
    headers::HeaderList,
};

/// A request ready for dispatch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingRequest {
    /// HTTP method
    pub method: Method,
    /// Fully resolved target URL
    pub url: String,
    /// Body text (empty for body-less requests)
    pub body: String,
    /// Client-level headers, authorization included
    pub default_headers: HeaderList,
    /// Headers produced while building the body
    pub content_headers: HeaderList,
}

impl OutgoingRequest {
    /// Create a body-less request
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            body: String::new(),
            default_headers: HeaderList::new(),
            content_headers: HeaderList::new(),
        }
    }

    /// Set body text
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// Set client-level headers
    pub fn with_default_headers(mut self, headers: HeaderList) -> Self {
        self.default_headers = headers;
        self
    }

    /// Set content headers
    pub fn with_content_headers(mut self, headers: HeaderList) -> Self {
        self.content_headers = headers;
        self
    }

    /// Headers to put on the wire: defaults first, then content headers
    ///
    /// `Content-Type` is left off when the body is empty.
    pub fn headers(&self) -> impl Iterator<Item = (&str, &str)> {
        let has_body = !self.body.is_empty();
        let content = self
            .content_headers
            .iter()
            .filter(move |(name, _)| has_body || !name.eq_ignore_ascii_case(CONTENT_TYPE.as_str()));
        self.default_headers.iter().chain(content)
    }
}

/// A response as read back from the transport
#[derive(Debug, Clone)]
pub struct ResponseEnvelope {
    /// HTTP status code
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Body text
    pub body: String,
}

impl ResponseEnvelope {
    /// Create a response without headers
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    /// Set response headers
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Check if the response status is a success (2xx)
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Check if the response status is a client error (4xx)
    pub fn is_client_error(&self) -> bool {
        self.status.is_client_error()
    }

    /// Check if the response status is a server error (5xx)
    pub fn is_server_error(&self) -> bool {
        self.status.is_server_error()
    }
}

/// Mockable HTTP transport trait
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a request and read the whole response
    ///
    /// Implementations must not interpret the status code.
    async fn execute(&self, request: &OutgoingRequest) -> Result<ResponseEnvelope>;
}

/// Production transport backed by reqwest
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    inner: reqwest::Client,
    config: TransportConfig,
}

impl ReqwestTransport {
    /// Create a new transport with configuration
    pub fn new(config: TransportConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(&config.user_agent)
            .redirect(if config.max_redirects > 0 {
                reqwest::redirect::Policy::limited(config.max_redirects)
            } else {
                reqwest::redirect::Policy::none()
            });

        if let Some(proxy_url) = &config.proxy {
            let proxy = reqwest::Proxy::all(proxy_url)
                .map_err(|e| RestError::InvalidProxy(e.to_string()))?;
            builder = builder.proxy(proxy);
        }

        let inner = builder
            .build()
            .map_err(|e| RestError::BuildError(e.to_string()))?;

        Ok(Self { inner, config })
    }

    /// Create transport with default configuration
    pub fn with_defaults() -> Result<Self> {
        Self::new(TransportConfig::default())
    }

    /// Wrap an already configured reqwest client
    pub fn from_client(inner: reqwest::Client) -> Self {
        Self {
            inner,
            config: TransportConfig::default(),
        }
    }

    /// Get underlying reqwest client (for advanced usage)
    pub fn inner(&self) -> &reqwest::Client {
        &self.inner
    }

    /// Get configuration
    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    fn header_map(request: &OutgoingRequest) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        for (name, value) in request.headers() {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| RestError::InvalidHeader(format!("{name}: {e}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| RestError::InvalidHeader(format!("{name}: {e}")))?;
            headers.insert(name, value);
        }
        Ok(headers)
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: &OutgoingRequest) -> Result<ResponseEnvelope> {
        let url = request
            .url
            .parse::<url::Url>()
            .map_err(|e| RestError::InvalidUrl(format!("{}: {e}", request.url)))?;

        debug!("HTTP {}: {}", request.method, url);
        trace!(body = %request.body, "Request body");

        let mut builder = self
            .inner
            .request(request.method.clone(), url)
            .headers(Self::header_map(request)?);

        if !request.body.is_empty() {
            builder = builder.body(request.body.clone());
        }

        let response = builder.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.text().await?;

        debug!("HTTP {} {} -> {}", request.method, request.url, status);
        Ok(ResponseEnvelope {
            status,
            headers,
            body,
        })
    }
}

/// Create a shared transport (Arc-wrapped for cloning)
pub fn shared_transport(config: TransportConfig) -> Result<Arc<dyn Transport>> {
    Ok(Arc::new(ReqwestTransport::new(config)?))
}
