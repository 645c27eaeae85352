//! Request client implementation

use std::fmt;
use std::sync::Arc;

use reqwest::{header::AUTHORIZATION, header::CONTENT_TYPE, Method};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use crate::{
    codec,
    config::{ClientConfig, TransportConfig},
    error::{RequestFailure, Result},
    headers::{validate_header, Authorization, HeaderList},
    hooks::{DefaultHooks, Recovery, RequestHooks},
    transport::{shared_transport, OutgoingRequest, ResponseEnvelope, Transport},
};

/// Prefix `url` with `base_url` unless it is already prefixed
///
/// Applying this twice gives the same result as applying it once.
pub fn resolve_url(base_url: &str, url: &str) -> String {
    if base_url.is_empty() || url.starts_with(base_url) {
        url.to_string()
    } else {
        format!("{base_url}{url}")
    }
}

/// Base client for typed REST APIs
///
/// Configuration setters take `&mut self` and verbs take `&self`, so a
/// client is configured first and then shared (for example behind an `Arc`)
/// for concurrent calls.
pub struct RequestClient {
    config: ClientConfig,
    transport: Arc<dyn Transport>,
    hooks: Arc<dyn RequestHooks>,
}

impl RequestClient {
    /// Create a client with the default reqwest transport and no base URL
    pub fn new() -> Result<Self> {
        Self::with_config(ClientConfig::default(), TransportConfig::default())
    }

    /// Create a client that prefixes relative URLs with `base_url`
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        Self::with_config(
            ClientConfig::new().with_base_url(base_url),
            TransportConfig::default(),
        )
    }

    /// Create a client from configuration, building a reqwest transport
    pub fn with_config(config: ClientConfig, transport: TransportConfig) -> Result<Self> {
        config.default_headers.validate()?;
        Ok(Self::from_parts(config, shared_transport(transport)?))
    }

    /// Create a client over an existing transport
    pub fn from_parts(config: ClientConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            config,
            transport,
            hooks: Arc::new(DefaultHooks),
        }
    }

    /// Install lifecycle hooks
    pub fn with_hooks(mut self, hooks: impl RequestHooks + 'static) -> Self {
        self.hooks = Arc::new(hooks);
        self
    }

    /// Install shared lifecycle hooks
    pub fn with_shared_hooks(mut self, hooks: Arc<dyn RequestHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    // === Configuration ===

    /// Get configuration
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Base URL prefixed to relative request URLs
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Set base URL
    pub fn set_base_url(&mut self, base_url: impl Into<String>) {
        self.config.base_url = base_url.into();
    }

    /// Content type stamped on bodies before the header hook runs
    pub fn content_type(&self) -> Option<&str> {
        self.config.content_type.as_deref()
    }

    /// Set content type
    pub fn set_content_type(&mut self, content_type: impl Into<String>) {
        self.config.content_type = Some(content_type.into());
    }

    /// Install the authorization credential, replacing any previous one
    ///
    /// The rendered header value is validated like any default header.
    pub fn set_authorization(&mut self, authorization: Authorization) -> Result<()> {
        validate_header(AUTHORIZATION.as_str(), &authorization.header_value())?;
        self.config.authorization = Some(authorization);
        Ok(())
    }

    /// Install a bearer token
    pub fn set_bearer_token(&mut self, token: impl Into<String>) -> Result<()> {
        self.set_authorization(Authorization::bearer(token))
    }

    /// Remove the authorization credential
    pub fn clear_authorization(&mut self) {
        self.config.authorization = None;
    }

    /// Add a header to every subsequent request
    ///
    /// A header with the same name (case-insensitive) is replaced.
    pub fn set_default_header(&mut self, name: &str, value: &str) -> Result<()> {
        validate_header(name, value)?;
        self.config.default_headers.set(name, value);
        Ok(())
    }

    /// Remove a default header
    pub fn remove_default_header(&mut self, name: &str) -> Option<String> {
        self.config.default_headers.remove(name)
    }

    /// Get the transport
    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    /// Swap the transport used by subsequent requests
    pub fn replace_transport(&mut self, transport: Arc<dyn Transport>) {
        self.transport = transport;
    }

    // === URL and content helpers ===

    /// Resolve a request URL against the base URL
    pub fn resolve_url(&self, url: &str) -> String {
        resolve_url(&self.config.base_url, url)
    }

    /// Resolved URL and body text for a payload
    pub fn request_data<P>(&self, url: &str, payload: &P) -> Result<(String, String)>
    where
        P: Serialize + ?Sized,
    {
        Ok((self.resolve_url(url), codec::encode(payload)?))
    }

    /// Encode query parameters without the leading `?`
    pub fn query_string<P>(&self, params: &P) -> Result<String>
    where
        P: Serialize + ?Sized,
    {
        codec::query_string(params)
    }

    // === GET ===

    /// GET returning the raw body text
    pub async fn get(&self, url: &str) -> Result<String> {
        self.hooks.before_request(url, None).await?;
        self.dispatch(Method::GET, url, String::new()).await
    }

    /// GET decoding the body into `R` (empty body gives `R::default()`)
    pub async fn get_json<R>(&self, url: &str) -> Result<R>
    where
        R: DeserializeOwned + Default,
    {
        codec::decode_or_default(&self.get(url).await?)
    }

    /// GET with `params` encoded into the query string
    pub async fn get_with<P>(&self, url: &str, params: &P) -> Result<String>
    where
        P: Serialize + ?Sized,
    {
        let params = codec::to_payload(params)?;
        self.hooks.before_request(url, params.as_ref()).await?;

        let query = params
            .as_ref()
            .map(|params| codec::query_from_pairs(codec::pairs_from_value(params)))
            .unwrap_or_default();
        let url = codec::append_query(url, &query);
        self.dispatch(Method::GET, &url, String::new()).await
    }

    /// GET with query parameters, decoding the body into `R` (empty body gives `R::default()`)
    pub async fn get_json_with<P, R>(&self, url: &str, params: &P) -> Result<R>
    where
        P: Serialize + ?Sized,
        R: DeserializeOwned + Default,
    {
        codec::decode_or_default(&self.get_with(url, params).await?)
    }

    /// Issue a plain GET and return the response untouched
    ///
    /// No hooks run and the status is not checked.
    pub async fn get_response(&self, url: &str) -> Result<ResponseEnvelope> {
        let request = OutgoingRequest::new(Method::GET, self.resolve_url(url))
            .with_default_headers(self.default_headers());
        self.transport.execute(&request).await
    }

    // === POST / PUT / PATCH ===

    /// POST `payload` and return the raw body text
    pub async fn post<P>(&self, url: &str, payload: &P) -> Result<String>
    where
        P: Serialize + ?Sized,
    {
        self.send_payload(Method::POST, url, payload).await
    }

    /// POST `payload`, decoding the body into `R` (empty body gives `R::default()`)
    pub async fn post_json<P, R>(&self, url: &str, payload: &P) -> Result<R>
    where
        P: Serialize + ?Sized,
        R: DeserializeOwned + Default,
    {
        codec::decode_or_default(&self.post(url, payload).await?)
    }

    /// PUT `payload` and return the raw body text
    pub async fn put<P>(&self, url: &str, payload: &P) -> Result<String>
    where
        P: Serialize + ?Sized,
    {
        self.send_payload(Method::PUT, url, payload).await
    }

    /// PUT `payload`, decoding the body into `R` (empty body gives `R::default()`)
    pub async fn put_json<P, R>(&self, url: &str, payload: &P) -> Result<R>
    where
        P: Serialize + ?Sized,
        R: DeserializeOwned + Default,
    {
        codec::decode_or_default(&self.put(url, payload).await?)
    }

    /// PATCH `payload` and return the raw body text
    pub async fn patch<P>(&self, url: &str, payload: &P) -> Result<String>
    where
        P: Serialize + ?Sized,
    {
        self.send_payload(Method::PATCH, url, payload).await
    }

    /// PATCH `payload`, decoding the body into `R` (empty body gives `R::default()`)
    pub async fn patch_json<P, R>(&self, url: &str, payload: &P) -> Result<R>
    where
        P: Serialize + ?Sized,
        R: DeserializeOwned + Default,
    {
        codec::decode_or_default(&self.patch(url, payload).await?)
    }

    // === DELETE ===

    /// DELETE, discarding the body
    pub async fn delete(&self, url: &str) -> Result<()> {
        self.hooks.before_request(url, None).await?;

        let request = self.build_request(Method::DELETE, self.resolve_url(url), String::new());
        let response = self.transport.execute(&request).await?;
        self.ensure_success(request, response).await?;
        Ok(())
    }

    // === Internals ===

    async fn send_payload<P>(&self, method: Method, url: &str, payload: &P) -> Result<String>
    where
        P: Serialize + ?Sized,
    {
        let payload = codec::to_payload(payload)?;
        self.hooks.before_request(url, payload.as_ref()).await?;

        let body = codec::content_from_value(payload.as_ref())?;
        self.dispatch(method, url, body).await
    }

    /// Resolve, send, observe and status-check a request
    async fn dispatch(&self, method: Method, url: &str, body: String) -> Result<String> {
        let request = self.build_request(method, self.resolve_url(url), body);

        let response = self.transport.execute(&request).await?;
        self.hooks.on_response_received(&response);
        self.ensure_success(request, response).await
    }

    fn build_request(&self, method: Method, url: String, body: String) -> OutgoingRequest {
        let mut content_headers = HeaderList::new();
        if let Some(content_type) = &self.config.content_type {
            content_headers.set(CONTENT_TYPE.as_str(), content_type.as_str());
        }
        self.hooks.on_adding_headers(&mut content_headers);

        OutgoingRequest::new(method, url)
            .with_body(body)
            .with_default_headers(self.default_headers())
            .with_content_headers(content_headers)
    }

    fn default_headers(&self) -> HeaderList {
        let mut headers = self.config.default_headers.clone();
        if let Some(authorization) = &self.config.authorization {
            headers.set(AUTHORIZATION.as_str(), authorization.header_value());
        }
        headers
    }

    /// Pass a successful body through, or route the failure through the hook
    async fn ensure_success(
        &self,
        request: OutgoingRequest,
        response: ResponseEnvelope,
    ) -> Result<String> {
        if response.is_success() {
            return Ok(response.body);
        }

        warn!(
            "HTTP {} {} failed with status {}",
            request.method, request.url, response.status
        );
        let body = response.body.clone();
        match self.hooks.on_exception(RequestFailure::new(request, response)).await? {
            Recovery::Continue => Ok(body),
            Recovery::ReplaceBody(body) => Ok(body),
        }
    }
}

impl fmt::Debug for RequestClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Drop for RequestClient {
    fn drop(&mut self) {
        debug!("Disposing request client for {:?}", self.config.base_url);
        self.hooks.on_dispose();
    }
}
