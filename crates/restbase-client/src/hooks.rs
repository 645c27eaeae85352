//! Request lifecycle hooks
//!
//! Every verb call runs the hooks in a fixed order:
//!
//! 1. [`RequestHooks::before_request`]
//! 2. [`RequestHooks::on_adding_headers`] while the request is built
//! 3. transport dispatch
//! 4. [`RequestHooks::on_response_received`] (not for DELETE)
//! 5. [`RequestHooks::on_exception`] when the status is not a success
//!
//! Implementors override only the methods they need.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;

use crate::{
    codec::JSON_CONTENT_TYPE,
    error::{RequestFailure, Result},
    headers::HeaderList,
    transport::ResponseEnvelope,
};

/// What a call does after [`RequestHooks::on_exception`] swallowed a failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recovery {
    /// Proceed with the failing response's body
    Continue,
    /// Proceed as if the server had answered with this body
    ReplaceBody(String),
}

/// Extension points of the request lifecycle
#[async_trait]
pub trait RequestHooks: Send + Sync {
    /// Runs before anything is sent; an error aborts the call
    ///
    /// `url` is the URL as the caller passed it and `payload` is the body or
    /// query value, if any.
    async fn before_request(&self, url: &str, payload: Option<&Value>) -> Result<()> {
        let _ = (url, payload);
        Ok(())
    }

    /// Adjust the content headers of a request
    fn on_adding_headers(&self, headers: &mut HeaderList) {
        headers.set(CONTENT_TYPE.as_str(), JSON_CONTENT_TYPE);
    }

    /// Observe a response before its status is checked
    fn on_response_received(&self, response: &ResponseEnvelope) {
        let _ = response;
    }

    /// Decide the outcome of a call that got a non-success status
    async fn on_exception(&self, failure: RequestFailure) -> Result<Recovery> {
        Err(failure.into())
    }

    /// Runs once when the client is dropped, before the transport is released
    fn on_dispose(&self) {}
}

/// Hooks with every default behaviour
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultHooks;

impl RequestHooks for DefaultHooks {}
