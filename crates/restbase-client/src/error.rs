//! Request client error types

use reqwest::StatusCode;
use thiserror::Error;

use crate::transport::{OutgoingRequest, ResponseEnvelope};

/// Result type for request client operations
pub type Result<T> = std::result::Result<T, RestError>;

/// Request client errors
#[derive(Debug, Error)]
pub enum RestError {
    /// Payload could not be converted to request text
    #[error("Failed to encode request payload: {0}")]
    Encoding(#[source] serde_json::Error),

    /// Response text could not be converted to the requested shape
    #[error("Failed to decode response body: {0}")]
    Decoding(#[source] serde_json::Error),

    /// Server answered with a non-success status
    #[error(transparent)]
    Request(Box<RequestFailure>),

    /// Transport failed before a response was produced
    #[error("Network request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Invalid header name or value
    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    /// Invalid proxy configuration
    #[error("Invalid proxy configuration: {0}")]
    InvalidProxy(String),

    /// Client build error
    #[error("Failed to build HTTP client: {0}")]
    BuildError(String),

    /// A request hook aborted the call
    #[error("Request aborted by hook: {0}")]
    Hook(String),
}

impl RestError {
    /// Response status carried by the error, if the server answered
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            RestError::Request(failure) => Some(failure.status()),
            RestError::Transport(e) => e.status(),
            _ => None,
        }
    }

    /// Structured failure for non-success responses
    pub fn failure(&self) -> Option<&RequestFailure> {
        match self {
            RestError::Request(failure) => Some(failure),
            _ => None,
        }
    }

    /// Check if error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            RestError::Transport(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            RestError::Request(failure) => {
                // Retry on 5xx server errors and 429 rate limit
                let status = failure.status();
                status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS
            }
            _ => false,
        }
    }
}

impl From<RequestFailure> for RestError {
    fn from(failure: RequestFailure) -> Self {
        RestError::Request(Box::new(failure))
    }
}

/// Low-level cause recorded when a response fails the status check
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Response status code does not indicate success: {status}")]
pub struct StatusError {
    /// Status that failed the check
    pub status: StatusCode,
}

/// A non-success response together with what was sent to produce it
#[derive(Debug, Error)]
#[error("Request to {url} failed with status {status}", status = .response.status)]
pub struct RequestFailure {
    /// Triggering low-level error, if any
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
    /// Fully resolved request URL
    pub url: String,
    /// Request as it was handed to the transport
    pub request: OutgoingRequest,
    /// Response as it came back
    pub response: ResponseEnvelope,
}

impl RequestFailure {
    /// Wrap a failed exchange, recording the status check as the cause
    pub fn new(request: OutgoingRequest, response: ResponseEnvelope) -> Self {
        let source = StatusError {
            status: response.status,
        };
        Self {
            source: Some(Box::new(source)),
            url: request.url.clone(),
            request,
            response,
        }
    }

    /// Replace the low-level cause
    pub fn with_source(
        mut self,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        self.source = source;
        self
    }

    /// Response status code
    pub fn status(&self) -> StatusCode {
        self.response.status
    }

    /// Response body text
    pub fn body(&self) -> &str {
        &self.response.body
    }
}
