//! Base request engine for typed REST clients
//!
//! Centralizes URL composition, JSON marshaling, default headers and
//! authorization, and one operation per HTTP verb, so a concrete API client
//! only supplies its base URL, credentials and payload types.
//!
//! ## Features
//!
//! - **Base URL resolution**: relative URLs are prefixed, already-prefixed ones are left alone
//! - **Typed verbs**: `get_json`, `post_json`, `put_json`, `patch_json` decode via serde
//! - **Lifecycle hooks**: override `RequestHooks` to validate, log, add headers or recover from failures
//! - **Structured failures**: non-2xx responses carry the request and response that produced them
//! - **Mockable transport**: swap the reqwest transport for any `Transport` implementation
//!
//! ## Example
//!
//! ```no_run
//! use restbase_client::{RequestClient, Result};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize)]
//! struct NewUser<'a> {
//!     name: &'a str,
//! }
//!
//! #[derive(Debug, Default, Deserialize)]
//! struct User {
//!     id: u64,
//! }
//!
//! async fn create_user() -> Result<User> {
//!     let mut client = RequestClient::with_base_url("https://api.example.com/")?;
//!     client.set_bearer_token("secret")?;
//!     client.set_default_header("X-Client", "billing")?;
//!
//!     client.post_json("users", &NewUser { name: "ada" }).await
//! }
//! ```

pub mod client;
pub mod codec;
pub mod config;
pub mod error;
pub mod headers;
pub mod hooks;
pub mod transport;

pub use client::{resolve_url, RequestClient};
pub use config::{ClientConfig, TransportConfig};
pub use error::{RequestFailure, RestError, Result, StatusError};
pub use headers::{Authorization, HeaderList};
pub use hooks::{DefaultHooks, Recovery, RequestHooks};
pub use transport::{shared_transport, OutgoingRequest, ReqwestTransport, ResponseEnvelope, Transport};

/// Re-export commonly used types
pub use reqwest::{header, Method, StatusCode};
