//! Client and transport configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::headers::{Authorization, HeaderList};

/// Request client configuration
///
/// Written during setup and read by every request afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Prefix for relative request URLs (empty = callers pass absolute URLs)
    #[serde(default)]
    pub base_url: String,

    /// Content type stamped on request bodies before the header hook runs
    #[serde(default)]
    pub content_type: Option<String>,

    /// Headers attached to every request
    #[serde(default)]
    pub default_headers: HeaderList,

    /// Credential sent as the `Authorization` header
    #[serde(default)]
    pub authorization: Option<Authorization>,
}

impl ClientConfig {
    /// Create an empty client config
    pub fn new() -> Self {
        Self::default()
    }

    /// Set base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set content type
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Add or replace a default header
    pub fn with_default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.set(name, value);
        self
    }

    /// Set authorization
    pub fn with_authorization(mut self, authorization: Authorization) -> Self {
        self.authorization = Some(authorization);
        self
    }
}

/// Transport configuration for the reqwest-backed transport
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportConfig {
    /// Request timeout
    #[serde(default = "default_timeout")]
    pub timeout: Duration,

    /// Connection timeout
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: Duration,

    /// HTTP/HTTPS proxy URL
    #[serde(default)]
    pub proxy: Option<String>,

    /// Custom user agent
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Maximum redirects to follow (0 = no redirects)
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            connect_timeout: default_connect_timeout(),
            proxy: None,
            user_agent: default_user_agent(),
            max_redirects: default_max_redirects(),
        }
    }
}

impl TransportConfig {
    /// Create a new transport config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Create config for fast operations (5s timeout)
    pub fn fast() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(2),
            ..Default::default()
        }
    }

    /// Create config for long operations (120s timeout)
    pub fn long() -> Self {
        Self {
            timeout: Duration::from_secs(120),
            connect_timeout: Duration::from_secs(10),
            ..Default::default()
        }
    }

    /// Set timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set proxy URL
    pub fn with_proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    /// Set user agent
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set redirect limit
    pub fn with_max_redirects(mut self, max_redirects: usize) -> Self {
        self.max_redirects = max_redirects;
        self
    }
}

// Default value functions for serde
fn default_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_connect_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_user_agent() -> String {
    format!("restbase/{}", env!("CARGO_PKG_VERSION"))
}

fn default_max_redirects() -> usize {
    10
}
