//! Header collections and authorization credentials

use std::fmt;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::header::{HeaderName, HeaderValue};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{RestError, Result};

/// Ordered header list with case-insensitive names
///
/// Setting a name that is already present removes the old entry and appends
/// the new one, so iteration order reflects the most recent `set`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderList {
    entries: Vec<(String, String)>,
}

impl HeaderList {
    /// Create an empty header list
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace any header with the same name, then append the pair
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        self.remove(&name);
        self.entries.push((name, value.into()));
    }

    /// Value of the header with the given name
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Check whether a header with the given name is present
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Remove the header with the given name, returning its value
    pub fn remove(&mut self, name: &str) -> Option<String> {
        let index = self
            .entries
            .iter()
            .position(|(key, _)| key.eq_ignore_ascii_case(name))?;
        Some(self.entries.remove(index).1)
    }

    /// Iterate over `(name, value)` pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Number of headers
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check whether the list is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check that every entry is a valid HTTP header
    pub fn validate(&self) -> Result<()> {
        self.iter()
            .try_for_each(|(name, value)| validate_header(name, value))
    }
}

impl<K, V> FromIterator<(K, V)> for HeaderList
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = HeaderList::new();
        for (name, value) in iter {
            headers.set(name, value);
        }
        headers
    }
}

impl Serialize for HeaderList {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (name, value) in self.iter() {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for HeaderList {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct HeaderListVisitor;

        impl<'de> Visitor<'de> for HeaderListVisitor {
            type Value = HeaderList;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a map of header names to values")
            }

            fn visit_map<A: MapAccess<'de>>(
                self,
                mut access: A,
            ) -> std::result::Result<Self::Value, A::Error> {
                let mut headers = HeaderList::new();
                while let Some((name, value)) = access.next_entry::<String, String>()? {
                    headers.set(name, value);
                }
                Ok(headers)
            }
        }

        deserializer.deserialize_map(HeaderListVisitor)
    }
}

/// Check that a name/value pair can be sent as an HTTP header
pub fn validate_header(name: &str, value: &str) -> Result<()> {
    HeaderName::from_bytes(name.as_bytes())
        .map_err(|e| RestError::InvalidHeader(format!("{name}: {e}")))?;
    HeaderValue::from_str(value).map_err(|e| RestError::InvalidHeader(format!("{name}: {e}")))?;
    Ok(())
}

/// Credential rendered into the `Authorization` header
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Authorization {
    /// `Bearer <token>`
    Bearer { token: String },
    /// `Basic base64(<username>:<password>)`
    Basic { username: String, password: String },
    /// Any scheme and credentials pair
    Scheme { scheme: String, credentials: String },
    /// Header value sent verbatim
    Raw { value: String },
}

impl Authorization {
    /// Bearer token credential
    pub fn bearer(token: impl Into<String>) -> Self {
        Authorization::Bearer {
            token: token.into(),
        }
    }

    /// Basic credential
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Authorization::Basic {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Custom scheme credential
    pub fn scheme(scheme: impl Into<String>, credentials: impl Into<String>) -> Self {
        Authorization::Scheme {
            scheme: scheme.into(),
            credentials: credentials.into(),
        }
    }

    /// Verbatim header value
    pub fn raw(value: impl Into<String>) -> Self {
        Authorization::Raw {
            value: value.into(),
        }
    }

    /// Value of the `Authorization` header
    pub fn header_value(&self) -> String {
        match self {
            Authorization::Bearer { token } => format!("Bearer {token}"),
            Authorization::Basic { username, password } => {
                format!("Basic {}", STANDARD.encode(format!("{username}:{password}")))
            }
            Authorization::Scheme {
                scheme,
                credentials,
            } => format!("{scheme} {credentials}"),
            Authorization::Raw { value } => value.clone(),
        }
    }
}

// Credentials stay out of logs
impl fmt::Debug for Authorization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let scheme = match self {
            Authorization::Bearer { .. } => "Bearer",
            Authorization::Basic { .. } => "Basic",
            Authorization::Scheme { scheme, .. } => scheme.as_str(),
            Authorization::Raw { .. } => "Raw",
        };
        f.debug_struct("Authorization")
            .field("scheme", &scheme)
            .finish_non_exhaustive()
    }
}
