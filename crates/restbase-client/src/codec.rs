//! Content codec
//!
//! Stateless conversions between in-memory values and the UTF-8 text that
//! goes over the wire, plus flattening of values into query strings.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::{RestError, Result};

/// Content type stamped on request bodies by default
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Convert a value to JSON
pub fn to_value<T: Serialize + ?Sized>(value: &T) -> Result<Value> {
    serde_json::to_value(value).map_err(RestError::Encoding)
}

/// Convert a value to a request payload, treating `null` as absent
pub fn to_payload<T: Serialize + ?Sized>(value: &T) -> Result<Option<Value>> {
    let value = to_value(value)?;
    Ok((!value.is_null()).then_some(value))
}

/// Render a payload as body text
///
/// Absent payloads give an empty body and strings are used verbatim;
/// everything else is JSON-encoded.
pub fn content_from_value(value: Option<&Value>) -> Result<String> {
    match value {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(text)) => Ok(text.clone()),
        Some(value) => serde_json::to_string(value).map_err(RestError::Encoding),
    }
}

/// Render any serializable value as body text
pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    content_from_value(to_payload(value)?.as_ref())
}

/// Decode response text into `T`
///
/// Empty text decodes as JSON `null`, so optional shapes come back empty
/// while required shapes fail with [`RestError::Decoding`].
pub fn decode<T: DeserializeOwned>(text: &str) -> Result<T> {
    let text = if text.trim().is_empty() { "null" } else { text };
    serde_json::from_str(text).map_err(RestError::Decoding)
}

/// Decode response text into `T`, giving `T::default()` for empty text
pub fn decode_or_default<T: DeserializeOwned + Default>(text: &str) -> Result<T> {
    if text.trim().is_empty() {
        return Ok(T::default());
    }
    serde_json::from_str(text).map_err(RestError::Decoding)
}

/// Flatten a value's fields into string pairs
///
/// Strings are kept as is, numbers and booleans are stringified, and
/// anything without a plain string form (null, arrays, objects) is dropped
/// along with empty strings. Order follows the value's field order.
pub fn query_pairs<T: Serialize + ?Sized>(value: &T) -> Result<Vec<(String, String)>> {
    Ok(pairs_from_value(&to_value(value)?))
}

/// Flatten an already-converted JSON value into string pairs
pub fn pairs_from_value(value: &Value) -> Vec<(String, String)> {
    let Value::Object(fields) = value else {
        return Vec::new();
    };

    fields
        .iter()
        .filter_map(|(key, value)| {
            let value = match value {
                Value::String(text) => text.clone(),
                Value::Number(number) => number.to_string(),
                Value::Bool(flag) => flag.to_string(),
                _ => return None,
            };
            (!value.is_empty()).then(|| (key.clone(), value))
        })
        .collect()
}

/// Encode a value as a query string without the leading `?`
pub fn query_string<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(query_from_pairs(query_pairs(value)?))
}

/// Encode explicit pairs as a query string, skipping empty values
pub fn query_from_pairs<I, K, V>(pairs: I) -> String
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    pairs
        .into_iter()
        .filter(|(_, value)| !value.as_ref().is_empty())
        .map(|(key, value)| {
            format!(
                "{}={}",
                urlencoding::encode(key.as_ref()),
                urlencoding::encode(value.as_ref())
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// Append a query string to a URL, using `&` when it already has one
pub fn append_query(url: &str, query: &str) -> String {
    if query.is_empty() {
        return url.to_string();
    }
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{url}{separator}{query}")
}
