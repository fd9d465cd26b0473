//! HTTP transport types for the host-does-IO pattern.
//!
//! # Design
//! Requests and responses are plain data. The manager builds an `HttpRequest`
//! for every bound call and hands it to a `Transport`, which performs the
//! actual I/O and reports back with an `HttpResponse` or a `TransportError`.
//! Connection pooling, retries and timeouts all live behind that trait.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{ManagerError, TransportError};

/// Header name to header value. Use `merge_headers`/`set_header` to combine
/// sets; they match names case-insensitively.
pub type Headers = BTreeMap<String, String>;

/// Insert `name`, first dropping any entry whose name differs only in case.
pub fn set_header(headers: &mut Headers, name: impl Into<String>, value: impl Into<String>) {
    let name = name.into();
    headers.retain(|existing, _| !existing.eq_ignore_ascii_case(&name));
    headers.insert(name, value.into());
}

/// Merge `overrides` into `headers`; an override replaces any entry with the
/// same name regardless of case and keeps its own spelling.
pub fn merge_headers<I>(headers: &mut Headers, overrides: I)
where
    I: IntoIterator<Item = (String, String)>,
{
    for (name, value) in overrides {
        set_header(headers, name, value);
    }
}

/// Request parameters, sent either as the query string or as the JSON body.
pub type Params = Map<String, Value>;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = ManagerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "PATCH" => Ok(HttpMethod::Patch),
            "DELETE" => Ok(HttpMethod::Delete),
            other => Err(ManagerError::NotImplemented(other.to_string())),
        }
    }
}

/// Per-endpoint options forwarded verbatim to the transport.
///
/// The manager never interprets these. `timeout_ms` and `response_type` are
/// named because most transports understand them; anything else lands in
/// `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_type: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// An HTTP request described as plain data.
///
/// Built by the method registry for each bound call. `url` is absolute
/// (host + root URL + endpoint path); `query` still has to be encoded by the
/// transport.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub query: Params,
    pub headers: Headers,
    pub body: Option<Value>,
    pub options: TransportOptions,
}

impl HttpRequest {
    /// Query parameters rendered as string pairs.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        self.query
            .iter()
            .map(|(key, value)| (key.clone(), query_value(value)))
            .collect()
    }

    /// The JSON body serialized to text, if the request carries one.
    pub fn body_text(&self) -> Option<String> {
        self.body.as_ref().map(Value::to_string)
    }
}

fn query_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpResponse {
    pub status: u16,
    #[serde(default)]
    pub headers: Headers,
    #[serde(default)]
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: Headers::new(),
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Deserialize the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_str(&self.body)
    }
}

/// The collaborator that performs network I/O.
///
/// Implementations resolve with the response for 2xx outcomes, fail with
/// `TransportError::Http` for any other status and with
/// `TransportError::Request` when no response was obtained at all.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;

    /// Shared defaults for requests sent through this transport. The manager
    /// copies them into its own header set at construction, so they arrive
    /// on every request it builds and the transport need not add them again.
    fn default_headers(&self) -> Headers {
        Headers::new()
    }
}
