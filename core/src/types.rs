//! Call-time inputs and outcomes.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::http::{Headers, HttpResponse, Params};

/// Projects a raw response onto whatever shape the caller finds convenient.
pub type ResponseParser = Arc<dyn Fn(&HttpResponse) -> Value + Send + Sync>;

/// Per-call values merged over the endpoint defaults. Keys present here win.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CallOverrides {
    #[serde(default)]
    pub params: Params,
    #[serde(default)]
    pub headers: Headers,
    /// Request body for DELETE calls. Ignored by every other verb.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl CallOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn data(mut self, data: impl Into<Value>) -> Self {
        self.data = Some(data.into());
        self
    }
}

/// Outcome of a bound call.
///
/// Remote failures are data: a 404 is returned as `HttpError`, a refused
/// connection as `TransportError`, and neither is an `Err`.
#[derive(Debug, Clone, PartialEq)]
pub enum CallResult {
    /// 2xx response. `parsed_data` is set only when a response parser is
    /// configured.
    Success {
        response: HttpResponse,
        parsed_data: Option<Value>,
    },
    /// Non-2xx response. `parsed_error` is the status code unless an HTTP
    /// error parser is configured.
    HttpError {
        response: HttpResponse,
        parsed_error: Value,
    },
    /// No response. `parsed_error` is the transport's message or the
    /// manager's default error message.
    TransportError { parsed_error: String },
}

impl CallResult {
    pub fn is_success(&self) -> bool {
        matches!(self, CallResult::Success { .. })
    }

    pub fn response(&self) -> Option<&HttpResponse> {
        match self {
            CallResult::Success { response, .. } | CallResult::HttpError { response, .. } => {
                Some(response)
            }
            CallResult::TransportError { .. } => None,
        }
    }

    pub fn parsed_data(&self) -> Option<&Value> {
        match self {
            CallResult::Success { parsed_data, .. } => parsed_data.as_ref(),
            _ => None,
        }
    }

    pub fn parsed_error(&self) -> Option<Value> {
        match self {
            CallResult::Success { .. } => None,
            CallResult::HttpError { parsed_error, .. } => Some(parsed_error.clone()),
            CallResult::TransportError { parsed_error } => Some(Value::String(parsed_error.clone())),
        }
    }
}
