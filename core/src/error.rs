//! Error types for the API manager.
//!
//! # Design
//! Two separate types. `ManagerError` covers configuration and usage
//! mistakes and is always returned as `Err`. `TransportError` is what a
//! `Transport` reports for a failed round-trip; the executor folds it into a
//! `CallResult` instead of propagating it.

use thiserror::Error;

use crate::config::EndpointDescriptor;
use crate::http::HttpResponse;

/// Configuration and usage errors raised by the manager.
#[derive(Debug, Error)]
pub enum ManagerError {
    /// An endpoint names a verb the method registry does not support.
    #[error("Invalid request method `{}` for api `{api_name}`", .descriptor.method)]
    InvalidRequestMethod {
        api_name: String,
        descriptor: Box<EndpointDescriptor>,
    },

    /// An endpoint has no `path`.
    #[error("You should define path property for api `{api_name}`")]
    UndefinedPath {
        api_name: String,
        descriptor: Box<EndpointDescriptor>,
    },

    /// The endpoint requires authorization but no source was ever set.
    #[error("This api needs authorization, but header not provided")]
    NullAuthorizationHeader,

    /// The method registry has no entry for this verb.
    #[error("Not Implemented: {0}")]
    NotImplemented(String),

    /// No bound operation carries this name.
    #[error("unknown operation `{0}`")]
    UnknownOperation(String),

    /// The configuration document could not be parsed.
    #[error("invalid manager configuration: {0}")]
    Config(#[from] serde_json::Error),
}

impl ManagerError {
    /// Name of the offending endpoint for configuration errors.
    pub fn api_name(&self) -> Option<&str> {
        match self {
            ManagerError::InvalidRequestMethod { api_name, .. }
            | ManagerError::UndefinedPath { api_name, .. } => Some(api_name.as_str()),
            _ => None,
        }
    }

    /// Full descriptor of the offending endpoint for configuration errors.
    pub fn descriptor(&self) -> Option<&EndpointDescriptor> {
        match self {
            ManagerError::InvalidRequestMethod { descriptor, .. }
            | ManagerError::UndefinedPath { descriptor, .. } => Some(descriptor.as_ref()),
            _ => None,
        }
    }
}

/// Failure reported by a `Transport`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransportError {
    /// The server answered with a non-2xx status.
    #[error("HTTP {}", .0.status)]
    Http(HttpResponse),

    /// No response was obtained (DNS, connect, TLS, malformed request...).
    #[error("{}", .message.as_deref().unwrap_or("request failed"))]
    Request { message: Option<String> },
}

impl TransportError {
    pub fn request(message: impl Into<String>) -> Self {
        TransportError::Request {
            message: Some(message.into()),
        }
    }
}
