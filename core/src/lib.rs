//! Declarative HTTP API client: named endpoint descriptors in, callable
//! operations out.
//!
//! # Overview
//! An `ApiManager` is built from a `ManagerConfig` mapping endpoint names to
//! descriptors (verb, path, default params and headers, auth flag). Each
//! valid descriptor becomes a `BoundOperation`. Calling one merges call-time
//! overrides over the defaults, injects the `Authorization` header when the
//! endpoint requires it, and hands a plain-data `HttpRequest` to the
//! caller-supplied `Transport` (host-does-IO pattern).
//!
//! # Design
//! - Configuration errors fail construction; a missing credential fails the
//!   call. Both are `ManagerError`.
//! - Every transport outcome, including 4xx/5xx and connection failures, is
//!   returned as a `CallResult` so callers handle them on one path.
//! - Parsers, the credential source and the default error message can be
//!   swapped at any time through `&self`; calls issued afterwards see them.

pub mod auth;
pub mod config;
pub mod error;
pub mod http;
pub mod manager;
pub mod methods;
pub mod operation;
pub mod types;

pub use auth::{AuthorizationProvider, AuthorizationSource, AUTHORIZATION};
pub use config::{EndpointDescriptor, ManagerConfig};
pub use error::{ManagerError, TransportError};
pub use http::{
    merge_headers, set_header, Headers, HttpMethod, HttpRequest, HttpResponse, Params, Transport,
    TransportOptions,
};
pub use manager::{ApiManager, DEFAULT_ERROR_MESSAGE};
pub use operation::BoundOperation;
pub use types::{CallOverrides, CallResult, ResponseParser};
