//! The API manager: builds bound operations from a configuration and holds
//! the state they share.
//!
//! # Design
//! Construction validates every descriptor in insertion order and stops at
//! the first invalid one, so a manager either exposes all configured
//! operations or does not exist. Operations live in a name-keyed map rather
//! than as members, which means endpoint names can never shadow the
//! manager's own methods.
//!
//! Global headers are copied into the manager at construction and applied
//! to its own requests only; the transport is never mutated.

use std::sync::{Arc, PoisonError, RwLock};

use indexmap::IndexMap;
use serde_json::Value;
use tracing::{debug, warn};

use crate::auth::{AuthorizationProvider, AuthorizationSource};
use crate::config::ManagerConfig;
use crate::error::{ManagerError, TransportError};
use crate::http::{merge_headers, Headers, HttpResponse, Transport};
use crate::operation::{BoundOperation, Endpoint};
use crate::types::{CallOverrides, CallResult, ResponseParser};

/// Used for transport failures that carry no message.
pub const DEFAULT_ERROR_MESSAGE: &str = "No message";

/// State shared between the manager and every operation it bound.
pub(crate) struct ManagerState {
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) headers: Headers,
    pub(crate) auth: AuthorizationProvider,
    response_parser: RwLock<Option<ResponseParser>>,
    http_error_parser: RwLock<Option<ResponseParser>>,
    default_error_message: RwLock<String>,
}

impl ManagerState {
    fn response_parser(&self) -> Option<ResponseParser> {
        self.response_parser
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn http_error_parser(&self) -> Option<ResponseParser> {
        self.http_error_parser
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn default_error_message(&self) -> String {
        self.default_error_message
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Fold a transport outcome into a `CallResult`.
    pub(crate) fn normalize(
        &self,
        operation: &str,
        outcome: Result<HttpResponse, TransportError>,
    ) -> CallResult {
        match outcome {
            Ok(response) => {
                let parsed_data = self.response_parser().map(|parse| parse(&response));
                CallResult::Success {
                    response,
                    parsed_data,
                }
            }
            Err(TransportError::Http(response)) => {
                warn!(operation, status = response.status, "request failed with HTTP error");
                let parsed_error = match self.http_error_parser() {
                    Some(parse) => parse(&response),
                    None => Value::from(response.status),
                };
                CallResult::HttpError {
                    response,
                    parsed_error,
                }
            }
            Err(TransportError::Request { message }) => {
                warn!(operation, message = message.as_deref(), "request failed before a response");
                let parsed_error = message
                    .filter(|message| !message.is_empty())
                    .unwrap_or_else(|| self.default_error_message());
                CallResult::TransportError { parsed_error }
            }
        }
    }
}

/// Exposes one `BoundOperation` per configured endpoint.
pub struct ApiManager {
    state: Arc<ManagerState>,
    operations: IndexMap<String, BoundOperation>,
}

impl ApiManager {
    /// Validate and bind every endpoint in `config`.
    ///
    /// Fails on the first descriptor with an unsupported verb or no path.
    pub fn new(config: ManagerConfig, transport: Arc<dyn Transport>) -> Result<Self, ManagerError> {
        let api_url = config.api_url();
        let ManagerConfig {
            apis,
            authorization_header_prefix,
            mut headers,
            ..
        } = config;

        // Headers the transport already sends win over configured globals.
        merge_headers(&mut headers, transport.default_headers());

        let state = Arc::new(ManagerState {
            transport,
            headers,
            auth: AuthorizationProvider::new(authorization_header_prefix),
            response_parser: RwLock::new(None),
            http_error_parser: RwLock::new(None),
            default_error_message: RwLock::new(DEFAULT_ERROR_MESSAGE.to_string()),
        });

        let mut operations = IndexMap::with_capacity(apis.len());
        for (name, descriptor) in apis {
            let endpoint = Endpoint::bind(&name, descriptor, &api_url)?;
            let operation = BoundOperation::new(&name, endpoint, state.clone());
            debug!(
                operation = %name,
                method = %operation.method(),
                url = operation.url(),
                "bound operation"
            );
            operations.insert(name, operation);
        }

        Ok(Self { state, operations })
    }

    /// Set the credential used by endpoints that require authorization.
    ///
    /// Accepts a constant (`"token"`) or an `AuthorizationSource::supplier`.
    pub fn set_authorization_header(&self, source: impl Into<AuthorizationSource>) {
        self.state.auth.set_source(source.into());
    }

    /// Shorthand for `set_authorization_header(AuthorizationSource::supplier(f))`.
    pub fn set_authorization_supplier<F>(&self, supplier: F)
    where
        F: Fn() -> String + Send + Sync + 'static,
    {
        self.set_authorization_header(AuthorizationSource::supplier(supplier));
    }

    pub fn set_response_parser<F>(&self, parser: F)
    where
        F: Fn(&HttpResponse) -> Value + Send + Sync + 'static,
    {
        *self
            .state
            .response_parser
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(parser));
    }

    pub fn set_http_error_parser<F>(&self, parser: F)
    where
        F: Fn(&HttpResponse) -> Value + Send + Sync + 'static,
    {
        *self
            .state
            .http_error_parser
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(parser));
    }

    pub fn set_default_error_message(&self, message: impl Into<String>) {
        *self
            .state
            .default_error_message
            .write()
            .unwrap_or_else(PoisonError::into_inner) = message.into();
    }

    pub fn default_error_message(&self) -> String {
        self.state.default_error_message()
    }

    pub fn authorization_header_prefix(&self) -> &str {
        self.state.auth.prefix()
    }

    /// Headers applied to every request of this manager: configured globals
    /// merged with the transport's own defaults.
    pub fn default_headers(&self) -> &Headers {
        &self.state.headers
    }

    pub fn operation(&self, name: &str) -> Option<&BoundOperation> {
        self.operations.get(name)
    }

    /// Operation names in configuration order.
    pub fn operation_names(&self) -> impl Iterator<Item = &str> {
        self.operations.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Call the operation registered as `name`.
    pub async fn call(
        &self,
        name: &str,
        overrides: CallOverrides,
    ) -> Result<CallResult, ManagerError> {
        let operation = self
            .operation(name)
            .ok_or_else(|| ManagerError::UnknownOperation(name.to_string()))?;
        operation.call(overrides).await
    }
}

impl std::fmt::Debug for ApiManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiManager")
            .field("headers", &self.state.headers)
            .field("operations", &self.operations.values().collect::<Vec<_>>())
            .finish()
    }
}
