//! Bound operations: one callable per endpoint descriptor.
//!
//! # Design
//! Binding resolves everything static once (absolute URL, request builder,
//! defaults). Each call then runs the same pipeline: merge overrides over
//! defaults, inject authorization, build the request, hand it to the
//! transport, normalize the outcome. Per-call state lives on the stack, so
//! any number of calls may be in flight on the same operation.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::auth::AUTHORIZATION;
use crate::config::EndpointDescriptor;
use crate::error::ManagerError;
use crate::http::{
    merge_headers, set_header, Headers, HttpMethod, HttpRequest, Params, TransportOptions,
};
use crate::manager::ManagerState;
use crate::methods::{self, Dispatch, MethodFn};
use crate::types::{CallOverrides, CallResult};

/// Static configuration captured from a validated descriptor.
pub(crate) struct Endpoint {
    url: String,
    method: HttpMethod,
    build: MethodFn,
    default_params: Params,
    default_headers: Headers,
    requires_auth: bool,
    transport_options: TransportOptions,
}

impl Endpoint {
    /// Validate `descriptor` and capture it, joining `api_url` and its path.
    pub(crate) fn bind(
        api_name: &str,
        descriptor: EndpointDescriptor,
        api_url: &str,
    ) -> Result<Self, ManagerError> {
        let method = descriptor.validate(api_name)?;
        let build = methods::resolve(method.as_str())?;
        let path = descriptor.path.unwrap_or_default();
        Ok(Self {
            url: format!("{api_url}{path}"),
            method,
            build,
            default_params: descriptor.default_params,
            default_headers: descriptor.default_headers,
            requires_auth: descriptor.requires_auth,
            transport_options: descriptor.transport_options.unwrap_or_default(),
        })
    }
}

/// A named, reusable handle on one endpoint.
///
/// Cloning is cheap; clones share the manager's parsers and credentials, so
/// later calls to the manager's setters affect them too.
#[derive(Clone)]
pub struct BoundOperation {
    name: Arc<str>,
    endpoint: Arc<Endpoint>,
    state: Arc<ManagerState>,
}

impl BoundOperation {
    pub(crate) fn new(name: &str, endpoint: Endpoint, state: Arc<ManagerState>) -> Self {
        Self {
            name: Arc::from(name),
            endpoint: Arc::new(endpoint),
            state,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn method(&self) -> HttpMethod {
        self.endpoint.method
    }

    pub fn url(&self) -> &str {
        &self.endpoint.url
    }

    pub fn requires_auth(&self) -> bool {
        self.endpoint.requires_auth
    }

    /// Call with the endpoint defaults only.
    pub async fn invoke(&self) -> Result<CallResult, ManagerError> {
        self.call(CallOverrides::default()).await
    }

    /// Call with `overrides` merged over the endpoint defaults.
    ///
    /// Only a missing authorization source is returned as `Err`; every
    /// transport outcome comes back as a `CallResult`.
    pub async fn call(&self, overrides: CallOverrides) -> Result<CallResult, ManagerError> {
        let request = self.build_request(overrides)?;
        debug!(
            operation = %self.name,
            method = %request.method,
            url = %request.url,
            "dispatching request"
        );
        let outcome = self.state.transport.send(request).await;
        Ok(self.state.normalize(&self.name, outcome))
    }

    /// Merge, authorize and shape the request without sending it.
    pub fn build_request(&self, overrides: CallOverrides) -> Result<HttpRequest, ManagerError> {
        let endpoint = &self.endpoint;
        let CallOverrides {
            params,
            headers,
            data,
        } = overrides;

        let mut request_headers = self.state.headers.clone();
        merge_headers(&mut request_headers, endpoint.default_headers.clone());
        merge_headers(&mut request_headers, headers);

        let mut request_params = endpoint.default_params.clone();
        request_params.extend(params);

        if endpoint.requires_auth {
            set_header(&mut request_headers, AUTHORIZATION, self.state.auth.header_value()?);
        }

        Ok((endpoint.build)(Dispatch {
            url: endpoint.url.clone(),
            params: request_params,
            headers: request_headers,
            data,
            options: endpoint.transport_options.clone(),
        }))
    }
}

impl fmt::Debug for BoundOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundOperation")
            .field("name", &self.name)
            .field("method", &self.endpoint.method)
            .field("url", &self.endpoint.url)
            .field("requires_auth", &self.endpoint.requires_auth)
            .finish()
    }
}
