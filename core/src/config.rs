//! Construction input: manager configuration and endpoint descriptors.
//!
//! # Design
//! Both types deserialize from the JSON shape API maps are usually written
//! in (`rootURL`, `requiresAuth`, ...). `method` stays a raw string so that
//! an unsupported verb survives parsing and is reported by `validate` with
//! the endpoint name attached, rather than as an anonymous serde error.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ManagerError;
use crate::http::{Headers, HttpMethod, Params, TransportOptions};
use crate::methods;

/// Static configuration of a single named endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointDescriptor {
    #[serde(default)]
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, rename = "params", skip_serializing_if = "serde_json::Map::is_empty")]
    pub default_params: Params,
    #[serde(default, rename = "headers", skip_serializing_if = "Headers::is_empty")]
    pub default_headers: Headers,
    #[serde(default)]
    pub requires_auth: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transport_options: Option<TransportOptions>,
}

impl EndpointDescriptor {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: Some(path.into()),
            ..Default::default()
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.default_params.insert(key.into(), value.into());
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.insert(name.into(), value.into());
        self
    }

    pub fn with_auth(mut self) -> Self {
        self.requires_auth = true;
        self
    }

    pub fn with_transport_options(mut self, options: TransportOptions) -> Self {
        self.transport_options = Some(options);
        self
    }

    /// Check the descriptor registered under `api_name`.
    ///
    /// The verb is checked before the path, so a descriptor with both
    /// problems reports `InvalidRequestMethod`.
    pub fn validate(&self, api_name: &str) -> Result<HttpMethod, ManagerError> {
        let method = methods::implemented(&self.method).ok_or_else(|| {
            ManagerError::InvalidRequestMethod {
                api_name: api_name.to_string(),
                descriptor: Box::new(self.clone()),
            }
        })?;
        if self.path.is_none() {
            return Err(ManagerError::UndefinedPath {
                api_name: api_name.to_string(),
                descriptor: Box::new(self.clone()),
            });
        }
        Ok(method)
    }
}

/// Everything needed to construct an `ApiManager`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagerConfig {
    #[serde(default)]
    pub host: String,
    #[serde(default = "default_root_url", rename = "rootURL")]
    pub root_url: String,
    #[serde(default)]
    pub apis: IndexMap<String, EndpointDescriptor>,
    #[serde(default)]
    pub authorization_header_prefix: String,
    #[serde(default)]
    pub headers: Headers,
}

fn default_root_url() -> String {
    "/".to_string()
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            root_url: default_root_url(),
            apis: IndexMap::new(),
            authorization_header_prefix: String::new(),
            headers: Headers::new(),
        }
    }
}

impl ManagerConfig {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ..Default::default()
        }
    }

    pub fn from_json_str(raw: &str) -> Result<Self, ManagerError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn with_root_url(mut self, root_url: impl Into<String>) -> Self {
        self.root_url = root_url.into();
        self
    }

    pub fn with_authorization_header_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.authorization_header_prefix = prefix.into();
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Register an endpoint. Re-registering a name replaces the descriptor
    /// but keeps its original position.
    pub fn with_api(mut self, name: impl Into<String>, descriptor: EndpointDescriptor) -> Self {
        self.apis.insert(name.into(), descriptor);
        self
    }

    /// Prefix shared by every endpoint URL: host followed by root URL, joined
    /// verbatim.
    pub fn api_url(&self) -> String {
        format!("{}{}", self.host, self.root_url)
    }
}
