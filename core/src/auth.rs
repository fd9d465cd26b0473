//! Authorization provider for endpoints marked `requiresAuth`.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use crate::error::ManagerError;

/// Header injected on authorized calls.
pub const AUTHORIZATION: &str = "Authorization";

/// Where the credential comes from.
#[derive(Clone)]
pub enum AuthorizationSource {
    /// A fixed value.
    Constant(String),
    /// Called on every authorized request; the result is never cached.
    Supplier(Arc<dyn Fn() -> String + Send + Sync>),
}

impl AuthorizationSource {
    pub fn supplier<F>(supplier: F) -> Self
    where
        F: Fn() -> String + Send + Sync + 'static,
    {
        AuthorizationSource::Supplier(Arc::new(supplier))
    }

    pub fn resolve(&self) -> String {
        match self {
            AuthorizationSource::Constant(value) => value.clone(),
            AuthorizationSource::Supplier(supplier) => supplier(),
        }
    }
}

impl fmt::Debug for AuthorizationSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthorizationSource::Constant(_) => f.write_str("Constant(..)"),
            AuthorizationSource::Supplier(_) => f.write_str("Supplier(..)"),
        }
    }
}

impl From<String> for AuthorizationSource {
    fn from(value: String) -> Self {
        AuthorizationSource::Constant(value)
    }
}

impl From<&str> for AuthorizationSource {
    fn from(value: &str) -> Self {
        AuthorizationSource::Constant(value.to_string())
    }
}

/// Holds the current credential source and the fixed header prefix.
#[derive(Debug, Default)]
pub struct AuthorizationProvider {
    prefix: String,
    source: RwLock<Option<AuthorizationSource>>,
}

impl AuthorizationProvider {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            source: RwLock::new(None),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn set_source(&self, source: AuthorizationSource) {
        *self.source.write().unwrap_or_else(PoisonError::into_inner) = Some(source);
    }

    /// The raw credential value.
    pub fn resolve(&self) -> Result<String, ManagerError> {
        // Clone out so a supplier may itself swap the source.
        let source = self
            .source
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(ManagerError::NullAuthorizationHeader)?;
        Ok(source.resolve())
    }

    /// The full `Authorization` header value: `"{prefix} {value}"`.
    pub fn header_value(&self) -> Result<String, ManagerError> {
        Ok(format!("{} {}", self.prefix, self.resolve()?))
    }
}
