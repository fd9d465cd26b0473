//! Method registry: maps a verb to the function that shapes its request.
//!
//! GET and DELETE carry params in the query string. POST, PUT and PATCH send
//! them as the JSON body. DELETE may additionally carry an explicit body
//! (`data`), since some APIs expect one.

use serde_json::Value;

use crate::error::ManagerError;
use crate::http::{Headers, HttpMethod, HttpRequest, Params, TransportOptions};

/// Everything a bound call hands to the registry after merging.
#[derive(Debug, Clone, Default)]
pub struct Dispatch {
    pub url: String,
    pub params: Params,
    pub headers: Headers,
    pub data: Option<Value>,
    pub options: TransportOptions,
}

/// Builds the request for one verb.
pub type MethodFn = fn(Dispatch) -> HttpRequest;

/// Verbs the registry can dispatch, in declaration order.
pub const IMPLEMENTED_METHODS: [HttpMethod; 5] = [
    HttpMethod::Get,
    HttpMethod::Post,
    HttpMethod::Put,
    HttpMethod::Patch,
    HttpMethod::Delete,
];

/// The registered method named exactly `verb`, if any.
pub fn implemented(verb: &str) -> Option<HttpMethod> {
    IMPLEMENTED_METHODS
        .into_iter()
        .find(|method| method.as_str() == verb)
}

/// Look up the request builder for `verb`.
pub fn resolve(verb: &str) -> Result<MethodFn, ManagerError> {
    implemented(verb)
        .map(method_fn)
        .ok_or_else(|| ManagerError::NotImplemented(verb.to_string()))
}

fn method_fn(method: HttpMethod) -> MethodFn {
    match method {
        HttpMethod::Get => get,
        HttpMethod::Post => post,
        HttpMethod::Put => put,
        HttpMethod::Patch => patch,
        HttpMethod::Delete => delete,
    }
}

fn get(dispatch: Dispatch) -> HttpRequest {
    HttpRequest {
        method: HttpMethod::Get,
        url: dispatch.url,
        query: dispatch.params,
        headers: dispatch.headers,
        body: None,
        options: dispatch.options,
    }
}

fn post(dispatch: Dispatch) -> HttpRequest {
    with_body(HttpMethod::Post, dispatch)
}

fn put(dispatch: Dispatch) -> HttpRequest {
    with_body(HttpMethod::Put, dispatch)
}

fn patch(dispatch: Dispatch) -> HttpRequest {
    with_body(HttpMethod::Patch, dispatch)
}

fn delete(dispatch: Dispatch) -> HttpRequest {
    HttpRequest {
        method: HttpMethod::Delete,
        url: dispatch.url,
        query: dispatch.params,
        headers: dispatch.headers,
        body: dispatch.data,
        options: dispatch.options,
    }
}

fn with_body(method: HttpMethod, dispatch: Dispatch) -> HttpRequest {
    HttpRequest {
        method,
        url: dispatch.url,
        query: Params::new(),
        headers: dispatch.headers,
        body: Some(Value::Object(dispatch.params)),
        options: dispatch.options,
    }
}
