//! Every verb, credential and failure path against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port and plugs a ureq-backed
//! `Transport` into the manager. ureq is blocking, so each request runs on
//! tokio's blocking pool.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use api_manager::{
    ApiManager, CallOverrides, CallResult, Headers, HttpMethod, HttpRequest, HttpResponse,
    ManagerConfig, ManagerError, Transport, TransportError,
};
use async_trait::async_trait;
use mock_server::Echo;
use serde_json::{json, Value};

/// Executes `HttpRequest`s with ureq.
///
/// Status-code-as-error is disabled so 4xx/5xx come back as responses; the
/// transport then reports them as `TransportError::Http`, as the manager
/// expects. `defaults` reach the wire through the manager, which folds them
/// into every request it builds.
struct UreqTransport {
    defaults: Headers,
}

#[async_trait]
impl Transport for UreqTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        tokio::task::spawn_blocking(move || execute(request))
            .await
            .map_err(|e| TransportError::request(e.to_string()))?
    }

    fn default_headers(&self) -> Headers {
        self.defaults.clone()
    }
}

fn with_parts<B>(mut builder: ureq::RequestBuilder<B>, req: &HttpRequest) -> ureq::RequestBuilder<B> {
    for (key, value) in req.query_pairs() {
        builder = builder.query(key, value);
    }
    for (name, value) in &req.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

fn execute(req: HttpRequest) -> Result<HttpResponse, TransportError> {
    let agent = ureq::Agent::config_builder()
        .http_status_as_error(false)
        .timeout_global(req.options.timeout_ms.map(Duration::from_millis))
        .build()
        .new_agent();

    let body = req.body_text();
    let result = match (req.method, body) {
        (HttpMethod::Get, _) => with_parts(agent.get(&req.url), &req).call(),
        (HttpMethod::Delete, None) => with_parts(agent.delete(&req.url), &req).call(),
        (HttpMethod::Delete, Some(body)) => {
            with_parts(agent.delete(&req.url).force_send_body(), &req)
                .content_type("application/json")
                .send(body.as_bytes())
        }
        (HttpMethod::Post, body) => with_parts(agent.post(&req.url), &req)
            .content_type("application/json")
            .send(body.unwrap_or_default().as_bytes()),
        (HttpMethod::Put, body) => with_parts(agent.put(&req.url), &req)
            .content_type("application/json")
            .send(body.unwrap_or_default().as_bytes()),
        (HttpMethod::Patch, body) => with_parts(agent.patch(&req.url), &req)
            .content_type("application/json")
            .send(body.unwrap_or_default().as_bytes()),
    };

    let mut response = result.map_err(|e| TransportError::request(e.to_string()))?;
    let status = response.status().as_u16();
    let headers = response
        .headers()
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|value| (name.as_str().to_string(), value.to_string()))
        })
        .collect();
    let body = response.body_mut().read_to_string().unwrap_or_default();

    let response = HttpResponse {
        status,
        headers,
        body,
    };
    if response.is_success() {
        Ok(response)
    } else {
        Err(TransportError::Http(response))
    }
}

fn start_server() -> SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    addr
}

fn config(addr: SocketAddr) -> ManagerConfig {
    let raw = json!({
        "host": format!("http://{addr}"),
        "rootURL": "/",
        "authorizationHeaderPrefix": "Bearer",
        "headers": {"X-Client": "api-manager"},
        "apis": {
            "listItems": {"method": "GET", "path": "echo/items", "params": {"page": 1}},
            "createItem": {"method": "POST", "path": "echo/items", "params": {"kind": "book"},
                           "headers": {"X-Origin": "tests"}},
            "replaceItem": {"method": "PUT", "path": "echo/items/1"},
            "patchItem": {"method": "PATCH", "path": "echo/items/1"},
            "deleteItem": {"method": "DELETE", "path": "echo/items/1", "params": {"hard": true}},
            "notFound": {"method": "GET", "path": "status/404"},
            "secure": {"method": "GET", "path": "secure", "requiresAuth": true}
        }
    });
    serde_json::from_value(raw).unwrap()
}

fn manager(addr: SocketAddr) -> ApiManager {
    let transport = UreqTransport {
        defaults: Headers::from([("X-Transport".to_string(), "ureq".to_string())]),
    };
    ApiManager::new(config(addr), Arc::new(transport)).unwrap()
}

fn echo(result: &CallResult) -> Echo {
    assert!(result.is_success(), "expected success, got {result:?}");
    result.response().unwrap().json().unwrap()
}

#[tokio::test]
async fn every_verb_round_trips() {
    let manager = manager(start_server());

    // GET: defaults and overrides merged into the query string.
    let result = manager
        .call("listItems", CallOverrides::new().param("q", "milk"))
        .await
        .unwrap();
    let seen = echo(&result);
    assert_eq!(seen.method, "GET");
    assert_eq!(seen.path, "items");
    assert_eq!(seen.query["page"], "1");
    assert_eq!(seen.query["q"], "milk");
    assert_eq!(seen.body, Value::Null);
    assert_eq!(seen.headers["x-client"], "api-manager");
    assert_eq!(seen.headers["x-transport"], "ureq");

    // POST: params become the JSON body.
    let result = manager
        .call("createItem", CallOverrides::new().param("title", "Dune"))
        .await
        .unwrap();
    let seen = echo(&result);
    assert_eq!(seen.method, "POST");
    assert_eq!(seen.body, json!({"kind": "book", "title": "Dune"}));
    assert!(seen.query.is_empty());
    assert_eq!(seen.headers["x-origin"], "tests");

    // PUT and PATCH without params send an empty object.
    for name in ["replaceItem", "patchItem"] {
        let result = manager.call(name, CallOverrides::new()).await.unwrap();
        assert_eq!(echo(&result).body, json!({}), "{name}");
    }

    // DELETE: params in the query, data as the body.
    let result = manager
        .call("deleteItem", CallOverrides::new().data(json!({"reason": "dup"})))
        .await
        .unwrap();
    let seen = echo(&result);
    assert_eq!(seen.method, "DELETE");
    assert_eq!(seen.query["hard"], "true");
    assert_eq!(seen.body, json!({"reason": "dup"}));
}

#[tokio::test]
async fn response_parser_projects_success() {
    let manager = manager(start_server());
    manager.set_response_parser(|response| {
        response
            .json::<Value>()
            .map(|body| body["method"].clone())
            .unwrap_or(Value::Null)
    });

    let result = manager.call("patchItem", CallOverrides::new()).await.unwrap();
    assert_eq!(result.parsed_data(), Some(&json!("PATCH")));
}

#[tokio::test]
async fn http_errors_are_normalized() {
    let manager = manager(start_server());

    let result = manager.call("notFound", CallOverrides::new()).await.unwrap();
    assert_eq!(result.parsed_error(), Some(json!(404)));
    assert_eq!(result.response().unwrap().status, 404);

    manager.set_http_error_parser(|response| {
        response
            .json::<Value>()
            .map(|body| json!({"reported": body["code"]}))
            .unwrap_or(Value::Null)
    });
    let result = manager.call("notFound", CallOverrides::new()).await.unwrap();
    assert_eq!(result.parsed_error(), Some(json!({"reported": 404})));
}

#[tokio::test]
async fn authorization_flow() {
    let manager = manager(start_server());

    let err = manager.call("secure", CallOverrides::new()).await.unwrap_err();
    assert!(matches!(err, ManagerError::NullAuthorizationHeader));

    manager.set_authorization_header("wrong");
    let result = manager.call("secure", CallOverrides::new()).await.unwrap();
    assert_eq!(result.parsed_error(), Some(json!(401)));

    manager.set_authorization_supplier(|| "open-sesame".to_string());
    let result = manager.call("secure", CallOverrides::new()).await.unwrap();
    assert!(result.is_success());
    let body: Value = result.response().unwrap().json().unwrap();
    assert_eq!(body["authorized"], true);
}

#[tokio::test]
async fn unreachable_host_is_a_transport_error() {
    // Bind then drop to get a port with nothing listening.
    let addr = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap();
    let manager = manager(addr);

    let result = manager.call("listItems", CallOverrides::new()).await.unwrap();
    match result {
        CallResult::TransportError { parsed_error } => assert!(!parsed_error.is_empty()),
        other => panic!("expected TransportError, got {other:?}"),
    }
}
