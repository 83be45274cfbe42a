//! In-process HTTP testing
//!
//! `TestClient` runs requests through the same dispatch path as `Server`
//! (body limit, per-request scope, middleware, router) without opening a
//! socket. Resolution uses the container given to the client, so tests do
//! not share the global one.
//!
//! # Example
//!
//! ```rust,ignore
//! let mut container = Container::new();
//! CapabilityRegistrar::linked().register("app::business", &mut container)?;
//!
//! let client = TestClient::new(routes::register(), container);
//! let response = client.get("/api/products").send().await;
//! assert_eq!(response.status(), 200);
//! ```

use crate::container::Container;
use crate::middleware::{Middleware, MiddlewareRegistry};
use crate::routing::Router;
use crate::server::Handler;
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use serde::de::DeserializeOwned;
use std::sync::Arc;

pub struct TestClient {
    handler: Handler,
}

impl TestClient {
    pub fn new(router: impl Into<Router>, container: Container) -> Self {
        Self {
            handler: Handler {
                router: Arc::new(router.into()),
                middleware: MiddlewareRegistry::new(),
                max_body_size: 10 * 1024 * 1024,
                container: Some(Arc::new(container)),
            },
        }
    }

    /// Add global middleware
    pub fn middleware<M: Middleware>(mut self, middleware: M) -> Self {
        self.handler.middleware = self.handler.middleware.append(middleware);
        self
    }

    pub fn max_body_size(mut self, limit: usize) -> Self {
        self.handler.max_body_size = limit;
        self
    }

    pub fn get(&self, path: &str) -> TestRequest<'_> {
        self.request(hyper::Method::GET, path)
    }

    pub fn post(&self, path: &str) -> TestRequest<'_> {
        self.request(hyper::Method::POST, path)
    }

    pub fn request(&self, method: hyper::Method, path: &str) -> TestRequest<'_> {
        TestRequest {
            client: self,
            builder: hyper::Request::builder().method(method).uri(path),
            body: Bytes::new(),
        }
    }
}

/// A request being built by `TestClient`
pub struct TestRequest<'a> {
    client: &'a TestClient,
    builder: hyper::http::request::Builder,
    body: Bytes,
}

impl TestRequest<'_> {
    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.builder = self.builder.header(name, value);
        self
    }

    pub fn bearer(self, token: &str) -> Self {
        self.header("Authorization", &format!("Bearer {}", token))
    }

    pub fn json(mut self, body: &serde_json::Value) -> Self {
        self.builder = self.builder.header("Content-Type", "application/json");
        self.body = Bytes::from(body.to_string());
        self
    }

    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Dispatch the request
    ///
    /// Panics if the request itself is malformed (bad URI or header).
    pub async fn send(self) -> TestResponse {
        let request = self
            .builder
            .body(Full::new(self.body))
            .expect("malformed test request");
        let response = self.client.handler.handle(request).await;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| Some((k.to_string(), v.to_str().ok()?.to_string())))
            .collect();
        let body = match response.into_body().collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(never) => match never {},
        };

        TestResponse {
            status,
            headers,
            body,
        }
    }
}

/// A collected response
#[derive(Debug, Clone)]
pub struct TestResponse {
    status: u16,
    headers: Vec<(String, String)>,
    body: Bytes,
}

impl TestResponse {
    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Parse the body as JSON; panics on invalid JSON
    pub fn json<T: DeserializeOwned>(&self) -> T {
        serde_json::from_slice(&self.body).expect("response body is not valid JSON")
    }
}
