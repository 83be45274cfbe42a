use super::body::parse_json;
use crate::auth::Principal;
use crate::container::Scope;
use crate::error::FrameworkError;
use bytes::Bytes;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::Arc;

/// HTTP request with its collected body, route parameters and resolution scope
///
/// The server opens one `Scope` per request; every scoped binding resolved
/// through `Request::resolve` is shared for the rest of that request.
pub struct Request {
    inner: hyper::Request<Bytes>,
    params: HashMap<String, String>,
    scope: Arc<Scope>,
    principal: Option<Principal>,
}

impl Request {
    pub fn new(inner: hyper::Request<Bytes>, scope: Arc<Scope>) -> Self {
        Self {
            inner,
            params: HashMap::new(),
            scope,
            principal: None,
        }
    }

    pub fn with_params(mut self, params: HashMap<String, String>) -> Self {
        self.params = params;
        self
    }

    /// Attach the authenticated caller
    pub fn with_principal(mut self, principal: Principal) -> Self {
        self.principal = Some(principal);
        self
    }

    /// Get the request method
    pub fn method(&self) -> &hyper::Method {
        self.inner.method()
    }

    /// Get the request path
    pub fn path(&self) -> &str {
        self.inner.uri().path()
    }

    /// Get the raw query string
    pub fn query(&self) -> Option<&str> {
        self.inner.uri().query()
    }

    /// Get a route parameter by name (e.g., /products/{id})
    pub fn param(&self, name: &str) -> Result<&str, FrameworkError> {
        self.params
            .get(name)
            .map(|s| s.as_str())
            .ok_or_else(|| FrameworkError::param(name))
    }

    /// Get all route parameters
    pub fn params(&self) -> &HashMap<String, String> {
        &self.params
    }

    /// Get the inner hyper request
    pub fn inner(&self) -> &hyper::Request<Bytes> {
        &self.inner
    }

    /// Get a header value by name
    pub fn header(&self, name: &str) -> Option<&str> {
        self.inner.headers().get(name).and_then(|v| v.to_str().ok())
    }

    /// Get the Content-Type header
    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// Token from an `Authorization: Bearer <token>` header
    pub fn bearer_token(&self) -> Option<&str> {
        let value = self.header("authorization")?;
        let (scheme, token) = value.split_once(' ')?;
        let token = token.trim();
        if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() {
            Some(token)
        } else {
            None
        }
    }

    /// The collected request body
    pub fn body(&self) -> &Bytes {
        self.inner.body()
    }

    /// Parse the request body as JSON
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// #[derive(Deserialize)]
    /// struct Quote { product_id: u64, quantity: u32 }
    ///
    /// pub async fn quote(req: Request) -> Response {
    ///     let input: Quote = req.json()?;
    ///     // ...
    /// }
    /// ```
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, FrameworkError> {
        parse_json(self.inner.body())
    }

    /// The resolution scope of this request
    pub fn scope(&self) -> &Arc<Scope> {
        &self.scope
    }

    /// Resolve a contract within this request's scope
    pub fn resolve<T: ?Sized + Send + Sync + 'static>(&self) -> Result<Arc<T>, FrameworkError> {
        self.scope.resolve::<T>()
    }

    /// The caller authenticated by `AuthMiddleware`, if any
    pub fn principal(&self) -> Option<&Principal> {
        self.principal.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::Container;

    fn request(builder: hyper::http::request::Builder, body: &'static [u8]) -> Request {
        let inner = builder.body(Bytes::from_static(body)).unwrap();
        Request::new(inner, Arc::new(Scope::new(Arc::new(Container::new()))))
    }

    #[test]
    fn test_bearer_token() {
        let req = request(
            hyper::Request::builder().header("Authorization", "Bearer abc123"),
            b"",
        );
        assert_eq!(req.bearer_token(), Some("abc123"));

        let req = request(
            hyper::Request::builder().header("Authorization", "bearer   xyz "),
            b"",
        );
        assert_eq!(req.bearer_token(), Some("xyz"));

        let req = request(
            hyper::Request::builder().header("Authorization", "Basic dXNlcg=="),
            b"",
        );
        assert_eq!(req.bearer_token(), None);

        let req = request(hyper::Request::builder(), b"");
        assert_eq!(req.bearer_token(), None);
    }

    #[test]
    fn test_param_missing() {
        let mut params = HashMap::new();
        params.insert("id".to_string(), "7".to_string());
        let req = request(hyper::Request::builder().uri("/products/7"), b"").with_params(params);

        assert_eq!(req.param("id").unwrap(), "7");
        assert!(matches!(
            req.param("slug"),
            Err(FrameworkError::ParamError { .. })
        ));
    }

    #[test]
    fn test_json_body() {
        #[derive(serde::Deserialize)]
        struct Quote {
            quantity: u32,
        }

        let req = request(hyper::Request::builder().method("POST"), br#"{"quantity":3}"#);
        let quote: Quote = req.json().unwrap();
        assert_eq!(quote.quantity, 3);
    }
}
