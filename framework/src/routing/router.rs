use crate::http::{Request, Response};
use crate::middleware::{into_boxed, BoxedMiddleware, Middleware};
use matchit::Router as MatchitRouter;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, OnceLock, RwLock};

/// Global registry mapping route names to path patterns
static ROUTE_REGISTRY: OnceLock<RwLock<HashMap<String, String>>> = OnceLock::new();

/// Register a route name -> path mapping
pub fn register_route_name(name: &str, path: &str) {
    let registry = ROUTE_REGISTRY.get_or_init(|| RwLock::new(HashMap::new()));
    if let Ok(mut map) = registry.write() {
        map.insert(name.to_string(), path.to_string());
    }
}

/// Generate a URL for a named route
///
/// # Example
/// ```rust,ignore
/// let url = route("products.show", &[("id", "42")]);
/// assert_eq!(url, Some("/api/products/42".to_string()));
/// ```
pub fn route(name: &str, params: &[(&str, &str)]) -> Option<String> {
    let registry = ROUTE_REGISTRY.get()?.read().ok()?;
    let mut url = registry.get(name)?.clone();
    for (key, value) in params {
        url = url.replace(&format!("{{{}}}", key), value);
    }
    Some(url)
}

/// Type alias for route handlers
pub type BoxedHandler =
    Box<dyn Fn(Request) -> Pin<Box<dyn Future<Output = Response> + Send>> + Send + Sync>;

#[derive(Clone)]
struct RouteEntry {
    pattern: String,
    handler: Arc<BoxedHandler>,
}

/// A matched route: handler, path parameters and route middleware
pub struct RouteMatch {
    pub handler: Arc<BoxedHandler>,
    pub params: HashMap<String, String>,
    pub middleware: Vec<BoxedMiddleware>,
}

fn boxed<H, Fut>(handler: H) -> Arc<BoxedHandler>
where
    H: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    let handler: BoxedHandler = Box::new(move |req| Box::pin(handler(req)));
    Arc::new(handler)
}

/// Whether the last path segment names a file, e.g. `/assets/app.js`
fn has_file_extension(path: &str) -> bool {
    path.rsplit('/')
        .next()
        .and_then(|segment| segment.rsplit_once('.'))
        .map_or(false, |(stem, ext)| !stem.is_empty() && !ext.is_empty())
}

/// HTTP router
///
/// Unmatched `GET`/`HEAD` requests go to the fallback handler when one is
/// set, which is how a single-page app shell is served. Paths that look like
/// files never fall back, so a missing asset stays a 404.
pub struct Router {
    routes: HashMap<hyper::Method, MatchitRouter<RouteEntry>>,
    /// Middleware assignments: (method, route pattern) -> middleware
    route_middleware: HashMap<(hyper::Method, String), Vec<BoxedMiddleware>>,
    fallback: Option<Arc<BoxedHandler>>,
}

impl Router {
    pub fn new() -> Self {
        Self {
            routes: HashMap::new(),
            route_middleware: HashMap::new(),
            fallback: None,
        }
    }

    fn insert(mut self, method: hyper::Method, path: &str, handler: Arc<BoxedHandler>) -> RouteBuilder {
        let entry = RouteEntry {
            pattern: path.to_string(),
            handler,
        };
        if let Err(e) = self.routes.entry(method.clone()).or_default().insert(path, entry) {
            tracing::warn!(%method, path, error = %e, "route not registered");
        }
        RouteBuilder {
            router: self,
            last_method: method,
            last_path: path.to_string(),
        }
    }

    /// Register a GET route
    pub fn get<H, Fut>(self, path: &str, handler: H) -> RouteBuilder
    where
        H: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        self.insert(hyper::Method::GET, path, boxed(handler))
    }

    /// Register a POST route
    pub fn post<H, Fut>(self, path: &str, handler: H) -> RouteBuilder
    where
        H: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        self.insert(hyper::Method::POST, path, boxed(handler))
    }

    /// Register a PUT route
    pub fn put<H, Fut>(self, path: &str, handler: H) -> RouteBuilder
    where
        H: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        self.insert(hyper::Method::PUT, path, boxed(handler))
    }

    /// Register a DELETE route
    pub fn delete<H, Fut>(self, path: &str, handler: H) -> RouteBuilder
    where
        H: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        self.insert(hyper::Method::DELETE, path, boxed(handler))
    }

    /// Handle unmatched GET requests
    pub fn fallback<H, Fut>(mut self, handler: H) -> Router
    where
        H: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        self.fallback = Some(boxed(handler));
        self
    }

    /// Match a request
    ///
    /// `HEAD` uses the `GET` routes. The fallback carries no middleware and
    /// no parameters.
    pub fn match_route(&self, method: &hyper::Method, path: &str) -> Option<RouteMatch> {
        let lookup = if method == hyper::Method::HEAD {
            &hyper::Method::GET
        } else {
            method
        };

        if let Some(matched) = self.routes.get(lookup).and_then(|r| r.at(path).ok()) {
            let params = matched
                .params
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect();
            let middleware = self
                .route_middleware
                .get(&(lookup.clone(), matched.value.pattern.clone()))
                .cloned()
                .unwrap_or_default();
            return Some(RouteMatch {
                handler: matched.value.handler.clone(),
                params,
                middleware,
            });
        }

        if lookup == hyper::Method::GET && !has_file_extension(path) {
            return self.fallback.clone().map(|handler| RouteMatch {
                handler,
                params: HashMap::new(),
                middleware: Vec::new(),
            });
        }
        None
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder returned after registering a route, enabling .name() and
/// .middleware() chaining
pub struct RouteBuilder {
    router: Router,
    last_method: hyper::Method,
    last_path: String,
}

impl RouteBuilder {
    /// Name the most recently registered route
    pub fn name(self, name: &str) -> RouteBuilder {
        register_route_name(name, &self.last_path);
        self
    }

    /// Apply middleware to the most recently registered route
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// Router::new()
    ///     .get("/api/products", products::index).middleware(AuthMiddleware::new())
    /// ```
    pub fn middleware<M: Middleware>(mut self, middleware: M) -> RouteBuilder {
        self.router
            .route_middleware
            .entry((self.last_method.clone(), self.last_path.clone()))
            .or_default()
            .push(into_boxed(middleware));
        self
    }

    /// Register a GET route
    pub fn get<H, Fut>(self, path: &str, handler: H) -> RouteBuilder
    where
        H: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        self.router.get(path, handler)
    }

    /// Register a POST route
    pub fn post<H, Fut>(self, path: &str, handler: H) -> RouteBuilder
    where
        H: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        self.router.post(path, handler)
    }

    /// Register a PUT route
    pub fn put<H, Fut>(self, path: &str, handler: H) -> RouteBuilder
    where
        H: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        self.router.put(path, handler)
    }

    /// Register a DELETE route
    pub fn delete<H, Fut>(self, path: &str, handler: H) -> RouteBuilder
    where
        H: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        self.router.delete(path, handler)
    }

    /// Handle unmatched GET requests
    pub fn fallback<H, Fut>(self, handler: H) -> Router
    where
        H: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        self.router.fallback(handler)
    }
}

impl From<RouteBuilder> for Router {
    fn from(builder: RouteBuilder) -> Self {
        builder.router
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::text;

    async fn index(_req: Request) -> Response {
        text("index")
    }

    async fn show(_req: Request) -> Response {
        text("show")
    }

    async fn shell(_req: Request) -> Response {
        text("shell")
    }

    #[test]
    fn test_match_with_params() {
        let router: Router = Router::new()
            .get("/products", index)
            .get("/products/{id}", show)
            .into();

        let matched = router
            .match_route(&hyper::Method::GET, "/products/42")
            .unwrap();
        assert_eq!(matched.params.get("id").map(String::as_str), Some("42"));

        assert!(router.match_route(&hyper::Method::POST, "/products").is_none());
        assert!(router.match_route(&hyper::Method::HEAD, "/products").is_some());
        assert!(router.match_route(&hyper::Method::GET, "/orders").is_none());
    }

    #[test]
    fn test_fallback_only_for_get() {
        let router = Router::new().get("/api/health", index).fallback(shell);

        assert!(router.match_route(&hyper::Method::GET, "/dashboard/settings").is_some());
        assert!(router.match_route(&hyper::Method::POST, "/dashboard").is_none());
    }

    #[test]
    fn test_fallback_skips_file_paths() {
        let router = Router::new().get("/api/health", index).fallback(shell);

        assert!(router.match_route(&hyper::Method::GET, "/assets/app.js").is_none());
        assert!(router.match_route(&hyper::Method::HEAD, "/favicon.ico").is_none());
        assert!(router.match_route(&hyper::Method::GET, "/orders/2024.01").is_none());
        assert!(router.match_route(&hyper::Method::GET, "/.well-known").is_some());
        assert!(router.match_route(&hyper::Method::GET, "/v1.2/orders").is_some());
    }

    #[test]
    fn test_route_middleware_follows_method() {
        let router: Router = Router::new()
            .get("/orders", index)
            .post("/orders", show)
            .middleware(crate::middleware::ErrorLogMiddleware)
            .into();

        let matched = router.match_route(&hyper::Method::POST, "/orders").unwrap();
        assert_eq!(matched.middleware.len(), 1);

        let matched = router.match_route(&hyper::Method::GET, "/orders").unwrap();
        assert!(matched.middleware.is_empty());
        let matched = router.match_route(&hyper::Method::HEAD, "/orders").unwrap();
        assert!(matched.middleware.is_empty());
    }

    #[test]
    fn test_route_middleware_follows_pattern() {
        let router: Router = Router::new()
            .get("/products/{id}", show)
            .middleware(crate::middleware::ErrorLogMiddleware)
            .get("/products", index)
            .into();

        let matched = router
            .match_route(&hyper::Method::GET, "/products/7")
            .unwrap();
        assert_eq!(matched.middleware.len(), 1);

        let matched = router.match_route(&hyper::Method::GET, "/products").unwrap();
        assert!(matched.middleware.is_empty());
    }

    #[test]
    fn test_named_route() {
        let _router: Router = Router::new()
            .get("/catalog/{sku}/reviews/{page}", show)
            .name("catalog.reviews")
            .into();

        assert_eq!(
            route("catalog.reviews", &[("sku", "A1"), ("page", "2")]),
            Some("/catalog/A1/reviews/2".to_string())
        );
        assert_eq!(route("catalog.missing", &[]), None);
    }
}
