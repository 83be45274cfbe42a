use crate::config::{Config, ServerConfig};
use crate::container::{App, Container, Scope};
use crate::error::FrameworkError;
use crate::http::{collect_body, HttpResponse, Request, Response};
use crate::middleware::{Middleware, MiddlewareChain, MiddlewareRegistry, StaticFiles};
use crate::routing::{BoxedHandler, Router};
use bytes::Bytes;
use http_body_util::Full;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;

pub struct Server {
    router: Arc<Router>,
    middleware: MiddlewareRegistry,
    host: String,
    port: u16,
    max_body_size: usize,
}

impl Server {
    pub fn new(router: impl Into<Router>) -> Self {
        Self {
            router: Arc::new(router.into()),
            middleware: MiddlewareRegistry::new(),
            host: "127.0.0.1".to_string(),
            port: 8080,
            max_body_size: 10 * 1024 * 1024,
        }
    }

    /// Build from the registered `ServerConfig` and the global middleware
    ///
    /// When `public_dir` is configured, `StaticFiles` runs inside the global
    /// middleware and ahead of the router.
    pub fn from_config(router: impl Into<Router>) -> Self {
        let config = Config::get::<ServerConfig>().unwrap_or_else(ServerConfig::from_env);
        let middleware =
            with_static_files(MiddlewareRegistry::from_global(), StaticFiles::from_config());

        Self {
            router: Arc::new(router.into()),
            middleware,
            host: config.host,
            port: config.port,
            max_body_size: config.max_body_size,
        }
    }

    /// Add global middleware (runs on every request)
    pub fn middleware<M: Middleware>(mut self, middleware: M) -> Self {
        self.middleware = self.middleware.append(middleware);
        self
    }

    pub fn host(mut self, host: &str) -> Self {
        self.host = host.to_string();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn max_body_size(mut self, limit: usize) -> Self {
        self.max_body_size = limit;
        self
    }

    fn addr(&self) -> Result<SocketAddr, FrameworkError> {
        let ip = self
            .host
            .parse()
            .map_err(|_| FrameworkError::config(format!("invalid SERVER_HOST '{}'", self.host)))?;
        Ok(SocketAddr::new(ip, self.port))
    }

    /// Serve until Ctrl-C
    pub async fn run(self) -> Result<(), FrameworkError> {
        let addr = self.addr()?;
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| FrameworkError::internal(format!("cannot bind {}: {}", addr, e)))?;

        tracing::info!(%addr, "server listening");

        let handler = Arc::new(Handler {
            router: self.router,
            middleware: self.middleware,
            max_body_size: self.max_body_size,
            container: None,
        });

        let shutdown = tokio::signal::ctrl_c();
        tokio::pin!(shutdown);

        loop {
            let (stream, peer) = tokio::select! {
                accepted = listener.accept() => match accepted {
                    Ok(conn) => conn,
                    Err(e) => {
                        tracing::warn!(error = %e, "accept failed");
                        continue;
                    }
                },
                _ = &mut shutdown => {
                    tracing::info!("shutting down");
                    return Ok(());
                }
            };

            let io = TokioIo::new(stream);
            let handler = handler.clone();

            tokio::spawn(async move {
                let service = service_fn(move |req: hyper::Request<hyper::body::Incoming>| {
                    let handler = handler.clone();
                    async move { Ok::<_, Infallible>(handler.handle(req).await) }
                });

                if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                    tracing::debug!(%peer, error = %err, "connection error");
                }
            });
        }
    }
}

fn with_static_files(global: MiddlewareRegistry, files: Option<StaticFiles>) -> MiddlewareRegistry {
    match files {
        Some(files) => global.append(files),
        None => global,
    }
}

/// Per-server request handling shared by every connection
pub(crate) struct Handler {
    pub(crate) router: Arc<Router>,
    pub(crate) middleware: MiddlewareRegistry,
    pub(crate) max_body_size: usize,
    /// Resolve from this container instead of the global one
    pub(crate) container: Option<Arc<Container>>,
}

impl Handler {
    pub(crate) async fn handle<B>(&self, req: hyper::Request<B>) -> hyper::Response<Full<Bytes>>
    where
        B: hyper::body::Body,
        B::Error: std::error::Error + Send + Sync + 'static,
    {
        let started = Instant::now();
        let method = req.method().clone();
        let path = req.uri().path().to_string();

        let response = self.dispatch(req).await;

        tracing::info!(
            %method,
            %path,
            status = response.status_code(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "request"
        );
        response.into_hyper()
    }

    async fn dispatch<B>(&self, req: hyper::Request<B>) -> HttpResponse
    where
        B: hyper::body::Body,
        B::Error: std::error::Error + Send + Sync + 'static,
    {
        let (parts, body) = req.into_parts();
        let bytes = match collect_body(body, self.max_body_size).await {
            Ok(bytes) => bytes,
            Err(e) => return e.into(),
        };
        let inner = hyper::Request::from_parts(parts, bytes);

        // One scope per request: scoped bindings live until the response is built
        let container = self.container.clone().unwrap_or_else(App::container);
        let scope = Arc::new(Scope::new(container));

        let mut chain = MiddlewareChain::new();
        chain.extend(self.middleware.global_middleware().iter().cloned());

        let request = Request::new(inner, scope);
        let response = match self.router.match_route(request.method(), request.path()) {
            Some(matched) => {
                chain.extend(matched.middleware);
                chain
                    .execute(request.with_params(matched.params), matched.handler)
                    .await
            }
            None => {
                let handler: BoxedHandler = Box::new(|req| Box::pin(not_found(req)));
                chain.execute(request, Arc::new(handler)).await
            }
        };

        response.unwrap_or_else(|e| e)
    }
}

async fn not_found(_req: Request) -> Response {
    Err(HttpResponse::json(serde_json::json!({ "error": "Not Found" })).status(404))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::text;
    use http_body_util::BodyExt;

    async fn echo(req: Request) -> Response {
        text(String::from_utf8_lossy(req.body()).into_owned())
    }

    fn handler(limit: usize) -> Handler {
        Handler {
            router: Arc::new(Router::new().post("/echo", echo).into()),
            middleware: MiddlewareRegistry::new(),
            max_body_size: limit,
            container: None,
        }
    }

    fn post(body: &'static str) -> hyper::Request<Full<Bytes>> {
        hyper::Request::builder()
            .method("POST")
            .uri("/echo")
            .body(Full::new(Bytes::from_static(body.as_bytes())))
            .unwrap()
    }

    #[tokio::test]
    async fn test_dispatch_echo() {
        let response = handler(1024).handle(post("ping")).await;
        assert_eq!(response.status(), 200);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(body, Bytes::from_static(b"ping"));
    }

    #[tokio::test]
    async fn test_body_limit() {
        let response = handler(2).handle(post("too large")).await;
        assert_eq!(response.status(), 413);
    }

    #[tokio::test]
    async fn test_not_found() {
        let request = hyper::Request::builder()
            .uri("/missing")
            .body(Full::new(Bytes::new()))
            .unwrap();
        let response = handler(1024).handle(request).await;
        assert_eq!(response.status(), 404);
    }

    struct Statuses(Arc<std::sync::Mutex<Vec<u16>>>);

    #[async_trait::async_trait]
    impl Middleware for Statuses {
        async fn handle(&self, request: Request, next: crate::middleware::Next) -> Response {
            let response = next(request).await;
            let status = match &response {
                Ok(r) | Err(r) => r.status_code(),
            };
            self.0.lock().unwrap().push(status);
            response
        }
    }

    #[tokio::test]
    async fn test_global_middleware_sees_static_file_rejections() {
        let dir = tempfile::tempdir().unwrap();
        let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
        let middleware = with_static_files(
            MiddlewareRegistry::new().append(Statuses(seen.clone())),
            Some(StaticFiles::new(dir.path())),
        );
        let handler = Handler {
            router: Arc::new(Router::new()),
            middleware,
            max_body_size: 1024,
            container: Some(Arc::new(Container::new())),
        };

        let request = hyper::Request::builder()
            .uri("/../secret.txt")
            .body(Full::new(Bytes::new()))
            .unwrap();
        let response = handler.handle(request).await;

        assert_eq!(response.status(), 400);
        assert_eq!(*seen.lock().unwrap(), vec![400]);
    }

    #[test]
    fn test_invalid_host() {
        let server = Server::new(Router::new()).host("not-an-ip");
        assert!(matches!(server.addr(), Err(FrameworkError::Config(_))));
    }
}
