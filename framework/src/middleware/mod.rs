//! Request middleware
//!
//! A middleware receives the request and a `Next` continuation; calling
//! `next(request).await` runs the rest of the chain and the handler.
//!
//! # Example
//!
//! ```rust,ignore
//! use lattice::{async_trait, Middleware, Next, Request, Response};
//!
//! pub struct RequireJson;
//!
//! #[async_trait]
//! impl Middleware for RequireJson {
//!     async fn handle(&self, request: Request, next: Next) -> Response {
//!         if request.content_type() != Some("application/json") {
//!             return Err(HttpResponse::text("expected JSON").status(415));
//!         }
//!         next(request).await
//!     }
//! }
//! ```

mod auth;
mod error_log;
mod registry;
mod static_files;

pub use auth::AuthMiddleware;
pub use error_log::ErrorLogMiddleware;
pub use registry::{get_global_middleware, register_global_middleware, MiddlewareRegistry};
pub use static_files::StaticFiles;

use crate::http::{Request, Response};
use crate::routing::BoxedHandler;
use async_trait::async_trait;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// The rest of the chain, ending in the route handler
pub type Next =
    Arc<dyn Fn(Request) -> Pin<Box<dyn Future<Output = Response> + Send>> + Send + Sync>;

/// Shared middleware instance
pub type BoxedMiddleware = Arc<dyn Middleware>;

#[async_trait]
pub trait Middleware: Send + Sync + 'static {
    async fn handle(&self, request: Request, next: Next) -> Response;
}

/// Box a middleware for storage in a chain or registry
pub fn into_boxed<M: Middleware>(middleware: M) -> BoxedMiddleware {
    Arc::new(middleware)
}

/// Ordered middleware for one request; the first added runs outermost
#[derive(Default, Clone)]
pub struct MiddlewareChain {
    middleware: Vec<BoxedMiddleware>,
}

impl MiddlewareChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, middleware: BoxedMiddleware) {
        self.middleware.push(middleware);
    }

    pub fn extend(&mut self, middleware: impl IntoIterator<Item = BoxedMiddleware>) {
        self.middleware.extend(middleware);
    }

    pub fn len(&self) -> usize {
        self.middleware.len()
    }

    pub fn is_empty(&self) -> bool {
        self.middleware.is_empty()
    }

    /// Run the chain, then the handler
    pub async fn execute(self, request: Request, handler: Arc<BoxedHandler>) -> Response {
        let mut next: Next = Arc::new(move |req| handler(req));

        for middleware in self.middleware.into_iter().rev() {
            let inner = next;
            next = Arc::new(move |req| {
                let middleware = middleware.clone();
                let inner = inner.clone();
                Box::pin(async move { middleware.handle(req, inner).await })
            });
        }

        next(request).await
    }
}

/// Register global middleware from the bootstrap function
///
/// # Example
///
/// ```rust,ignore
/// global_middleware!(ErrorLogMiddleware);
/// global_middleware!(AuthMiddleware::new());
/// ```
#[macro_export]
macro_rules! global_middleware {
    ($middleware:expr) => {
        $crate::middleware::register_global_middleware($middleware)
    };
}
