use super::{Middleware, Next};
use crate::auth::TokenValidator;
use crate::config::{AuthConfig, Config};
use crate::error::FrameworkError;
use crate::http::{HttpResponse, Request, Response};
use async_trait::async_trait;

/// Requires a valid bearer token
///
/// The token is checked by the `dyn TokenValidator` bound in the container,
/// resolved from the request's scope. On success the `Principal` is attached
/// to the request; otherwise the request ends with `401`.
///
/// # Example
///
/// ```rust,ignore
/// Router::new()
///     .get("/api/products", products::index).middleware(AuthMiddleware::new())
/// ```
pub struct AuthMiddleware {
    realm: String,
}

impl AuthMiddleware {
    /// Use the realm of the registered `AuthConfig`
    pub fn new() -> Self {
        let realm = Config::get::<AuthConfig>()
            .map(|c| c.realm)
            .unwrap_or_else(|| "api".to_string());
        Self { realm }
    }

    pub fn realm(mut self, realm: impl Into<String>) -> Self {
        self.realm = realm.into();
        self
    }

    fn unauthorized(&self) -> HttpResponse {
        HttpResponse::from(FrameworkError::Unauthenticated).header(
            "WWW-Authenticate",
            format!("Bearer realm=\"{}\"", self.realm),
        )
    }
}

impl Default for AuthMiddleware {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Middleware for AuthMiddleware {
    async fn handle(&self, request: Request, next: Next) -> Response {
        let Some(token) = request.bearer_token().map(str::to_owned) else {
            return Err(self.unauthorized());
        };

        let validator = request.resolve::<dyn TokenValidator>().map_err(|e| {
            tracing::error!(error = %e, "no token validator bound");
            HttpResponse::from(e)
        })?;

        match validator.validate(&token).await {
            Some(principal) => {
                tracing::debug!(subject = %principal.subject, "authenticated");
                next(request.with_principal(principal)).await
            }
            None => Err(self.unauthorized()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::StaticTokenValidator;
    use crate::container::{Container, Scope};
    use crate::middleware::{into_boxed, MiddlewareChain};
    use crate::routing::BoxedHandler;
    use bytes::Bytes;
    use std::sync::Arc;

    fn request(container: Container, authorization: Option<&str>) -> Request {
        let mut builder = hyper::Request::builder().uri("/secure");
        if let Some(value) = authorization {
            builder = builder.header("Authorization", value);
        }
        let inner = builder.body(Bytes::new()).unwrap();
        Request::new(inner, Arc::new(Scope::new(Arc::new(container))))
    }

    fn whoami() -> Arc<BoxedHandler> {
        let handler: BoxedHandler = Box::new(|req: Request| {
            Box::pin(async move {
                let subject = req
                    .principal()
                    .map(|p| p.subject.clone())
                    .unwrap_or_default();
                crate::http::text(subject)
            })
        });
        Arc::new(handler)
    }

    fn container_with_tokens() -> Container {
        let mut container = Container::new();
        container.bind::<dyn TokenValidator>(Arc::new(StaticTokenValidator::new(["letmein"])));
        container
    }

    async fn run(request: Request) -> Response {
        let mut chain = MiddlewareChain::new();
        chain.push(into_boxed(AuthMiddleware::new().realm("test")));
        chain.execute(request, whoami()).await
    }

    #[tokio::test]
    async fn test_missing_token() {
        let response = run(request(container_with_tokens(), None)).await.unwrap_err();
        assert_eq!(response.status_code(), 401);
        assert_eq!(
            response.header_value("www-authenticate"),
            Some("Bearer realm=\"test\"")
        );
    }

    #[tokio::test]
    async fn test_rejected_token() {
        let response = run(request(container_with_tokens(), Some("Bearer nope")))
            .await
            .unwrap_err();
        assert_eq!(response.status_code(), 401);
    }

    #[tokio::test]
    async fn test_accepted_token() {
        let response = run(request(container_with_tokens(), Some("Bearer letmein")))
            .await
            .unwrap();
        assert_eq!(response.status_code(), 200);
        assert_eq!(response.body(), &Bytes::from_static(b"token-7"));
    }

    #[tokio::test]
    async fn test_no_validator_bound() {
        let response = run(request(Container::new(), Some("Bearer letmein")))
            .await
            .unwrap_err();
        assert_eq!(response.status_code(), 500);
    }
}
