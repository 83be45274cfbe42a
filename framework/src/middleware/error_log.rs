use super::{Middleware, Next};
use crate::http::{Request, Response};
use async_trait::async_trait;
use std::time::Instant;

/// Logs error responses
///
/// Server errors (5xx) are logged at `error`, other `Err` responses at `warn`.
pub struct ErrorLogMiddleware;

#[async_trait]
impl Middleware for ErrorLogMiddleware {
    async fn handle(&self, request: Request, next: Next) -> Response {
        let method = request.method().clone();
        let path = request.path().to_string();
        let started = Instant::now();

        let response = next(request).await;

        let (status, is_err) = match &response {
            Ok(r) => (r.status_code(), false),
            Err(r) => (r.status_code(), true),
        };
        let elapsed_ms = started.elapsed().as_millis() as u64;

        if status >= 500 {
            tracing::error!(%method, %path, status, elapsed_ms, "request failed");
        } else if is_err {
            tracing::warn!(%method, %path, status, elapsed_ms, "request rejected");
        }

        response
    }
}
