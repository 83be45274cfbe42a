use crate::business::AuditTrail;
use lattice::{async_trait, Middleware, Next, Request, Response};

/// Records each request in the request's `AuditTrail`
///
/// The trail is scoped, so handlers and components resolved later in the
/// same request append to the same instance.
pub struct AuditMiddleware;

#[async_trait]
impl Middleware for AuditMiddleware {
    async fn handle(&self, request: Request, next: Next) -> Response {
        match request.scope().try_resolve::<dyn AuditTrail>() {
            Ok(Some(audit)) => {
                audit.record(&format!("{} {}", request.method(), request.path()));
            }
            Ok(None) => {}
            Err(e) => tracing::warn!(error = %e, "audit trail unavailable"),
        }
        next(request).await
    }
}
