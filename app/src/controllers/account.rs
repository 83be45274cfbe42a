use lattice::{json, FrameworkError, Request, Response};
use serde_json::json;

/// The authenticated caller; mounted behind `AuthMiddleware`
pub async fn me(req: Request) -> Response {
    let principal = req.principal().ok_or(FrameworkError::Unauthenticated)?;
    json(json!({
        "subject": principal.subject,
        "scopes": principal.scopes,
    }))
}
