use lattice::{json, AppConfig, Config, Request, Response, DB};
use serde_json::json;

pub async fn check(_req: Request) -> Response {
    let app = Config::get::<AppConfig>();
    json(json!({
        "status": "ok",
        "app": app.as_ref().map(|c| c.name.clone()),
        "environment": app.map(|c| c.environment.to_string()),
        "database": DB::is_connected(),
    }))
}
