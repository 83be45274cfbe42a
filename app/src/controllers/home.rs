use lattice::{HttpResponse, Request, Response};

const SHELL: &str = r#"<!doctype html>
<html>
  <head><meta charset="utf-8"><title>Lattice</title></head>
  <body><div id="app"></div></body>
</html>
"#;

/// Single-page app shell, served for every unmatched GET
pub async fn shell(_req: Request) -> Response {
    Ok(HttpResponse::bytes(SHELL, "text/html; charset=utf-8"))
}
