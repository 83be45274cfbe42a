use super::{Middleware, Next};
use crate::config::{Config, ServerConfig};
use crate::error::AppError;
use crate::http::{HttpResponse, Request, Response};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Serves files from a public directory
///
/// Only `GET` and `HEAD` requests are considered. A request that does not
/// name an existing file falls through to the router.
pub struct StaticFiles {
    root: PathBuf,
}

impl StaticFiles {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Serve `ServerConfig::public_dir`, if one is configured
    pub fn from_config() -> Option<Self> {
        Config::get::<ServerConfig>()
            .and_then(|c| c.public_dir)
            .map(Self::new)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a request path below the root; `Err` for traversal attempts
    fn resolve(&self, path: &str) -> Result<PathBuf, AppError> {
        let mut resolved = self.root.clone();
        for segment in path.split('/').filter(|s| !s.is_empty() && *s != ".") {
            let lower = segment.to_ascii_lowercase();
            if segment == ".."
                || segment.contains('\\')
                || lower.contains("%2e")
                || lower.contains("%2f")
                || lower.contains("%5c")
            {
                return Err(AppError::bad_request("Invalid path"));
            }
            resolved.push(segment);
        }
        Ok(resolved)
    }
}

fn content_type(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("html") | Some("htm") => "text/html; charset=utf-8",
        Some("css") => "text/css",
        Some("js") | Some("mjs") => "application/javascript",
        Some("json") => "application/json",
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("ico") => "image/x-icon",
        Some("txt") => "text/plain; charset=utf-8",
        Some("wasm") => "application/wasm",
        _ => "application/octet-stream",
    }
}

#[async_trait]
impl Middleware for StaticFiles {
    async fn handle(&self, request: Request, next: Next) -> Response {
        let method = request.method();
        if method != hyper::Method::GET && method != hyper::Method::HEAD {
            return next(request).await;
        }

        let mut path = self.resolve(request.path())?;
        if tokio::fs::metadata(&path).await.map(|m| m.is_dir()).unwrap_or(false) {
            path.push("index.html");
        }

        match tokio::fs::read(&path).await {
            Ok(contents) => {
                tracing::trace!(path = %path.display(), "static file");
                let body = if request.method() == hyper::Method::HEAD {
                    Vec::new()
                } else {
                    contents
                };
                Ok(HttpResponse::bytes(body, content_type(&path)))
            }
            Err(_) => next(request).await,
        }
    }
}
