use crate::error::{AppError, FrameworkError};
use bytes::Bytes;
use http_body_util::Full;

/// HTTP response builder
#[derive(Debug, Clone)]
pub struct HttpResponse {
    status: u16,
    body: Bytes,
    headers: Vec<(String, String)>,
}

/// Response type alias - allows using `?` operator for early returns
pub type Response = Result<HttpResponse, HttpResponse>;

impl HttpResponse {
    pub fn new() -> Self {
        Self {
            status: 200,
            body: Bytes::new(),
            headers: Vec::new(),
        }
    }

    /// Create a response with a string body
    pub fn text(body: impl Into<String>) -> Self {
        Self::bytes(body.into(), "text/plain; charset=utf-8")
    }

    /// Create a JSON response from a serde_json::Value
    pub fn json(body: serde_json::Value) -> Self {
        Self::bytes(body.to_string(), "application/json")
    }

    /// Create a response with a raw body and content type
    pub fn bytes(body: impl Into<Bytes>, content_type: &str) -> Self {
        Self {
            status: 200,
            body: body.into(),
            headers: vec![("Content-Type".to_string(), content_type.to_string())],
        }
    }

    /// Set the HTTP status code
    pub fn status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    /// Add a header to the response
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Wrap this response in Ok() for use as Response type
    pub fn ok(self) -> Response {
        Ok(self)
    }

    pub fn status_code(&self) -> u16 {
        self.status
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// First value of a header, compared case-insensitively
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Convert to hyper response
    ///
    /// An invalid status or header turns the response into a bare 500.
    pub fn into_hyper(self) -> hyper::Response<Full<Bytes>> {
        let mut builder = hyper::Response::builder().status(self.status);
        for (name, value) in &self.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        builder.body(Full::new(self.body)).unwrap_or_else(|e| {
            tracing::error!(error = %e, "invalid response");
            let mut response = hyper::Response::new(Full::new(Bytes::from_static(
                b"Internal Server Error",
            )));
            *response.status_mut() = hyper::StatusCode::INTERNAL_SERVER_ERROR;
            response
        })
    }
}

impl Default for HttpResponse {
    fn default() -> Self {
        Self::new()
    }
}

/// Every framework error becomes a JSON body with its status code
impl From<FrameworkError> for HttpResponse {
    fn from(err: FrameworkError) -> HttpResponse {
        let status = err.status_code();
        let body = match &err {
            FrameworkError::ParamError { param_name } => serde_json::json!({
                "error": format!("Missing required parameter: {}", param_name)
            }),
            // Do not leak construction details to clients
            FrameworkError::ServiceNotFound { .. }
            | FrameworkError::CircularDependency { .. }
            | FrameworkError::BindingMismatch { .. }
            | FrameworkError::Registration(_)
            | FrameworkError::Database(_)
                if !crate::Config::is_debug() =>
            {
                serde_json::json!({ "error": "Internal server error" })
            }
            _ => serde_json::json!({ "error": err.to_string() }),
        };
        HttpResponse::json(body).status(status)
    }
}

impl From<AppError> for HttpResponse {
    fn from(err: AppError) -> HttpResponse {
        FrameworkError::from(err).into()
    }
}
