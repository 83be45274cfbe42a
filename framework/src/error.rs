//! Framework-wide error types
//!
//! `FrameworkError` is the error every container, request and infrastructure
//! operation returns. Startup registration failures have their own
//! `RegistrationError` family so the composition root can tell a missing
//! module apart from a sealed one before it aborts.

use thiserror::Error;

/// Trait for errors that can be converted to HTTP responses
///
/// Implement this trait on your domain errors to customize the HTTP status code
/// and message that will be returned when the error is converted to a response.
///
/// # Example
///
/// ```rust,ignore
/// use lattice::HttpError;
///
/// #[derive(Debug)]
/// struct ProductNotFound { id: u64 }
///
/// impl std::fmt::Display for ProductNotFound {
///     fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
///         write!(f, "Product {} not found", self.id)
///     }
/// }
///
/// impl std::error::Error for ProductNotFound {}
///
/// impl HttpError for ProductNotFound {
///     fn status_code(&self) -> u16 { 404 }
/// }
/// ```
pub trait HttpError: std::error::Error + Send + Sync + 'static {
    /// HTTP status code (default: 500)
    fn status_code(&self) -> u16 {
        500
    }

    /// Error message for HTTP response (default: error's Display)
    fn error_message(&self) -> String {
        self.to_string()
    }
}

/// Ad-hoc domain error with an HTTP status
///
/// # Example
///
/// ```rust,ignore
/// use lattice::{AppError, FrameworkError};
///
/// fn lookup(id: u64) -> Result<Product, FrameworkError> {
///     catalog.find(id).ok_or_else(|| AppError::not_found("Product not found").into())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AppError {
    message: String,
    status_code: u16,
}

impl AppError {
    /// Create a new AppError with status 500 (Internal Server Error)
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status_code: 500,
        }
    }

    /// Set the HTTP status code
    pub fn status(mut self, code: u16) -> Self {
        self.status_code = code;
        self
    }

    /// Create a 404 Not Found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(message).status(404)
    }

    /// Create a 400 Bad Request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(message).status(400)
    }

    /// Create a 401 Unauthorized error
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(message).status(401)
    }

    /// Create a 403 Forbidden error
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(message).status(403)
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AppError {}

impl HttpError for AppError {
    fn status_code(&self) -> u16 {
        self.status_code
    }

    fn error_message(&self) -> String {
        self.message.clone()
    }
}

impl From<AppError> for FrameworkError {
    fn from(e: AppError) -> Self {
        FrameworkError::Domain {
            message: e.message,
            status_code: e.status_code,
        }
    }
}

/// A named module could not be located or its dependencies could not be loaded
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModuleLoadError {
    /// The caller supplied a blank module name
    #[error("module name must not be empty")]
    EmptyName,

    /// No declared module and no linked type carries this module path
    #[error("module '{module}' not found among linked components")]
    NotFound {
        /// The module that was requested
        module: String,
    },

    /// The module declares a dependency that is not linked into the binary
    #[error("module '{module}' requires '{dependency}', which is not linked")]
    MissingDependency {
        /// The module being loaded
        module: String,
        /// The dependency that failed to resolve
        dependency: String,
    },
}

/// Enumerating the types of a module was refused
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReflectionAccessError {
    /// The module (or a module nested inside the scanned one) is sealed
    #[error("module '{module}' is sealed and cannot be scanned")]
    Sealed {
        /// The sealed module
        module: String,
    },
}

/// Failure of the startup capability registration pass
///
/// Either variant aborts startup; nothing is bound when discovery fails.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    #[error(transparent)]
    ModuleLoad(#[from] ModuleLoadError),

    #[error(transparent)]
    ReflectionAccess(#[from] ReflectionAccessError),
}

impl RegistrationError {
    /// Name of the module the failure is about, if the error carries one
    pub fn module(&self) -> Option<&str> {
        match self {
            Self::ModuleLoad(ModuleLoadError::EmptyName) => None,
            Self::ModuleLoad(ModuleLoadError::NotFound { module })
            | Self::ModuleLoad(ModuleLoadError::MissingDependency { module, .. })
            | Self::ReflectionAccess(ReflectionAccessError::Sealed { module }) => Some(module),
        }
    }
}

/// Framework-wide error type
///
/// Converts into an HTTP response (see `http::response`), so handlers can
/// propagate it with `?`.
///
/// # Example
///
/// ```rust,ignore
/// use lattice::{FrameworkError, Request, Response};
///
/// pub async fn index(req: Request) -> Response {
///     let catalog = req.resolve::<dyn ProductCatalog>()?;
///     // ...
/// }
/// ```
#[derive(Debug, Clone, Error)]
pub enum FrameworkError {
    /// Service not found in the dependency injection container
    #[error("Service '{type_name}' not registered in container")]
    ServiceNotFound {
        /// The type name of the service that was not found
        type_name: &'static str,
    },

    /// A binding's construction required itself
    #[error("Circular dependency while constructing '{type_name}'")]
    CircularDependency {
        /// The type whose construction re-entered itself
        type_name: &'static str,
    },

    /// A binding produced a value of an unexpected type
    #[error("Binding for '{type_name}' produced a value of another type")]
    BindingMismatch {
        /// The requested type
        type_name: &'static str,
    },

    /// Capability registration failed
    #[error("Registration failed: {0}")]
    Registration(#[from] RegistrationError),

    /// Parameter extraction failed (missing or invalid parameter)
    #[error("Missing required parameter: {param_name}")]
    ParamError {
        /// The name of the parameter that failed extraction
        param_name: String,
    },

    /// Request body could not be decoded
    #[error("Invalid request body: {0}")]
    BadRequest(String),

    /// Request body exceeded the configured limit
    #[error("Request body exceeds {limit} bytes")]
    PayloadTooLarge {
        /// Configured limit in bytes
        limit: usize,
    },

    /// Configuration value missing or invalid
    #[error("Configuration error: {0}")]
    Config(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(String),

    /// Generic internal server error
    #[error("Internal server error: {message}")]
    Internal {
        /// The error message
        message: String,
    },

    /// Domain/application error with custom status code
    #[error("{message}")]
    Domain {
        /// The error message
        message: String,
        /// HTTP status code
        status_code: u16,
    },

    /// Missing or rejected credentials (401 Unauthorized)
    #[error("Unauthenticated")]
    Unauthenticated,
}

impl FrameworkError {
    /// Create a ServiceNotFound error for a given type
    pub fn service_not_found<T: ?Sized>() -> Self {
        Self::ServiceNotFound {
            type_name: std::any::type_name::<T>(),
        }
    }

    /// Create a ParamError for a missing parameter
    pub fn param(name: impl Into<String>) -> Self {
        Self::ParamError {
            param_name: name.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a DatabaseError
    pub fn database(message: impl Into<String>) -> Self {
        Self::Database(message.into())
    }

    /// Create an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Create a Domain error with custom status code
    pub fn domain(message: impl Into<String>, status_code: u16) -> Self {
        Self::Domain {
            message: message.into(),
            status_code,
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::ServiceNotFound { .. } => 500,
            Self::CircularDependency { .. } => 500,
            Self::BindingMismatch { .. } => 500,
            Self::Registration(_) => 500,
            Self::ParamError { .. } => 400,
            Self::BadRequest(_) => 400,
            Self::PayloadTooLarge { .. } => 413,
            Self::Config(_) => 500,
            Self::Database(_) => 500,
            Self::Internal { .. } => 500,
            Self::Domain { status_code, .. } => *status_code,
            Self::Unauthenticated => 401,
        }
    }
}

impl From<sea_orm::DbErr> for FrameworkError {
    fn from(e: sea_orm::DbErr) -> Self {
        Self::Database(e.to_string())
    }
}

impl From<serde_json::Error> for FrameworkError {
    fn from(e: serde_json::Error) -> Self {
        Self::BadRequest(e.to_string())
    }
}
