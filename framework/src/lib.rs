//! Lattice: capability registration and application bootstrap
//!
//! Implementation types declare the contracts they satisfy with
//! `#[component]`; at startup the capability registrar scans a module and
//! binds every contract to its implementation with scoped lifetime. The rest
//! of the crate is the web bootstrap around it: configuration, logging,
//! routing, middleware, authentication and the HTTP server.

extern crate self as lattice;

pub mod app;
pub mod auth;
pub mod config;
pub mod container;
pub mod database;
pub mod error;
pub mod http;
pub mod logging;
pub mod middleware;
pub mod routing;
pub mod server;
pub mod testing;

pub use app::Application;
pub use auth::{Principal, StaticTokenValidator, TokenValidator};
pub use config::{
    env, env_list, env_optional, env_required, AppConfig, AuthConfig, Config, Environment,
    LogConfig, ServerConfig,
};
pub use container::{
    App, CapabilityRegistrar, Container, Discovery, FromScope, Lifetime, RegistrationReport,
    Scope,
};
pub use database::{DatabaseConfig, DatabaseType, DbConnection, DB};
pub use error::{
    AppError, FrameworkError, HttpError, ModuleLoadError, ReflectionAccessError,
    RegistrationError,
};
pub use http::{json, text, HttpResponse, Request, Response};
pub use middleware::{
    AuthMiddleware, ErrorLogMiddleware, Middleware, MiddlewareChain, Next, StaticFiles,
};
pub use routing::{route, Router};
pub use server::Server;

// Self-registration macros
pub use lattice_macros::{component, contract};

// Used by macro expansions and by application code implementing middleware
pub use async_trait::async_trait;
#[doc(hidden)]
pub use inventory;
pub use serde_json;
