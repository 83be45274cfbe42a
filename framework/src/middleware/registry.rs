//! Global middleware registry
//!
//! Filled from the bootstrap function with `global_middleware!` and read
//! once by `Server::from_config`.

use super::{into_boxed, BoxedMiddleware, Middleware};
use std::sync::{OnceLock, RwLock};

static GLOBAL_MIDDLEWARE: OnceLock<RwLock<Vec<BoxedMiddleware>>> = OnceLock::new();

/// Add middleware that runs on every request, in registration order
pub fn register_global_middleware<M: Middleware>(middleware: M) {
    let registry = GLOBAL_MIDDLEWARE.get_or_init(|| RwLock::new(Vec::new()));
    match registry.write() {
        Ok(mut global) => global.push(into_boxed(middleware)),
        Err(poisoned) => poisoned.into_inner().push(into_boxed(middleware)),
    }
}

/// Everything registered with `global_middleware!` so far
pub fn get_global_middleware() -> Vec<BoxedMiddleware> {
    GLOBAL_MIDDLEWARE
        .get()
        .and_then(|lock| lock.read().ok())
        .map(|global| global.clone())
        .unwrap_or_default()
}

/// Global middleware of one server instance
#[derive(Default, Clone)]
pub struct MiddlewareRegistry {
    global: Vec<BoxedMiddleware>,
}

impl MiddlewareRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from the middleware registered with `global_middleware!`
    pub fn from_global() -> Self {
        Self {
            global: get_global_middleware(),
        }
    }

    /// Append middleware after the ones already present
    pub fn append<M: Middleware>(mut self, middleware: M) -> Self {
        self.global.push(into_boxed(middleware));
        self
    }

    /// Append already boxed middleware
    pub fn append_boxed(mut self, middleware: BoxedMiddleware) -> Self {
        self.global.push(middleware);
        self
    }

    pub fn global_middleware(&self) -> &[BoxedMiddleware] {
        &self.global
    }
}
