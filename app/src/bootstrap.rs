//! Application bootstrap
//!
//! Runs after the capability modules are registered. Bindings made here
//! need runtime configuration, so they cannot come from `#[component]`.

use lattice::{
    bind, env_optional, global_middleware, AuthConfig, Config, ErrorLogMiddleware,
    FrameworkError, StaticTokenValidator, TokenValidator, DB,
};

use crate::middleware::AuditMiddleware;

pub async fn register() -> Result<(), FrameworkError> {
    let auth = Config::get::<AuthConfig>().unwrap_or_else(AuthConfig::from_env);
    if !auth.is_enabled() {
        tracing::warn!("AUTH_TOKENS is empty; every authenticated route will answer 401");
    }
    bind!(dyn TokenValidator, StaticTokenValidator::from_config(&auth));

    // The database is optional for this app
    if env_optional::<String>("DATABASE_URL").is_some() {
        DB::init().await?;
    }

    global_middleware!(ErrorLogMiddleware);
    global_middleware!(AuditMiddleware);

    Ok(())
}
