mod app;
mod auth;
mod log;
mod server;

pub use app::{AppConfig, AppConfigBuilder};
pub use auth::AuthConfig;
pub use log::LogConfig;
pub use server::{ServerConfig, ServerConfigBuilder};
