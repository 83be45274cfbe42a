//! Application builder for the Lattice framework
//!
//! The composition root: loads configuration, registers capability modules,
//! runs the bootstrap function and serves the routes.
//!
//! # Example
//!
//! ```rust,ignore
//! use lattice::Application;
//!
//! #[tokio::main]
//! async fn main() {
//!     Application::new()
//!         .config(config::register_all)
//!         .module("app::business")
//!         .module("app::promotions")
//!         .bootstrap(bootstrap::register)
//!         .routes(routes::register)
//!         .run()
//!         .await;
//! }
//! ```

use crate::config::{AppConfig, LogConfig};
use crate::container::{CapabilityRegistrar, RegistrationReport};
use crate::error::{FrameworkError, RegistrationError};
use crate::{logging, App, Config, Router, Server};
use clap::{Parser, Subcommand};
use std::future::Future;
use std::path::Path;
use std::pin::Pin;

/// CLI structure for Lattice applications
#[derive(Parser, Debug)]
#[command(name = "app")]
#[command(about = "Lattice application server and utilities")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Commands {
    /// Run the web server (default command)
    Serve,
    /// List the components and contracts of the configured modules
    #[command(name = "components:list")]
    ComponentsList {
        /// Only this module
        module: Option<String>,
    },
}

type BootstrapFn =
    Box<dyn FnOnce() -> Pin<Box<dyn Future<Output = Result<(), FrameworkError>> + Send>> + Send>;

/// Application builder
pub struct Application {
    config_fn: Option<Box<dyn FnOnce()>>,
    modules: Vec<String>,
    bootstrap_fn: Option<BootstrapFn>,
    routes_fn: Option<Box<dyn FnOnce() -> Router + Send>>,
}

impl Application {
    /// Create a new application builder
    pub fn new() -> Self {
        Application {
            config_fn: None,
            modules: Vec::new(),
            bootstrap_fn: None,
            routes_fn: None,
        }
    }

    /// Register a configuration function, called right after `.env` loading
    pub fn config<F>(mut self, f: F) -> Self
    where
        F: FnOnce() + 'static,
    {
        self.config_fn = Some(Box::new(f));
        self
    }

    /// Register every component of a module with the container
    ///
    /// Modules are registered in call order, so a contract implemented in a
    /// later module replaces the binding from an earlier one. Modules listed
    /// in `APP_MODULES` are registered after these.
    pub fn module(mut self, module: impl Into<String>) -> Self {
        self.modules.push(module.into());
        self
    }

    /// Register a bootstrap function
    ///
    /// Runs after module registration; use it for explicit bindings,
    /// global middleware and database setup.
    pub fn bootstrap<F, Fut>(mut self, f: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), FrameworkError>> + Send + 'static,
    {
        self.bootstrap_fn = Some(Box::new(move || Box::pin(f())));
        self
    }

    /// Register a routes function
    pub fn routes<F>(mut self, f: F) -> Self
    where
        F: FnOnce() -> Router + Send + 'static,
    {
        self.routes_fn = Some(Box::new(f));
        self
    }

    /// Parse the command line and run it
    ///
    /// - `serve` (default): register modules, bootstrap, serve
    /// - `components:list [MODULE]`: print what registration would bind
    ///
    /// Any startup failure is logged and ends the process with status 1.
    pub async fn run(self) {
        let cli = Cli::parse();
        if let Err(e) = self.execute(cli.command.unwrap_or(Commands::Serve)).await {
            tracing::error!(error = %e, "startup failed");
            std::process::exit(1);
        }
    }

    async fn execute(self, command: Commands) -> Result<(), FrameworkError> {
        let environment = Config::init(Path::new("."));
        let log = Config::get::<LogConfig>().unwrap_or_else(LogConfig::from_env);
        logging::init(&log);
        tracing::debug!(%environment, "configuration loaded");

        let Application {
            config_fn,
            modules,
            bootstrap_fn,
            routes_fn,
        } = self;

        if let Some(config_fn) = config_fn {
            config_fn();
        }

        let modules = configured_modules(modules);

        match command {
            Commands::Serve => {
                App::init();
                register_modules(&modules)?;

                if let Some(bootstrap_fn) = bootstrap_fn {
                    bootstrap_fn().await?;
                }

                let router = routes_fn.map(|f| f()).unwrap_or_default();
                Server::from_config(router).run().await
            }
            Commands::ComponentsList { module } => {
                let modules = module.map(|m| vec![m]).unwrap_or(modules);
                print!("{}", list_components(&CapabilityRegistrar::linked(), &modules)?);
                Ok(())
            }
        }
    }
}

impl Default for Application {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder modules first, then `APP_MODULES` entries not already listed
fn configured_modules(mut modules: Vec<String>) -> Vec<String> {
    let from_env = Config::get::<AppConfig>()
        .map(|c| c.modules)
        .unwrap_or_default();
    for module in from_env {
        if !modules.contains(&module) {
            modules.push(module);
        }
    }
    modules
}

/// Register modules in order against the global container
///
/// Stops at the first failure; modules registered before it stay bound.
pub fn register_modules(modules: &[String]) -> Result<Vec<RegistrationReport>, RegistrationError> {
    modules
        .iter()
        .map(|module| App::register_module(module))
        .collect()
}

/// Human-readable discovery of each module
pub fn list_components(
    registrar: &CapabilityRegistrar,
    modules: &[String],
) -> Result<String, RegistrationError> {
    let mut out = String::new();
    for module in modules {
        let discovery = registrar.discover(module)?;
        out.push_str(discovery.module());
        out.push('\n');
        if discovery.is_empty() {
            out.push_str("  (no components)\n");
        }
        for (implementation, contracts) in discovery.contract_map() {
            let contracts = if contracts.is_empty() {
                "(none)".to_string()
            } else {
                contracts.join(", ")
            };
            out.push_str(&format!("  {} -> {}\n", implementation, contracts));
        }
    }
    Ok(out)
}
