//! Sample product API wired through capability registration
//!
//! - `app::business`: catalog, pricing and audit components
//! - `app::promotions`: a pricing override, registered after `app::business`
//! - `app::notifications`: contracts only

pub mod bootstrap;
pub mod business;
pub mod config;
pub mod controllers;
pub mod middleware;
pub mod notifications;
pub mod promotions;
pub mod routes;
