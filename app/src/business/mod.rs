//! Catalog, pricing and audit capabilities
//!
//! Registered with `Application::module("app::business")`. Every
//! `#[component]` below `app::business` is bound to its contracts with
//! scoped lifetime, so one HTTP request sees one instance of each.

mod audit;
mod catalog;
mod contracts;
mod format;
mod pricing;

pub use audit::RequestAuditTrail;
pub use catalog::{InMemoryCatalog, Stock};
pub use contracts::{AuditTrail, PriceCalculator, Product, ProductCatalog};
pub use format::CurrencyFormat;
pub use pricing::StandardPricing;

lattice::declare_module!("app::business");
