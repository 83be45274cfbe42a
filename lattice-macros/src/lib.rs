//! Procedural macros for the Lattice framework
//!
//! This crate provides the self-registration macros behind capability
//! discovery:
//! - `#[contract]` marks a trait as a capability contract
//! - `#[component(...)]` marks a struct as the implementation of contracts

use proc_macro::TokenStream;

mod component;
mod contract;

/// Mark a trait as a capability contract
///
/// Adds `Send + Sync + 'static` bounds so the trait can be stored in the
/// container as `Arc<dyn Trait>`, and records the trait in the current
/// module's registration table. Supertraits outside the standard library
/// must be contracts themselves; a component of the trait is bound to them
/// as well.
///
/// # Example
///
/// ```rust,ignore
/// use lattice::contract;
///
/// #[contract]
/// pub trait PriceCalculator {
///     fn price(&self, product: &Product, quantity: u32) -> u64;
/// }
///
/// // Or record it under another module name
/// #[contract(module = "app::business")]
/// pub trait AuditTrail {
///     fn record(&self, event: &str);
/// }
/// ```
#[proc_macro_attribute]
pub fn contract(attr: TokenStream, input: TokenStream) -> TokenStream {
    contract::contract_impl(attr, input)
}

/// Mark a struct as the implementation of one or more contracts
///
/// At registration time (`App::register_module`), every listed contract is
/// bound to this struct with scoped lifetime, together with every contract
/// those extend. Fields marked `#[inject]` are
/// resolved from the scope; every other field uses `Default`.
///
/// Place `#[component]` above any `#[derive]` on the same struct.
///
/// # Example
///
/// ```rust,ignore
/// use lattice::component;
///
/// #[component(ProductCatalog, module = "app::business")]
/// pub struct InMemoryCatalog {
///     #[inject]
///     pricing: Arc<dyn PriceCalculator>,
///     products: Vec<Product>,
/// }
///
/// // A component with no contracts is discovered but never bound
/// #[component]
/// pub struct CatalogSeed;
/// ```
#[proc_macro_attribute]
pub fn component(attr: TokenStream, input: TokenStream) -> TokenStream {
    component::component_impl(attr, input)
}
