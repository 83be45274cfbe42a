//! Self-registration table for capability discovery
//!
//! Contracts, components and modules register themselves at link time:
//! - `#[contract]` submits a `ContractEntry`
//! - `#[component(ContractA, ContractB)]` submits a `ComponentEntry` whose
//!   contract list also carries every contract the listed ones extend
//! - `declare_module!` submits a `ModuleEntry`
//!
//! The registrar reads the table through a `Catalog`, either the linked one
//! collected by `inventory` or one assembled by hand.
//!
//! # Example
//!
//! ```rust,ignore
//! use lattice::{component, contract, declare_module};
//!
//! declare_module!("app::business", requires = ["app::audit"]);
//!
//! #[contract]
//! pub trait ProductCatalog {
//!     fn list(&self) -> Vec<Product>;
//! }
//!
//! #[component(ProductCatalog)]
//! #[derive(Default)]
//! pub struct InMemoryCatalog;
//! ```

use super::{Container, Scope};
use crate::error::FrameworkError;

/// A module declared with `declare_module!`
#[derive(Debug)]
pub struct ModuleEntry {
    /// Module path, e.g. `app::business`
    pub name: &'static str,
    /// Modules that must be linked for this one to load
    pub requires: &'static [&'static str],
    /// Sealed modules refuse enumeration
    pub sealed: bool,
}

/// A capability contract (trait) marked with `#[contract]`
#[derive(Debug)]
pub struct ContractEntry {
    /// Trait name as written
    pub name: &'static str,
    /// Module path of the declaration
    pub module: &'static str,
    /// Fully qualified `dyn` type name
    pub type_name: fn() -> &'static str,
}

/// One contract an implementation satisfies, with the code that binds it
pub struct ContractBinding {
    /// Trait name as written
    pub name: &'static str,
    /// Fully qualified `dyn` type name
    pub type_name: fn() -> &'static str,
    /// Bind `dyn Contract -> Implementation` with scoped lifetime
    pub bind: fn(&mut Container),
}

impl std::fmt::Debug for ContractBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContractBinding")
            .field("name", &self.name)
            .field("type_name", &(self.type_name)())
            .finish()
    }
}

/// Construction of a `#[component]` from a scope
///
/// Generated by the macro: `#[inject]` fields come from the scope, every
/// other field from `Default`.
pub trait Component: Sized + 'static {
    fn construct(scope: &Scope) -> Result<Self, FrameworkError>;
}

/// An implementation type marked with `#[component(...)]`
#[derive(Debug)]
pub struct ComponentEntry {
    /// Struct name
    pub name: &'static str,
    /// Module path of the declaration
    pub module: &'static str,
    /// Every contract the type satisfies, direct ones first, then the
    /// contracts they extend
    pub contracts: fn() -> Vec<ContractBinding>,
}

impl ComponentEntry {
    /// `module::Name`
    pub fn qualified_name(&self) -> String {
        format!("{}::{}", self.module, self.name)
    }
}

inventory::collect!(ModuleEntry);
inventory::collect!(ContractEntry);
inventory::collect!(ComponentEntry);

/// Whether `path` is `module` itself or nested inside it
pub fn in_module(path: &str, module: &str) -> bool {
    path == module
        || (path.len() > module.len()
            && path.starts_with(module)
            && path[module.len()..].starts_with("::"))
}

/// The set of entries the registrar scans
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    modules: Vec<&'static ModuleEntry>,
    contracts: Vec<&'static ContractEntry>,
    components: Vec<&'static ComponentEntry>,
}

impl Catalog {
    /// Build a catalog from explicit entries
    pub fn new(
        modules: Vec<&'static ModuleEntry>,
        contracts: Vec<&'static ContractEntry>,
        components: Vec<&'static ComponentEntry>,
    ) -> Self {
        Self {
            modules,
            contracts,
            components,
        }
    }

    /// Every entry linked into the running binary
    pub fn linked() -> Self {
        Self {
            modules: inventory::iter::<ModuleEntry>.into_iter().collect(),
            contracts: inventory::iter::<ContractEntry>.into_iter().collect(),
            components: inventory::iter::<ComponentEntry>.into_iter().collect(),
        }
    }

    pub fn modules(&self) -> &[&'static ModuleEntry] {
        &self.modules
    }

    pub fn contracts(&self) -> &[&'static ContractEntry] {
        &self.contracts
    }

    pub fn components(&self) -> &[&'static ComponentEntry] {
        &self.components
    }

    /// The declaration for exactly this module name
    pub fn declared(&self, module: &str) -> Option<&'static ModuleEntry> {
        self.modules.iter().copied().find(|m| m.name == module)
    }

    /// Whether a module is declared or has at least one linked type
    pub fn resolves(&self, module: &str) -> bool {
        self.declared(module).is_some()
            || self.contracts.iter().any(|c| in_module(c.module, module))
            || self.components.iter().any(|c| in_module(c.module, module))
    }
}

/// Declare a module for capability registration
///
/// Declaring is optional: any module that contains a `#[contract]` or a
/// `#[component]` can be scanned. Declare a module to give it dependencies
/// or to seal it against scanning.
///
/// # Example
///
/// ```rust,ignore
/// declare_module!("app::business");
/// declare_module!("app::promotions", requires = ["app::business"]);
/// declare_module!("app::internal", sealed);
/// ```
#[macro_export]
macro_rules! declare_module {
    (@submit $name:expr, [$($dep:expr),*], $sealed:expr) => {
        $crate::inventory::submit! {
            $crate::container::provider::ModuleEntry {
                name: $name,
                requires: &[$($dep),*],
                sealed: $sealed,
            }
        }
    };
    ($name:expr) => {
        $crate::declare_module!(@submit $name, [], false);
    };
    ($name:expr, sealed) => {
        $crate::declare_module!(@submit $name, [], true);
    };
    ($name:expr, requires = [$($dep:expr),* $(,)?]) => {
        $crate::declare_module!(@submit $name, [$($dep),*], false);
    };
    ($name:expr, requires = [$($dep:expr),* $(,)?], sealed) => {
        $crate::declare_module!(@submit $name, [$($dep),*], true);
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    static BILLING: ModuleEntry = ModuleEntry {
        name: "billing",
        requires: &[],
        sealed: false,
    };

    static INVOICE: ContractEntry = ContractEntry {
        name: "Invoices",
        module: "billing::contracts",
        type_name: || "dyn billing::contracts::Invoices",
    };

    #[test]
    fn test_in_module() {
        assert!(in_module("app::business", "app::business"));
        assert!(in_module("app::business::pricing", "app::business"));
        assert!(!in_module("app::businessx", "app::business"));
        assert!(!in_module("app", "app::business"));
    }

    #[test]
    fn test_catalog_resolves_declared_and_populated_modules() {
        let catalog = Catalog::new(vec![&BILLING], vec![&INVOICE], vec![]);

        assert!(catalog.resolves("billing"));
        assert!(catalog.resolves("billing::contracts"));
        assert!(!catalog.resolves("shipping"));
        assert_eq!(catalog.declared("billing").map(|m| m.name), Some("billing"));
        assert!(catalog.declared("billing::contracts").is_none());
    }
}
