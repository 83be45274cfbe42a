//! Capability registrar
//!
//! Scans one module of the self-registration table, maps every
//! implementation type to the contracts it satisfies, and binds each
//! contract to its implementation with scoped lifetime. Runs once during
//! startup; any error aborts the pass before anything is bound.

use super::provider::{in_module, Catalog, ComponentEntry};
use super::{Container, Lifetime};
use crate::error::{ModuleLoadError, ReflectionAccessError, RegistrationError};
use std::collections::BTreeMap;

/// An implementation type found in a module, with its contracts
#[derive(Debug, Clone, Copy)]
pub struct DiscoveredComponent {
    entry: &'static ComponentEntry,
}

impl DiscoveredComponent {
    /// Struct name
    pub fn name(&self) -> &'static str {
        self.entry.name
    }

    /// Module path the struct is declared in
    pub fn module(&self) -> &'static str {
        self.entry.module
    }

    /// `module::Name`
    pub fn qualified_name(&self) -> String {
        self.entry.qualified_name()
    }

    /// Fully qualified `dyn` names of every contract the type satisfies,
    /// inherited ones included
    pub fn contracts(&self) -> Vec<&'static str> {
        (self.entry.contracts)()
            .iter()
            .map(|binding| (binding.type_name)())
            .collect()
    }

    fn entry(&self) -> &'static ComponentEntry {
        self.entry
    }
}

/// Result of scanning one module
#[derive(Debug, Clone)]
pub struct Discovery {
    module: String,
    components: Vec<DiscoveredComponent>,
}

impl Discovery {
    pub fn module(&self) -> &str {
        &self.module
    }

    /// Implementation types in registration order
    pub fn components(&self) -> &[DiscoveredComponent] {
        &self.components
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// `qualified implementation name -> contract names`
    pub fn contract_map(&self) -> Vec<(String, Vec<&'static str>)> {
        self.components
            .iter()
            .map(|c| (c.qualified_name(), c.contracts()))
            .collect()
    }
}

/// One effective contract binding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingRecord {
    pub contract: &'static str,
    pub implementation: String,
    pub lifetime: Lifetime,
}

/// A contract bound again by a later implementation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Override {
    pub contract: &'static str,
    pub previous: String,
    pub current: String,
}

/// What a registration pass bound
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationReport {
    module: String,
    bindings: BTreeMap<&'static str, BindingRecord>,
    overrides: Vec<Override>,
    components: usize,
}

impl RegistrationReport {
    pub fn module(&self) -> &str {
        &self.module
    }

    /// Effective bindings, ordered by contract name
    pub fn bindings(&self) -> impl Iterator<Item = &BindingRecord> {
        self.bindings.values()
    }

    /// Implementation bound to a contract (fully qualified `dyn` name)
    pub fn implementation_of(&self, contract: &str) -> Option<&str> {
        self.bindings
            .get(contract)
            .map(|record| record.implementation.as_str())
    }

    pub fn overrides(&self) -> &[Override] {
        &self.overrides
    }

    /// Number of implementation types scanned
    pub fn components(&self) -> usize {
        self.components
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

/// Maps implementation types to contracts and registers the bindings
///
/// # Example
///
/// ```rust,ignore
/// let registrar = CapabilityRegistrar::linked();
/// let mut container = Container::new();
/// let report = registrar.register("app::business", &mut container)?;
/// for binding in report.bindings() {
///     println!("{} -> {}", binding.contract, binding.implementation);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CapabilityRegistrar {
    catalog: Catalog,
}

impl CapabilityRegistrar {
    pub fn new(catalog: Catalog) -> Self {
        Self { catalog }
    }

    /// Registrar over every entry linked into the binary
    pub fn linked() -> Self {
        Self::new(Catalog::linked())
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Enumerate the implementation types of a module
    ///
    /// Contract types are excluded; implementation types with no contracts
    /// are kept. Components are ordered by module path, then name.
    pub fn discover(&self, module: &str) -> Result<Discovery, RegistrationError> {
        let module = module.trim();
        if module.is_empty() {
            return Err(ModuleLoadError::EmptyName.into());
        }

        if !self.catalog.resolves(module) {
            return Err(ModuleLoadError::NotFound {
                module: module.to_string(),
            }
            .into());
        }

        self.check_access(module)?;

        if let Some(declared) = self.catalog.declared(module) {
            for dependency in declared.requires {
                if !self.catalog.resolves(dependency) {
                    return Err(ModuleLoadError::MissingDependency {
                        module: module.to_string(),
                        dependency: dependency.to_string(),
                    }
                    .into());
                }
            }
        }

        let mut components: Vec<DiscoveredComponent> = self
            .catalog
            .components()
            .iter()
            .copied()
            .filter(|entry| in_module(entry.module, module))
            .map(|entry| DiscoveredComponent { entry })
            .collect();
        components.sort_by(|a, b| (a.module(), a.name()).cmp(&(b.module(), b.name())));

        tracing::debug!(
            module,
            components = components.len(),
            contracts = self
                .catalog
                .contracts()
                .iter()
                .filter(|c| in_module(c.module, module))
                .count(),
            "module scanned"
        );

        Ok(Discovery {
            module: module.to_string(),
            components,
        })
    }

    /// Discover a module and bind every contract to its implementation
    ///
    /// Bindings use scoped lifetime. When two implementations satisfy the
    /// same contract, the one registered later wins and the replacement is
    /// recorded in the report.
    pub fn register(
        &self,
        module: &str,
        container: &mut Container,
    ) -> Result<RegistrationReport, RegistrationError> {
        let discovery = self.discover(module)?;

        let mut bindings: BTreeMap<&'static str, BindingRecord> = BTreeMap::new();
        let mut overrides = Vec::new();

        for component in discovery.components() {
            let implementation = component.qualified_name();
            for binding in (component.entry().contracts)() {
                (binding.bind)(container);

                let contract = (binding.type_name)();
                let record = BindingRecord {
                    contract,
                    implementation: implementation.clone(),
                    lifetime: Lifetime::Scoped,
                };
                if let Some(previous) = bindings.insert(contract, record) {
                    if previous.implementation != implementation {
                        tracing::warn!(
                            contract,
                            previous = %previous.implementation,
                            current = %implementation,
                            "contract binding overridden"
                        );
                        overrides.push(Override {
                            contract,
                            previous: previous.implementation,
                            current: implementation.clone(),
                        });
                    }
                }
            }
        }

        tracing::info!(
            module = discovery.module(),
            components = discovery.components().len(),
            bindings = bindings.len(),
            "module registered"
        );

        Ok(RegistrationReport {
            module: discovery.module().to_string(),
            bindings,
            overrides,
            components: discovery.components().len(),
        })
    }

    fn check_access(&self, module: &str) -> Result<(), ReflectionAccessError> {
        // Sealed below the scanned module, or the scanned module lies inside a sealed one
        let sealed = self.catalog.modules().iter().find(|declared| {
            declared.sealed
                && (in_module(declared.name, module) || in_module(module, declared.name))
        });
        match sealed {
            Some(declared) => Err(ReflectionAccessError::Sealed {
                module: declared.name.to_string(),
            }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::provider::{ContractBinding, ContractEntry, ModuleEntry};
    use crate::container::Scope;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    trait Storage: Send + Sync {
        fn backend(&self) -> &'static str;
    }

    trait Reporting: Send + Sync {}

    struct Disk;
    impl Storage for Disk {
        fn backend(&self) -> &'static str {
            "disk"
        }
    }
    impl Reporting for Disk {}

    struct Memory;
    impl Storage for Memory {
        fn backend(&self) -> &'static str {
            "memory"
        }
    }

    fn storage_name() -> &'static str {
        std::any::type_name::<dyn Storage>()
    }

    fn reporting_name() -> &'static str {
        std::any::type_name::<dyn Reporting>()
    }

    fn bind_disk_storage(c: &mut Container) {
        c.bind_scoped::<dyn Storage, _>(|_| Ok(Arc::new(Disk)));
    }

    fn bind_disk_reporting(c: &mut Container) {
        c.bind_scoped::<dyn Reporting, _>(|_| Ok(Arc::new(Disk)));
    }

    fn bind_memory_storage(c: &mut Container) {
        c.bind_scoped::<dyn Storage, _>(|_| Ok(Arc::new(Memory)));
    }

    fn disk_contracts() -> Vec<ContractBinding> {
        vec![
            ContractBinding {
                name: "Storage",
                type_name: storage_name,
                bind: bind_disk_storage,
            },
            ContractBinding {
                name: "Reporting",
                type_name: reporting_name,
                bind: bind_disk_reporting,
            },
        ]
    }

    fn memory_contracts() -> Vec<ContractBinding> {
        vec![ContractBinding {
            name: "Storage",
            type_name: storage_name,
            bind: bind_memory_storage,
        }]
    }

    fn no_contracts() -> Vec<ContractBinding> {
        Vec::new()
    }

    // A implements {Storage, Reporting}, B implements {Storage}
    static A_DISK: ComponentEntry = ComponentEntry {
        name: "ADisk",
        module: "store",
        contracts: disk_contracts,
    };

    static B_MEMORY: ComponentEntry = ComponentEntry {
        name: "BMemory",
        module: "store",
        contracts: memory_contracts,
    };

    static PLAIN: ComponentEntry = ComponentEntry {
        name: "Plain",
        module: "store::support",
        contracts: no_contracts,
    };

    static MASTER_KEY: ComponentEntry = ComponentEntry {
        name: "MasterKey",
        module: "store::vault::keys",
        contracts: no_contracts,
    };

    static STORAGE_CONTRACT: ContractEntry = ContractEntry {
        name: "Storage",
        module: "contracts",
        type_name: storage_name,
    };

    static REPORTING_CONTRACT: ContractEntry = ContractEntry {
        name: "Reporting",
        module: "contracts",
        type_name: reporting_name,
    };

    static VAULT: ModuleEntry = ModuleEntry {
        name: "store::vault",
        requires: &[],
        sealed: true,
    };

    static REPORTS: ModuleEntry = ModuleEntry {
        name: "reports",
        requires: &["store", "ledger"],
        sealed: false,
    };

    fn registrar() -> CapabilityRegistrar {
        // Deliberately listed out of order; discovery sorts
        CapabilityRegistrar::new(Catalog::new(
            vec![],
            vec![&STORAGE_CONTRACT, &REPORTING_CONTRACT],
            vec![&PLAIN, &B_MEMORY, &A_DISK],
        ))
    }

    #[test]
    fn test_last_registration_wins() {
        let mut container = Container::new();
        let report = registrar().register("store", &mut container).unwrap();

        assert_eq!(report.implementation_of(reporting_name()), Some("store::ADisk"));
        assert_eq!(report.implementation_of(storage_name()), Some("store::BMemory"));
        assert_eq!(
            report.overrides(),
            &[Override {
                contract: storage_name(),
                previous: "store::ADisk".to_string(),
                current: "store::BMemory".to_string(),
            }]
        );

        let scope = Scope::new(Arc::new(container));
        assert_eq!(scope.resolve::<dyn Storage>().unwrap().backend(), "memory");
        assert!(scope.resolve::<dyn Reporting>().is_ok());
    }

    #[test]
    fn test_bindings_are_scoped() {
        let mut container = Container::new();
        let report = registrar().register("store", &mut container).unwrap();

        assert!(report.bindings().all(|b| b.lifetime == Lifetime::Scoped));
        assert_eq!(container.lifetime_of::<dyn Storage>(), Some(Lifetime::Scoped));
    }

    #[test]
    fn test_contract_only_module_binds_nothing() {
        let mut container = Container::new();
        let report = registrar().register("contracts", &mut container).unwrap();

        assert!(report.is_empty());
        assert_eq!(report.components(), 0);
        assert!(container.is_empty());
    }

    #[test]
    fn test_empty_module_name_fails_fast() {
        let mut container = Container::new();
        for name in ["", "   "] {
            let err = registrar().register(name, &mut container).unwrap_err();
            assert_eq!(err, RegistrationError::ModuleLoad(ModuleLoadError::EmptyName));
        }
        assert!(container.is_empty());
    }

    #[test]
    fn test_unknown_module() {
        let err = registrar().discover("shipping").unwrap_err();
        assert_eq!(
            err,
            RegistrationError::ModuleLoad(ModuleLoadError::NotFound {
                module: "shipping".to_string()
            })
        );
    }

    #[test]
    fn test_component_without_contracts_is_discovered_but_not_bound() {
        let discovery = registrar().discover("store::support").unwrap();
        assert_eq!(
            discovery.contract_map(),
            vec![("store::support::Plain".to_string(), vec![])]
        );

        let mut container = Container::new();
        let report = registrar().register("store::support", &mut container).unwrap();
        assert_eq!(report.components(), 1);
        assert!(report.is_empty());
        assert!(container.is_empty());
    }

    #[test]
    fn test_discovery_includes_nested_modules_in_order() {
        let discovery = registrar().discover("store").unwrap();
        let names: Vec<String> = discovery
            .components()
            .iter()
            .map(|c| c.qualified_name())
            .collect();
        assert_eq!(
            names,
            vec!["store::ADisk", "store::BMemory", "store::support::Plain"]
        );
        assert_eq!(
            discovery.components()[0].contracts(),
            vec![storage_name(), reporting_name()]
        );
    }

    #[test]
    fn test_registration_is_idempotent() {
        let first = registrar()
            .register("store", &mut Container::new())
            .unwrap();
        let second = registrar()
            .register("store", &mut Container::new())
            .unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_sealed_module_refuses_scan() {
        let registrar = CapabilityRegistrar::new(Catalog::new(
            vec![&VAULT],
            vec![],
            vec![&A_DISK],
        ));

        let expected = RegistrationError::ReflectionAccess(ReflectionAccessError::Sealed {
            module: "store::vault".to_string(),
        });
        assert_eq!(registrar.discover("store::vault").unwrap_err(), expected);
        // Scanning the enclosing module would enumerate the sealed one too
        assert_eq!(registrar.discover("store").unwrap_err(), expected);
    }

    #[test]
    fn test_module_inside_sealed_module_refuses_scan() {
        let registrar = CapabilityRegistrar::new(Catalog::new(
            vec![&VAULT],
            vec![],
            vec![&A_DISK, &MASTER_KEY],
        ));

        let err = registrar.discover("store::vault::keys").unwrap_err();
        assert_eq!(
            err,
            RegistrationError::ReflectionAccess(ReflectionAccessError::Sealed {
                module: "store::vault".to_string(),
            })
        );

        let mut container = Container::new();
        assert!(registrar.register("store::vault::keys", &mut container).is_err());
        assert!(container.is_empty());
    }

    #[test]
    fn test_missing_dependency_aborts_without_binding() {
        let registrar = CapabilityRegistrar::new(Catalog::new(
            vec![&REPORTS],
            vec![],
            vec![&A_DISK],
        ));
        let mut container = Container::new();

        let err = registrar.register("reports", &mut container).unwrap_err();
        assert_eq!(
            err,
            RegistrationError::ModuleLoad(ModuleLoadError::MissingDependency {
                module: "reports".to_string(),
                dependency: "ledger".to_string(),
            })
        );
        assert!(container.is_empty());
    }
}
