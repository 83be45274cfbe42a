use app::business::{
    AuditTrail, CurrencyFormat, InMemoryCatalog, PriceCalculator, ProductCatalog,
    RequestAuditTrail, StandardPricing,
};
use app::notifications::Notifier;
use app::promotions::PromotionalPricing;
use lattice::{
    CapabilityRegistrar, Container, Lifetime, ModuleLoadError, ReflectionAccessError,
    RegistrationError, Scope,
};
use pretty_assertions::assert_eq;
use std::any::type_name;
use std::sync::Arc;

mod vault {
    use lattice::{component, contract};

    lattice::declare_module!("registration::vault", sealed);

    #[contract]
    pub trait Secrets {
        fn secret(&self, key: &str) -> Option<String>;
    }

    #[component(Secrets)]
    pub struct EnvSecrets;

    impl Secrets for EnvSecrets {
        fn secret(&self, key: &str) -> Option<String> {
            std::env::var(key).ok()
        }
    }
}

mod reports {
    use lattice::component;

    lattice::declare_module!("registration::reports", requires = ["registration::warehouse"]);

    #[component]
    pub struct SalesReport;
}

mod scheduling {
    use lattice::{component, contract};

    #[contract]
    pub trait Clock {
        fn now(&self) -> u64;
    }

    #[contract]
    pub trait Scheduler: Clock {
        fn next_run(&self) -> u64;
    }

    #[contract]
    pub trait Reminder: Clock + std::fmt::Debug {
        fn remind_at(&self) -> u64;
    }

    #[component(Scheduler, Reminder)]
    #[derive(Debug)]
    pub struct FixedSchedule;

    impl Clock for FixedSchedule {
        fn now(&self) -> u64 {
            1_000
        }
    }

    impl Scheduler for FixedSchedule {
        fn next_run(&self) -> u64 {
            self.now() + 60
        }
    }

    impl Reminder for FixedSchedule {
        fn remind_at(&self) -> u64 {
            self.now() + 30
        }
    }
}

fn registrar() -> CapabilityRegistrar {
    CapabilityRegistrar::linked()
}

fn qualified<T: ?Sized>() -> String {
    type_name::<T>().to_string()
}

#[test]
fn discovers_every_business_component_in_order() {
    let discovery = registrar().discover("app::business").unwrap();

    assert_eq!(
        discovery.contract_map(),
        vec![
            (qualified::<RequestAuditTrail>(), vec![type_name::<dyn AuditTrail>()]),
            (qualified::<InMemoryCatalog>(), vec![type_name::<dyn ProductCatalog>()]),
            (qualified::<CurrencyFormat>(), vec![]),
            (qualified::<StandardPricing>(), vec![type_name::<dyn PriceCalculator>()]),
        ]
    );
}

#[test]
fn binds_each_contract_with_scoped_lifetime() {
    let mut container = Container::new();
    let report = registrar().register("app::business", &mut container).unwrap();

    assert_eq!(report.len(), 3);
    assert_eq!(report.components(), 4);
    assert!(report.overrides().is_empty());
    assert_eq!(
        report.implementation_of(type_name::<dyn ProductCatalog>()),
        Some(type_name::<InMemoryCatalog>())
    );
    assert!(report.bindings().all(|b| b.lifetime == Lifetime::Scoped));

    assert_eq!(container.lifetime_of::<dyn ProductCatalog>(), Some(Lifetime::Scoped));
    assert_eq!(container.lifetime_of::<dyn PriceCalculator>(), Some(Lifetime::Scoped));
    assert_eq!(container.lifetime_of::<dyn AuditTrail>(), Some(Lifetime::Scoped));
}

#[test]
fn component_without_contracts_binds_nothing() {
    let mut container = Container::new();
    let report = registrar().register("app::business", &mut container).unwrap();

    assert!(report
        .bindings()
        .all(|b| b.implementation != type_name::<CurrencyFormat>()));
    assert_eq!(container.len(), 3);
}

#[test]
fn later_module_overrides_earlier_binding() {
    let registrar = registrar();
    let mut container = Container::new();

    registrar.register("app::business", &mut container).unwrap();
    let report = registrar.register("app::promotions", &mut container).unwrap();

    assert_eq!(
        report.implementation_of(type_name::<dyn PriceCalculator>()),
        Some(type_name::<PromotionalPricing>())
    );

    let scope = Scope::new(Arc::new(container));
    let pricing = scope.resolve::<dyn PriceCalculator>().unwrap();
    assert_eq!(pricing.name(), "promotional");

    // Untouched contracts keep the first module's implementation
    let catalog = scope.resolve::<dyn ProductCatalog>().unwrap();
    assert_eq!(catalog.products().len(), 4);
}

#[test]
fn registering_a_module_twice_gives_identical_reports() {
    let registrar = registrar();

    let first = registrar
        .register("app::business", &mut Container::new())
        .unwrap();
    let second = registrar
        .register("app::business", &mut Container::new())
        .unwrap();

    assert_eq!(first, second);
}

#[test]
fn re_registering_into_the_same_container_is_idempotent() {
    let registrar = registrar();
    let mut container = Container::new();

    registrar.register("app::business", &mut container).unwrap();
    // Overrides are only recorded between components of one pass
    let report = registrar.register("app::business", &mut container).unwrap();

    assert!(report.overrides().is_empty());
    assert_eq!(container.len(), 3);
}

#[test]
fn contract_only_module_binds_nothing() {
    let mut container = Container::new();
    let report = registrar()
        .register("app::notifications", &mut container)
        .unwrap();

    assert!(report.is_empty());
    assert_eq!(report.components(), 0);
    assert!(!container.has_binding::<dyn Notifier>());
}

#[test]
fn blank_module_name_fails_fast() {
    for name in ["", "   "] {
        let err = registrar().discover(name).unwrap_err();
        assert_eq!(err, RegistrationError::ModuleLoad(ModuleLoadError::EmptyName));
    }
}

#[test]
fn unknown_module_is_a_load_error() {
    let mut container = Container::new();
    let err = registrar()
        .register("app::warehouse", &mut container)
        .unwrap_err();

    assert_eq!(
        err,
        RegistrationError::ModuleLoad(ModuleLoadError::NotFound {
            module: "app::warehouse".to_string()
        })
    );
    assert!(container.is_empty());
}

#[test]
fn missing_dependency_is_a_load_error() {
    let err = registrar().discover("registration::reports").unwrap_err();

    assert_eq!(
        err,
        RegistrationError::ModuleLoad(ModuleLoadError::MissingDependency {
            module: "registration::reports".to_string(),
            dependency: "registration::warehouse".to_string(),
        })
    );
    assert_eq!(err.module(), Some("registration::reports"));
}

#[test]
fn sealed_module_refuses_scanning() {
    let mut container = Container::new();
    let err = registrar()
        .register("registration::vault", &mut container)
        .unwrap_err();

    assert_eq!(
        err,
        RegistrationError::ReflectionAccess(ReflectionAccessError::Sealed {
            module: "registration::vault".to_string()
        })
    );
    assert!(!container.has_binding::<dyn vault::Secrets>());
}

#[test]
fn scoped_instances_are_shared_within_a_scope_only() {
    let mut container = Container::new();
    registrar().register("app::business", &mut container).unwrap();
    let container = Arc::new(container);

    let scope = Scope::new(container.clone());
    let first = scope.resolve::<dyn AuditTrail>().unwrap();
    let second = scope.resolve::<dyn AuditTrail>().unwrap();
    assert!(Arc::ptr_eq(&first, &second));

    let other = Scope::new(container).resolve::<dyn AuditTrail>().unwrap();
    assert!(!Arc::ptr_eq(&first, &other));
}

#[test]
fn injected_dependencies_come_from_the_same_scope() {
    let mut container = Container::new();
    registrar().register("app::business", &mut container).unwrap();
    let scope = Scope::new(Arc::new(container));

    let catalog = scope.resolve::<dyn ProductCatalog>().unwrap();
    catalog.find(3);

    let audit = scope.resolve::<dyn AuditTrail>().unwrap();
    assert_eq!(audit.events(), vec!["catalog.find 3".to_string()]);
}

#[test]
fn optional_injection_uses_a_bound_notifier() {
    use std::sync::Mutex;

    #[derive(Default)]
    struct Outbox(Mutex<Vec<String>>);

    impl Notifier for Outbox {
        fn notify(&self, message: &str) {
            self.0.lock().unwrap().push(message.to_string());
        }
    }

    let outbox = Arc::new(Outbox::default());
    let mut container = Container::new();
    registrar().register("app::business", &mut container).unwrap();
    container.bind::<dyn Notifier>(outbox.clone());

    let scope = Scope::new(Arc::new(container));
    scope.resolve::<dyn AuditTrail>().unwrap().record("checkout");

    assert_eq!(*outbox.0.lock().unwrap(), vec!["checkout".to_string()]);
}

#[test]
fn inherited_contracts_are_discovered_and_bound() {
    use scheduling::{Clock, FixedSchedule, Reminder, Scheduler};

    let registrar = registrar();
    let discovery = registrar.discover("registration::scheduling").unwrap();
    // Clock is reached through both contracts but listed once
    assert_eq!(
        discovery.contract_map(),
        vec![(
            qualified::<FixedSchedule>(),
            vec![
                type_name::<dyn Scheduler>(),
                type_name::<dyn Clock>(),
                type_name::<dyn Reminder>(),
            ]
        )]
    );

    let mut container = Container::new();
    let report = registrar
        .register("registration::scheduling", &mut container)
        .unwrap();
    assert_eq!(report.len(), 3);
    assert_eq!(
        report.implementation_of(type_name::<dyn Clock>()),
        Some(type_name::<FixedSchedule>())
    );
    assert_eq!(container.lifetime_of::<dyn Clock>(), Some(Lifetime::Scoped));

    let scope = Scope::new(Arc::new(container));
    assert_eq!(scope.resolve::<dyn Clock>().unwrap().now(), 1_000);
    assert_eq!(scope.resolve::<dyn Scheduler>().unwrap().next_run(), 1_060);
    assert_eq!(scope.resolve::<dyn Reminder>().unwrap().remind_at(), 1_030);
}
