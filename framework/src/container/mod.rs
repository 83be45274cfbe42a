//! Application Container for Dependency Injection
//!
//! This module provides the service container and its lifetimes:
//! - Singletons: one shared instance for the life of the container
//! - Scoped: one instance per `Scope` (one HTTP request, one unit of work)
//! - Transient: a new instance per resolution
//! - Capability registration: bind every `#[component]` of a module to the
//!   `#[contract]` traits it implements
//!
//! # Example
//!
//! ```rust,ignore
//! use lattice::{App, bind, component, contract};
//!
//! #[contract]
//! pub trait ProductCatalog {
//!     fn list(&self) -> Vec<Product>;
//! }
//!
//! #[component(ProductCatalog)]
//! #[derive(Default)]
//! pub struct InMemoryCatalog;
//!
//! // At startup: bind every component of the module (scoped lifetime)
//! App::register_module("app::business")?;
//!
//! // Per unit of work
//! let scope = App::scope();
//! let catalog = scope.resolve::<dyn ProductCatalog>()?;
//! ```

pub mod provider;
pub mod registrar;
pub mod scope;

pub use provider::{Catalog, Component, ComponentEntry, ContractBinding, ContractEntry, ModuleEntry};
pub use registrar::{
    BindingRecord, CapabilityRegistrar, DiscoveredComponent, Discovery, Override,
    RegistrationReport,
};
pub use scope::{FromScope, Scope};

use crate::error::{FrameworkError, RegistrationError};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, OnceLock, RwLock};

/// Global application container
///
/// Holds an `Arc` so readers can take a snapshot and resolve without
/// holding the lock.
static APP_CONTAINER: OnceLock<RwLock<Arc<Container>>> = OnceLock::new();

/// Type-erased instance stored in the container
pub(crate) type Instance = Arc<dyn Any + Send + Sync>;

/// Type-erased constructor; receives the scope it resolves dependencies from
pub(crate) type Factory = Arc<dyn Fn(&Scope) -> Result<Instance, FrameworkError> + Send + Sync>;

/// How long a resolved instance lives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifetime {
    /// One shared instance for the whole container
    Singleton,
    /// One instance per `Scope`
    Scoped,
    /// A new instance on every resolution
    Transient,
}

impl std::fmt::Display for Lifetime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Singleton => write!(f, "singleton"),
            Self::Scoped => write!(f, "scoped"),
            Self::Transient => write!(f, "transient"),
        }
    }
}

/// Binding types: a shared instance or a factory with its lifetime
#[derive(Clone)]
pub(crate) enum Binding {
    Instance(Instance),
    Factory { lifetime: Lifetime, factory: Factory },
}

impl Binding {
    pub(crate) fn lifetime(&self) -> Lifetime {
        match self {
            Binding::Instance(_) => Lifetime::Singleton,
            Binding::Factory { lifetime, .. } => *lifetime,
        }
    }
}

/// The main service container
///
/// Stores type-erased bindings keyed by TypeId. Concrete types are keyed by
/// `TypeId::of::<T>()`, trait objects by `TypeId::of::<Arc<dyn Trait>>()`.
/// Binding the same key again replaces the previous binding.
#[derive(Clone, Default)]
pub struct Container {
    bindings: HashMap<TypeId, Binding>,
}

impl Container {
    /// Create a new empty container
    pub fn new() -> Self {
        Self {
            bindings: HashMap::new(),
        }
    }

    /// Register a singleton instance of a concrete type
    ///
    /// # Example
    /// ```rust,ignore
    /// container.singleton(DatabaseConfig::from_env());
    /// ```
    pub fn singleton<T: Any + Send + Sync + 'static>(&mut self, instance: T) {
        let arc: Instance = Arc::new(instance);
        self.bindings
            .insert(TypeId::of::<T>(), Binding::Instance(arc));
    }

    /// Bind a trait object to a shared implementation
    ///
    /// # Example
    /// ```rust,ignore
    /// container.bind::<dyn TokenValidator>(Arc::new(StaticTokenValidator::new(tokens)));
    /// ```
    pub fn bind<T: ?Sized + Send + Sync + 'static>(&mut self, instance: Arc<T>) {
        let arc: Instance = Arc::new(instance);
        self.bindings
            .insert(TypeId::of::<Arc<T>>(), Binding::Instance(arc));
    }

    /// Bind a trait object to a factory run on every resolution
    pub fn bind_factory<T: ?Sized + Send + Sync + 'static, F>(&mut self, factory: F)
    where
        F: Fn(&Scope) -> Result<Arc<T>, FrameworkError> + Send + Sync + 'static,
    {
        self.insert_factory::<T, F>(Lifetime::Transient, factory);
    }

    /// Bind a trait object to a factory run once per scope
    ///
    /// # Example
    /// ```rust,ignore
    /// container.bind_scoped::<dyn AuditTrail, _>(|_| Ok(Arc::new(RequestAuditTrail::default())));
    /// ```
    pub fn bind_scoped<T: ?Sized + Send + Sync + 'static, F>(&mut self, factory: F)
    where
        F: Fn(&Scope) -> Result<Arc<T>, FrameworkError> + Send + Sync + 'static,
    {
        self.insert_factory::<T, F>(Lifetime::Scoped, factory);
    }

    fn insert_factory<T: ?Sized + Send + Sync + 'static, F>(&mut self, lifetime: Lifetime, factory: F)
    where
        F: Fn(&Scope) -> Result<Arc<T>, FrameworkError> + Send + Sync + 'static,
    {
        let wrapped: Factory = Arc::new(move |scope: &Scope| {
            let instance = factory(scope)?;
            Ok(Arc::new(instance) as Instance)
        });
        self.bindings.insert(
            TypeId::of::<Arc<T>>(),
            Binding::Factory {
                lifetime,
                factory: wrapped,
            },
        );
    }

    /// Get a clone of a singleton instance of a concrete type
    ///
    /// Only shared instances are returned; factories need a `Scope`.
    pub fn instance<T: Any + Send + Sync + Clone + 'static>(&self) -> Option<T> {
        match self.bindings.get(&TypeId::of::<T>())? {
            Binding::Instance(arc) => arc.downcast_ref::<T>().cloned(),
            Binding::Factory { .. } => None,
        }
    }

    /// Check if a concrete type is registered
    pub fn has<T: Any + 'static>(&self) -> bool {
        self.bindings.contains_key(&TypeId::of::<T>())
    }

    /// Check if a trait binding is registered
    pub fn has_binding<T: ?Sized + 'static>(&self) -> bool {
        self.bindings.contains_key(&TypeId::of::<Arc<T>>())
    }

    /// Lifetime of a trait binding, if one is registered
    pub fn lifetime_of<T: ?Sized + 'static>(&self) -> Option<Lifetime> {
        self.bindings
            .get(&TypeId::of::<Arc<T>>())
            .map(Binding::lifetime)
    }

    /// Number of registered bindings
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Whether the container has no bindings
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub(crate) fn binding(&self, key: &TypeId) -> Option<&Binding> {
        self.bindings.get(key)
    }
}

/// Application container facade
///
/// Static access to the process-wide container built by the composition
/// root. Writes happen during startup; resolution goes through a `Scope`
/// over a snapshot of the container.
///
/// # Example
///
/// ```rust,ignore
/// use lattice::{App, bind, singleton};
///
/// singleton!(DatabaseConfig::from_env());
/// bind!(dyn TokenValidator, StaticTokenValidator::new(tokens));
///
/// let validator: Arc<dyn TokenValidator> = App::make::<dyn TokenValidator>().unwrap();
/// ```
pub struct App;

impl App {
    fn global() -> &'static RwLock<Arc<Container>> {
        APP_CONTAINER.get_or_init(|| RwLock::new(Arc::new(Container::new())))
    }

    /// Mutate the global container
    ///
    /// Scopes opened before the write keep the snapshot they started with.
    pub fn with_container<R>(f: impl FnOnce(&mut Container) -> R) -> R {
        let mut guard = match Self::global().write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        f(Arc::make_mut(&mut guard))
    }

    /// Initialize the application container
    ///
    /// Called by `Application::run()`; calling it again is a no-op.
    pub fn init() {
        Self::global();
    }

    /// Snapshot of the current container
    pub fn container() -> Arc<Container> {
        match Self::global().read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Open a new resolution scope over the current container
    pub fn scope() -> Scope {
        Scope::new(Self::container())
    }

    /// Register a singleton instance (shared across all resolutions)
    pub fn singleton<T: Any + Send + Sync + 'static>(instance: T) {
        Self::with_container(|c| c.singleton(instance));
    }

    /// Bind a trait object to a shared implementation
    pub fn bind<T: ?Sized + Send + Sync + 'static>(instance: Arc<T>) {
        Self::with_container(|c| c.bind(instance));
    }

    /// Bind a trait object to a transient factory
    pub fn bind_factory<T: ?Sized + Send + Sync + 'static, F>(factory: F)
    where
        F: Fn(&Scope) -> Result<Arc<T>, FrameworkError> + Send + Sync + 'static,
    {
        Self::with_container(|c| c.bind_factory::<T, F>(factory));
    }

    /// Bind a trait object to a scoped factory
    pub fn bind_scoped<T: ?Sized + Send + Sync + 'static, F>(factory: F)
    where
        F: Fn(&Scope) -> Result<Arc<T>, FrameworkError> + Send + Sync + 'static,
    {
        Self::with_container(|c| c.bind_scoped::<T, F>(factory));
    }

    /// Bind every component of a linked module to its contracts
    ///
    /// Runs the capability registrar over the inventory-collected entries.
    /// On error nothing is bound.
    ///
    /// # Example
    /// ```rust,ignore
    /// let report = App::register_module("app::business")?;
    /// ```
    pub fn register_module(module: &str) -> Result<RegistrationReport, RegistrationError> {
        let registrar = CapabilityRegistrar::linked();
        Self::with_container(|c| registrar.register(module, c))
    }

    /// Resolve a concrete type
    ///
    /// # Example
    /// ```rust,ignore
    /// let db: DbConnection = App::get().unwrap();
    /// ```
    pub fn get<T: Any + Send + Sync + Clone + 'static>() -> Option<T> {
        Self::scope().get::<T>().ok()
    }

    /// Resolve a trait binding
    ///
    /// Each call opens its own scope, so scoped bindings behave like
    /// transient ones here. Use `App::scope()` to share instances.
    pub fn make<T: ?Sized + Send + Sync + 'static>() -> Option<Arc<T>> {
        Self::scope().resolve::<T>().ok()
    }

    /// Resolve a concrete type, returning an error if not found
    pub fn resolve<T: Any + Send + Sync + Clone + 'static>() -> Result<T, FrameworkError> {
        Self::scope().get::<T>()
    }

    /// Resolve a trait binding, returning an error if not found
    pub fn resolve_make<T: ?Sized + Send + Sync + 'static>() -> Result<Arc<T>, FrameworkError> {
        Self::scope().resolve::<T>()
    }

    /// Check if a concrete type is registered
    pub fn has<T: Any + 'static>() -> bool {
        Self::container().has::<T>()
    }

    /// Check if a trait binding is registered
    pub fn has_binding<T: ?Sized + 'static>() -> bool {
        Self::container().has_binding::<T>()
    }
}

/// Bind a trait to a shared implementation (auto-wraps in Arc)
///
/// # Example
/// ```rust,ignore
/// bind!(dyn TokenValidator, StaticTokenValidator::new(tokens));
/// ```
#[macro_export]
macro_rules! bind {
    ($trait:ty, $instance:expr) => {
        $crate::App::bind::<$trait>(::std::sync::Arc::new($instance) as ::std::sync::Arc<$trait>)
    };
}

/// Bind a trait to a transient factory (auto-wraps in Arc)
///
/// # Example
/// ```rust,ignore
/// bind_factory!(dyn Clock, || SystemClock::new());
/// ```
#[macro_export]
macro_rules! bind_factory {
    ($trait:ty, $factory:expr) => {{
        let f = $factory;
        $crate::App::bind_factory::<$trait, _>(move |_scope: &$crate::container::Scope| {
            Ok(::std::sync::Arc::new(f()) as ::std::sync::Arc<$trait>)
        })
    }};
}

/// Bind a trait to a scoped factory (auto-wraps in Arc, one instance per scope)
///
/// # Example
/// ```rust,ignore
/// bind_scoped!(dyn AuditTrail, || RequestAuditTrail::default());
/// ```
#[macro_export]
macro_rules! bind_scoped {
    ($trait:ty, $factory:expr) => {{
        let f = $factory;
        $crate::App::bind_scoped::<$trait, _>(move |_scope: &$crate::container::Scope| {
            Ok(::std::sync::Arc::new(f()) as ::std::sync::Arc<$trait>)
        })
    }};
}

/// Register a singleton instance (concrete type)
///
/// # Example
/// ```rust,ignore
/// singleton!(DatabaseConfig::from_env());
/// ```
#[macro_export]
macro_rules! singleton {
    ($instance:expr) => {
        $crate::App::singleton($instance)
    };
}
