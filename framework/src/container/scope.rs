//! Resolution scopes
//!
//! A `Scope` is one logical unit of work (an HTTP request, a CLI command).
//! Scoped bindings are constructed at most once per scope and dropped with
//! it; singletons are shared; transient bindings are built on every call.

use super::{Binding, Container, Instance, Lifetime};
use crate::error::FrameworkError;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, ThreadId};

/// A resolution scope over a container snapshot
pub struct Scope {
    container: Arc<Container>,
    instances: Mutex<HashMap<TypeId, Instance>>,
    /// Keys under construction per thread, innermost last
    ///
    /// Factories run synchronously, so one call chain never leaves its
    /// thread; other threads sharing the scope keep their own chain.
    resolving: Mutex<HashMap<ThreadId, Vec<TypeId>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

impl Scope {
    /// Open a scope over a container
    pub fn new(container: Arc<Container>) -> Self {
        Self {
            container,
            instances: Mutex::new(HashMap::new()),
            resolving: Mutex::new(HashMap::new()),
        }
    }

    /// The container this scope resolves from
    pub fn container(&self) -> &Arc<Container> {
        &self.container
    }

    /// Resolve a trait binding
    ///
    /// # Example
    /// ```rust,ignore
    /// let catalog = scope.resolve::<dyn ProductCatalog>()?;
    /// ```
    pub fn resolve<T: ?Sized + Send + Sync + 'static>(&self) -> Result<Arc<T>, FrameworkError> {
        let instance = self.instance(TypeId::of::<Arc<T>>(), std::any::type_name::<T>())?;
        instance
            .downcast_ref::<Arc<T>>()
            .cloned()
            .ok_or(FrameworkError::BindingMismatch {
                type_name: std::any::type_name::<T>(),
            })
    }

    /// Resolve a trait binding if one is registered
    ///
    /// Construction errors other than a missing binding are still returned.
    pub fn try_resolve<T: ?Sized + Send + Sync + 'static>(
        &self,
    ) -> Result<Option<Arc<T>>, FrameworkError> {
        match self.resolve::<T>() {
            Ok(instance) => Ok(Some(instance)),
            Err(FrameworkError::ServiceNotFound { type_name })
                if type_name == std::any::type_name::<T>() =>
            {
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Resolve a concrete type registered with `singleton`
    pub fn get<T: Any + Send + Sync + Clone + 'static>(&self) -> Result<T, FrameworkError> {
        let instance = self.instance(TypeId::of::<T>(), std::any::type_name::<T>())?;
        instance
            .downcast_ref::<T>()
            .cloned()
            .ok_or(FrameworkError::BindingMismatch {
                type_name: std::any::type_name::<T>(),
            })
    }

    /// Number of scoped instances built so far
    pub fn cached(&self) -> usize {
        lock(&self.instances).len()
    }

    fn instance(&self, key: TypeId, type_name: &'static str) -> Result<Instance, FrameworkError> {
        let binding = self
            .container
            .binding(&key)
            .ok_or(FrameworkError::ServiceNotFound { type_name })?;

        match binding {
            Binding::Instance(instance) => Ok(instance.clone()),
            Binding::Factory {
                lifetime: Lifetime::Scoped,
                factory,
            } => {
                if let Some(instance) = lock(&self.instances).get(&key) {
                    return Ok(instance.clone());
                }
                let built = self.construct(key, type_name, |scope| factory(scope))?;
                // A dependency may have built the same key while we were unlocked
                Ok(lock(&self.instances).entry(key).or_insert(built).clone())
            }
            Binding::Factory { factory, .. } => {
                self.construct(key, type_name, |scope| factory(scope))
            }
        }
    }

    fn construct(
        &self,
        key: TypeId,
        type_name: &'static str,
        build: impl FnOnce(&Scope) -> Result<Instance, FrameworkError>,
    ) -> Result<Instance, FrameworkError> {
        let thread = thread::current().id();
        {
            let mut resolving = lock(&self.resolving);
            let chain = resolving.entry(thread).or_default();
            if chain.contains(&key) {
                return Err(FrameworkError::CircularDependency { type_name });
            }
            chain.push(key);
        }

        let result = build(self);

        let mut resolving = lock(&self.resolving);
        if let Some(chain) = resolving.get_mut(&thread) {
            if let Some(pos) = chain.iter().rposition(|k| *k == key) {
                chain.remove(pos);
            }
            if chain.is_empty() {
                resolving.remove(&thread);
            }
        }
        result
    }
}

impl Drop for Scope {
    fn drop(&mut self) {
        let count = lock(&self.instances).len();
        if count > 0 {
            tracing::trace!(instances = count, "scope closed");
        }
    }
}

/// Types a `#[component]` can receive through an `#[inject]` field
///
/// # Example
/// ```rust,ignore
/// #[component(ProductCatalog)]
/// pub struct InMemoryCatalog {
///     #[inject]
///     audit: Arc<dyn AuditTrail>,
///     #[inject]
///     pricing: Option<Arc<dyn PriceCalculator>>,
/// }
/// ```
pub trait FromScope: Sized {
    fn from_scope(scope: &Scope) -> Result<Self, FrameworkError>;
}

impl<T: ?Sized + Send + Sync + 'static> FromScope for Arc<T> {
    fn from_scope(scope: &Scope) -> Result<Self, FrameworkError> {
        scope.resolve::<T>()
    }
}

impl<T: ?Sized + Send + Sync + 'static> FromScope for Option<Arc<T>> {
    fn from_scope(scope: &Scope) -> Result<Self, FrameworkError> {
        scope.try_resolve::<T>()
    }
}
