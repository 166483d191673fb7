//! Type-indexed service storage.
//!
//! This module provides the [`Registry`] trait, the contract every
//! registry bound to a context fulfils, and [`ServiceRegistry`], the
//! default implementation created by the binding helpers.
//!
//! # Thread Safety
//!
//! [`Registry`] requires `Send + Sync`. [`ServiceRegistry`] publishes its
//! map as an immutable snapshot: `get` loads the current snapshot without
//! taking a lock and never blocks, while `register` copies the map,
//! inserts, and swaps the new snapshot in (writers are serialized). A `get`
//! racing a `register` for the same id observes either the old or the new
//! value, never a torn one. Registration is `O(n)`, so the registry suits
//! the intended pattern: populate during setup, read afterwards.

use std::sync::Arc;

use arc_swap::ArcSwap;
use downcast_rs::{DowncastSync, impl_downcast};
use hashbrown::HashMap;
use parking_lot::Mutex;

use crate::service::{AnyService, Service, ServiceId, Shared};

/// A mapping from [`ServiceId`] to a type-erased service value.
///
/// Implementations must uphold:
///
/// - Each id maps to at most one value; `register` is last-write-wins.
/// - `get` is pure: it never mutates the registry and never fabricates
///   values.
/// - Replaced values are released, not destroyed: other holders of the
///   same [`AnyService`] keep it alive.
///
/// Typed access goes through the inherent methods on `dyn Registry`
/// ([`insert`](#method.insert), [`service`](#method.service), ...), which
/// derive the id from the static type. `Arc<dyn Registry>` can be downcast
/// to the concrete implementation with
/// [`downcast_arc`](#method.downcast_arc).
pub trait Registry: DowncastSync {
    /// Stores `service` under `id`, replacing any previous value.
    fn register(&self, id: ServiceId, service: AnyService);

    /// Returns the value stored under `id`, if any.
    fn get(&self, id: ServiceId) -> Option<AnyService>;

    /// Returns `true` if a value is stored under `id`.
    fn contains(&self, id: ServiceId) -> bool {
        self.get(id).is_some()
    }

    /// Returns the number of registered services.
    fn len(&self) -> usize;

    /// Returns `true` if no services are registered.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Lists the type names of the registered services, for diagnostics.
    fn service_names(&self) -> Vec<&'static str>;
}

impl_downcast!(sync Registry);

impl dyn Registry {
    /// Registers `service` by value under the id of `T`.
    pub fn insert<T: Service>(&self, service: T) {
        self.register(ServiceId::of::<T>(), AnyService::new(service));
    }

    /// Registers a mutable handle under the id of `T`.
    ///
    /// Lookups through [`shared`](#method.shared) return a handle to the
    /// same value.
    pub fn insert_shared<T: Service>(&self, handle: Shared<T>) {
        self.register(ServiceId::of::<T>(), AnyService::new(handle));
    }

    /// Returns a clone of the by-value service registered for `T`.
    ///
    /// # Panics
    ///
    /// Panics if the value stored under `T`'s id is not a `T` (for example
    /// when it was registered as a [`Shared<T>`] handle).
    #[must_use]
    pub fn service<T: Service + Clone>(&self) -> Option<T> {
        let id = ServiceId::of::<T>();
        let stored = self.get(id)?;
        match stored.downcast_ref::<T>() {
            Some(service) => Some(service.clone()),
            None => type_mismatch(id, &stored),
        }
    }

    /// Returns the handle registered for `T`.
    ///
    /// # Panics
    ///
    /// Panics if the value stored under `T`'s id is not a [`Shared<T>`]
    /// (for example when it was registered by value).
    #[must_use]
    pub fn shared<T: Service>(&self) -> Option<Shared<T>> {
        let id = ServiceId::of::<T>();
        let stored = self.get(id)?;
        match stored.downcast_ref::<Shared<T>>() {
            Some(handle) => Some(handle.clone()),
            None => type_mismatch(id, &stored),
        }
    }

    /// Returns `true` if a service is registered for `T`, in either flavor.
    #[must_use]
    pub fn has<T: Service>(&self) -> bool {
        self.contains(ServiceId::of::<T>())
    }
}

impl core::fmt::Debug for dyn Registry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Registry")
            .field("services", &self.service_names())
            .finish()
    }
}

#[track_caller]
fn type_mismatch(id: ServiceId, stored: &AnyService) -> ! {
    panic!(
        "service type mismatch for {id}: registry holds a {} (this is a bug)",
        stored.type_name()
    )
}

/// Default [`Registry`] implementation.
///
/// A copy-on-write `hashbrown` map published through `arc-swap`. Reads
/// load the current snapshot and clone an `Arc`; they neither lock nor
/// allocate. Writes are serialized by a `parking_lot` mutex.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use ambit_registry::{Registry, ServiceRegistry};
///
/// #[derive(Clone)]
/// struct Greeting(&'static str);
///
/// let registry: Arc<dyn Registry> = Arc::new(ServiceRegistry::new());
/// registry.insert(Greeting("hello"));
///
/// assert_eq!(registry.service::<Greeting>().unwrap().0, "hello");
/// assert!(registry.service::<u32>().is_none());
/// ```
#[derive(Default)]
pub struct ServiceRegistry {
    services: ArcSwap<HashMap<ServiceId, AnyService>>,
    writer: Mutex<()>,
}

impl ServiceRegistry {
    /// Creates a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            services: ArcSwap::from_pointee(HashMap::new()),
            writer: Mutex::new(()),
        }
    }

    /// Creates a new empty registry, ready to be bound to a context.
    #[must_use]
    pub fn new_dyn() -> Arc<dyn Registry> {
        Arc::new(Self::new())
    }
}

impl Registry for ServiceRegistry {
    fn register(&self, id: ServiceId, service: AnyService) {
        let (previous, replaced) = {
            let _writer = self.writer.lock();
            let previous = self.services.load_full();
            let mut next = HashMap::clone(&previous);
            let replaced = next.insert(id, service);
            self.services.store(Arc::new(next));
            (previous, replaced)
        };
        tracing::trace!(
            service = id.name(),
            replaced = replaced.is_some(),
            "registered service"
        );
        // Release the old snapshot outside the writer lock.
        drop((previous, replaced));
    }

    fn get(&self, id: ServiceId) -> Option<AnyService> {
        self.services.load().get(&id).cloned()
    }

    fn contains(&self, id: ServiceId) -> bool {
        self.services.load().contains_key(&id)
    }

    fn len(&self) -> usize {
        self.services.load().len()
    }

    fn service_names(&self) -> Vec<&'static str> {
        self.services.load().keys().map(ServiceId::name).collect()
    }
}

impl core::fmt::Debug for ServiceRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ServiceRegistry")
            .field("services", &self.service_names())
            .finish()
    }
}
