//! Service values and the type tokens that key them.
//!
//! - [`Service`] - Bound satisfied by every storable type
//! - [`ServiceId`] - Type token derived from a static type
//! - [`AnyService`] - A type-erased, shareable service value
//! - [`Shared`] - Mutable handle for the by-handle storage flavor

use core::any::{Any, TypeId};
use core::hash::{Hash, Hasher};
use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// A value that can be stored in a [`Registry`](crate::Registry).
///
/// Any type that is `Send + Sync + 'static` automatically implements
/// `Service`; the registry never inspects the value.
pub trait Service: Send + Sync + 'static {
    /// Returns the type name for debugging purposes.
    fn type_name(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}

// Blanket implementation for all compatible types
impl<T: Send + Sync + 'static> Service for T {}

/// Type token identifying a service type.
///
/// Two ids compare equal exactly when they were derived from the same
/// static type. Producing one needs no instance of the type and costs
/// nothing at runtime.
///
/// The type name is kept for diagnostics and is ignored by equality and
/// hashing.
#[derive(Clone, Copy)]
pub struct ServiceId {
    id: TypeId,
    name: &'static str,
}

impl ServiceId {
    /// Creates a `ServiceId` for the given type.
    #[must_use]
    pub fn of<T: Service>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: core::any::type_name::<T>(),
        }
    }

    /// Returns the underlying `TypeId`.
    #[must_use]
    pub fn type_id(&self) -> TypeId {
        self.id
    }

    /// Returns the name of the type this id was derived from.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for ServiceId {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ServiceId {}

impl Hash for ServiceId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl core::fmt::Debug for ServiceId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("ServiceId").field(&self.name).finish()
    }
}

impl core::fmt::Display for ServiceId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name)
    }
}

/// A type-erased service value as held by a registry.
///
/// Cloning is an `Arc` bump: the registry and every reader share the same
/// allocation, and the value is dropped only when its last holder lets go.
#[derive(Clone)]
pub struct AnyService {
    value: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl AnyService {
    /// Erases `value`.
    #[must_use]
    pub fn new<T: Service>(value: T) -> Self {
        Self::from_arc(Arc::new(value))
    }

    /// Erases an already shared value without re-allocating it.
    #[must_use]
    pub fn from_arc<T: Service>(value: Arc<T>) -> Self {
        Self {
            value,
            type_name: core::any::type_name::<T>(),
        }
    }

    /// Returns the name of the concrete type that was erased.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns `true` if the erased value is a `T`.
    #[must_use]
    pub fn is<T: Service>(&self) -> bool {
        self.value.is::<T>()
    }

    /// Returns a reference to the value if it is a `T`.
    #[must_use]
    pub fn downcast_ref<T: Service>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }

    /// Returns the shared value if it is a `T`.
    #[must_use]
    pub fn downcast_arc<T: Service>(&self) -> Option<Arc<T>> {
        Arc::clone(&self.value).downcast::<T>().ok()
    }
}

impl core::fmt::Debug for AnyService {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("AnyService").field(&self.type_name).finish()
    }
}

/// A mutable, shareable handle to a service.
///
/// This is the by-handle storage flavor: every clone points at the same
/// lock, so a write made through one clone is visible to every later
/// reader of any other clone, including clones retrieved from a
/// [`Registry`](crate::Registry).
///
/// # Example
///
/// ```
/// use ambit_registry::Shared;
///
/// struct Counter { n: u32 }
///
/// let handle = Shared::new(Counter { n: 0 });
/// let other = handle.clone();
///
/// other.write().n = 5;
/// assert_eq!(handle.read().n, 5);
/// assert!(handle.ptr_eq(&other));
/// ```
pub struct Shared<T: Service> {
    inner: Arc<RwLock<T>>,
}

impl<T: Service> Shared<T> {
    /// Wraps `value` in a new handle.
    #[must_use]
    pub fn new(value: T) -> Self {
        Self {
            inner: Arc::new(RwLock::new(value)),
        }
    }

    /// Acquires shared read access, blocking while a writer holds the lock.
    pub fn read(&self) -> RwLockReadGuard<'_, T> {
        self.inner.read()
    }

    /// Acquires exclusive write access, blocking while any guard is held.
    pub fn write(&self) -> RwLockWriteGuard<'_, T> {
        self.inner.write()
    }

    /// Attempts to acquire read access without blocking.
    pub fn try_read(&self) -> Option<RwLockReadGuard<'_, T>> {
        self.inner.try_read()
    }

    /// Attempts to acquire write access without blocking.
    pub fn try_write(&self) -> Option<RwLockWriteGuard<'_, T>> {
        self.inner.try_write()
    }

    /// Returns `true` if both handles point at the same value.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T: Service> Clone for Shared<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Service> From<T> for Shared<T> {
    fn from(value: T) -> Self {
        Self::new(value)
    }
}

impl<T: Service + core::fmt::Debug> core::fmt::Debug for Shared<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.inner.try_read() {
            Some(value) => f.debug_tuple("Shared").field(&*value).finish(),
            None => f.write_str("Shared(<locked>)"),
        }
    }
}
