//! Keys used to associate values with a [`Context`](crate::Context).

use core::any::TypeId;
use core::hash::{Hash, Hasher};

/// Identifies a value slot in a context.
///
/// Keys are derived from a type, so two keys compare equal exactly when
/// they were created from the same type. The key type does not need to be
/// the type of the stored value, and it may be unsized: trait objects such
/// as `dyn MyTrait` make good private keys because no caller can construct
/// a colliding key by accident.
///
/// The type name is carried for diagnostics only and takes no part in
/// equality or hashing.
///
/// # Example
///
/// ```
/// use ambit_context::ContextKey;
///
/// trait Tenant {}
///
/// assert_eq!(ContextKey::of::<dyn Tenant>(), ContextKey::of::<dyn Tenant>());
/// assert_ne!(ContextKey::of::<dyn Tenant>(), ContextKey::of::<String>());
/// ```
#[derive(Clone, Copy)]
pub struct ContextKey {
    id: TypeId,
    name: &'static str,
}

impl ContextKey {
    /// Creates the key for type `K`.
    #[must_use]
    pub fn of<K: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<K>(),
            name: core::any::type_name::<K>(),
        }
    }

    /// Returns the underlying `TypeId`.
    #[must_use]
    pub fn type_id(&self) -> TypeId {
        self.id
    }

    /// Returns the name of the type this key was derived from.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for ContextKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ContextKey {}

impl Hash for ContextKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl core::fmt::Debug for ContextKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("ContextKey").field(&self.name).finish()
    }
}
