//! Binding a [`Registry`] to a [`Context`].
//!
//! The registry lives in the context under a single well-known key derived
//! from the `dyn Registry` type, so it cannot collide with keys chosen by
//! callers. Every helper here is a thin layer over that slot:
//!
//! | Helper | Registry missing | Entry missing |
//! |--------|------------------|---------------|
//! | [`from_context`] | `T::default()` | `T::default()` |
//! | [`lookup`] | `None` | `None` |
//! | [`ptr_from_context`] | `None` | `None` |
//! | [`context_with`] / [`context_with_ptr`] | creates one, derives a context | registers |
//! | [`try_register`] / [`try_register_ptr`] | [`BindError::MissingRegistry`] | registers |
//! | [`must_register`] / [`must_register_ptr`] | panics | registers |
//!
//! # Shadowing vs Inheritance
//!
//! Writing a service through a context that already carries a registry
//! mutates that registry, and therefore every context sharing it. To give a
//! subtree its own services, bind a fresh registry first with
//! [`context_with_registry`].
//!
//! # Cancellation
//!
//! The context is used purely as a value carrier here. A cancelled or
//! expired context still yields its registry and services.

use std::sync::Arc;

use ambit_context::{Context, ContextKey};

use crate::error::BindError;
use crate::registry::{Registry, ServiceRegistry};
use crate::service::{Service, Shared};

/// The key under which a context carries its registry.
#[must_use]
pub fn registry_key() -> ContextKey {
    ContextKey::of::<dyn Registry>()
}

/// Returns a derived context that carries `registry`.
///
/// The derived context shadows any registry bound by an ancestor; `ctx`
/// itself is unchanged.
#[must_use]
pub fn context_with_registry(ctx: &Context, registry: Arc<dyn Registry>) -> Context {
    tracing::debug!(services = registry.len(), "binding service registry to context");
    ctx.with_value(registry_key(), Arc::new(registry))
}

/// Ensures a registry is bound.
///
/// Returns `ctx` itself when it already carries a registry, otherwise a
/// derived context carrying a fresh, empty [`ServiceRegistry`]. Calling it
/// repeatedly never replaces a registry placed by a parent.
#[must_use]
pub fn context_with_default_registry(ctx: &Context) -> Context {
    ensure_registry(ctx).0
}

/// Returns the registry bound to `ctx` or its closest ancestor.
///
/// # Panics
///
/// Panics if the registry slot was filled with something other than an
/// `Arc<dyn Registry>` by going around this module.
#[must_use]
pub fn registry_from_context(ctx: &Context) -> Option<Arc<dyn Registry>> {
    let value = ctx.value(&registry_key())?;
    match value.downcast_ref::<Arc<dyn Registry>>() {
        Some(registry) => Some(Arc::clone(registry)),
        None => panic!("context registry slot does not hold a registry (this is a bug)"),
    }
}

fn ensure_registry(ctx: &Context) -> (Context, Arc<dyn Registry>) {
    if let Some(registry) = registry_from_context(ctx) {
        return (ctx.clone(), registry);
    }

    tracing::debug!("no service registry in context, creating a default one");
    let registry = ServiceRegistry::new_dyn();
    let derived = context_with_registry(ctx, Arc::clone(&registry));
    (derived, registry)
}

/// Returns the by-value service registered for `T`, or `T::default()` when
/// there is no registry or no entry.
///
/// Use [`lookup`] to tell an absent service apart from a default one.
///
/// # Panics
///
/// Panics if the entry for `T` was registered as a [`Shared<T>`] handle.
///
/// # Example
///
/// ```
/// use ambit_context::Context;
/// use ambit_registry::{context_with, from_context};
///
/// let ctx = Context::background();
/// assert_eq!(from_context::<u32>(&ctx), 0);
///
/// let ctx = context_with(&ctx, String::from("hello"));
/// assert_eq!(from_context::<String>(&ctx), "hello");
/// assert_eq!(from_context::<u32>(&ctx), 0);
/// ```
#[must_use]
pub fn from_context<T: Service + Clone + Default>(ctx: &Context) -> T {
    lookup(ctx).unwrap_or_default()
}

/// Returns the by-value service registered for `T`, or `None` when there
/// is no registry or no entry.
///
/// # Panics
///
/// Panics if the entry for `T` was registered as a [`Shared<T>`] handle.
#[must_use]
pub fn lookup<T: Service + Clone>(ctx: &Context) -> Option<T> {
    registry_from_context(ctx)?.service::<T>()
}

/// Returns the handle registered for `T`, or `None` when there is no
/// registry or no entry.
///
/// # Panics
///
/// Panics if the entry for `T` was registered by value.
#[must_use]
pub fn ptr_from_context<T: Service>(ctx: &Context) -> Option<Shared<T>> {
    registry_from_context(ctx)?.shared::<T>()
}

/// Registers `service` by value under `T`.
///
/// Uses the registry already bound to `ctx` when there is one, and returns
/// `ctx` itself in that case. Otherwise creates a registry and returns a
/// derived context carrying it; `ctx` is left without one.
#[must_use]
pub fn context_with<T: Service>(ctx: &Context, service: T) -> Context {
    let (ctx, registry) = ensure_registry(ctx);
    registry.insert(service);
    ctx
}

/// Registers a mutable handle under `T`, with the same context rules as
/// [`context_with`].
#[must_use]
pub fn context_with_ptr<T: Service>(ctx: &Context, handle: Shared<T>) -> Context {
    let (ctx, registry) = ensure_registry(ctx);
    registry.insert_shared(handle);
    ctx
}

/// Registers `service` by value into the registry already bound to `ctx`.
///
/// # Errors
///
/// Returns [`BindError::MissingRegistry`] if `ctx` carries no registry.
/// Nothing is created in that case.
pub fn try_register<T: Service>(ctx: &Context, service: T) -> Result<(), BindError> {
    existing_registry::<T>(ctx)?.insert(service);
    Ok(())
}

/// Registers a mutable handle into the registry already bound to `ctx`.
///
/// # Errors
///
/// Returns [`BindError::MissingRegistry`] if `ctx` carries no registry.
pub fn try_register_ptr<T: Service>(ctx: &Context, handle: Shared<T>) -> Result<(), BindError> {
    existing_registry::<T>(ctx)?.insert_shared(handle);
    Ok(())
}

fn existing_registry<T: Service>(ctx: &Context) -> Result<Arc<dyn Registry>, BindError> {
    registry_from_context(ctx).ok_or(BindError::MissingRegistry {
        service: core::any::type_name::<T>(),
    })
}

/// Registers `service` by value into the registry already bound to `ctx`.
///
/// Setup code uses this to insist that an outer scope bound the registry,
/// instead of silently creating one nobody else can see.
///
/// # Panics
///
/// Panics if `ctx` carries no registry.
#[track_caller]
pub fn must_register<T: Service>(ctx: &Context, service: T) {
    if let Err(err) = try_register(ctx, service) {
        abort_registration(&err);
    }
}

/// Registers a mutable handle into the registry already bound to `ctx`.
///
/// # Panics
///
/// Panics if `ctx` carries no registry.
#[track_caller]
pub fn must_register_ptr<T: Service>(ctx: &Context, handle: Shared<T>) {
    if let Err(err) = try_register_ptr(ctx, handle) {
        abort_registration(&err);
    }
}

#[track_caller]
fn abort_registration(err: &BindError) -> ! {
    tracing::error!(error = %err, "strict service registration failed");
    panic!("{err}")
}
