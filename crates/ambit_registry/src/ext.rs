//! Method-call syntax for the binding helpers.

use std::sync::Arc;

use ambit_context::Context;

use crate::binding;
use crate::error::BindError;
use crate::registry::Registry;
use crate::service::{Service, Shared};

/// Extension methods on [`Context`] for binding and resolving services.
///
/// Each method forwards to the free function of the same meaning in
/// [`binding`](crate::binding), so both styles can be mixed freely.
///
/// # Example
///
/// ```
/// use ambit_context::Context;
/// use ambit_registry::{ContextExt, Shared};
///
/// #[derive(Debug, Default)]
/// struct Counter { n: u32 }
///
/// let ctx = Context::background()
///     .with_service(String::from("db://primary"))
///     .with_shared(Shared::new(Counter::default()));
///
/// // Deep in the call stack:
/// fn bump(ctx: &Context) {
///     if let Some(counter) = ctx.shared::<Counter>() {
///         counter.write().n += 1;
///     }
/// }
///
/// bump(&ctx);
/// assert_eq!(ctx.shared::<Counter>().unwrap().read().n, 1);
/// assert_eq!(ctx.service::<String>(), "db://primary");
/// ```
pub trait ContextExt {
    /// See [`binding::context_with_registry`].
    #[must_use]
    fn with_registry(&self, registry: Arc<dyn Registry>) -> Context;

    /// See [`binding::context_with_default_registry`].
    #[must_use]
    fn with_default_registry(&self) -> Context;

    /// See [`binding::registry_from_context`].
    fn registry(&self) -> Option<Arc<dyn Registry>>;

    /// See [`binding::from_context`].
    fn service<T: Service + Clone + Default>(&self) -> T;

    /// See [`binding::lookup`].
    fn lookup<T: Service + Clone>(&self) -> Option<T>;

    /// See [`binding::ptr_from_context`].
    fn shared<T: Service>(&self) -> Option<Shared<T>>;

    /// See [`binding::context_with`].
    #[must_use]
    fn with_service<T: Service>(&self, service: T) -> Context;

    /// See [`binding::context_with_ptr`].
    #[must_use]
    fn with_shared<T: Service>(&self, handle: Shared<T>) -> Context;

    /// See [`binding::try_register`].
    ///
    /// # Errors
    ///
    /// Returns [`BindError::MissingRegistry`] if no registry is bound.
    fn try_register<T: Service>(&self, service: T) -> Result<(), BindError>;

    /// See [`binding::must_register`].
    #[track_caller]
    fn must_register<T: Service>(&self, service: T);

    /// See [`binding::must_register_ptr`].
    #[track_caller]
    fn must_register_shared<T: Service>(&self, handle: Shared<T>);
}

impl ContextExt for Context {
    fn with_registry(&self, registry: Arc<dyn Registry>) -> Context {
        binding::context_with_registry(self, registry)
    }

    fn with_default_registry(&self) -> Context {
        binding::context_with_default_registry(self)
    }

    fn registry(&self) -> Option<Arc<dyn Registry>> {
        binding::registry_from_context(self)
    }

    fn service<T: Service + Clone + Default>(&self) -> T {
        binding::from_context(self)
    }

    fn lookup<T: Service + Clone>(&self) -> Option<T> {
        binding::lookup(self)
    }

    fn shared<T: Service>(&self) -> Option<Shared<T>> {
        binding::ptr_from_context(self)
    }

    fn with_service<T: Service>(&self, service: T) -> Context {
        binding::context_with(self, service)
    }

    fn with_shared<T: Service>(&self, handle: Shared<T>) -> Context {
        binding::context_with_ptr(self, handle)
    }

    fn try_register<T: Service>(&self, service: T) -> Result<(), BindError> {
        binding::try_register(self, service)
    }

    #[track_caller]
    fn must_register<T: Service>(&self, service: T) {
        binding::must_register(self, service);
    }

    #[track_caller]
    fn must_register_shared<T: Service>(&self, handle: Shared<T>) {
        binding::must_register_ptr(self, handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Config {
        name: String,
    }

    #[test]
    fn methods_match_free_functions() {
        let ctx = Context::background().with_service(Config { name: "a".into() });

        assert_eq!(ctx.service::<Config>(), binding::from_context::<Config>(&ctx));
        assert!(Arc::ptr_eq(
            &ctx.registry().unwrap(),
            &binding::registry_from_context(&ctx).unwrap()
        ));
    }

    #[test]
    fn lookup_distinguishes_absent() {
        let ctx = Context::background().with_default_registry();
        assert_eq!(ctx.lookup::<Config>(), None);

        ctx.must_register(Config::default());
        assert_eq!(ctx.lookup::<Config>(), Some(Config::default()));
    }

    #[test]
    fn try_register_through_extension() {
        let bare = Context::background();
        assert!(bare.try_register(Config::default()).is_err());

        let bound = bare.with_registry(crate::ServiceRegistry::new_dyn());
        assert!(bound.try_register(Config::default()).is_ok());
    }

    #[test]
    #[should_panic(expected = "no service registry bound to context")]
    fn must_register_shared_panics_without_registry() {
        Context::background().must_register_shared(Shared::new(Config::default()));
    }
}
