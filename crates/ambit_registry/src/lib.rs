//! Type-indexed service registry carried by an ambient [`Context`].
//!
//! `ambit_registry` lets setup code attach service instances to a context
//! and lets code deep in the call stack retrieve them by their static type,
//! without threading each service through every signature in between:
//!
//! - [`service`] - Type tokens, erased values and mutable handles
//! - [`registry`] - The [`Registry`] contract and [`ServiceRegistry`]
//! - [`binding`] - Placing a registry in a context and resolving services
//! - [`ext`] - The same operations as [`ContextExt`] methods
//! - [`error`] - Errors for strict registration
//!
//! # Storage Flavors
//!
//! | Flavor | Register | Resolve | Missing |
//! |--------|----------|---------|---------|
//! | By value | [`context_with`] | [`from_context`] / [`lookup`] | `T::default()` / `None` |
//! | By handle | [`context_with_ptr`] | [`ptr_from_context`] | `None` |
//!
//! Both flavors key the entry by `T`. Use one flavor per type and registry;
//! reading an entry through the other flavor panics.
//!
//! # Concurrency
//!
//! [`ServiceRegistry`] is internally synchronized, so registering and
//! resolving from several threads at once is safe. Resolving never blocks:
//! reads load an immutable snapshot of the map, and registrations publish a
//! new snapshot. Contexts are `Send + Sync` and can be moved into spawned
//! tasks.
//!
//! # Example
//!
//! ```
//! use ambit_context::Context;
//! use ambit_registry::{context_with, context_with_default_registry, from_context, must_register};
//!
//! #[derive(Clone, Default)]
//! struct Settings { retries: u32 }
//!
//! fn handle_request(ctx: &Context) -> u32 {
//!     from_context::<Settings>(ctx).retries
//! }
//!
//! let ctx = context_with_default_registry(&Context::background());
//! must_register(&ctx, Settings { retries: 3 });
//! assert_eq!(handle_request(&ctx), 3);
//!
//! // A context without a registry resolves the default.
//! assert_eq!(handle_request(&Context::background()), 0);
//!
//! // `context_with` creates the registry on demand.
//! let ctx = context_with(&Context::background(), Settings { retries: 1 });
//! assert_eq!(handle_request(&ctx), 1);
//! ```

/// Binding helpers between contexts and registries.
pub mod binding;

/// Binding error types.
pub mod error;

/// Context extension trait.
pub mod ext;

/// Registry contract and default implementation.
pub mod registry;

/// Service values, tokens and handles.
pub mod service;

pub use ambit_context::Context;
pub use binding::{
    context_with, context_with_default_registry, context_with_ptr, context_with_registry,
    from_context, lookup, must_register, must_register_ptr, ptr_from_context,
    registry_from_context, registry_key, try_register, try_register_ptr,
};
pub use error::BindError;
pub use ext::ContextExt;
pub use registry::{Registry, ServiceRegistry};
pub use service::{AnyService, Service, ServiceId, Shared};

/// Re-export all common types for easy access.
pub mod prelude {
    pub use crate::binding::*;
    pub use crate::error::*;
    pub use crate::ext::*;
    pub use crate::registry::*;
    pub use crate::service::*;
}
