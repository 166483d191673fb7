//! Ambient per-operation context for Ambit.
//!
//! `ambit_context` provides [`Context`], the value that callers thread
//! through a call chain alongside their regular arguments:
//!
//! - [`key`] - Type-derived keys for associating values
//! - [`mod@context`] - The immutable, derivable [`Context`] itself
//! - [`cancel`] - Cancellation handles for cancelable contexts
//! - [`error`] - Why a context is done
//!
//! # Derivation Model
//!
//! A context is never mutated. Every `with_*` call returns a *derived*
//! context that points at its parent:
//!
//! ```text
//! background
//!    │
//!    └── with_value(Config)
//!           │
//!           ├── with_cancel()           (request A)
//!           │
//!           └── with_timeout(5s)        (request B)
//! ```
//!
//! Lookups walk from the leaf towards the root, so the closest association
//! for a key wins. Siblings never observe each other's values.
//!
//! # Example
//!
//! ```
//! use ambit_context::Context;
//!
//! struct RequestId(u64);
//!
//! let ctx = Context::background().with(RequestId(7));
//! let (ctx, cancel) = ctx.with_cancel();
//!
//! assert_eq!(ctx.get::<RequestId>().unwrap().0, 7);
//! assert!(ctx.err().is_none());
//!
//! cancel.cancel();
//! assert!(ctx.is_cancelled());
//! ```

/// Cancellation handles.
pub mod cancel;

/// The context type.
pub mod context;

/// Context error types.
pub mod error;

/// Keys for context values.
pub mod key;

pub use cancel::CancelHandle;
pub use context::{Context, ContextValue};
pub use error::ContextError;
pub use key::ContextKey;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use crate::cancel::*;
    pub use crate::context::*;
    pub use crate::error::*;
    pub use crate::key::*;
}
