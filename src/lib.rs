//! Dependency injection through an ambient context.
//!
//! Ambit attaches services to the [`Context`](ambit_context::Context) a
//! call chain already threads, and lets any callee resolve them by type:
//!
//! - [`ambit_context`] - The immutable context: values, cancellation, deadlines
//! - [`ambit_registry`] - The type-indexed registry and its binding helpers
//!
//! # Example
//!
//! ```
//! use ambit::prelude::*;
//!
//! #[derive(Clone, Default)]
//! struct Greeter { greeting: &'static str }
//!
//! fn greet(ctx: &Context, name: &str) -> String {
//!     format!("{}, {name}", ctx.service::<Greeter>().greeting)
//! }
//!
//! let ctx = Context::background().with_service(Greeter { greeting: "Hello" });
//! assert_eq!(greet(&ctx, "Ada"), "Hello, Ada");
//! ```

pub use ambit_context;
pub use ambit_registry;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use ambit_context::prelude::*;
    pub use ambit_registry::prelude::*;
}
