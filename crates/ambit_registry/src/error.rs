//! Error types for the binding layer.

/// Errors raised when binding services to a context.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BindError {
    /// A strict registration found no registry bound to the context.
    #[error(
        "no service registry bound to context while registering {service}; \
         bind one with context_with_registry or context_with_default_registry first"
    )]
    MissingRegistry {
        /// Type name of the service that could not be registered.
        service: &'static str,
    },
}
