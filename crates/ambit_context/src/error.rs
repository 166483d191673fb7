//! Reasons a context is done.

/// Why a [`Context`](crate::Context) reports itself as done.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ContextError {
    /// The context, or one of its ancestors, was explicitly cancelled.
    #[error("context canceled")]
    Canceled,

    /// The earliest deadline in the context's ancestry has passed.
    #[error("context deadline exceeded")]
    DeadlineExceeded,
}
