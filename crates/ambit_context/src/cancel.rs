//! Cancellation handles.

use tokio_util::sync::CancellationToken;

/// Cancels the context returned alongside it by
/// [`Context::with_cancel`](crate::Context::with_cancel).
///
/// Cancelling is idempotent and affects the paired context and every
/// context derived from it, never its ancestors or siblings. Handles are
/// cheap to clone and may be moved to other threads.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    token: CancellationToken,
}

impl CancelHandle {
    pub(crate) fn new(token: CancellationToken) -> Self {
        Self { token }
    }

    /// Cancels the paired context.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Returns `true` once [`cancel`](Self::cancel) has been called, or an
    /// ancestor context was cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Returns the underlying token, for handing to code that speaks
    /// `tokio_util` directly.
    #[must_use]
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }
}
