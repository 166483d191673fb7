//! The ambient context type.
//!
//! A [`Context`] is an immutable node in a tree of derived contexts. Each
//! node adds exactly one thing on top of its parent: a value, a
//! cancellation scope, or a deadline. Cloning a context is an `Arc` bump.
//!
//! Every node also caches the nearest cancellation token and the earliest
//! deadline of its ancestry, so those queries never walk the chain.

use core::any::Any;
use core::time::Duration;
use std::sync::Arc;
use std::time::Instant;

use tokio_util::sync::CancellationToken;

use crate::cancel::CancelHandle;
use crate::error::ContextError;
use crate::key::ContextKey;

/// A type-erased value stored in a context.
pub type ContextValue = Arc<dyn Any + Send + Sync>;

/// What a single node adds on top of its parent.
enum Layer {
    /// The root of every context tree.
    Background,
    /// Associates `key` with `value` for this node and its descendants.
    Value { key: ContextKey, value: ContextValue },
    /// Cancelable boundary.
    Cancel,
    /// Deadline boundary.
    Deadline,
}

struct Node {
    parent: Option<Context>,
    layer: Layer,
    /// Token of the closest cancelable ancestor (or self).
    token: Option<CancellationToken>,
    /// Earliest deadline along the ancestry.
    deadline: Option<Instant>,
}

impl Drop for Node {
    // Unlink the parent chain iteratively, stopping at the first shared node.
    fn drop(&mut self) {
        let mut next = self.parent.take();
        while let Some(ctx) = next {
            next = match Arc::into_inner(ctx.node) {
                Some(mut node) => node.parent.take(),
                None => break,
            };
        }
    }
}

/// Ambient per-operation context.
///
/// Contexts are passed down a call chain and carry request-scoped values,
/// a cancellation signal, and an optional deadline. They are immutable:
/// every `with_*` method returns a derived context and leaves `self`
/// untouched, so a callee can never change what its caller observes.
///
/// # Lookup Order
///
/// [`value`](Self::value) walks from this context towards the root and
/// returns the first association found (shadowing: closest wins).
///
/// # Thread Safety
///
/// `Context` is `Send + Sync` and cheap to clone, so it can be handed to
/// other threads and async tasks freely.
///
/// # Example
///
/// ```
/// use ambit_context::Context;
///
/// struct Locale(&'static str);
///
/// let root = Context::background();
/// let en = root.with(Locale("en"));
/// let fr = en.with(Locale("fr"));
///
/// assert!(root.get::<Locale>().is_none());
/// assert_eq!(en.get::<Locale>().unwrap().0, "en");
/// assert_eq!(fr.get::<Locale>().unwrap().0, "fr");
/// ```
#[derive(Clone)]
pub struct Context {
    node: Arc<Node>,
}

impl Default for Context {
    fn default() -> Self {
        Self::background()
    }
}

impl Context {
    /// Creates a new, empty root context.
    ///
    /// The background context carries no values, is never cancelled and
    /// has no deadline.
    #[must_use]
    pub fn background() -> Self {
        Self {
            node: Arc::new(Node {
                parent: None,
                layer: Layer::Background,
                token: None,
                deadline: None,
            }),
        }
    }

    fn derive(&self, layer: Layer) -> Self {
        self.derive_with(layer, self.node.token.clone(), self.node.deadline)
    }

    fn derive_with(
        &self,
        layer: Layer,
        token: Option<CancellationToken>,
        deadline: Option<Instant>,
    ) -> Self {
        Self {
            node: Arc::new(Node {
                parent: Some(self.clone()),
                layer,
                token,
                deadline,
            }),
        }
    }

    /// Returns a derived context that associates `key` with `value`.
    #[must_use]
    pub fn with_value(&self, key: ContextKey, value: ContextValue) -> Self {
        self.derive(Layer::Value { key, value })
    }

    /// Returns the value associated with `key` by this context or its
    /// closest ancestor, if any.
    #[must_use]
    pub fn value(&self, key: &ContextKey) -> Option<ContextValue> {
        self.ancestry().find_map(|ctx| match &ctx.node.layer {
            Layer::Value { key: k, value } if k == key => Some(Arc::clone(value)),
            _ => None,
        })
    }

    /// Builder shorthand: stores `value` under the key derived from its
    /// own type.
    #[must_use]
    pub fn with<V: Any + Send + Sync>(&self, value: V) -> Self {
        self.with_value(ContextKey::of::<V>(), Arc::new(value))
    }

    /// Returns the value stored by [`with`](Self::with) for type `V`.
    ///
    /// # Panics
    ///
    /// Panics if a value of a different type was stored under `V`'s key
    /// through [`with_value`](Self::with_value).
    #[must_use]
    pub fn get<V: Any + Send + Sync>(&self) -> Option<Arc<V>> {
        self.value(&ContextKey::of::<V>()).map(|value| {
            value.downcast::<V>().unwrap_or_else(|_| {
                panic!(
                    "context value type mismatch for key {}",
                    core::any::type_name::<V>()
                )
            })
        })
    }

    /// Returns a derived context that can be cancelled through the returned
    /// handle.
    ///
    /// The new scope is a child of the closest cancelable ancestor, so
    /// cancelling an ancestor also cancels it. Cancelling the handle affects
    /// the derived context and its descendants; `self` is unaffected.
    #[must_use]
    pub fn with_cancel(&self) -> (Self, CancelHandle) {
        let token = match &self.node.token {
            Some(parent) => parent.child_token(),
            None => CancellationToken::new(),
        };
        let ctx = self.derive_with(Layer::Cancel, Some(token.clone()), self.node.deadline);
        (ctx, CancelHandle::new(token))
    }

    /// Returns a derived context that is done once `deadline` passes.
    ///
    /// If an ancestor already has an earlier deadline, that one still
    /// applies; deadlines can only be tightened.
    #[must_use]
    pub fn with_deadline(&self, deadline: Instant) -> Self {
        let earliest = match self.node.deadline {
            Some(inherited) => inherited.min(deadline),
            None => deadline,
        };
        self.derive_with(Layer::Deadline, self.node.token.clone(), Some(earliest))
    }

    /// Returns a derived context whose deadline is `timeout` from now.
    #[must_use]
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Returns the earliest deadline along this context's ancestry.
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.node.deadline
    }

    /// Returns `true` if this context or any ancestor has been cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.node
            .token
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
    }

    /// Returns the token of the closest cancelable scope, if any.
    #[must_use]
    pub fn cancellation_token(&self) -> Option<&CancellationToken> {
        self.node.token.as_ref()
    }

    /// Returns why this context is done, or `None` while it is still live.
    ///
    /// Cancellation takes precedence over an expired deadline.
    #[must_use]
    pub fn err(&self) -> Option<ContextError> {
        if self.is_cancelled() {
            return Some(ContextError::Canceled);
        }
        match self.deadline() {
            Some(deadline) if deadline <= Instant::now() => Some(ContextError::DeadlineExceeded),
            _ => None,
        }
    }

    /// Completes once this context is cancelled.
    ///
    /// Never completes for a context without a cancelable ancestor.
    pub async fn cancelled(&self) {
        match &self.node.token {
            Some(token) => token.cancelled().await,
            None => core::future::pending().await,
        }
    }

    /// Completes once this context is done, returning why.
    ///
    /// Waiting on a deadline needs a Tokio runtime with the time driver
    /// enabled. Cancellation wins if both are ready.
    pub async fn done(&self) -> ContextError {
        let Some(deadline) = self.deadline() else {
            self.cancelled().await;
            return ContextError::Canceled;
        };

        tokio::select! {
            biased;
            () = self.cancelled() => ContextError::Canceled,
            () = tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)) => {
                ContextError::DeadlineExceeded
            }
        }
    }

    /// Returns the context this one was derived from, or `None` for a
    /// background context.
    #[must_use]
    pub fn parent(&self) -> Option<&Context> {
        self.node.parent.as_ref()
    }

    /// Returns `true` if both handles refer to the same context node.
    #[must_use]
    pub fn ptr_eq(&self, other: &Context) -> bool {
        Arc::ptr_eq(&self.node, &other.node)
    }

    /// Iterates over this context and its ancestors, leaf first.
    fn ancestry(&self) -> impl Iterator<Item = &Context> {
        core::iter::successors(Some(self), |ctx| ctx.parent())
    }
}

impl core::fmt::Debug for Context {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let keys: Vec<&'static str> = self
            .ancestry()
            .filter_map(|ctx| match &ctx.node.layer {
                Layer::Value { key, .. } => Some(key.name()),
                _ => None,
            })
            .collect();

        f.debug_struct("Context")
            .field("keys", &keys)
            .field("cancelled", &self.is_cancelled())
            .field("deadline", &self.deadline())
            .finish()
    }
}
