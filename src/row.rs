//! Row contract and reusable notification base.
//!
//! A row is one logical line inside the render window. The [`Row`] trait is
//! the full contract the window consumes: render one line, report lifecycle
//! state, and optionally let the window subscribe to change notifications.
//! [`RowCore`] provides the subscriber registry and lifecycle plumbing so a
//! concrete row only has to store its own content.

use crate::term::Terminal;
use parking_lot::Mutex;
use smallvec::SmallVec;
use std::io;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Change-notification callback registered by a subscriber.
pub type Listener = Arc<dyn Fn() + Send + Sync>;

// Subscription ids are process-global so a token can never collide across
// rows, even when a listener is moved between them.
static SUBSCRIPTION_IDS: AtomicU64 = AtomicU64::new(1);

/// Opaque token identifying one registered listener.
///
/// Returned by [`Row::subscribe`]; passing it to [`Row::unsubscribe`]
/// deregisters exactly that listener. Unsubscribing twice is a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    fn next() -> Self {
        Self(SUBSCRIPTION_IDS.fetch_add(1, Ordering::Relaxed))
    }
}

/// Lifecycle state of a row.
///
/// The transition out of `Active` is one-directional: once a row has ended
/// it is eligible for removal on the next redraw and its owner must not
/// mutate it further.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RowState {
    /// Still rendering.
    #[default]
    Active,
    /// Finished; remove on the next redraw without a trace.
    EndedSilent,
    /// Finished; remove on the next redraw and emit this text as a
    /// permanent log line.
    EndedWithMessage(String),
}

impl RowState {
    /// Whether this row has finished.
    pub fn is_ended(&self) -> bool {
        !matches!(self, Self::Active)
    }
}

/// One line of content inside a render window.
///
/// Only `render` is mandatory. Rows that never change and never finish can
/// leave the other methods defaulted; the window treats a `None` return
/// from `subscribe` as "this row does not signal changes".
pub trait Row: Send + Sync {
    /// Write the row's current visual representation to `term`.
    ///
    /// Must produce at most one line's worth of content (no embedded
    /// newlines), must be safe to call repeatedly, and must reflect the
    /// row's state at call time rather than buffered content.
    fn render(&self, term: &mut dyn Terminal) -> io::Result<()>;

    /// Current lifecycle state.
    fn state(&self) -> RowState {
        RowState::Active
    }

    /// Register a change listener, returning its token, or `None` if this
    /// row does not support change notification.
    fn subscribe(&self, _listener: Listener) -> Option<SubscriptionId> {
        None
    }

    /// Deregister a listener previously returned by `subscribe`.
    fn unsubscribe(&self, _id: SubscriptionId) {}
}

struct CoreInner {
    listeners: SmallVec<[(SubscriptionId, Listener); 2]>,
    state: RowState,
}

/// Reusable base providing the subscriber registry and lifecycle state.
///
/// Concrete rows embed a `RowCore`, delegate the optional [`Row`] methods
/// to it, and call [`RowCore::notify`] whenever their renderable content
/// changes.
pub struct RowCore {
    inner: Mutex<CoreInner>,
}

impl RowCore {
    /// Create an active core with no subscribers.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(CoreInner {
                listeners: SmallVec::new(),
                state: RowState::Active,
            }),
        }
    }

    /// Register a listener and return its token.
    pub fn subscribe(&self, listener: Listener) -> SubscriptionId {
        let id = SubscriptionId::next();
        self.inner.lock().listeners.push((id, listener));
        id
    }

    /// Remove the listener with the given token. Unknown tokens are
    /// ignored, so double-unsubscribe is a no-op.
    pub fn unsubscribe(&self, id: SubscriptionId) {
        let mut inner = self.inner.lock();
        if let Some(pos) = inner.listeners.iter().position(|(l, _)| *l == id) {
            inner.listeners.remove(pos);
        }
    }

    /// Whether at least one listener is currently registered.
    pub fn is_active(&self) -> bool {
        !self.inner.lock().listeners.is_empty()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> RowState {
        self.inner.lock().state.clone()
    }

    /// Finish silently. No-op if the row already ended.
    pub fn end(&self) {
        self.end_as(RowState::EndedSilent);
    }

    /// Finish, leaving `message` as a permanent log line. No-op if the row
    /// already ended.
    pub fn end_with(&self, message: impl Into<String>) {
        self.end_as(RowState::EndedWithMessage(message.into()));
    }

    fn end_as(&self, state: RowState) {
        {
            let mut inner = self.inner.lock();
            if inner.state.is_ended() {
                return;
            }
            inner.state = state;
        }
        self.notify();
    }

    /// Invoke every currently-registered listener, in registration order.
    ///
    /// Iterates a snapshot taken under the lock and invokes listeners after
    /// releasing it: a listener that unsubscribes mid-notification does not
    /// corrupt the iteration, and listeners added mid-notification are not
    /// invoked until the next round.
    pub fn notify(&self) {
        let snapshot: SmallVec<[Listener; 2]> = self
            .inner
            .lock()
            .listeners
            .iter()
            .map(|(_, l)| Arc::clone(l))
            .collect();
        for listener in snapshot {
            listener();
        }
    }
}

impl Default for RowCore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RowCore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("RowCore")
            .field("listeners", &inner.listeners.len())
            .field("state", &inner.state)
            .finish()
    }
}
