//! EventEmitter<T>: typed fan-out for change notifications.
//!
//! Listeners are stored as `Arc<dyn Fn(&T)>` so snapshots are cheap.
//! Snapshot-on-emit semantics mean:
//!   - A listener removed *during* emission is still called in that round.
//!   - A listener added *during* emission is NOT called until the next emit.
//!
//! Each listener runs inside `catch_unwind`: a panicking subscriber is logged
//! and skipped, and delivery continues to the rest.
//!
//! All methods take `&self` (interior mutability via `parking_lot::Mutex`),
//! which allows listeners to subscribe or unsubscribe during `emit()` without
//! deadlocking.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use super::subscription::Subscription;

/// A listener ID returned by [`EventEmitter::on`] that can be passed to
/// [`EventEmitter::off`] to remove the listener.
pub type ListenerId = u64;

/// Closure type for event listeners.
pub type ListenerFn<T> = dyn Fn(&T) + Send + Sync;

/// Typed synchronous event emitter.
///
/// `T` is the event payload type and may be unsized (`EventEmitter<[Record]>`).
/// Internal state is protected by a `parking_lot::Mutex` that is never held
/// during callbacks.
pub struct EventEmitter<T: ?Sized> {
    listeners: Mutex<Vec<(ListenerId, Arc<ListenerFn<T>>)>>,
    next_id: AtomicU64,
}

impl<T: ?Sized> EventEmitter<T> {
    /// Create a new, empty emitter.
    pub fn new() -> Self {
        Self {
            listeners: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Register `callback` and return its [`ListenerId`].
    pub fn on(&self, callback: impl Fn(&T) + Send + Sync + 'static) -> ListenerId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.listeners.lock().push((id, Arc::new(callback)));
        id
    }

    /// Remove the listener identified by `id`.
    ///
    /// Does nothing if `id` is not present (safe to call multiple times).
    pub fn off(&self, id: ListenerId) {
        self.listeners.lock().retain(|(lid, _)| *lid != id);
    }

    /// Emit `event` to all currently registered listeners.
    ///
    /// The listener list is snapshotted before iteration and the lock released
    /// before any callback runs.
    pub fn emit(&self, event: &T) {
        let snapshot: Vec<(ListenerId, Arc<ListenerFn<T>>)> = {
            let guard = self.listeners.lock();
            guard
                .iter()
                .map(|(id, cb)| (*id, Arc::clone(cb)))
                .collect()
        };
        for (id, cb) in snapshot {
            if catch_unwind(AssertUnwindSafe(|| cb(event))).is_err() {
                tracing::error!(listener = id, "change listener panicked; continuing fan-out");
            }
        }
    }

    /// Number of currently registered listeners.
    pub fn size(&self) -> usize {
        self.listeners.lock().len()
    }
}

impl<T: ?Sized + 'static> EventEmitter<T> {
    /// Register `callback` and return a [`Subscription`] that removes it.
    ///
    /// The subscription only holds a weak reference, so an outstanding handle
    /// does not keep the emitter alive.
    pub fn subscribe(
        self: &Arc<Self>,
        callback: impl Fn(&T) + Send + Sync + 'static,
    ) -> Subscription {
        let id = self.on(callback);
        let emitter: Weak<Self> = Arc::downgrade(self);
        Subscription::new(move || {
            if let Some(emitter) = emitter.upgrade() {
                emitter.off(id);
            }
        })
    }
}

impl<T: ?Sized> Default for EventEmitter<T> {
    fn default() -> Self {
        Self::new()
    }
}
