//! Synchronous publish/subscribe channel.
//!
//! Fields use an [`EventEmitter`] for `change`, `reset`, `item_change` and
//! `field_change` notifications. Delivery is synchronous: `emit` returns
//! after every subscriber registered at emit time has run.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

/// Handle returned by [`EventEmitter::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(usize);

impl ListenerId {
    fn new() -> Self {
        static COUNTER: AtomicUsize = AtomicUsize::new(0);
        Self(COUNTER.fetch_add(1, Ordering::SeqCst))
    }
}

type Handler<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// A multi-subscriber event channel.
///
/// Cloning an emitter yields a handle to the same subscriber list.
pub struct EventEmitter<T> {
    listeners: Arc<RwLock<Vec<(ListenerId, Handler<T>)>>>,
}

impl<T> EventEmitter<T> {
    pub fn new() -> Self {
        Self {
            listeners: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Register a handler. It receives every event emitted after this call.
    pub fn subscribe<F>(&self, handler: F) -> ListenerId
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let id = ListenerId::new();
        self.listeners
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push((id, Arc::new(handler)));
        id
    }

    /// Remove a handler. Returns `false` if it was not registered.
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut guard = self
            .listeners
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let before = guard.len();
        guard.retain(|(listener, _)| *listener != id);
        guard.len() != before
    }

    /// Deliver `event` to a snapshot of the current subscribers.
    ///
    /// The subscriber list is not locked while handlers run, so handlers may
    /// subscribe, unsubscribe or emit again.
    pub fn emit(&self, event: &T) {
        let handlers: Vec<Handler<T>> = self
            .listeners
            .read()
            .map(|guard| guard.iter().map(|(_, h)| Arc::clone(h)).collect())
            .unwrap_or_else(|poisoned| {
                poisoned
                    .into_inner()
                    .iter()
                    .map(|(_, h)| Arc::clone(h))
                    .collect()
            });
        for handler in handlers {
            handler(event);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.read().map(|guard| guard.len()).unwrap_or(0)
    }
}

impl<T> Clone for EventEmitter<T> {
    fn clone(&self) -> Self {
        Self {
            listeners: Arc::clone(&self.listeners),
        }
    }
}

impl<T> Default for EventEmitter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for EventEmitter<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventEmitter")
            .field("listeners", &self.listener_count())
            .finish()
    }
}
