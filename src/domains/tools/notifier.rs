//! Change notification for the enabled tool set.
//!
//! Subscribers register a callback and receive a guard. Dropping the guard
//! (or calling [`Subscription::unsubscribe`]) removes the callback, so a
//! transport that holds the guard for the lifetime of its connection cannot
//! leak a subscription on any exit path.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};

use super::manager::ToolListResponse;

type Callback = Arc<dyn Fn(&ToolListResponse) + Send + Sync>;

#[derive(Default)]
struct Subscribers {
    next_id: AtomicU64,
    callbacks: Mutex<BTreeMap<u64, Callback>>,
}

impl Subscribers {
    fn remove(&self, id: u64) {
        self.callbacks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id);
    }
}

/// The set of callbacks interested in tool list changes.
#[derive(Clone, Default)]
pub struct ChangeNotifier {
    inner: Arc<Subscribers>,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `callback`. It stays registered until the guard is dropped.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&ToolListResponse) + Send + Sync + 'static,
    {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner
            .callbacks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, Arc::new(callback));

        Subscription {
            id,
            subscribers: Arc::downgrade(&self.inner),
        }
    }

    /// Invoke every callback with `response`, in subscription order.
    ///
    /// The callbacks run outside the lock, so a callback may drop
    /// subscriptions (its own included).
    pub fn notify(&self, response: &ToolListResponse) {
        let callbacks: Vec<Callback> = self
            .inner
            .callbacks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();

        for callback in callbacks {
            callback(response);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner
            .callbacks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl std::fmt::Debug for ChangeNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeNotifier")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

/// Keeps a callback registered. Unsubscribes on drop.
#[must_use = "dropping a Subscription unsubscribes immediately"]
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    subscribers: Weak<Subscribers>,
}

impl Subscription {
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(subscribers) = self.subscribers.upgrade() {
            subscribers.remove(self.id);
        }
    }
}
