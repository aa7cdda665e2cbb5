//! In-process publish/subscribe event bus.
//!
//! The bus maps event names to an ordered list of listeners. It is
//! constructed explicitly and shared through an [`Arc`]; every client that
//! publishes events receives the bus it should publish on.
//!
//! # Example
//!
//! ```rust
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//!
//! use miracle_sdk::bus::{listener, EventBus};
//!
//! let bus = EventBus::<u32>::new();
//! let seen = Arc::new(AtomicUsize::new(0));
//!
//! let counter = Arc::clone(&seen);
//! let on_tick = listener(move |n: &u32| {
//!     counter.fetch_add(*n as usize, Ordering::SeqCst);
//! });
//!
//! bus.subscribe("tick", Arc::clone(&on_tick));
//! bus.publish("tick", &2);
//! bus.unsubscribe("tick", &on_tick);
//! bus.publish("tick", &5);
//!
//! assert_eq!(seen.load(Ordering::SeqCst), 2);
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::trace;

/// A bus callback. Identity (for [`EventBus::unsubscribe`]) is the `Arc`
/// pointer.
pub type Listener<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// Wraps a closure into a [`Listener`].
pub fn listener<T, F>(f: F) -> Listener<T>
where
    F: Fn(&T) + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Publish/subscribe registry keyed by event name.
pub struct EventBus<T> {
    listeners: Mutex<HashMap<String, Vec<Listener<T>>>>,
}

impl<T> Default for EventBus<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for EventBus<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let listeners = self.lock();
        let counts: HashMap<&str, usize> = listeners
            .iter()
            .map(|(name, list)| (name.as_str(), list.len()))
            .collect();
        f.debug_struct("EventBus")
            .field("listeners", &counts)
            .finish()
    }
}

impl<T> EventBus<T> {
    /// Creates an empty bus.
    #[must_use]
    pub fn new() -> Self {
        Self {
            listeners: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Vec<Listener<T>>>> {
        // Listeners never run under the lock, so poisoning only means a panic
        // elsewhere; the map itself is always consistent.
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Appends a listener for `event_name`.
    ///
    /// The same listener may be registered more than once; it is then called
    /// once per registration.
    pub fn subscribe(&self, event_name: impl Into<String>, listener: Listener<T>) {
        self.lock()
            .entry(event_name.into())
            .or_default()
            .push(listener);
    }

    /// Removes every registration of `listener` under `event_name`.
    pub fn unsubscribe(&self, event_name: &str, listener: &Listener<T>) {
        let mut listeners = self.lock();
        if let Some(list) = listeners.get_mut(event_name) {
            list.retain(|registered| !Arc::ptr_eq(registered, listener));
            if list.is_empty() {
                listeners.remove(event_name);
            }
        }
    }

    /// Calls every listener registered for `event_name`, in registration order.
    ///
    /// Listeners subscribed during dispatch are not called for this publish.
    /// Listeners unsubscribed during dispatch are skipped if dispatch has not
    /// reached them yet. A panicking listener aborts the remaining dispatch.
    pub fn publish(&self, event_name: &str, payload: &T) {
        let snapshot = match self.lock().get(event_name) {
            Some(list) => list.clone(),
            None => return,
        };

        trace!(event = event_name, listeners = snapshot.len(), "publish");

        for listener in &snapshot {
            if !self.is_registered(event_name, listener) {
                continue;
            }
            listener(payload);
        }
    }

    /// Returns the number of registrations for `event_name`.
    #[must_use]
    pub fn listener_count(&self, event_name: &str) -> usize {
        self.lock().get(event_name).map_or(0, Vec::len)
    }

    /// Returns true if `listener` is currently registered for `event_name`.
    #[must_use]
    pub fn is_registered(&self, event_name: &str, listener: &Listener<T>) -> bool {
        self.lock()
            .get(event_name)
            .is_some_and(|list| list.iter().any(|l| Arc::ptr_eq(l, listener)))
    }

    /// Removes all listeners for every event.
    pub fn clear(&self) {
        self.lock().clear();
    }
}
