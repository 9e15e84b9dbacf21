//! Location history: change subscriptions and push navigation.

use std::collections::BTreeMap;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tracing::debug;

use crate::location::Location;

/// Callback invoked with the new location after every navigation.
pub type LocationListener = Arc<dyn Fn(&Location) + Send + Sync>;

/// Navigation capability the form depends on.
pub trait History: Send + Sync {
    fn location(&self) -> Location;

    /// Register a listener. It stays registered until the returned
    /// [`Subscription`] is dropped.
    fn listen(&self, listener: LocationListener) -> Subscription;

    /// Push a new entry (not replace) and notify listeners.
    fn push(&self, url: &str);
}

/// Handle for a registered listener; dropping it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    unsubscribe: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn new(unsubscribe: impl FnOnce() + Send + 'static) -> Self {
        Self {
            unsubscribe: Some(Box::new(unsubscribe)),
        }
    }

    pub fn unsubscribe(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(f) = self.unsubscribe.take() {
            f();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

// ---------------------------------------------------------------------------
// In-memory history
// ---------------------------------------------------------------------------

#[derive(Default)]
struct HistoryInner {
    entries: Vec<Location>,
    listeners: BTreeMap<u64, LocationListener>,
    next_listener_id: u64,
}

/// History kept in memory: a stack of entries plus a listener registry.
/// Clones share the same history.
#[derive(Clone)]
pub struct MemoryHistory {
    inner: Arc<Mutex<HistoryInner>>,
}

impl MemoryHistory {
    pub fn new(initial: &str) -> Self {
        let inner = HistoryInner {
            entries: vec![Location::parse(initial)],
            ..Default::default()
        };
        Self {
            inner: Arc::new(Mutex::new(inner)),
        }
    }

    pub fn entries(&self) -> Vec<Location> {
        self.inner.lock().entries.clone()
    }

    pub fn listener_count(&self) -> usize {
        self.inner.lock().listeners.len()
    }

    /// Go back one entry, notifying listeners. Returns the new location, or
    /// `None` when already at the first entry.
    pub fn back(&self) -> Option<Location> {
        let location = {
            let mut inner = self.inner.lock();
            if inner.entries.len() < 2 {
                return None;
            }
            inner.entries.pop();
            inner.entries.last().cloned()?
        };
        self.notify(&location);
        Some(location)
    }

    fn notify(&self, location: &Location) {
        // Listeners run outside the lock so they may read or push history
        let listeners: Vec<LocationListener> = self.inner.lock().listeners.values().cloned().collect();
        debug!(location = %location, listeners = listeners.len(), "Location changed");
        for listener in listeners {
            listener(location);
        }
    }
}

impl History for MemoryHistory {
    fn location(&self) -> Location {
        self.inner.lock().entries.last().cloned().unwrap_or_default()
    }

    fn listen(&self, listener: LocationListener) -> Subscription {
        let id = {
            let mut inner = self.inner.lock();
            let id = inner.next_listener_id;
            inner.next_listener_id += 1;
            inner.listeners.insert(id, listener);
            id
        };
        let weak: Weak<Mutex<HistoryInner>> = Arc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.lock().listeners.remove(&id);
            }
        })
    }

    fn push(&self, url: &str) {
        let location = Location::parse(url);
        self.inner.lock().entries.push(location.clone());
        self.notify(&location);
    }
}
