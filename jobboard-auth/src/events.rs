//! Session lifecycle notifications.
//!
//! Interested components subscribe with a callback and receive sign-in and
//! sign-out events as they happen. Dropping the returned subscription handle
//! removes the callback, so listeners cannot outlive their owners.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use uuid::Uuid;

/// A change in session state for one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    SignedIn { user_id: Uuid },
    SignedOut { user_id: Uuid },
}

type Callback = Box<dyn Fn(&SessionEvent) + Send + Sync>;

/// Registry of session-event listeners. Cheap to clone; all clones share the
/// same listener set.
#[derive(Clone, Default)]
pub struct SessionEvents {
    inner: Arc<SessionEventsInner>,
}

#[derive(Default)]
struct SessionEventsInner {
    next_id: AtomicU64,
    listeners: RwLock<HashMap<u64, Callback>>,
}

impl SessionEvents {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback. It stays active until the returned handle is dropped.
    pub fn subscribe<F>(&self, callback: F) -> SessionSubscription
    where
        F: Fn(&SessionEvent) + Send + Sync + 'static,
    {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut listeners) = self.inner.listeners.write() {
            listeners.insert(id, Box::new(callback));
        }
        SessionSubscription {
            id,
            registry: Arc::downgrade(&self.inner),
        }
    }

    /// Deliver an event to every live listener.
    pub fn emit(&self, event: SessionEvent) {
        if let Ok(listeners) = self.inner.listeners.read() {
            for callback in listeners.values() {
                callback(&event);
            }
        }
    }

    #[cfg(test)]
    fn listener_count(&self) -> usize {
        self.inner.listeners.read().map(|l| l.len()).unwrap_or(0)
    }
}

/// Handle for an active subscription. Unsubscribes on drop.
pub struct SessionSubscription {
    id: u64,
    registry: std::sync::Weak<SessionEventsInner>,
}

impl Drop for SessionSubscription {
    fn drop(&mut self) {
        if let Some(inner) = self.registry.upgrade() {
            if let Ok(mut listeners) = inner.listeners.write() {
                listeners.remove(&self.id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn subscribers_receive_events() {
        let events = SessionEvents::new();
        let seen = Arc::new(AtomicUsize::new(0));

        let seen_clone = seen.clone();
        let _sub = events.subscribe(move |event| {
            assert!(matches!(event, SessionEvent::SignedIn { .. }));
            seen_clone.fetch_add(1, Ordering::SeqCst);
        });

        events.emit(SessionEvent::SignedIn {
            user_id: Uuid::new_v4(),
        });
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn dropping_subscription_unsubscribes() {
        let events = SessionEvents::new();
        let sub = events.subscribe(|_| {});
        assert_eq!(events.listener_count(), 1);

        drop(sub);
        assert_eq!(events.listener_count(), 0);

        // Emitting with no listeners is a no-op.
        events.emit(SessionEvent::SignedOut {
            user_id: Uuid::new_v4(),
        });
    }
}
