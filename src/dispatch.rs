//! Callback registry for incoming messages.
//!
//! Consumers subscribe a callback per [`MessageType`]; the reader task
//! dispatches each decoded message to every callback registered for its
//! type, in subscription order. A panicking callback is isolated: the panic
//! is caught and logged, remaining callbacks still run, and the reader task
//! survives.
//!
//! The registry is owned by the [`Client`](crate::Client) rather than being
//! process-global, so independent clients never share handlers.

use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tracing::error;

use crate::protocol::{Message, MessageType};

type Callback = Arc<dyn Fn(&Message) + Send + Sync>;

struct Entry {
    id: u64,
    callback: Callback,
}

/// Proof of a registration, used to remove it later.
///
/// Closures have no identity of their own, so `subscribe` hands back an
/// opaque id. Dropping a `Subscription` does NOT unregister the callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subscription {
    ty: MessageType,
    id: u64,
}

/// Message-type → ordered callback list.
///
/// Duplicate registrations of the same closure are allowed and fire once
/// per registration. All methods take `&self`; the registry is safe to
/// share behind an `Arc`.
pub struct DispatchRegistry {
    entries: Mutex<HashMap<MessageType, Vec<Entry>>>,
    next_id: AtomicU64,
}

impl DispatchRegistry {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Register a callback for one message type, appended after any
    /// callbacks already registered for that type.
    pub fn subscribe<F>(&self, ty: MessageType, callback: F) -> Subscription
    where
        F: Fn(&Message) + Send + Sync + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let mut entries = self.lock();
        entries.entry(ty).or_default().push(Entry {
            id,
            callback: Arc::new(callback),
        });
        Subscription { ty, id }
    }

    /// Remove a previously registered callback.
    ///
    /// Removing a subscription that is already gone is a no-op. Other
    /// callbacks for the same type keep their relative order.
    pub fn unsubscribe(&self, subscription: Subscription) {
        let mut entries = self.lock();
        if let Some(list) = entries.get_mut(&subscription.ty) {
            list.retain(|e| e.id != subscription.id);
            if list.is_empty() {
                entries.remove(&subscription.ty);
            }
        }
    }

    /// Invoke every callback registered for the message's type, in
    /// registration order.
    ///
    /// No callbacks registered is a non-event. Callbacks run outside the
    /// registry lock, so a callback may subscribe or unsubscribe; changes
    /// take effect from the next dispatched message.
    pub fn dispatch(&self, message: &Message) {
        let ty = message.message_type();
        let snapshot: Vec<Callback> = {
            let entries = self.lock();
            match entries.get(&ty) {
                Some(list) => list.iter().map(|e| Arc::clone(&e.callback)).collect(),
                None => return,
            }
        };

        for callback in snapshot {
            if catch_unwind(AssertUnwindSafe(|| callback(message))).is_err() {
                error!(message_type = ?ty, "message callback panicked");
            }
        }
    }

    /// Number of callbacks currently registered for a type.
    pub fn callback_count(&self, ty: MessageType) -> usize {
        self.lock().get(&ty).map_or(0, Vec::len)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<MessageType, Vec<Entry>>> {
        // A poisoned lock means a panic while mutating the map; the map
        // itself is still structurally sound, so keep going.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for DispatchRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn counter() -> (Arc<AtomicUsize>, impl Fn(&Message) + Send + Sync + 'static) {
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        (count, move |_: &Message| {
            c.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn test_dispatch_reaches_matching_type_only() {
        let registry = DispatchRegistry::new();
        let (pings, on_ping) = counter();
        registry.subscribe(MessageType::Ping, on_ping);

        registry.dispatch(&Message::Ping);
        registry.dispatch(&Message::Pong);
        registry.dispatch(&Message::Ping);

        assert_eq!(pings.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_fan_out_in_registration_order() {
        let registry = DispatchRegistry::new();
        let order = Arc::new(Mutex::new(Vec::new()));
        for label in ["first", "second", "third"] {
            let order = order.clone();
            registry.subscribe(MessageType::GameOver, move |_| {
                order.lock().unwrap().push(label);
            });
        }

        registry.dispatch(&Message::GameOver);

        assert_eq!(*order.lock().unwrap(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_unsubscribe_middle_keeps_order() {
        let registry = DispatchRegistry::new();
        let order = Arc::new(Mutex::new(Vec::new()));
        let mut subs = Vec::new();
        for label in ["a", "b", "c"] {
            let order = order.clone();
            subs.push(registry.subscribe(MessageType::Pong, move |_| {
                order.lock().unwrap().push(label);
            }));
        }

        registry.unsubscribe(subs[1]);
        registry.dispatch(&Message::Pong);

        assert_eq!(*order.lock().unwrap(), vec!["a", "c"]);
        assert_eq!(registry.callback_count(MessageType::Pong), 2);
    }

    #[test]
    fn test_unsubscribe_twice_is_noop() {
        let registry = DispatchRegistry::new();
        let (count, cb) = counter();
        let sub = registry.subscribe(MessageType::Ping, cb);

        registry.unsubscribe(sub);
        registry.unsubscribe(sub);

        registry.dispatch(&Message::Ping);
        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert_eq!(registry.callback_count(MessageType::Ping), 0);
    }

    #[test]
    fn test_duplicate_registration_fires_per_registration() {
        let registry = DispatchRegistry::new();
        let (count, _) = counter();
        for _ in 0..3 {
            let c = count.clone();
            registry.subscribe(MessageType::Ping, move |_| {
                c.fetch_add(1, Ordering::SeqCst);
            });
        }

        registry.dispatch(&Message::Ping);
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_dispatch_with_no_callbacks_is_noop() {
        let registry = DispatchRegistry::new();
        registry.dispatch(&Message::Ping); // must not panic
    }

    #[test]
    fn test_panicking_callback_is_isolated() {
        let registry = DispatchRegistry::new();
        let (count, _) = counter();

        registry.subscribe(MessageType::Ping, |_| panic!("boom"));
        let c = count.clone();
        registry.subscribe(MessageType::Ping, move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        });

        registry.dispatch(&Message::Ping);
        // The later callback still ran, and dispatch did not propagate.
        assert_eq!(count.load(Ordering::SeqCst), 1);

        // The registry stays usable afterwards.
        registry.dispatch(&Message::Ping);
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_callback_sees_message_fields() {
        let registry = DispatchRegistry::new();
        let seen = Arc::new(Mutex::new(None));
        let s = seen.clone();
        registry.subscribe(MessageType::MoveResult, move |m| {
            if let Message::MoveResult { row, col, .. } = m {
                *s.lock().unwrap() = Some((*row, *col));
            }
        });

        registry.dispatch(&Message::MoveResult {
            row: 3,
            col: 7,
            is_hit: true,
            is_sunk: false,
            sunk_ship_type: 0,
            game_over: false,
            is_your_shot: true,
        });

        assert_eq!(*seen.lock().unwrap(), Some((3, 7)));
    }
}
