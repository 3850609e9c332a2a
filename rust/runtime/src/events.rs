// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Explicit event subscriptions.
//!
//! Collaborators announce model loads and lifecycle diagnostics through
//! an [`EventBus`]. Subscribing returns a [`Subscription`] token that
//! unsubscribes on drop, and handlers are dispatched in subscription
//! order so consumers observe a deterministic sequence.

use std::sync::{Arc, Mutex};

type Handler<E> = Arc<dyn Fn(&E) + Send + Sync>;

struct Slots<E> {
    subscribers: Vec<(u64, Handler<E>)>,
    next_id: u64,
}

/// Multi-subscriber event channel with deterministic dispatch order.
pub struct EventBus<E> {
    slots: Arc<Mutex<Slots<E>>>,
}

impl<E> Clone for EventBus<E> {
    fn clone(&self) -> Self {
        Self {
            slots: Arc::clone(&self.slots),
        }
    }
}

impl<E: 'static> Default for EventBus<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: 'static> EventBus<E> {
    pub fn new() -> Self {
        Self {
            slots: Arc::new(Mutex::new(Slots {
                subscribers: Vec::new(),
                next_id: 0,
            })),
        }
    }

    /// Register a handler. Dropping the returned token unsubscribes it.
    pub fn subscribe(&self, handler: impl Fn(&E) + Send + Sync + 'static) -> Subscription {
        let id = {
            let mut slots = self.slots.lock().expect("event bus lock poisoned");
            let id = slots.next_id;
            slots.next_id += 1;
            slots.subscribers.push((id, Arc::new(handler)));
            id
        };

        let slots = Arc::clone(&self.slots);
        Subscription {
            cancel: Some(Box::new(move || {
                let mut slots = slots.lock().expect("event bus lock poisoned");
                slots.subscribers.retain(|(sub_id, _)| *sub_id != id);
            })),
        }
    }

    /// Dispatch `event` to all current subscribers in subscription order.
    ///
    /// Handlers run outside the bus lock, so a handler may subscribe or
    /// emit without deadlocking; such changes take effect on the next
    /// emit.
    pub fn emit(&self, event: &E) {
        let handlers: Vec<Handler<E>> = {
            let slots = self.slots.lock().expect("event bus lock poisoned");
            slots
                .subscribers
                .iter()
                .map(|(_, handler)| Arc::clone(handler))
                .collect()
        };
        for handler in handlers {
            handler(event);
        }
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.slots
            .lock()
            .expect("event bus lock poisoned")
            .subscribers
            .len()
    }
}

/// Handle to an active subscription; unsubscribes when dropped.
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    /// Unsubscribe explicitly instead of waiting for drop.
    pub fn cancel(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatches_in_subscription_order() {
        let bus: EventBus<u32> = EventBus::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let first = {
            let seen = Arc::clone(&seen);
            bus.subscribe(move |n| seen.lock().unwrap().push(("first", *n)))
        };
        let second = {
            let seen = Arc::clone(&seen);
            bus.subscribe(move |n| seen.lock().unwrap().push(("second", *n)))
        };

        bus.emit(&7);
        assert_eq!(
            *seen.lock().unwrap(),
            vec![("first", 7), ("second", 7)]
        );
        drop(first);
        drop(second);
    }

    #[test]
    fn drop_unsubscribes() {
        let bus: EventBus<u32> = EventBus::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let sub = {
            let seen = Arc::clone(&seen);
            bus.subscribe(move |n| seen.lock().unwrap().push(*n))
        };
        bus.emit(&1);
        drop(sub);
        bus.emit(&2);

        assert_eq!(*seen.lock().unwrap(), vec![1]);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn handler_may_emit_without_deadlock() {
        let bus: EventBus<u32> = EventBus::new();
        let inner = bus.clone();
        let _sub = bus.subscribe(move |n| {
            if *n == 0 {
                inner.emit(&1);
            }
        });
        bus.emit(&0);
    }
}
