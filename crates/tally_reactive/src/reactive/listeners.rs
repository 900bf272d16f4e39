use std::sync::Arc;

use parking_lot::Mutex;
use slotmap::{SlotMap, new_key_type};
use tracing::trace;

new_key_type! {
    /// Identifies a listener registered with a [`Listeners`] registry.
    pub struct ListenerKey;
}

type Callback<E> = Arc<dyn Fn(&E) + Send + Sync + 'static>;

struct Registry<E> {
    callbacks: SlotMap<ListenerKey, Callback<E>>,
    // registration order, `SlotMap` re-uses vacant slots
    order: Vec<ListenerKey>,
}

/// A registry of callbacks interested in events of type `E`.
///
/// Callbacks are invoked in registration order. The registry lock is released before any
/// callback runs, so a callback is free to subscribe or unsubscribe listeners.
pub struct Listeners<E> {
    registry: Mutex<Registry<E>>,
}

impl<E> Default for Listeners<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Listeners<E> {
    /// Creates a new empty registry.
    pub fn new() -> Self {
        Self {
            registry: Mutex::new(Registry {
                callbacks: SlotMap::with_key(),
                order: Vec::new(),
            }),
        }
    }

    /// Registers a callback, returning the key used to unsubscribe it later.
    pub fn subscribe<F>(&self, callback: F) -> ListenerKey
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        let mut registry = self.registry.lock();
        let key = registry.callbacks.insert(Arc::new(callback));
        registry.order.push(key);
        trace!("Listener subscribed. key: {:?}, listeners: {}", key, registry.order.len());
        key
    }

    /// Removes a callback.
    ///
    /// Returns `false` when the key does not refer to a registered callback, e.g. when it was
    /// already removed.
    pub fn unsubscribe(&self, key: ListenerKey) -> bool {
        let mut registry = self.registry.lock();
        if registry.callbacks.remove(key).is_none() {
            return false;
        }
        registry.order.retain(|candidate| *candidate != key);
        trace!("Listener unsubscribed. key: {:?}, listeners: {}", key, registry.order.len());
        true
    }

    /// Invokes every registered callback with the event.
    pub fn notify(&self, event: &E) {
        let callbacks: Vec<Callback<E>> = {
            let registry = self.registry.lock();
            registry
                .order
                .iter()
                .filter_map(|key| registry.callbacks.get(*key).cloned())
                .collect()
        };

        for callback in callbacks {
            callback(event);
        }
    }

    pub fn len(&self) -> usize {
        self.registry.lock().order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use parking_lot::Mutex;

    use super::*;

    #[test]
    fn notify_calls_listeners_in_registration_order() {
        // given
        let listeners = Listeners::<u32>::new();
        let calls = Arc::new(Mutex::new(Vec::new()));

        for name in ["first", "second", "third"] {
            let calls = calls.clone();
            listeners.subscribe(move |event| calls.lock().push((name, *event)));
        }

        // when
        listeners.notify(&7);

        // then
        assert_eq!(*calls.lock(), vec![("first", 7), ("second", 7), ("third", 7)]);
    }

    #[test]
    fn order_is_kept_when_a_vacant_slot_is_reused() {
        // given
        let listeners = Listeners::<()>::new();
        let calls = Arc::new(Mutex::new(Vec::new()));

        let calls_a = calls.clone();
        let key_a = listeners.subscribe(move |_| calls_a.lock().push("a"));
        let calls_b = calls.clone();
        listeners.subscribe(move |_| calls_b.lock().push("b"));

        // when
        listeners.unsubscribe(key_a);
        let calls_c = calls.clone();
        listeners.subscribe(move |_| calls_c.lock().push("c"));
        listeners.notify(&());

        // then
        assert_eq!(*calls.lock(), vec!["b", "c"]);
    }

    #[test]
    fn stale_key_does_not_remove_a_newer_listener() {
        // given
        let listeners = Listeners::<()>::new();
        let stale = listeners.subscribe(|_| {});
        assert!(listeners.unsubscribe(stale));

        // and a new listener that most likely occupies the same slot
        listeners.subscribe(|_| {});

        // when
        let removed = listeners.unsubscribe(stale);

        // then
        assert!(!removed);
        assert_eq!(listeners.len(), 1);
    }

    #[test]
    fn listener_can_unsubscribe_itself_while_being_notified() {
        // given
        let listeners = Arc::new(Listeners::<()>::new());
        let key_slot: Arc<Mutex<Option<ListenerKey>>> = Arc::new(Mutex::new(None));

        let listeners_for_callback = Arc::downgrade(&listeners);
        let key_for_callback = key_slot.clone();
        let key = listeners.subscribe(move |_| {
            if let (Some(listeners), Some(key)) = (listeners_for_callback.upgrade(), *key_for_callback.lock()) {
                listeners.unsubscribe(key);
            }
        });
        *key_slot.lock() = Some(key);

        // when
        listeners.notify(&());

        // then
        assert!(listeners.is_empty());
    }
}
