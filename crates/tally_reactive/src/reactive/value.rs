use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use parking_lot::{Mutex, ReentrantMutex};

use super::listeners::{ListenerKey, Listeners};

struct ValueInner<T> {
    // serialises store-then-notify, re-entrant so a listener may `set` again
    update: ReentrantMutex<()>,
    value: Mutex<T>,
    listeners: Listeners<T>,
}

/// A thread-safe container for a value that can be monitored for changes.
///
/// Cloning a `Value` creates a new handle to the **same** stored value.
pub struct Value<T> {
    inner: Arc<ValueInner<T>>,
}

impl<T> Clone for Value<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Debug> Debug for Value<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Value")
            .field("value", &*self.inner.value.lock())
            .field("listeners", &self.inner.listeners.len())
            .finish()
    }
}

impl<T: Default + Clone + PartialEq> Default for Value<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Clone + PartialEq> Value<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: Arc::new(ValueInner {
                update: ReentrantMutex::new(()),
                value: Mutex::new(value),
                listeners: Listeners::new(),
            }),
        }
    }

    /// Returns a copy of the current value.
    pub fn get(&self) -> T {
        self.inner.value.lock().clone()
    }

    /// Stores a new value.
    ///
    /// Listeners are notified, with the new value, only when it differs from the previous one.
    /// Returns whether the value changed.
    ///
    /// Concurrent calls are serialised up to and including notification, so the last payload a
    /// listener receives is always the stored value.
    pub fn set(&self, value: T) -> bool {
        let _update = self.inner.update.lock();
        {
            let mut current = self.inner.value.lock();
            if *current == value {
                return false;
            }
            *current = value.clone();
        }

        self.inner.listeners.notify(&value);
        true
    }

    /// Registers a callback that is invoked after every change.
    pub fn on_change<F>(&self, callback: F) -> ListenerKey
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.inner.listeners.subscribe(callback)
    }

    pub fn remove_listener(&self, key: ListenerKey) -> bool {
        self.inner.listeners.unsubscribe(key)
    }
}
