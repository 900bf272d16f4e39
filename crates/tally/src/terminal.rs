//! Terminal sinks, where reports end up.

use parking_lot::Mutex;
use tally_reactive::{ListenerKey, Value};

use crate::sink::Sink;

/// Records every reported value, in order.
///
/// Mostly useful for testing.
#[derive(Debug, Default)]
pub struct Collector<T> {
    reports: Mutex<Vec<T>>,
}

impl<T> Collector<T> {
    pub fn new() -> Self {
        Self {
            reports: Mutex::new(Vec::new()),
        }
    }

    pub fn clear(&self) {
        self.reports.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.reports.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Clone> Collector<T> {
    /// Returns the values reported so far.
    pub fn reports(&self) -> Vec<T> {
        self.reports.lock().clone()
    }
}

impl<T> Sink<T> for Collector<T> {
    fn report(&self, value: T) {
        self.reports.lock().push(value);
    }
}

/// Keeps the last reported value and notifies subscribers when it changes.
///
/// Before anything is reported, [`Container::current`] returns `T::default()`.
/// Cloning a `Container` creates a new handle to the same value.
#[derive(Debug, Clone, Default)]
pub struct Container<T: Clone + PartialEq> {
    value: Value<T>,
}

impl<T: Clone + PartialEq + Default> Container<T> {
    pub fn new() -> Self {
        Self {
            value: Value::new(T::default()),
        }
    }
}

impl<T: Clone + PartialEq> Container<T> {
    pub fn current(&self) -> T {
        self.value.get()
    }

    /// The callback is invoked synchronously, on the reporting thread, with the new value.
    pub fn subscribe<F>(&self, callback: F) -> ListenerKey
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.value.on_change(callback)
    }

    pub fn unsubscribe(&self, key: ListenerKey) -> bool {
        self.value.remove_listener(key)
    }
}

impl<T: Clone + PartialEq> Sink<T> for Container<T> {
    fn report(&self, value: T) {
        self.value.set(value);
    }
}
