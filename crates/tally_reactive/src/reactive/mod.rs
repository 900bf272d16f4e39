//! Core reactive components.
//!
//! - `Listeners<E>`: A registry of callbacks that are invoked with an event of type `E`
//! - `Value<T>`: A thread-safe container whose changes can be observed
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use parking_lot::Mutex;
//! use tally_reactive::Listeners;
//!
//! let listeners = Listeners::<u32>::new();
//!
//! let seen = Arc::new(Mutex::new(Vec::new()));
//! let seen_for_listener = seen.clone();
//! let key = listeners.subscribe(move |event| seen_for_listener.lock().push(*event));
//!
//! listeners.notify(&1);
//! listeners.unsubscribe(key);
//! listeners.notify(&2);
//!
//! assert_eq!(*seen.lock(), vec![1]);
//! ```

mod listeners;
mod value;

pub use listeners::{ListenerKey, Listeners};
pub use value::Value;
