//! Thread-safe change notification primitives for tally.
//!
//! This crate provides the small reactive vocabulary the progress engine uses to tell
//! observers that something changed, without tying them to any UI toolkit.
//!
//! # Key Features
//!
//! - Keyed listener registries that can be shared between reporting threads and observers
//! - Generational listener keys, so a stale key can never remove someone else's listener
//! - A last-value holder that only notifies when the stored value actually changes
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use tally_reactive::Value;
//!
//! let status = Value::new(String::from("idle"));
//!
//! let changes = Arc::new(AtomicUsize::new(0));
//! let changes_for_listener = changes.clone();
//! status.on_change(move |_| {
//!     changes_for_listener.fetch_add(1, Ordering::SeqCst);
//! });
//!
//! status.set(String::from("running"));
//! status.set(String::from("running"));
//!
//! assert_eq!(status.get(), "running");
//! assert_eq!(changes.load(Ordering::SeqCst), 1);
//! ```

pub mod reactive;

pub use reactive::{ListenerKey, Listeners, Value};
