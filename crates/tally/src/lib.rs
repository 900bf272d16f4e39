//! Weighted aggregation of progress.
//!
//! Work is split into pieces that report progress independently, possibly from different threads.
//! This crate combines those reports into one overall figure, weighted by how much each piece
//! matters.
//!
//! # Key Features
//!
//! - [`Sink`], the minimal "report a value" contract, plus adapters to reshape reports on the way
//! - [`Muxer`], folding many weighted inputs into a single target, nestable to any depth
//! - [`AutoResetMuxer`], a muxer that starts over once every input of a wave has completed
//! - [`OperationManager`], a registry of weighted [`Operation`]s with an observable aggregate
//! - [`CompletionGuard`], reporting completion exactly once when a scope is left
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use tally::{Collector, Percentage, Sink, SinkExt};
//!
//! let collector = Arc::new(Collector::<Percentage>::new());
//! let muxer = collector.clone().into_muxer();
//!
//! let download = muxer.create_input(3.0).unwrap();
//! let unpack = muxer.create_input(1.0).unwrap();
//!
//! download.report(Percentage::from_fraction(0.5));
//! unpack.report(Percentage::FULL);
//!
//! let last = collector.reports().last().copied().unwrap();
//! assert_eq!(last.to_string(), "62.5%");
//! ```
//!
//! Operations report plain fractions and are tracked by a manager:
//!
//! ```rust
//! use tally::OperationManager;
//!
//! let manager = OperationManager::new();
//! let first = manager.create_operation(1.0).unwrap();
//! let second = manager.create_operation(1.0).unwrap();
//!
//! first.report(0.8).unwrap();
//! second.report(0.4).unwrap();
//! assert!((manager.progress() - 0.6).abs() < 1e-9);
//!
//! first.complete().unwrap();
//! second.complete().unwrap();
//! assert!(!manager.is_active());
//! ```

mod aggregate;

pub mod adapters;
pub mod auto_reset;
pub mod completable;
pub mod error;
pub mod manager;
pub mod muxer;
pub mod operation;
pub mod percentage;
pub mod sink;
pub mod terminal;

#[cfg(any(test, feature = "testing"))]
pub mod test;

pub use adapters::{
    Distinct, Filter, Map, Merge, MergeAll, Ordered, SinkExt, fraction_to_percentage, int_to_percentage, merge_all,
    percentage_to_fraction, percentage_to_int, percentage_to_value, value_to_percentage,
};
pub use auto_reset::{AutoResetInput, AutoResetMuxer};
pub use completable::{Completable, CompletableExt, CompletableSink, CompletionGuard, WithCompletion};
pub use error::ProgressError;
pub use manager::{ManagerSnapshot, OperationManager};
pub use muxer::{DEFAULT_WEIGHT, Muxer, MuxerInput};
pub use operation::{Operation, OperationSnapshot};
pub use percentage::Percentage;
pub use sink::{FnSink, Sink, sink_fn};
pub use tally_reactive::ListenerKey;
pub use terminal::{Collector, Container};
