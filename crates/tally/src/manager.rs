//! Registry of weighted operations with a derived aggregate.
//!
//! # Invariants
//!
//! 1. `progress` is the weighted mean of every operation held by the manager, completed ones
//!    counting as fully done.
//! 2. As soon as every held operation is completed, the set is emptied, `progress` drops to zero and
//!    `is_active` to false, in the same critical section as the completion that caused it.
//! 3. Listeners observe each recomputation, in order, before the lock is released.
//!
//! Unlike a [`crate::Muxer`], creating an operation recomputes right away: an operation is expected
//! to report, so a new one immediately pulls the aggregate towards zero.

use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use parking_lot::Mutex;
use slotmap::{SlotMap, new_key_type};
use tally_reactive::{ListenerKey, Listeners};
use tracing::{debug, trace};

use crate::aggregate::weighted_mean;
use crate::error::ProgressError;
use crate::operation::{Operation, OperationSnapshot};
use crate::sink::Sink;

new_key_type! {
    pub(crate) struct OperationKey;
}

/// Aggregate state of an [`OperationManager`], as delivered to listeners.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ManagerSnapshot {
    pub progress: f64,
    pub is_active: bool,
    pub operation_count: usize,
}

struct OperationState {
    weight: f64,
    progress: f64,
    completed: bool,
}

#[derive(Default)]
struct ManagerState {
    operations: SlotMap<OperationKey, OperationState>,
    // creation order
    order: Vec<OperationKey>,
    snapshot: ManagerSnapshot,
}

#[derive(Default)]
pub(crate) struct ManagerShared {
    state: Mutex<ManagerState>,
    listeners: Listeners<ManagerSnapshot>,
}

impl ManagerShared {
    /// Must be called with the state lock held, listeners are notified before it is released.
    fn refresh(&self, state: &mut ManagerState) {
        if state
            .operations
            .values()
            .all(|operation| operation.completed)
        {
            if !state.operations.is_empty() {
                debug!("All operations completed, clearing. operations: {}", state.operations.len());
            }
            state.operations.clear();
            state.order.clear();
            state.snapshot = ManagerSnapshot::default();
        } else {
            let operations = &state.operations;
            let progress = weighted_mean(
                state
                    .order
                    .iter()
                    .filter_map(|key| operations.get(*key))
                    .map(|operation| (operation.weight, operation.progress)),
            );
            state.snapshot = ManagerSnapshot {
                progress,
                is_active: true,
                operation_count: state.operations.len(),
            };
        }
        trace!("Refreshed manager. snapshot: {:?}", state.snapshot);

        self.listeners.notify(&state.snapshot);
    }

    pub(crate) fn report(&self, key: OperationKey, progress: f64) -> Result<(), ProgressError> {
        let mut state = self.state.lock();

        let operation = state
            .operations
            .get_mut(key)
            .filter(|operation| !operation.completed)
            .ok_or(ProgressError::Completed)?;
        operation.progress = progress;

        self.refresh(&mut state);
        Ok(())
    }

    pub(crate) fn complete(&self, key: OperationKey) -> Result<(), ProgressError> {
        let mut state = self.state.lock();

        let operation = state
            .operations
            .get_mut(key)
            .filter(|operation| !operation.completed)
            .ok_or(ProgressError::AlreadyCompleted)?;
        operation.completed = true;
        operation.progress = 1.0;
        debug!("Operation completed. weight: {}", operation.weight);

        self.refresh(&mut state);
        Ok(())
    }

    /// Pruned operations are reported as completed.
    pub(crate) fn operation_snapshot(&self, key: OperationKey, weight: f64) -> OperationSnapshot {
        let state = self.state.lock();
        match state.operations.get(key) {
            Some(operation) => OperationSnapshot {
                weight: operation.weight,
                progress: operation.progress,
                is_completed: operation.completed,
            },
            None => OperationSnapshot {
                weight,
                progress: 1.0,
                is_completed: true,
            },
        }
    }
}

/// Manages and keeps track of [`Operation`]s.
///
/// Cloning a manager creates a new handle to the same set of operations.
#[derive(Clone, Default)]
pub struct OperationManager {
    shared: Arc<ManagerShared>,
}

impl Debug for OperationManager {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperationManager")
            .field("snapshot", &self.snapshot())
            .finish()
    }
}

impl OperationManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a manager whose aggregate progress is reported to `sink`, whenever it changes.
    ///
    /// Bridges the manager back into the plain sink contract, e.g. to feed a muxer input.
    pub fn wrap<S>(sink: S) -> Self
    where
        S: Sink<f64> + Send + Sync + 'static,
    {
        let manager = Self::new();

        let last_reported = Mutex::new(0.0_f64);
        manager.subscribe(move |snapshot| {
            let mut last_reported = last_reported.lock();
            if *last_reported == snapshot.progress {
                return;
            }
            *last_reported = snapshot.progress;
            sink.report(snapshot.progress);
        });

        manager
    }

    /// Creates and registers a new operation.
    ///
    /// The weight determines how much the progress of this operation affects the aggregate,
    /// relative to the other operations. Fails with [`ProgressError::InvalidWeight`] when the
    /// weight is negative or not finite.
    pub fn create_operation(&self, weight: f64) -> Result<Operation, ProgressError> {
        if !(weight >= 0.0 && weight.is_finite()) {
            return Err(ProgressError::InvalidWeight(weight));
        }

        let mut state = self.shared.state.lock();
        let key = state.operations.insert(OperationState {
            weight,
            progress: 0.0,
            completed: false,
        });
        state.order.push(key);
        debug!("Created operation. weight: {}, operations: {}", weight, state.operations.len());

        self.shared.refresh(&mut state);

        Ok(Operation::new(self.shared.clone(), key, weight))
    }

    /// Creates `count` operations, in ascending index order, with the weight returned by
    /// `weight_fn` for each index.
    ///
    /// Nothing is created unless every weight is valid.
    pub fn create_operations<F>(&self, count: usize, weight_fn: F) -> Result<Vec<Operation>, ProgressError>
    where
        F: Fn(usize) -> f64,
    {
        let weights = (0..count)
            .map(|index| weight_fn(index))
            .collect::<Vec<_>>();

        if let Some(weight) = weights
            .iter()
            .find(|weight| !(**weight >= 0.0 && weight.is_finite()))
        {
            return Err(ProgressError::InvalidWeight(*weight));
        }

        weights
            .into_iter()
            .map(|weight| self.create_operation(weight))
            .collect()
    }

    pub fn progress(&self) -> f64 {
        self.shared.state.lock().snapshot.progress
    }

    /// Whether any operation is still running.
    pub fn is_active(&self) -> bool {
        self.shared.state.lock().snapshot.is_active
    }

    pub fn snapshot(&self) -> ManagerSnapshot {
        self.shared.state.lock().snapshot
    }

    /// The operations held by this manager, in creation order.
    ///
    /// Operations that completed while others are still running are included; the list is emptied
    /// once all of them have completed.
    pub fn operations(&self) -> Vec<OperationSnapshot> {
        let state = self.shared.state.lock();
        state
            .order
            .iter()
            .filter_map(|key| state.operations.get(*key))
            .map(|operation| OperationSnapshot {
                weight: operation.weight,
                progress: operation.progress,
                is_completed: operation.completed,
            })
            .collect()
    }

    /// Registers a callback invoked after every recomputation.
    ///
    /// The callback runs synchronously on the mutating thread while the manager is locked; it
    /// receives the new state and must not call back into this manager.
    pub fn subscribe<F>(&self, callback: F) -> ListenerKey
    where
        F: Fn(&ManagerSnapshot) + Send + Sync + 'static,
    {
        self.shared.listeners.subscribe(callback)
    }

    pub fn unsubscribe(&self, key: ListenerKey) -> bool {
        self.shared.listeners.unsubscribe(key)
    }
}
