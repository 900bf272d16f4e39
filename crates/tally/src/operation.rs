use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use crate::completable::Completable;
use crate::error::ProgressError;
use crate::manager::{ManagerShared, OperationKey};

/// Point-in-time view of an [`Operation`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OperationSnapshot {
    pub weight: f64,
    pub progress: f64,
    pub is_completed: bool,
}

/// A unit of work registered with an [`crate::OperationManager`].
///
/// Progress is reported as a fraction, `0.0` to `1.0`. Once completed, through
/// [`Operation::complete`] or a [`crate::CompletionGuard`], further reports are rejected.
pub struct Operation {
    shared: Arc<ManagerShared>,
    key: OperationKey,
    weight: f64,
}

impl Operation {
    pub(crate) fn new(shared: Arc<ManagerShared>, key: OperationKey, weight: f64) -> Self {
        Self {
            shared,
            key,
            weight,
        }
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn progress(&self) -> f64 {
        self.snapshot().progress
    }

    pub fn is_completed(&self) -> bool {
        self.snapshot().is_completed
    }

    /// An operation that was cleared from its manager reads as completed, at full progress.
    pub fn snapshot(&self) -> OperationSnapshot {
        self.shared
            .operation_snapshot(self.key, self.weight)
    }

    /// Fails with [`ProgressError::OutOfRange`] for anything outside of `0.0..=1.0`, NaN included,
    /// and with [`ProgressError::Completed`] once the operation has completed.
    pub fn report(&self, progress: f64) -> Result<(), ProgressError> {
        if !(0.0..=1.0).contains(&progress) {
            return Err(ProgressError::OutOfRange(progress));
        }

        self.shared.report(self.key, progress)
    }

    /// Marks the operation as completed, its progress becomes `1.0`.
    pub fn complete(&self) -> Result<(), ProgressError> {
        self.shared.complete(self.key)
    }
}

impl Completable for Operation {
    fn report_completion(&self) -> Result<(), ProgressError> {
        self.complete()
    }
}

impl Debug for Operation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Operation")
            .field("key", &self.key)
            .field("weight", &self.weight)
            .finish()
    }
}
