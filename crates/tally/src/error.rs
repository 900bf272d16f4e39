use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum ProgressError {
    #[error("Invalid weight. weight: {0}")]
    InvalidWeight(f64),

    #[error("Progress out of range, must be between 0 and 1 (inclusive). progress: {0}")]
    OutOfRange(f64),

    #[error("Cannot report progress on an operation marked as completed.")]
    Completed,

    #[error("Completion has already been reported.")]
    AlreadyCompleted,
}
