use crate::{accumulator, storage::StorageError};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthzError {
    /// The level is outside the configured hierarchy
    #[error("level {level} is out of range: the hierarchy has {count} levels")]
    LevelOutOfRange { level: u32, count: u8 },

    /// The level half of the credential does not verify
    #[error("access denied: level witness is invalid")]
    LevelWitnessInvalid,

    /// The department half of the credential does not verify
    #[error("access denied: department witness is invalid")]
    DepartmentWitnessInvalid,

    /// Enrollment failed and could not be rolled back
    #[error("partial enrollment requires reconciliation: {0}")]
    PartialEnrollment(String),

    /// Revocation failed and could not be rolled back
    #[error("partial revocation requires reconciliation: {0}")]
    PartialRevocation(String),

    /// The identifier is not enrolled in one of the accumulators
    #[error("identifier is not enrolled")]
    NotFound,

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Accumulator(#[from] accumulator::Error),

    /// A mutex lock was poisoned (another thread panicked while holding the lock)
    #[error("mutex lock poisoned")]
    MutexPoisoned,
}
