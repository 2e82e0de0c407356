//! Error types raised by the mutation API.

use huddle_core::TaskId;
use huddle_store_mem::StoreError;
use thiserror::Error;

/// Failure of a mutation operation, surfaced synchronously to the caller.
///
/// Authorization failures are policy rejections, not transient faults; no
/// caller should retry them.
#[derive(Error, Debug)]
pub enum MutationError {
    /// The caller lacks permission for this mutation.
    #[error("not-authorized")]
    NotAuthorized,

    /// The referenced task does not exist.
    #[error("Task not found: {0}")]
    TaskNotFound(TaskId),

    /// The backing store failed.
    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for MutationError {
    fn from(err: StoreError) -> Self {
        // A missing record is a first-class outcome of the API, not a
        // storage fault.
        match err {
            StoreError::TaskNotFound(id) => Self::TaskNotFound(id),
            other => Self::Store(other),
        }
    }
}
