//! Error types for huddle store operations.

use huddle_core::TaskId;
use thiserror::Error;

/// Errors that can occur during [`MemStore`](crate::MemStore) operations.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Task was not found in the collection.
    #[error("Task not found: {0}")]
    TaskNotFound(TaskId),

    /// Failed to parse the persisted task document.
    #[error("Failed to parse task document: {0}")]
    ParseError(String),

    /// Failed to serialize the task document.
    #[error("Failed to serialize task document: {0}")]
    SerializeError(String),

    /// I/O operation failed.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}
