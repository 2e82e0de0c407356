//! Domain types for the huddle shared task list.
//!
//! The model is intentionally small: one record ([`Task`]), the visibility
//! rule attached to it, the delta vocabulary pushed to subscribers
//! ([`TaskChange`]), and the pure derivations the client renders from.

/// Replication delta definitions.
pub mod change;
/// Identifier types.
pub mod id;
/// The task record and its visibility rule.
pub mod task;
/// Pure view derivations (ordering, counts, ownership).
pub mod view;

pub use change::TaskChange;
pub use id::{TaskId, UserId};
pub use task::Task;
