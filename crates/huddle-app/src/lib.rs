//! Application layer for the huddle shared task list.
//!
//! This crate wires the domain model to its surfaces: the validated
//! mutation API, the publish/subscribe feed with visibility filtering, the
//! per-client session mirror, user profiles, and configuration.

pub mod config;
pub mod error;
pub mod feed;
pub mod identity;
pub mod profile;
pub mod service;
pub mod session;
pub mod task_writer;

// Re-exports for convenience
pub use config::AppConfig;
pub use error::MutationError;
pub use feed::{ChangeStream, TaskFeed};
pub use identity::{Caller, UserInfo, caller_from_env, caller_from_params_or_env};
pub use profile::{UserDirectory, UserProfile};
pub use service::{Subscription, TaskService};
pub use session::ClientSession;
pub use task_writer::{TaskStore, TaskUpdate, TaskWriter};
