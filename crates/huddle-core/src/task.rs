use crate::id::{TaskId, UserId};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// A single task record, the sole persisted entity.
///
/// Only `checked` and `private` are ever mutated after creation; everything
/// else is fixed when the owner adds the task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique task identifier.
    pub id: TaskId,
    /// User-supplied task text.
    pub text: String,
    #[serde(with = "time::serde::rfc3339")]
    /// Creation timestamp in UTC, immutable.
    pub created_at: OffsetDateTime,
    /// Identity that created the task, immutable.
    pub owner: UserId,
    /// Denormalized display name of the owner at creation time.
    pub username: String,
    /// Completion flag.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub checked: bool,
    /// Privacy flag; a private task is visible only to its owner.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub private: bool,
}

impl Task {
    /// Create a fresh task owned by `owner`, stamped with the current time.
    #[must_use]
    pub fn new(text: impl Into<String>, owner: UserId, username: impl Into<String>) -> Self {
        Self {
            id: TaskId::new(),
            text: text.into(),
            created_at: OffsetDateTime::now_utc(),
            owner,
            username: username.into(),
            checked: false,
            private: false,
        }
    }

    /// Whether `viewer` may observe this task.
    ///
    /// A task is visible iff it is not private or the viewer is its owner.
    /// `None` is an anonymous viewer.
    #[must_use]
    pub fn visible_to(&self, viewer: Option<&UserId>) -> bool {
        !self.private || viewer == Some(&self.owner)
    }
}
