use crate::id::TaskId;
use crate::task::Task;
use serde::{Deserialize, Serialize};

/// Delta pushed to a subscriber when the visible task set changes.
///
/// The publish hub translates every store mutation into one of these per
/// subscriber, after applying the visibility filter. A task turning private
/// therefore arrives as [`TaskChange::Removed`] for everyone but the owner,
/// even though the record still exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum TaskChange {
    /// A task entered the subscriber's visible set.
    Added {
        /// The newly visible record.
        task: Task,
    },
    /// A visible task changed in place.
    Changed {
        /// The record after the mutation.
        task: Task,
    },
    /// A task left the subscriber's visible set.
    Removed {
        /// Identifier of the departed record.
        id: TaskId,
    },
}

impl TaskChange {
    /// Identifier of the task this delta concerns.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        match self {
            Self::Added { task } | Self::Changed { task } => task.id,
            Self::Removed { id } => *id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::UserId;

    #[test]
    fn change_reports_its_task_id() {
        let task = Task::new("buy milk", UserId::new("u-alice"), "alice");
        let id = task.id;
        assert_eq!(TaskChange::Added { task: task.clone() }.task_id(), id);
        assert_eq!(TaskChange::Changed { task }.task_id(), id);
        assert_eq!(TaskChange::Removed { id }.task_id(), id);
    }

    #[test]
    fn removed_serializes_with_tag() {
        let id = TaskId::new();
        let json = serde_json::to_string(&TaskChange::Removed { id }).expect("must serialize");
        assert!(json.contains("\"type\":\"removed\""));
    }
}
