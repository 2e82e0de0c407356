//! Pure view derivations over an already-filtered task set.
//!
//! Everything here operates on the client's local mirror; privacy filtering
//! has already happened at publish time, so these functions deliberately see
//! only what the viewer is allowed to see.

use crate::id::UserId;
use crate::task::Task;

/// Tasks to render, newest first.
///
/// With `hide_completed` set, checked tasks are dropped. Ordering is by
/// `created_at` descending; ties keep the input order (the sort is stable).
pub fn visible_tasks<'a, I>(tasks: I, hide_completed: bool) -> Vec<&'a Task>
where
    I: IntoIterator<Item = &'a Task>,
{
    let mut out: Vec<&Task> = tasks
        .into_iter()
        .filter(|task| !(hide_completed && task.checked))
        .collect();
    out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    out
}

/// Number of unchecked tasks in the mirrored set.
///
/// Computed over the viewer's visible set only: another user's private task
/// never contributes to this count, even while unchecked.
pub fn incomplete_count<'a, I>(tasks: I) -> usize
where
    I: IntoIterator<Item = &'a Task>,
{
    tasks.into_iter().filter(|task| !task.checked).count()
}

/// Whether `viewer` owns `task`. Anonymous viewers own nothing.
#[must_use]
pub fn is_owner(task: &Task, viewer: Option<&UserId>) -> bool {
    viewer == Some(&task.owner)
}
