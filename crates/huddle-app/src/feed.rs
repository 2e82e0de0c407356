//! Publish/subscribe channel between the store's change feed and each
//! client session's mirror.
//!
//! The visibility filter runs here, at publish time: every mutation is
//! translated per subscriber into the delta that subscriber is allowed to
//! observe, or into nothing at all.

use std::sync::{Mutex, MutexGuard, PoisonError};

use huddle_core::{Task, TaskChange, UserId};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender, error::TryRecvError};

struct Subscriber {
    viewer: Option<UserId>,
    tx: UnboundedSender<TaskChange>,
}

/// Live delta stream handed to one subscriber.
#[derive(Debug)]
pub struct ChangeStream {
    rx: UnboundedReceiver<TaskChange>,
}

impl ChangeStream {
    /// Take the next already-queued delta without waiting.
    pub fn try_next(&mut self) -> Option<TaskChange> {
        match self.rx.try_recv() {
            Ok(change) => Some(change),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    /// Wait for the next delta. Returns `None` once the feed is dropped.
    pub async fn next(&mut self) -> Option<TaskChange> {
        self.rx.recv().await
    }
}

/// Hub owning every live subscription.
#[derive(Default)]
pub struct TaskFeed {
    subscribers: Mutex<Vec<Subscriber>>,
}

impl TaskFeed {
    /// Register a subscriber with the given viewer identity.
    ///
    /// Deltas published from this point on are filtered against `viewer`.
    /// Identity changes are handled by dropping the stream and subscribing
    /// again; the hub prunes disconnected subscribers on the next publish.
    pub fn subscribe(&self, viewer: Option<UserId>) -> ChangeStream {
        let (tx, rx) = mpsc::unbounded_channel();
        self.guard().push(Subscriber { viewer, tx });
        ChangeStream { rx }
    }

    /// Publish one store mutation as per-subscriber deltas.
    ///
    /// `before`/`after` describe the record around the write: an insert has
    /// no `before`, a removal no `after`. Each subscriber receives the delta
    /// matching how its visible set changed, so a task turning private
    /// arrives as a removal for everyone but the owner.
    pub fn publish(&self, before: Option<&Task>, after: Option<&Task>) {
        self.guard().retain(|sub| {
            let viewer = sub.viewer.as_ref();
            let was = before.is_some_and(|task| task.visible_to(viewer));
            let is = after.is_some_and(|task| task.visible_to(viewer));
            let change = match (was, is, before, after) {
                (false, true, _, Some(task)) => TaskChange::Added { task: task.clone() },
                (true, true, _, Some(task)) => TaskChange::Changed { task: task.clone() },
                (true, false, Some(task), _) => TaskChange::Removed { id: task.id },
                _ => return true,
            };
            sub.tx.send(change).is_ok()
        });
    }

    /// Number of live subscriptions (for diagnostics and tests).
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.guard().len()
    }

    fn guard(&self) -> MutexGuard<'_, Vec<Subscriber>> {
        self.subscribers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
