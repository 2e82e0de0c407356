use huddle_core::{Task, TaskId, UserId};

use crate::config::AppConfig;
use crate::error::MutationError;
use crate::feed::{ChangeStream, TaskFeed};
use crate::identity::Caller;
use crate::profile::UserDirectory;
use crate::task_writer::{TaskStore, TaskWriter};

/// Filtered snapshot plus the live delta stream for one subscriber.
#[derive(Debug)]
pub struct Subscription {
    /// Tasks visible to the subscriber at subscription time.
    pub snapshot: Vec<Task>,
    /// Deltas published after the snapshot was taken.
    ///
    /// The stream is registered before the snapshot is read, so a write
    /// racing the subscription may appear in both; applying such a delta to
    /// a mirror built from the snapshot converges to the same state.
    pub changes: ChangeStream,
}

/// Service façade that encapsulates all task-related side effects.
///
/// This is the remote-callable surface of the system: mutations validate the
/// caller, write through the store, and publish the resulting delta to every
/// live subscription. View code never touches the store directly.
pub struct TaskService<S> {
    writer: TaskWriter<S>,
    feed: TaskFeed,
    directory: UserDirectory,
    config: AppConfig,
}

impl<S> TaskService<S> {
    /// Build a service over `store` with an in-memory profile directory.
    pub fn new(store: S, config: AppConfig) -> Self
    where
        S: TaskStore,
    {
        Self::with_profiles(store, UserDirectory::in_memory(), config)
    }

    /// Build a service over `store` and an already-opened profile directory.
    pub fn with_profiles(store: S, profiles: UserDirectory, config: AppConfig) -> Self
    where
        S: TaskStore,
    {
        Self {
            writer: TaskWriter::new(store),
            feed: TaskFeed::default(),
            directory: profiles,
            config,
        }
    }

    /// Borrow the application configuration.
    pub const fn config(&self) -> &AppConfig {
        &self.config
    }
}

impl<S: TaskStore> TaskService<S> {
    /// Create a task owned by the caller and announce it.
    ///
    /// # Errors
    /// [`MutationError::NotAuthorized`] for anonymous callers.
    pub fn add_task(&self, caller: &Caller, text: &str) -> Result<Task, MutationError> {
        let task = self.writer.add_task(caller, text)?;
        self.feed.publish(None, Some(&task));
        Ok(task)
    }

    /// Delete a task and announce its removal.
    ///
    /// # Errors
    /// [`MutationError::TaskNotFound`] for an unknown id,
    /// [`MutationError::NotAuthorized`] for a non-owner on a private task.
    pub fn delete_task(&self, caller: &Caller, id: TaskId) -> Result<(), MutationError> {
        let removed = self.writer.delete_task(caller, id)?;
        self.feed.publish(Some(&removed), None);
        Ok(())
    }

    /// Set the completion flag and announce the change.
    ///
    /// # Errors
    /// See [`TaskService::delete_task`].
    pub fn set_checked(
        &self,
        caller: &Caller,
        id: TaskId,
        checked: bool,
    ) -> Result<Task, MutationError> {
        let update = self.writer.set_checked(caller, id, checked)?;
        self.feed.publish(Some(&update.before), Some(&update.after));
        Ok(update.after)
    }

    /// Set the privacy flag and announce the change.
    ///
    /// Subscribers losing sight of the task receive a removal; subscribers
    /// gaining sight receive an addition.
    ///
    /// # Errors
    /// [`MutationError::TaskNotFound`] for an unknown id,
    /// [`MutationError::NotAuthorized`] for any caller other than the owner.
    pub fn set_private(
        &self,
        caller: &Caller,
        id: TaskId,
        private: bool,
    ) -> Result<Task, MutationError> {
        let update = self.writer.set_private(caller, id, private)?;
        self.feed.publish(Some(&update.before), Some(&update.after));
        Ok(update.after)
    }

    /// Persist the caller's language preference.
    ///
    /// Silently does nothing for anonymous callers; this is the one
    /// operation specified as a no-op rather than a rejection.
    ///
    /// # Errors
    /// Returns a store error when the profile document cannot be written.
    pub fn set_user_language(&self, caller: &Caller, language: &str) -> Result<(), MutationError> {
        if let Some(user) = caller.info() {
            self.directory.set_language(&user.id, language)?;
        }
        Ok(())
    }

    /// The persisted language preference for `user`, if any.
    #[must_use]
    pub fn profile_language(&self, user: &UserId) -> Option<String> {
        self.directory.language(user)
    }

    /// Open a live subscription scoped to the caller's identity.
    ///
    /// # Errors
    /// Returns a store error when the snapshot cannot be read.
    pub fn subscribe(&self, caller: &Caller) -> Result<Subscription, MutationError> {
        let viewer = caller.user_id().cloned();
        // Register before snapshotting so no delta can fall in the gap.
        let changes = self.feed.subscribe(viewer.clone());
        let snapshot = self
            .writer
            .store()
            .list()?
            .into_iter()
            .filter(|task| task.visible_to(viewer.as_ref()))
            .collect();
        Ok(Subscription { snapshot, changes })
    }
}
