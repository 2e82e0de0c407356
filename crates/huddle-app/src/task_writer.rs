//! Validated task mutation service shared by CLI and shell surfaces.
//!
//! All task writes flow through [`TaskWriter`]; it checks authorization on
//! the trusted side and never trusts client-supplied identity claims beyond
//! the explicit [`Caller`] it is handed.

use huddle_core::{Task, TaskId};
use huddle_store_mem::{MemStore, StoreError};

use crate::error::MutationError;
use crate::identity::Caller;

/// Minimal storage abstraction required by [`TaskWriter`].
pub trait TaskStore {
    /// Insert a freshly created task.
    ///
    /// # Errors
    /// Returns a store error when persisting fails.
    fn insert(&self, task: Task) -> Result<(), StoreError>;

    /// Fetch a task by id, if present.
    ///
    /// # Errors
    /// Returns a store error when the lookup fails.
    fn get(&self, id: TaskId) -> Result<Option<Task>, StoreError>;

    /// Mutate a single task atomically and return the updated record.
    ///
    /// # Errors
    /// Returns [`StoreError::TaskNotFound`] for an unknown id.
    fn update(&self, id: TaskId, mutate: &mut dyn FnMut(&mut Task)) -> Result<Task, StoreError>;

    /// Remove a task and return the removed record.
    ///
    /// # Errors
    /// Returns [`StoreError::TaskNotFound`] for an unknown id.
    fn remove(&self, id: TaskId) -> Result<Task, StoreError>;

    /// Snapshot of every stored task.
    ///
    /// # Errors
    /// Returns a store error when listing fails.
    fn list(&self) -> Result<Vec<Task>, StoreError>;
}

impl TaskStore for MemStore {
    fn insert(&self, task: Task) -> Result<(), StoreError> {
        Self::insert(self, task)
    }

    fn get(&self, id: TaskId) -> Result<Option<Task>, StoreError> {
        Ok(Self::get(self, id))
    }

    fn update(&self, id: TaskId, mutate: &mut dyn FnMut(&mut Task)) -> Result<Task, StoreError> {
        Self::update(self, id, mutate)
    }

    fn remove(&self, id: TaskId) -> Result<Task, StoreError> {
        Self::remove(self, id)
    }

    fn list(&self) -> Result<Vec<Task>, StoreError> {
        Ok(Self::list(self))
    }
}

/// Before/after pair of a field mutation, used to drive publication.
#[derive(Debug, Clone)]
pub struct TaskUpdate {
    /// The record as it was before the write.
    pub before: Task,
    /// The record after the write.
    pub after: Task,
}

/// High-level service that validates callers and applies task writes.
pub struct TaskWriter<S> {
    store: S,
}

impl<S> TaskWriter<S> {
    /// Construct a new writer over `store`.
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Expose a reference to the underlying store (read-only operations).
    pub const fn store(&self) -> &S {
        &self.store
    }
}

impl<S: TaskStore> TaskWriter<S> {
    /// Create a task owned by the caller.
    ///
    /// # Errors
    /// [`MutationError::NotAuthorized`] for anonymous callers; store errors
    /// are passed through. Nothing is written on failure.
    pub fn add_task(&self, caller: &Caller, text: &str) -> Result<Task, MutationError> {
        let Some(user) = caller.info() else {
            return Err(MutationError::NotAuthorized);
        };
        let task = Task::new(text, user.id.clone(), user.username.clone());
        self.store.insert(task.clone())?;
        Ok(task)
    }

    /// Delete a task. A private task may only be deleted by its owner.
    ///
    /// # Errors
    /// [`MutationError::TaskNotFound`] for an unknown id,
    /// [`MutationError::NotAuthorized`] for a non-owner on a private task.
    pub fn delete_task(&self, caller: &Caller, id: TaskId) -> Result<Task, MutationError> {
        let task = self.load(id)?;
        Self::ensure_private_access(&task, caller)?;
        Ok(self.store.remove(id)?)
    }

    /// Set the completion flag. Same ownership rule as delete.
    ///
    /// # Errors
    /// See [`TaskWriter::delete_task`].
    pub fn set_checked(
        &self,
        caller: &Caller,
        id: TaskId,
        checked: bool,
    ) -> Result<TaskUpdate, MutationError> {
        let before = self.load(id)?;
        Self::ensure_private_access(&before, caller)?;
        let after = self.store.update(id, &mut |task| task.checked = checked)?;
        Ok(TaskUpdate { before, after })
    }

    /// Set the privacy flag. Only the owner may change it, regardless of the
    /// task's current privacy.
    ///
    /// # Errors
    /// [`MutationError::TaskNotFound`] for an unknown id,
    /// [`MutationError::NotAuthorized`] for any caller other than the owner.
    pub fn set_private(
        &self,
        caller: &Caller,
        id: TaskId,
        private: bool,
    ) -> Result<TaskUpdate, MutationError> {
        let before = self.load(id)?;
        if caller.user_id() != Some(&before.owner) {
            return Err(MutationError::NotAuthorized);
        }
        let after = self.store.update(id, &mut |task| task.private = private)?;
        Ok(TaskUpdate { before, after })
    }

    fn load(&self, id: TaskId) -> Result<Task, MutationError> {
        self.store.get(id)?.ok_or(MutationError::TaskNotFound(id))
    }

    fn ensure_private_access(task: &Task, caller: &Caller) -> Result<(), MutationError> {
        if task.private && caller.user_id() != Some(&task.owner) {
            return Err(MutationError::NotAuthorized);
        }
        Ok(())
    }
}
