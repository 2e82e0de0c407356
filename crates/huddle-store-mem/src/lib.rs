//! Document storage for huddle tasks.
//!
//! [`MemStore`] keeps the whole collection in memory behind a read-write
//! lock and can optionally mirror it to a JSON file so CLI invocations see
//! each other's writes. Single-document mutations run a closure under the
//! write lock, which is the only atomicity the system promises.

use huddle_core::{Task, TaskId};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info};

mod error;

pub use error::StoreError;

/// In-memory task collection, optionally persisted as a JSON array.
#[derive(Debug, Default)]
pub struct MemStore {
    tasks: RwLock<BTreeMap<TaskId, Task>>,
    path: Option<PathBuf>,
}

impl MemStore {
    /// Create a purely in-memory store (used by tests and demos).
    #[must_use]
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Open a file-backed store, loading the document if it exists.
    ///
    /// A missing file is an empty collection, not an error; it is created on
    /// the first write.
    ///
    /// # Errors
    /// Returns an error when the file cannot be read or parsed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let mut tasks = BTreeMap::new();
        if path.exists() {
            let contents = fs::read_to_string(&path)?;
            let loaded: Vec<Task> = serde_json::from_str(&contents)
                .map_err(|err| StoreError::ParseError(err.to_string()))?;
            for task in loaded {
                tasks.insert(task.id, task);
            }
            debug!(count = tasks.len(), path = %path.display(), "Loaded task document");
        }
        Ok(Self {
            tasks: RwLock::new(tasks),
            path: Some(path),
        })
    }

    /// Insert a freshly created task.
    ///
    /// # Errors
    /// Returns an error when persisting the document fails.
    pub fn insert(&self, task: Task) -> Result<(), StoreError> {
        let mut tasks = self.write_guard();
        info!(id = %task.id, "Inserting task");
        tasks.insert(task.id, task);
        self.flush(&tasks)
    }

    /// Fetch a task by id, if present.
    pub fn get(&self, id: TaskId) -> Option<Task> {
        self.read_guard().get(&id).cloned()
    }

    /// Apply `mutate` to the task under the write lock and return the result.
    ///
    /// # Errors
    /// Returns [`StoreError::TaskNotFound`] when the id is unknown, or a
    /// persistence error when flushing fails.
    pub fn update<F>(&self, id: TaskId, mutate: F) -> Result<Task, StoreError>
    where
        F: FnOnce(&mut Task),
    {
        let mut tasks = self.write_guard();
        let task = tasks.get_mut(&id).ok_or(StoreError::TaskNotFound(id))?;
        mutate(task);
        let updated = task.clone();
        self.flush(&tasks)?;
        Ok(updated)
    }

    /// Remove a task and return the removed record.
    ///
    /// # Errors
    /// Returns [`StoreError::TaskNotFound`] when the id is unknown, or a
    /// persistence error when flushing fails.
    pub fn remove(&self, id: TaskId) -> Result<Task, StoreError> {
        let mut tasks = self.write_guard();
        let removed = tasks.remove(&id).ok_or(StoreError::TaskNotFound(id))?;
        info!(id = %id, "Removed task");
        self.flush(&tasks)?;
        Ok(removed)
    }

    /// Snapshot of every task, in id order (ids are time-ordered UUIDs).
    #[must_use]
    pub fn list(&self) -> Vec<Task> {
        self.read_guard().values().cloned().collect()
    }

    /// Number of stored tasks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.read_guard().len()
    }

    /// Whether the collection is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read_guard().is_empty()
    }

    fn flush(&self, tasks: &BTreeMap<TaskId, Task>) -> Result<(), StoreError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let snapshot: Vec<&Task> = tasks.values().collect();
        let body = serde_json::to_string_pretty(&snapshot)
            .map_err(|err| StoreError::SerializeError(err.to_string()))?;
        fs::write(path, body)?;
        Ok(())
    }

    fn read_guard(&self) -> RwLockReadGuard<'_, BTreeMap<TaskId, Task>> {
        self.tasks.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_guard(&self) -> RwLockWriteGuard<'_, BTreeMap<TaskId, Task>> {
        self.tasks.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use huddle_core::UserId;

    fn sample(text: &str) -> Task {
        Task::new(text, UserId::new("u-alice"), "alice")
    }

    #[test]
    fn insert_then_get_roundtrips() -> Result<(), StoreError> {
        let store = MemStore::in_memory();
        let task = sample("buy milk");
        let id = task.id;
        store.insert(task.clone())?;
        assert_eq!(store.get(id), Some(task));
        Ok(())
    }

    #[test]
    fn update_applies_closure_atomically() -> Result<(), StoreError> {
        let store = MemStore::in_memory();
        let task = sample("water plants");
        let id = task.id;
        store.insert(task)?;

        let updated = store.update(id, |task| task.checked = true)?;
        assert!(updated.checked);
        assert!(store.get(id).is_some_and(|task| task.checked));
        Ok(())
    }

    #[test]
    fn update_missing_task_is_not_found() {
        let store = MemStore::in_memory();
        let missing = TaskId::new();
        let result = store.update(missing, |task| task.checked = true);
        assert!(matches!(result, Err(StoreError::TaskNotFound(id)) if id == missing));
    }

    #[test]
    fn remove_returns_the_record() -> Result<(), StoreError> {
        let store = MemStore::in_memory();
        let task = sample("call the plumber");
        let id = task.id;
        store.insert(task.clone())?;

        assert_eq!(store.remove(id)?, task);
        assert!(store.is_empty());
        assert!(matches!(store.remove(id), Err(StoreError::TaskNotFound(_))));
        Ok(())
    }

    #[test]
    fn list_preserves_creation_order() -> Result<(), StoreError> {
        let store = MemStore::in_memory();
        let first = sample("first");
        let second = sample("second");
        store.insert(first.clone())?;
        store.insert(second.clone())?;

        let texts: Vec<String> = store.list().into_iter().map(|task| task.text).collect();
        assert_eq!(texts, vec!["first".to_owned(), "second".to_owned()]);
        Ok(())
    }
}
