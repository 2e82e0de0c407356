//! File persistence tests for the JSON-backed store.

use huddle_core::{Task, UserId};
use huddle_store_mem::MemStore;
use tempfile::TempDir;

#[test]
fn reopened_store_sees_previous_writes() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("tasks.json");

    let task = Task::new("buy milk", UserId::new("u-alice"), "alice");
    let id = task.id;
    {
        let store = MemStore::open(&path)?;
        store.insert(task.clone())?;
        store.update(id, |task| task.checked = true)?;
    }

    let reopened = MemStore::open(&path)?;
    let loaded = reopened.get(id).ok_or_else(|| anyhow::anyhow!("task missing after reopen"))?;
    assert_eq!(loaded.text, "buy milk");
    assert!(loaded.checked);
    assert_eq!(loaded.owner, task.owner);
    Ok(())
}

#[test]
fn missing_file_opens_as_empty_collection() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let store = MemStore::open(dir.path().join("tasks.json"))?;
    assert!(store.is_empty());
    Ok(())
}

#[test]
fn removed_tasks_stay_removed_across_reopen() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("tasks.json");

    let keep = Task::new("keep", UserId::new("u-alice"), "alice");
    let drop = Task::new("drop", UserId::new("u-alice"), "alice");
    let dropped_id = drop.id;
    {
        let store = MemStore::open(&path)?;
        store.insert(keep.clone())?;
        store.insert(drop)?;
        store.remove(dropped_id)?;
    }

    let reopened = MemStore::open(&path)?;
    assert_eq!(reopened.len(), 1);
    assert!(reopened.get(dropped_id).is_none());
    assert!(reopened.get(keep.id).is_some());
    Ok(())
}

#[test]
fn corrupt_document_is_a_parse_error() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("tasks.json");
    std::fs::write(&path, "not json")?;
    assert!(MemStore::open(&path).is_err());
    Ok(())
}
