//! End-to-end exercise of the shared list: three users, one store, live
//! filtered subscriptions.

use huddle_app::{AppConfig, Caller, ClientSession, MutationError, TaskService};
use huddle_core::TaskChange;
use huddle_store_mem::MemStore;

fn service() -> TaskService<MemStore> {
    TaskService::new(MemStore::in_memory(), AppConfig::default())
}

#[test]
fn shared_task_lifecycle_across_three_users() -> anyhow::Result<()> {
    let service = service();
    let alice = Caller::user("u-alice", "alice");
    let bob = Caller::user("u-bob", "bob");
    let carol = Caller::user("u-carol", "carol");

    let mut bob_session = ClientSession::connect(&service, bob.clone())?;

    // Alice adds a task; it is public and shows up for Bob.
    let task = service.add_task(&alice, "buy milk")?;
    assert_eq!(task.text, "buy milk");
    assert!(!task.checked);
    bob_session.drain();
    assert_eq!(bob_session.visible_tasks().len(), 1);
    assert!(!bob_session.is_owner(bob_session.visible_tasks()[0]));

    // Bob checks the public task off.
    let checked = service.set_checked(&bob, task.id, true)?;
    assert!(checked.checked);

    // Carol may not flip privacy on a task she does not own.
    assert!(matches!(
        service.set_private(&carol, task.id, true),
        Err(MutationError::NotAuthorized)
    ));

    // Alice may; Bob's mirror drops the task via a removal delta.
    service.set_private(&alice, task.id, true)?;
    bob_session.drain();
    assert!(bob_session.visible_tasks().is_empty());

    // Alice still sees and controls it.
    let alice_session = ClientSession::connect(&service, alice.clone())?;
    assert_eq!(alice_session.visible_tasks().len(), 1);
    service.delete_task(&alice, task.id)?;
    Ok(())
}

#[test]
fn privacy_flip_arrives_as_removal_then_addition() -> anyhow::Result<()> {
    let service = service();
    let alice = Caller::user("u-alice", "alice");
    let bob = Caller::user("u-bob", "bob");

    let task = service.add_task(&alice, "on and off")?;
    let mut bob_session = ClientSession::connect(&service, bob)?;

    service.set_private(&alice, task.id, true)?;
    service.set_private(&alice, task.id, false)?;

    assert!(matches!(
        bob_session.try_next_change(),
        Some(TaskChange::Removed { id }) if id == task.id
    ));
    assert!(matches!(
        bob_session.try_next_change(),
        Some(TaskChange::Added { .. })
    ));
    assert_eq!(bob_session.visible_tasks().len(), 1);
    Ok(())
}

#[tokio::test]
async fn async_subscriber_wakes_on_publish() -> anyhow::Result<()> {
    let service = service();
    let alice = Caller::user("u-alice", "alice");
    let mut session = ClientSession::connect(&service, Caller::Anonymous)?;

    service.add_task(&alice, "ping")?;
    let change = session.next_change().await;
    assert!(matches!(change, Some(TaskChange::Added { .. })));
    assert_eq!(session.incomplete_count(), 1);
    Ok(())
}

#[test]
fn counts_stay_scoped_to_what_each_user_can_see() -> anyhow::Result<()> {
    let service = service();
    let alice = Caller::user("u-alice", "alice");
    let bob = Caller::user("u-bob", "bob");

    service.add_task(&alice, "public, open")?;
    let secret = service.add_task(&alice, "secret, open")?;
    service.set_private(&alice, secret.id, true)?;
    let done_public = service.add_task(&alice, "public, done")?;
    service.set_checked(&alice, done_public.id, true)?;

    let bob_session = ClientSession::connect(&service, bob)?;
    assert_eq!(bob_session.incomplete_count(), 1);

    let alice_session = ClientSession::connect(&service, alice)?;
    assert_eq!(alice_session.incomplete_count(), 2);

    // Ordering: newest first for the tasks Bob can see.
    let texts: Vec<&str> = bob_session
        .visible_tasks()
        .iter()
        .map(|task| task.text.as_str())
        .collect();
    assert_eq!(texts, vec!["public, done", "public, open"]);
    Ok(())
}
