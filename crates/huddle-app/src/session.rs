//! Client-local session: the mirrored task set plus ephemeral UI flags.
//!
//! A session plays the role of one connected client. It never reads the
//! store; everything it renders comes from the filtered snapshot and the
//! deltas its subscription pushes, so what it can show is exactly what the
//! visibility filter lets it see.

use std::collections::BTreeMap;

use huddle_core::{Task, TaskChange, TaskId, view};

use crate::error::MutationError;
use crate::feed::ChangeStream;
use crate::identity::Caller;
use crate::service::{Subscription, TaskService};
use crate::task_writer::TaskStore;

/// One client's live, filtered view of the shared task list.
pub struct ClientSession {
    caller: Caller,
    mirror: BTreeMap<TaskId, Task>,
    changes: ChangeStream,
    hide_completed: bool,
    language: String,
}

impl ClientSession {
    /// Connect as `caller`: subscribe, seed the mirror, and (when
    /// authenticated) synchronize the language preference.
    ///
    /// # Errors
    /// Returns a store error when the snapshot cannot be read.
    pub fn connect<S: TaskStore>(
        service: &TaskService<S>,
        caller: Caller,
    ) -> Result<Self, MutationError> {
        let Subscription { snapshot, changes } = service.subscribe(&caller)?;
        let mut session = Self {
            caller,
            mirror: snapshot.into_iter().map(|task| (task.id, task)).collect(),
            changes,
            hide_completed: false,
            language: service.config().default_language().to_owned(),
        };
        session.sync_language(service)?;
        Ok(session)
    }

    /// Switch the session to a new identity.
    ///
    /// Re-subscribes so the visibility filter is re-evaluated: the mirror is
    /// rebuilt from a fresh filtered snapshot and the old delta stream is
    /// dropped. The persisted profile language, if any, becomes the active
    /// language and is re-persisted (the profile is the source of truth on
    /// (re)authentication).
    ///
    /// # Errors
    /// Returns a store error when the snapshot cannot be read.
    pub fn login<S: TaskStore>(
        &mut self,
        service: &TaskService<S>,
        caller: Caller,
    ) -> Result<(), MutationError> {
        let Subscription { snapshot, changes } = service.subscribe(&caller)?;
        self.caller = caller;
        self.changes = changes;
        self.mirror = snapshot.into_iter().map(|task| (task.id, task)).collect();
        self.sync_language(service)?;
        Ok(())
    }

    /// Drop authentication and fall back to the anonymous view.
    ///
    /// # Errors
    /// Returns a store error when the snapshot cannot be read.
    pub fn logout<S: TaskStore>(&mut self, service: &TaskService<S>) -> Result<(), MutationError> {
        self.login(service, Caller::Anonymous)
    }

    fn sync_language<S: TaskStore>(
        &mut self,
        service: &TaskService<S>,
    ) -> Result<(), MutationError> {
        let Some(user) = self.caller.info() else {
            return Ok(());
        };
        if let Some(language) = service.profile_language(&user.id) {
            self.language = language;
        }
        service.set_user_language(&self.caller, &self.language)
    }

    /// Apply every delta already queued on the subscription.
    ///
    /// Returns the number of deltas applied.
    pub fn drain(&mut self) -> usize {
        let mut applied = 0;
        while let Some(change) = self.changes.try_next() {
            self.apply(&change);
            applied += 1;
        }
        applied
    }

    /// Apply the next already-queued delta and hand it back.
    pub fn try_next_change(&mut self) -> Option<TaskChange> {
        let change = self.changes.try_next()?;
        self.apply(&change);
        Some(change)
    }

    /// Wait for the next delta, apply it, and hand it back.
    ///
    /// Returns `None` once the service side of the feed is gone.
    pub async fn next_change(&mut self) -> Option<TaskChange> {
        let change = self.changes.next().await?;
        self.apply(&change);
        Some(change)
    }

    fn apply(&mut self, change: &TaskChange) {
        match change {
            TaskChange::Added { task } | TaskChange::Changed { task } => {
                self.mirror.insert(task.id, task.clone());
            }
            TaskChange::Removed { id } => {
                self.mirror.remove(id);
            }
        }
    }

    /// Tasks to render, honoring the hide-completed flag, newest first.
    #[must_use]
    pub fn visible_tasks(&self) -> Vec<&Task> {
        view::visible_tasks(self.mirror.values(), self.hide_completed)
    }

    /// Count of unchecked tasks in the mirrored (visible) set.
    #[must_use]
    pub fn incomplete_count(&self) -> usize {
        view::incomplete_count(self.mirror.values())
    }

    /// Whether the session's caller owns `task`.
    #[must_use]
    pub fn is_owner(&self, task: &Task) -> bool {
        view::is_owner(task, self.caller.user_id())
    }

    /// Readback of the hide-completed flag.
    #[must_use]
    pub const fn hide_completed(&self) -> bool {
        self.hide_completed
    }

    /// Toggle hiding of checked tasks. Session-local only.
    pub const fn set_hide_completed(&mut self, hide: bool) {
        self.hide_completed = hide;
    }

    /// The active UI language.
    #[must_use]
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Select a language: applied locally and persisted to the caller's
    /// profile (a no-op for anonymous callers).
    ///
    /// # Errors
    /// Returns a store error when the profile document cannot be written.
    pub fn set_language<S: TaskStore>(
        &mut self,
        service: &TaskService<S>,
        language: &str,
    ) -> Result<(), MutationError> {
        self.language = language.to_owned();
        service.set_user_language(&self.caller, language)
    }

    /// The identity this session runs as.
    #[must_use]
    pub const fn caller(&self) -> &Caller {
        &self.caller
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use huddle_store_mem::MemStore;

    fn service() -> TaskService<MemStore> {
        TaskService::new(MemStore::in_memory(), AppConfig::default())
    }

    fn alice() -> Caller {
        Caller::user("u-alice", "alice")
    }

    fn bob() -> Caller {
        Caller::user("u-bob", "bob")
    }

    #[test]
    fn mirror_follows_published_deltas() -> Result<(), MutationError> {
        let service = service();
        let mut session = ClientSession::connect(&service, bob())?;
        assert!(session.visible_tasks().is_empty());

        let task = service.add_task(&alice(), "buy milk")?;
        assert_eq!(session.drain(), 1);
        assert_eq!(session.visible_tasks().len(), 1);

        service.set_checked(&bob(), task.id, true)?;
        session.drain();
        assert_eq!(session.incomplete_count(), 0);

        service.delete_task(&alice(), task.id)?;
        session.drain();
        assert!(session.visible_tasks().is_empty());
        Ok(())
    }

    #[test]
    fn hide_completed_filters_locally() -> Result<(), MutationError> {
        let service = service();
        let mut session = ClientSession::connect(&service, alice())?;

        let done = service.add_task(&alice(), "done")?;
        service.add_task(&alice(), "open")?;
        service.set_checked(&alice(), done.id, true)?;
        session.drain();

        assert_eq!(session.visible_tasks().len(), 2);
        session.set_hide_completed(true);
        let texts: Vec<&str> = session
            .visible_tasks()
            .iter()
            .map(|task| task.text.as_str())
            .collect();
        assert_eq!(texts, vec!["open"]);
        assert!(session.hide_completed());
        Ok(())
    }

    #[test]
    fn incomplete_count_excludes_invisible_private_tasks() -> Result<(), MutationError> {
        let service = service();
        let secret = service.add_task(&alice(), "secret, unchecked")?;
        service.set_private(&alice(), secret.id, true)?;

        let session = ClientSession::connect(&service, bob())?;
        assert_eq!(session.incomplete_count(), 0);

        let owner_session = ClientSession::connect(&service, alice())?;
        assert_eq!(owner_session.incomplete_count(), 1);
        Ok(())
    }

    #[test]
    fn login_rebuilds_the_mirror_for_the_new_identity() -> Result<(), MutationError> {
        let service = service();
        let secret = service.add_task(&alice(), "secret")?;
        service.set_private(&alice(), secret.id, true)?;

        let mut session = ClientSession::connect(&service, Caller::Anonymous)?;
        assert!(session.visible_tasks().is_empty());

        session.login(&service, alice())?;
        assert_eq!(session.visible_tasks().len(), 1);
        assert!(session.is_owner(session.visible_tasks()[0]));

        session.logout(&service)?;
        assert!(session.visible_tasks().is_empty());
        Ok(())
    }

    #[test]
    fn login_adopts_the_persisted_language() -> Result<(), MutationError> {
        let service = service();
        service.set_user_language(&alice(), "es")?;

        let session = ClientSession::connect(&service, alice())?;
        assert_eq!(session.language(), "es");
        Ok(())
    }

    #[test]
    fn first_login_persists_the_session_language() -> Result<(), MutationError> {
        let service = service();
        let mut session = ClientSession::connect(&service, Caller::Anonymous)?;
        assert_eq!(session.language(), "en");

        // No profile yet: the active language becomes the stored preference.
        session.login(&service, bob())?;
        assert_eq!(
            service.profile_language(&huddle_core::UserId::new("u-bob")),
            Some("en".to_owned())
        );

        session.set_language(&service, "es")?;
        session.logout(&service)?;
        session.login(&service, bob())?;
        assert_eq!(session.language(), "es");
        Ok(())
    }
}
