//! Task use-case service with live-query notifications.
//!
//! # Responsibility
//! - Provide stable task CRUD and checklist-editing entry points.
//! - Push fresh per-user snapshots to registered watchers after every
//!   successful mutation.
//!
//! # Invariants
//! - Service APIs never bypass repository validation/persistence contracts.
//! - Snapshots delivered to watchers always reflect committed state.

use crate::model::task::{
    default_checklist, ChecklistItem, ChecklistStatus, Task, TaskId, TaskValidationError,
};
use crate::repo::task_repo::{RepoResult, TaskField, TaskRepository};
use crate::watch::{TaskWatchers, WatchHandle};

/// Request model for creating a task pinned to the plan.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskDraft {
    /// Short description shown on the marker.
    pub title: String,
    /// Owning user.
    pub user_id: String,
    /// Initial checklist; `None` seeds the standard site workflow.
    pub checklist: Option<Vec<ChecklistItem>>,
    /// Normalized pin position; `None` places the pin at the plan center.
    pub position: Option<(f64, f64)>,
}

impl TaskDraft {
    /// Draft with seed checklist and default position.
    pub fn new(title: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            user_id: user_id.into(),
            checklist: None,
            position: None,
        }
    }

    /// Replaces the seed checklist with a caller-provided one.
    pub fn with_checklist(mut self, checklist: Vec<ChecklistItem>) -> Self {
        self.checklist = Some(checklist);
        self
    }

    /// Pins the task at a normalized plan position.
    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.position = Some((x, y));
        self
    }
}

/// Use-case service wrapper for task CRUD and checklist editing.
pub struct TaskService<R: TaskRepository> {
    repo: R,
    watchers: TaskWatchers,
}

impl<R: TaskRepository> TaskService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            watchers: TaskWatchers::new(),
        }
    }

    /// Creates a new task from a draft.
    ///
    /// # Contract
    /// - Missing checklist defaults to [`default_checklist`].
    /// - Missing position defaults to the plan center.
    /// - Returns the created task, including its generated stable ID.
    pub fn create_task(&self, draft: &TaskDraft) -> RepoResult<Task> {
        let checklist = draft
            .checklist
            .clone()
            .unwrap_or_else(default_checklist);
        let mut task = Task::new(draft.title.clone(), checklist, draft.user_id.clone());
        if let Some((x, y)) = draft.position {
            task.x = x;
            task.y = y;
        }

        self.repo.insert_task(&task)?;
        self.emit(&task.user_id)?;
        Ok(task)
    }

    /// Gets one task by stable ID.
    pub fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>> {
        self.repo.get_task(id)
    }

    /// Applies a typed partial update to one task.
    ///
    /// Returns the merged task, or `None` when the id is unknown.
    pub fn update_task(&self, id: TaskId, fields: &[TaskField]) -> RepoResult<Option<Task>> {
        let updated = self.repo.update_task(id, fields)?;
        if let Some(task) = &updated {
            self.emit(&task.user_id)?;
        }
        Ok(updated)
    }

    /// Deletes one task. Idempotent: an unknown id returns `false`.
    pub fn remove_task(&self, id: TaskId) -> RepoResult<bool> {
        let Some(task) = self.repo.get_task(id)? else {
            return Ok(false);
        };

        let removed = self.repo.remove_task(id)?;
        if removed {
            self.emit(&task.user_id)?;
        }
        Ok(removed)
    }

    /// All tasks owned by `user_id`, in insertion order.
    pub fn list_tasks_by_user(&self, user_id: &str) -> RepoResult<Vec<Task>> {
        self.repo.list_tasks_by_user(user_id)
    }

    /// Sets the status of one checklist item.
    ///
    /// An unknown item id leaves the task unchanged and is not an error.
    pub fn set_item_status(
        &self,
        task_id: TaskId,
        item_id: &str,
        status: ChecklistStatus,
    ) -> RepoResult<Option<Task>> {
        self.edit_checklist(task_id, |task| Ok(task.set_item_status(item_id, status)))
    }

    /// Sets the text of one checklist item. Empty text is allowed.
    pub fn set_item_text(
        &self,
        task_id: TaskId,
        item_id: &str,
        text: &str,
    ) -> RepoResult<Option<Task>> {
        self.edit_checklist(task_id, |task| Ok(task.set_item_text(item_id, text)))
    }

    /// Appends a new `NotStarted` item to the checklist.
    pub fn add_item(&self, task_id: TaskId, text: &str) -> RepoResult<Option<Task>> {
        self.edit_checklist(task_id, |task| {
            task.push_item(ChecklistItem::new(text));
            Ok(true)
        })
    }

    /// Removes one checklist item.
    ///
    /// # Contract
    /// - Removing the last remaining item fails with a validation error
    ///   and leaves the stored task unchanged.
    /// - An unknown item id leaves the task unchanged and is not an error.
    pub fn remove_item(&self, task_id: TaskId, item_id: &str) -> RepoResult<Option<Task>> {
        self.edit_checklist(task_id, |task| task.remove_item(item_id))
    }

    /// Registers a live query over the tasks of `user_id`.
    ///
    /// # Contract
    /// - The callback immediately receives the current snapshot, then a
    ///   fresh snapshot after every mutation touching that user's tasks.
    /// - Delivery stops when the returned handle is unsubscribed or dropped.
    pub fn watch_user(
        &self,
        user_id: &str,
        callback: impl Fn(&[Task]) + Send + Sync + 'static,
    ) -> RepoResult<WatchHandle> {
        let handle = self.watchers.register(user_id, callback);
        let snapshot = self.repo.list_tasks_by_user(user_id)?;
        self.watchers.deliver_to(&handle, &snapshot);
        Ok(handle)
    }

    /// Loads, edits and re-persists one task's checklist.
    ///
    /// Edits reporting `false` (nothing matched) skip the write and return
    /// the stored task as-is. Persisting goes through `update_task` so
    /// watchers observe the change.
    fn edit_checklist(
        &self,
        task_id: TaskId,
        edit: impl FnOnce(&mut Task) -> Result<bool, TaskValidationError>,
    ) -> RepoResult<Option<Task>> {
        let Some(mut task) = self.repo.get_task(task_id)? else {
            return Ok(None);
        };

        if !edit(&mut task)? {
            return Ok(Some(task));
        }

        self.update_task(task_id, &[TaskField::Checklist(task.checklist)])
    }

    fn emit(&self, user_id: &str) -> RepoResult<()> {
        if !self.watchers.is_watched(user_id) {
            return Ok(());
        }

        let snapshot = self.repo.list_tasks_by_user(user_id)?;
        self.watchers.notify(user_id, &snapshot);
        Ok(())
    }
}
