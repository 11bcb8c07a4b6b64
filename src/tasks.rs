//! Direct mutations of existing tasks. None of them may leave two open tasks
//! on the same `(title, due_date)`.

use chrono::{DateTime, Utc};

use crate::dedup::normalize_title;
use crate::error::{Error, Result};
use crate::events::TaskEvent;
use crate::models::{Task, TaskEdit};
use crate::service::TaskService;
use crate::storage::TaskStore;

fn ensure_no_open_twin(tasks: &[Task], candidate: &Task) -> Result<()> {
    if !candidate.is_open() {
        return Ok(());
    }
    let twin = tasks.iter().find(|t| {
        t.id != candidate.id && t.is_open() && t.due_date == candidate.due_date && t.title == candidate.title
    });
    match twin {
        Some(other) => Err(Error::validation(format!(
            "task {} is already open for '{}' on {}",
            other.id, candidate.title, candidate.due_date
        ))),
        None => Ok(()),
    }
}

impl<S: TaskStore> TaskService<S> {
    pub fn get_task(&self, id: u64) -> Result<Task> {
        self.store()
            .load_tasks()?
            .into_iter()
            .find(|t| t.id == id)
            .ok_or(Error::NotFound(id))
    }

    /// Flips `is_done`. Completion stamps `done_at` with `now`, reopening
    /// clears it. Reopening is refused while another open task holds the
    /// same title and date.
    pub fn toggle_task(&self, id: u64, now: DateTime<Utc>) -> Result<Task> {
        let task = self.store().update_tasks(|tasks| {
            let idx = tasks.iter().position(|t| t.id == id).ok_or(Error::NotFound(id))?;
            let mut updated = tasks[idx].clone();
            updated.is_done = !updated.is_done;
            updated.done_at = if updated.is_done { Some(now) } else { None };
            ensure_no_open_twin(tasks, &updated)?;
            tasks[idx] = updated.clone();
            Ok(updated)
        })?;
        self.emit(TaskEvent::TaskToggled { id, is_done: task.is_done });
        Ok(task)
    }

    /// Applies `edit` to task `id`.
    pub fn edit_task(&self, id: u64, edit: TaskEdit) -> Result<Task> {
        let title = edit.title.as_deref().map(normalize_title).transpose()?;
        let task = self.store().update_tasks(|tasks| {
            let idx = tasks.iter().position(|t| t.id == id).ok_or(Error::NotFound(id))?;
            let mut updated = tasks[idx].clone();
            if let Some(title) = title {
                updated.title = title;
            }
            if let Some(due_date) = edit.due_date {
                updated.due_date = due_date;
            }
            if let Some(order) = edit.display_order {
                updated.display_order = order;
            }
            ensure_no_open_twin(tasks, &updated)?;
            tasks[idx] = updated.clone();
            Ok(updated)
        })?;
        self.emit(TaskEvent::TaskUpdated { id });
        Ok(task)
    }

    pub fn remove_task(&self, id: u64) -> Result<Task> {
        let removed = self.store().update_tasks(|tasks| {
            let idx = tasks.iter().position(|t| t.id == id).ok_or(Error::NotFound(id))?;
            Ok(tasks.remove(idx))
        })?;
        self.emit(TaskEvent::TaskRemoved {
            id,
            title: removed.title.clone(),
        });
        Ok(removed)
    }

    /// Deletes every task and returns how many there were. With `dry_run`
    /// only counts. Definitions are left alone.
    pub fn clear_tasks(&self, dry_run: bool) -> Result<usize> {
        if dry_run {
            return Ok(self.store().load_tasks()?.len());
        }
        let count = self.store().update_tasks(|tasks| {
            let count = tasks.len();
            tasks.clear();
            Ok(count)
        })?;
        self.emit(TaskEvent::TasksCleared { count });
        Ok(count)
    }
}
