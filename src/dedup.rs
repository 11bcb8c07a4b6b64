//! Creation of tasks with the one-open-task-per-(title, date) guarantee.
//!
//! Titles are trimmed of surrounding whitespace and then compared exactly,
//! case included. The lookup and the insert run inside a single
//! [`TaskStore::update_tasks`] call, so concurrent callers for the same
//! pair see each other's inserts.

use chrono::{DateTime, NaiveDate, Utc};
use tracing::debug;

use crate::error::{Error, Result};
use crate::events::TaskEvent;
use crate::models::{NewTask, Outcome, Task};
use crate::service::TaskService;
use crate::storage::TaskStore;

pub const MAX_TITLE_LEN: usize = 500;

/// Trims `raw` and checks it is a usable title.
pub fn normalize_title(raw: &str) -> Result<String> {
    let title = raw.trim();
    if title.is_empty() {
        return Err(Error::validation("title cannot be empty"));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(Error::validation(format!("title cannot exceed {MAX_TITLE_LEN} characters")));
    }
    Ok(title.to_string())
}

/// Parses a `YYYY-MM-DD` date.
pub fn parse_due_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|e| Error::validation(format!("invalid date '{}': {e}. Use YYYY-MM-DD.", raw.trim())))
}

/// The open task holding `(title, due_date)`, if any.
pub fn find_open<'a>(tasks: &'a [Task], title: &str, due_date: NaiveDate) -> Option<&'a Task> {
    tasks
        .iter()
        .find(|t| t.is_open() && t.due_date == due_date && t.title == title)
}

/// One past the highest `display_order` on `due_date`, done tasks included.
/// Stays at `i64::MAX` once a day reaches it.
pub fn next_display_order(tasks: &[Task], due_date: NaiveDate) -> i64 {
    tasks
        .iter()
        .filter(|t| t.due_date == due_date)
        .map(|t| t.display_order)
        .max()
        .map_or(1, |max| max.saturating_add(1))
}

pub(crate) fn next_id(tasks: &[Task]) -> Result<u64> {
    tasks
        .iter()
        .map(|t| t.id)
        .max()
        .unwrap_or(0)
        .checked_add(1)
        .ok_or_else(|| Error::validation("no task id left above the highest stored one"))
}

impl<S: TaskStore> TaskService<S> {
    /// Due date used when a request carries none: today if today is part of
    /// the target weekend, its Friday otherwise.
    pub fn default_due_date(&self, now: DateTime<Utc>) -> NaiveDate {
        let today = self.today(now);
        let weekend = self.target_weekend(now);
        if weekend.contains(today) {
            today
        } else {
            weekend.friday
        }
    }

    /// Returns the open task for `(title, due_date)` or inserts a new one.
    ///
    /// A duplicate is returned untouched. Done tasks never match, so a
    /// completed task does not block a new one for the same pair.
    pub fn create_if_absent(&self, request: NewTask, now: DateTime<Utc>) -> Result<(Task, Outcome)> {
        let title = normalize_title(&request.title)?;
        let due_date = request.due_date.unwrap_or_else(|| self.default_due_date(now));
        debug!(%title, %due_date, is_recurring = request.is_recurring, "create_if_absent");

        let (task, outcome) = self.store().update_tasks(|tasks| {
            if let Some(existing) = find_open(tasks, &title, due_date) {
                return Ok((existing.clone(), Outcome::Duplicate));
            }
            let task = Task {
                id: next_id(tasks)?,
                title: title.clone(),
                due_date,
                is_done: false,
                done_at: None,
                created_at: now,
                is_recurring: request.is_recurring,
                display_order: request
                    .display_order
                    .unwrap_or_else(|| next_display_order(tasks, due_date)),
            };
            tasks.push(task.clone());
            Ok((task, Outcome::Created))
        })?;

        self.emit(match outcome {
            Outcome::Created => TaskEvent::TaskCreated {
                id: task.id,
                title: task.title.clone(),
                due_date: task.due_date,
                is_recurring: task.is_recurring,
            },
            Outcome::Duplicate => TaskEvent::TaskDuplicate {
                id: task.id,
                title: task.title.clone(),
                due_date: task.due_date,
            },
        });
        Ok((task, outcome))
    }

    /// Read-only counterpart of the dedup lookup.
    pub fn find_open_task(&self, title: &str, due_date: NaiveDate) -> Result<Option<Task>> {
        let title = normalize_title(title)?;
        let tasks = self.store().load_tasks()?;
        Ok(find_open(&tasks, &title, due_date).cloned())
    }
}
