use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::dedup::normalize_title;
use crate::error::{Error, Result};
use crate::events::TaskEvent;
use crate::models::{NewTask, Outcome, RecurringTaskDefinition, Task, WeekendDay};
use crate::service::TaskService;
use crate::storage::{DefinitionStore, TaskStore};

/// Next `order` slot for `day`: one past the highest present, gaps and
/// hand-edited values included, or `1` for an empty day.
pub fn next_order(definitions: &[RecurringTaskDefinition], day: WeekendDay) -> u32 {
    definitions
        .iter()
        .filter(|d| d.day_offset == day)
        .map(|d| d.order)
        .max()
        .map_or(1, |max| max.saturating_add(1))
}

/// Orders definitions by day, then `order`. Stable, so equal entries keep
/// their file order.
pub fn sort_definitions(definitions: &mut [RecurringTaskDefinition]) {
    definitions.sort_by_key(|d| (d.day_offset, d.order));
}

/// Parses `fri`/`sat`/`sun` or `0`/`1`/`2`.
pub fn parse_day(raw: &str) -> Result<WeekendDay> {
    raw.parse().map_err(Error::Validation)
}

/// Result of [`TaskService::submit`].
#[derive(Debug)]
pub struct Submission {
    pub task: Task,
    pub outcome: Outcome,
    /// Set when a new recurring task was added to the weekly list.
    pub definition: Option<RecurringTaskDefinition>,
    /// Set when a new recurring task could not be added to the weekly list.
    /// The task itself was still created.
    pub warning: Option<Error>,
}

/// Result of [`TaskService::import_definitions`].
#[derive(Debug, Default)]
pub struct ImportSummary {
    /// Appended definitions, with the order they were given here.
    pub added: Vec<RecurringTaskDefinition>,
    /// Entries whose title was already on the list for that day.
    pub skipped: usize,
}

impl<S: TaskStore + DefinitionStore> TaskService<S> {
    /// Appends `title` to the weekly list for `day`.
    pub fn register_definition(&self, title: &str, day: WeekendDay) -> Result<RecurringTaskDefinition> {
        let title = normalize_title(title)?;
        let appended = self.store().append_definition(|existing| RecurringTaskDefinition {
            title: title.clone(),
            day_offset: day,
            order: next_order(existing, day),
        });
        match appended {
            Ok(def) => {
                self.emit(TaskEvent::DefinitionRegistered {
                    title: def.title.clone(),
                    day: def.day_offset,
                    order: def.order,
                });
                Ok(def)
            }
            Err(e) => {
                self.emit(TaskEvent::DefinitionAppendFailed {
                    title,
                    day,
                    error: e.to_string(),
                });
                Err(Error::DefinitionAppendFailed(e))
            }
        }
    }

    /// The weekly list ordered by day, then `order`.
    pub fn list_definitions(&self) -> Result<Vec<RecurringTaskDefinition>> {
        let mut defs = self.store().load_definitions()?;
        sort_definitions(&mut defs);
        Ok(defs)
    }

    /// Appends each incoming definition whose title is not yet on the list
    /// for its day, in the given order. Incoming `order` values only decide
    /// that sequence; stored orders continue the existing ones.
    pub fn import_definitions(&self, incoming: &[RecurringTaskDefinition]) -> Result<ImportSummary> {
        let mut sorted = incoming.to_vec();
        sort_definitions(&mut sorted);

        let mut present: HashSet<(String, WeekendDay)> = self
            .store()
            .load_definitions()?
            .into_iter()
            .map(|d| (d.title.trim().to_string(), d.day_offset))
            .collect();

        let mut summary = ImportSummary::default();
        for def in sorted {
            let title = normalize_title(&def.title)?;
            if !present.insert((title.clone(), def.day_offset)) {
                summary.skipped += 1;
                continue;
            }
            summary.added.push(self.register_definition(&title, def.day_offset)?);
        }
        Ok(summary)
    }

    /// Creates a task and, when it is new and recurring, records it in the
    /// weekly list.
    ///
    /// Registration failures never undo the task: they come back in
    /// [`Submission::warning`].
    pub fn submit(&self, request: NewTask, now: DateTime<Utc>) -> Result<Submission> {
        let (task, outcome) = self.create_if_absent(request, now)?;
        let mut submission = Submission {
            task,
            outcome,
            definition: None,
            warning: None,
        };
        if !(outcome.is_created() && submission.task.is_recurring) {
            return Ok(submission);
        }

        match WeekendDay::of_date(submission.task.due_date) {
            Some(day) => match self.register_definition(&submission.task.title, day) {
                Ok(def) => submission.definition = Some(def),
                Err(e) => submission.warning = Some(e),
            },
            None => {
                submission.warning = Some(Error::validation(format!(
                    "{} is not a Friday, Saturday or Sunday; task not added to the weekly list",
                    submission.task.due_date
                )));
            }
        }
        Ok(submission)
    }
}
