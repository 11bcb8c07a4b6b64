//! The weekly generation run: every recurring definition becomes a task on
//! the target weekend, unless an open one already exists.

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::dedup::{find_open, normalize_title};
use crate::error::Result;
use crate::events::TaskEvent;
use crate::models::{NewTask, Outcome, RecurringTaskDefinition, WeekendDay};
use crate::service::TaskService;
use crate::storage::{DefinitionStore, TaskStore};
use crate::weekend::Weekend;

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    Created,
    Duplicate,
    Failed,
}

impl From<Outcome> for ItemStatus {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Created => ItemStatus::Created,
            Outcome::Duplicate => ItemStatus::Duplicate,
        }
    }
}

/// What happened to one definition during a run.
#[derive(Serialize, Debug, Clone)]
pub struct ItemResult {
    pub title: String,
    pub day: WeekendDay,
    pub order: u32,
    pub due_date: NaiveDate,
    pub status: ItemStatus,
    /// Task created or found. Absent for failures and simulated creations.
    pub task_id: Option<u64>,
    pub error: Option<String>,
}

#[derive(Serialize, Debug, Clone)]
pub struct GenerationReport {
    pub weekend: Weekend,
    pub simulated: bool,
    pub total: usize,
    pub created_count: usize,
    pub duplicate_count: usize,
    pub failed_count: usize,
    pub results: Vec<ItemResult>,
}

impl GenerationReport {
    fn new(weekend: Weekend, simulated: bool) -> Self {
        GenerationReport {
            weekend,
            simulated,
            total: 0,
            created_count: 0,
            duplicate_count: 0,
            failed_count: 0,
            results: Vec::new(),
        }
    }

    fn push(&mut self, item: ItemResult) {
        self.total += 1;
        match item.status {
            ItemStatus::Created => self.created_count += 1,
            ItemStatus::Duplicate => self.duplicate_count += 1,
            ItemStatus::Failed => self.failed_count += 1,
        }
        self.results.push(item);
    }

    /// `0` when nothing failed, `2` when everything failed, `1` in between.
    pub fn exit_code(&self) -> i32 {
        if self.failed_count == 0 {
            0
        } else if self.failed_count < self.total {
            1
        } else {
            2
        }
    }
}

impl<S: TaskStore + DefinitionStore> TaskService<S> {
    /// Instantiates every definition for the weekend targeted at `now`.
    ///
    /// A definition that fails is recorded in the report and the run moves
    /// on. With `simulate`, the same lookups happen but nothing is written;
    /// definitions that would create a task are reported as `Created`.
    ///
    /// Only failing to read the definition list aborts the run.
    pub fn run_weekly_generation(&self, now: DateTime<Utc>, simulate: bool) -> Result<GenerationReport> {
        let weekend = self.target_weekend(now);
        let definitions = self.list_definitions()?;
        let mut report = GenerationReport::new(weekend, simulate);

        let snapshot = if simulate { Some(self.store().load_tasks()) } else { None };
        let mut would_create: HashSet<(String, NaiveDate)> = HashSet::new();

        for def in definitions {
            let due_date = weekend.date_for(def.day_offset);
            let attempt = match &snapshot {
                None => self
                    .create_if_absent(
                        NewTask::new(def.title.clone(), due_date)
                            .recurring(true)
                            .with_display_order(i64::from(def.order)),
                        now,
                    )
                    .map(|(task, outcome)| (Some(task.id), outcome))
                    .map_err(|e| e.to_string()),
                Some(Err(e)) => Err(e.to_string()),
                Some(Ok(tasks)) => normalize_title(&def.title)
                    .map_err(|e| e.to_string())
                    .map(|title| {
                        if let Some(existing) = find_open(tasks, &title, due_date) {
                            (Some(existing.id), Outcome::Duplicate)
                        } else if would_create.insert((title, due_date)) {
                            (None, Outcome::Created)
                        } else {
                            (None, Outcome::Duplicate)
                        }
                    }),
            };
            report.push(self.item_result(def, due_date, attempt));
        }

        self.emit(TaskEvent::GenerationFinished {
            friday: weekend.friday,
            created: report.created_count,
            duplicate: report.duplicate_count,
            failed: report.failed_count,
            simulated: simulate,
        });
        Ok(report)
    }

    fn item_result(
        &self,
        def: RecurringTaskDefinition,
        due_date: NaiveDate,
        attempt: std::result::Result<(Option<u64>, Outcome), String>,
    ) -> ItemResult {
        let (status, task_id, error) = match attempt {
            Ok((task_id, outcome)) => (outcome.into(), task_id, None),
            Err(error) => {
                self.emit(TaskEvent::GenerationItemFailed {
                    title: def.title.clone(),
                    due_date,
                    error: error.clone(),
                });
                (ItemStatus::Failed, None, Some(error))
            }
        };
        ItemResult {
            title: def.title,
            day: def.day_offset,
            order: def.order,
            due_date,
            status,
            task_id,
            error,
        }
    }
}
