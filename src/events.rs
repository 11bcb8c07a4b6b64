use std::sync::Mutex;

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::models::WeekendDay;

/// Structured record of something the core did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskEvent {
    TaskCreated { id: u64, title: String, due_date: NaiveDate, is_recurring: bool },
    TaskDuplicate { id: u64, title: String, due_date: NaiveDate },
    TaskToggled { id: u64, is_done: bool },
    TaskUpdated { id: u64 },
    TaskRemoved { id: u64, title: String },
    TasksCleared { count: usize },
    DefinitionRegistered { title: String, day: WeekendDay, order: u32 },
    DefinitionAppendFailed { title: String, day: WeekendDay, error: String },
    GenerationItemFailed { title: String, due_date: NaiveDate, error: String },
    GenerationFinished { friday: NaiveDate, created: usize, duplicate: usize, failed: usize, simulated: bool },
}

impl TaskEvent {
    /// Stable dotted name, e.g. `task.created`.
    pub fn name(&self) -> &'static str {
        match self {
            TaskEvent::TaskCreated { .. } => "task.created",
            TaskEvent::TaskDuplicate { .. } => "task.duplicate",
            TaskEvent::TaskToggled { .. } => "task.toggled",
            TaskEvent::TaskUpdated { .. } => "task.updated",
            TaskEvent::TaskRemoved { .. } => "task.removed",
            TaskEvent::TasksCleared { .. } => "tasks.cleared",
            TaskEvent::DefinitionRegistered { .. } => "definition.registered",
            TaskEvent::DefinitionAppendFailed { .. } => "definition.append_failed",
            TaskEvent::GenerationItemFailed { .. } => "generation.item_failed",
            TaskEvent::GenerationFinished { .. } => "generation.finished",
        }
    }
}

/// Receives the events emitted by [`crate::TaskService`].
pub trait EventSink: Send + Sync {
    fn emit(&self, event: TaskEvent);
}

/// Forwards events to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingEventSink;

impl EventSink for TracingEventSink {
    fn emit(&self, event: TaskEvent) {
        let name = event.name();
        match event {
            TaskEvent::TaskCreated { id, title, due_date, is_recurring } => {
                info!(event = name, id, %title, %due_date, is_recurring, "task created");
            }
            TaskEvent::TaskDuplicate { id, title, due_date } => {
                info!(event = name, id, %title, %due_date, "open task already exists");
            }
            TaskEvent::TaskToggled { id, is_done } => info!(event = name, id, is_done, "task toggled"),
            TaskEvent::TaskUpdated { id } => info!(event = name, id, "task updated"),
            TaskEvent::TaskRemoved { id, title } => info!(event = name, id, %title, "task removed"),
            TaskEvent::TasksCleared { count } => warn!(event = name, count, "all tasks removed"),
            TaskEvent::DefinitionRegistered { title, day, order } => {
                info!(event = name, %title, day = day.offset(), order, "recurring definition appended");
            }
            TaskEvent::DefinitionAppendFailed { title, day, error } => {
                warn!(event = name, %title, day = day.offset(), %error, "recurring definition not recorded");
            }
            TaskEvent::GenerationItemFailed { title, due_date, error } => {
                warn!(event = name, %title, %due_date, %error, "definition skipped");
            }
            TaskEvent::GenerationFinished { friday, created, duplicate, failed, simulated } => {
                info!(event = name, %friday, created, duplicate, failed, simulated, "weekly generation finished");
            }
        }
    }
}

/// Keeps events in memory, for tests and for callers that want to inspect them.
#[derive(Debug, Default)]
pub struct RecordingEventSink {
    events: Mutex<Vec<TaskEvent>>,
}

impl RecordingEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<TaskEvent> {
        self.events.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.events().iter().map(TaskEvent::name).collect()
    }
}

impl EventSink for RecordingEventSink {
    fn emit(&self, event: TaskEvent) {
        self.events.lock().unwrap_or_else(|p| p.into_inner()).push(event);
    }
}

impl<T: EventSink + ?Sized> EventSink for std::sync::Arc<T> {
    fn emit(&self, event: TaskEvent) {
        (**self).emit(event)
    }
}
