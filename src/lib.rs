//! Weekend checklist engine for a small hotel: which weekend a task belongs
//! to, whether a request duplicates an open task, and how recurring tasks
//! feed the weekly generation run.

pub mod commands;
pub mod config;
pub mod dedup;
pub mod error;
pub mod events;
pub mod generator;
pub mod listing;
pub mod models;
pub mod registrar;
pub mod service;
pub mod storage;
pub mod tasks;
pub mod tui;
pub mod weekend;

pub use error::{Error, Result, StoreError};
pub use events::{EventSink, RecordingEventSink, TaskEvent, TracingEventSink};
pub use generator::{GenerationReport, ItemResult, ItemStatus};
pub use listing::{Page, TaskQuery, WeekendBoard};
pub use models::{NewTask, Outcome, RecurringTaskDefinition, Task, TaskEdit, WeekendDay};
pub use registrar::{ImportSummary, Submission};
pub use service::TaskService;
pub use storage::{DefinitionStore, FileStore, TaskStore};
pub use weekend::{date_for_offset, resolve_target_weekend, Weekend};
