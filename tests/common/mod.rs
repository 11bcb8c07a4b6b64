#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use hoteltask::{FileStore, RecordingEventSink, TaskService};
use tempfile::TempDir;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
}

/// Wednesday 2025-01-08, noon UTC. Target weekend: 2025-01-10..12.
pub fn wednesday() -> DateTime<Utc> {
    at(2025, 1, 8, 12, 0)
}

pub struct Fixture {
    pub dir: TempDir,
    pub events: Arc<RecordingEventSink>,
    pub svc: TaskService<FileStore>,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_timezone(chrono_tz::UTC)
    }

    pub fn with_timezone(tz: chrono_tz::Tz) -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let events = Arc::new(RecordingEventSink::new());
        let store = FileStore::open(dir.path()).expect("open store");
        let svc = TaskService::new(store, tz).with_events(events.clone());
        Fixture { dir, events, svc }
    }

    /// A second service over the same files, as after a restart.
    pub fn reopen(&self) -> TaskService<FileStore> {
        TaskService::new(FileStore::open(self.dir.path()).expect("reopen"), chrono_tz::UTC)
    }
}
