use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;

use crate::events::{EventSink, TaskEvent, TracingEventSink};
use crate::weekend::{resolve_target_weekend, Weekend};

/// Entry point of the rule engine.
///
/// Owns the store, the timezone that decides which calendar day "now" is,
/// and the event sink. The operations themselves live next to their rules:
/// [`crate::dedup`], [`crate::registrar`], [`crate::generator`],
/// [`crate::tasks`] and [`crate::listing`].
pub struct TaskService<S> {
    store: S,
    timezone: Tz,
    events: Box<dyn EventSink>,
}

impl<S> TaskService<S> {
    pub fn new(store: S, timezone: Tz) -> Self {
        TaskService {
            store,
            timezone,
            events: Box::new(TracingEventSink),
        }
    }

    /// Replaces the default `tracing` sink.
    pub fn with_events(mut self, sink: impl EventSink + 'static) -> Self {
        self.events = Box::new(sink);
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// The local calendar day at `now`.
    pub fn today(&self, now: DateTime<Utc>) -> NaiveDate {
        now.with_timezone(&self.timezone).date_naive()
    }

    pub fn target_weekend(&self, now: DateTime<Utc>) -> Weekend {
        resolve_target_weekend(now, &self.timezone)
    }

    pub(crate) fn emit(&self, event: TaskEvent) {
        self.events.emit(event);
    }
}
