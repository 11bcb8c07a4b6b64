use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};

/// Represents a single checklist item for one service day.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Task {
    /// Unique identifier for the task.
    pub id: u64,
    /// What has to be done. Stored trimmed, compared exactly.
    pub title: String,
    /// The service day the task applies to.
    pub due_date: NaiveDate,
    /// Whether the task has been completed.
    #[serde(default)]
    pub is_done: bool,
    /// Set when the task is completed, cleared when it is reopened.
    #[serde(default)]
    pub done_at: Option<DateTime<Utc>>,
    /// Timestamp when the task was created.
    pub created_at: DateTime<Utc>,
    /// Whether the task comes from (or feeds) the weekly definition list.
    #[serde(default)]
    pub is_recurring: bool,
    /// Position within its due date.
    #[serde(default)]
    pub display_order: i64,
}

impl Task {
    pub fn is_open(&self) -> bool {
        !self.is_done
    }
}

/// A request to create a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    /// Filled from the target weekend when absent.
    pub due_date: Option<NaiveDate>,
    pub is_recurring: bool,
    /// Next free slot on the due date when absent.
    pub display_order: Option<i64>,
}

impl NewTask {
    pub fn new(title: impl Into<String>, due_date: NaiveDate) -> Self {
        NewTask {
            title: title.into(),
            due_date: Some(due_date),
            is_recurring: false,
            display_order: None,
        }
    }

    pub fn undated(title: impl Into<String>) -> Self {
        NewTask {
            title: title.into(),
            due_date: None,
            is_recurring: false,
            display_order: None,
        }
    }

    pub fn recurring(mut self, is_recurring: bool) -> Self {
        self.is_recurring = is_recurring;
        self
    }

    pub fn with_display_order(mut self, order: i64) -> Self {
        self.display_order = Some(order);
        self
    }
}

/// Fields to change on an existing task. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskEdit {
    pub title: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub display_order: Option<i64>,
}

/// Whether `create_if_absent` inserted a task or found an open one.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Created,
    Duplicate,
}

impl Outcome {
    pub fn is_created(self) -> bool {
        matches!(self, Outcome::Created)
    }
}

/// One day of the Friday-Saturday-Sunday service window, stored as its
/// offset from Friday.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(try_from = "u8", into = "u8")]
pub enum WeekendDay {
    Friday,
    Saturday,
    Sunday,
}

impl WeekendDay {
    pub const ALL: [WeekendDay; 3] = [WeekendDay::Friday, WeekendDay::Saturday, WeekendDay::Sunday];

    pub fn offset(self) -> u8 {
        match self {
            WeekendDay::Friday => 0,
            WeekendDay::Saturday => 1,
            WeekendDay::Sunday => 2,
        }
    }

    pub fn from_offset(offset: u8) -> Option<Self> {
        match offset {
            0 => Some(WeekendDay::Friday),
            1 => Some(WeekendDay::Saturday),
            2 => Some(WeekendDay::Sunday),
            _ => None,
        }
    }

    /// Returns `None` for Monday through Thursday.
    pub fn of_date(date: NaiveDate) -> Option<Self> {
        match date.weekday() {
            Weekday::Fri => Some(WeekendDay::Friday),
            Weekday::Sat => Some(WeekendDay::Saturday),
            Weekday::Sun => Some(WeekendDay::Sunday),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            WeekendDay::Friday => "Friday",
            WeekendDay::Saturday => "Saturday",
            WeekendDay::Sunday => "Sunday",
        }
    }
}

impl TryFrom<u8> for WeekendDay {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        WeekendDay::from_offset(value).ok_or_else(|| format!("day_offset must be 0, 1 or 2, got {value}"))
    }
}

impl From<WeekendDay> for u8 {
    fn from(day: WeekendDay) -> u8 {
        day.offset()
    }
}

impl fmt::Display for WeekendDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for WeekendDay {
    type Err = String;

    /// Accepts `0`/`1`/`2` or a day name (`fri`, `Saturday`, ...).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        if let Ok(n) = s.parse::<u8>() {
            return WeekendDay::try_from(n);
        }
        match s.as_str() {
            "fri" | "friday" => Ok(WeekendDay::Friday),
            "sat" | "saturday" => Ok(WeekendDay::Saturday),
            "sun" | "sunday" => Ok(WeekendDay::Sunday),
            _ => Err(format!("unknown weekend day '{s}' (expected fri, sat, sun or 0-2)")),
        }
    }
}

/// Declarative template replayed by the weekly generation run.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct RecurringTaskDefinition {
    /// Title given to each generated task.
    pub title: String,
    /// Which day of the target weekend the task lands on.
    pub day_offset: WeekendDay,
    /// Position within the day; becomes the generated task's `display_order`.
    pub order: u32,
}
