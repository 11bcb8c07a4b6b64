use std::cmp::{Ordering, Reverse};
use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::error::{Error, Result};
use crate::models::{Task, WeekendDay};
use crate::service::TaskService;
use crate::storage::TaskStore;
use crate::weekend::{weekend_containing, Weekend};

pub const DEFAULT_LIMIT: usize = 100;
pub const MAX_LIMIT: usize = 1000;

/// Listing order: open before done, then `display_order`, then `due_date`,
/// then newest `created_at` first. The id settles whatever is left, so the
/// order is total.
pub fn listing_cmp(a: &Task, b: &Task) -> Ordering {
    let key = |t: &Task| (t.is_done, t.display_order, t.due_date, Reverse(t.created_at), t.id);
    key(a).cmp(&key(b))
}

pub fn sort_for_listing(tasks: &mut [Task]) {
    tasks.sort_by(listing_cmp);
}

/// Filters for [`TaskService::list_tasks`]. Date bounds are inclusive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub is_done: Option<bool>,
    /// Defaults to [`DEFAULT_LIMIT`]; must be within `1..=MAX_LIMIT`.
    pub limit: Option<usize>,
    pub offset: usize,
}

#[derive(Serialize, Debug, Clone)]
pub struct Page {
    pub tasks: Vec<Task>,
    pub total: usize,
    pub limit: usize,
    pub offset: usize,
    pub has_more: bool,
}

/// Applies `query` to `tasks` and returns the requested page in listing order.
pub fn query_tasks(mut tasks: Vec<Task>, query: &TaskQuery) -> Result<Page> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT);
    if !(1..=MAX_LIMIT).contains(&limit) {
        return Err(Error::validation(format!("limit must be between 1 and {MAX_LIMIT}")));
    }
    if let (Some(from), Some(to)) = (query.from, query.to) {
        if from > to {
            return Err(Error::validation(format!("from ({from}) is after to ({to})")));
        }
    }

    tasks.retain(|t| {
        query.from.map_or(true, |from| t.due_date >= from)
            && query.to.map_or(true, |to| t.due_date <= to)
            && query.is_done.map_or(true, |done| t.is_done == done)
    });
    sort_for_listing(&mut tasks);

    let total = tasks.len();
    let tasks: Vec<Task> = tasks.into_iter().skip(query.offset).take(limit).collect();
    Ok(Page {
        tasks,
        total,
        limit,
        offset: query.offset,
        has_more: query.offset.saturating_add(limit) < total,
    })
}

/// Tasks of one weekend, split by day, each day in listing order.
#[derive(Serialize, Debug, Clone)]
pub struct WeekendBoard {
    pub weekend: Weekend,
    pub friday: Vec<Task>,
    pub saturday: Vec<Task>,
    pub sunday: Vec<Task>,
    /// Monday to Thursday tasks filed under the preceding weekend.
    pub midweek: Vec<Task>,
}

impl WeekendBoard {
    fn new(weekend: Weekend) -> Self {
        WeekendBoard {
            weekend,
            friday: Vec::new(),
            saturday: Vec::new(),
            sunday: Vec::new(),
            midweek: Vec::new(),
        }
    }

    fn push(&mut self, task: Task) {
        match self.weekend.day_of(task.due_date) {
            Some(WeekendDay::Friday) => self.friday.push(task),
            Some(WeekendDay::Saturday) => self.saturday.push(task),
            Some(WeekendDay::Sunday) => self.sunday.push(task),
            None => self.midweek.push(task),
        }
    }

    pub fn day(&self, day: WeekendDay) -> &[Task] {
        match day {
            WeekendDay::Friday => &self.friday,
            WeekendDay::Saturday => &self.saturday,
            WeekendDay::Sunday => &self.sunday,
        }
    }

    pub fn len(&self) -> usize {
        self.friday.len() + self.saturday.len() + self.sunday.len() + self.midweek.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Done tasks completed on one local calendar day.
#[derive(Serialize, Debug, Clone)]
pub struct CompletedDay {
    pub date: NaiveDate,
    pub tasks: Vec<Task>,
}

impl<S: TaskStore> TaskService<S> {
    pub fn list_tasks(&self, query: &TaskQuery) -> Result<Page> {
        query_tasks(self.store().load_tasks()?, query)
    }

    /// The target weekend at `now` with its tasks.
    pub fn weekend_board(&self, now: DateTime<Utc>) -> Result<WeekendBoard> {
        self.board_for(self.target_weekend(now))
    }

    pub fn board_for(&self, weekend: Weekend) -> Result<WeekendBoard> {
        let mut tasks = self.store().load_tasks()?;
        tasks.retain(|t| weekend.contains(t.due_date));
        sort_for_listing(&mut tasks);

        let mut board = WeekendBoard::new(weekend);
        tasks.into_iter().for_each(|t| board.push(t));
        Ok(board)
    }

    /// Every task filed under its weekend, most recent weekend first.
    pub fn history(&self) -> Result<Vec<WeekendBoard>> {
        let mut tasks = self.store().load_tasks()?;
        sort_for_listing(&mut tasks);

        let mut weeks: BTreeMap<Reverse<NaiveDate>, WeekendBoard> = BTreeMap::new();
        for task in tasks {
            let weekend = weekend_containing(task.due_date);
            weeks
                .entry(Reverse(weekend.friday))
                .or_insert_with(|| WeekendBoard::new(weekend))
                .push(task);
        }
        Ok(weeks.into_values().collect())
    }

    /// Done tasks grouped by the local day they were completed, most recent
    /// day first. Within a day, latest completion first.
    pub fn completed_by_day(&self) -> Result<Vec<CompletedDay>> {
        let mut done: Vec<(DateTime<Utc>, Task)> = self
            .store()
            .load_tasks()?
            .into_iter()
            .filter(|t| t.is_done)
            .filter_map(|t| {
                let at = t.done_at?;
                Some((at, t))
            })
            .collect();
        done.sort_by(|(a_at, a), (b_at, b)| {
            b_at.cmp(a_at)
                .then(a.display_order.cmp(&b.display_order))
                .then(a.id.cmp(&b.id))
        });

        let mut days: Vec<CompletedDay> = Vec::new();
        for (at, task) in done {
            let date = at.with_timezone(&self.timezone()).date_naive();
            match days.last_mut() {
                Some(day) if day.date == date => day.tasks.push(task),
                _ => days.push(CompletedDay { date, tasks: vec![task] }),
            }
        }
        Ok(days)
    }
}
