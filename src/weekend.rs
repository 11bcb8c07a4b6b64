use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};
use serde::Serialize;

use crate::models::WeekendDay;

/// A Friday and the Saturday and Sunday that follow it.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Weekend {
    pub friday: NaiveDate,
    pub saturday: NaiveDate,
    pub sunday: NaiveDate,
}

impl Weekend {
    /// `friday` is trusted to be a Friday.
    pub fn starting(friday: NaiveDate) -> Self {
        Weekend {
            friday,
            saturday: date_for_offset(friday, WeekendDay::Saturday),
            sunday: date_for_offset(friday, WeekendDay::Sunday),
        }
    }

    pub fn dates(&self) -> [NaiveDate; 3] {
        [self.friday, self.saturday, self.sunday]
    }

    pub fn date_for(&self, day: WeekendDay) -> NaiveDate {
        date_for_offset(self.friday, day)
    }

    /// Which day of this weekend `date` is, if any.
    pub fn day_of(&self, date: NaiveDate) -> Option<WeekendDay> {
        WeekendDay::ALL.into_iter().find(|d| self.date_for(*d) == date)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.day_of(date).is_some()
    }
}

/// Resolves the weekend an administrator is working on at `reference`.
///
/// The weekday is taken in `tz`. Friday to Sunday resolve to the weekend in
/// progress (0 to 2 days back), Monday to Thursday to the coming one (1 to 4
/// days ahead).
pub fn resolve_target_weekend<Tz: TimeZone>(reference: DateTime<Utc>, tz: &Tz) -> Weekend {
    target_weekend_for_date(reference.with_timezone(tz).date_naive())
}

/// Same rule as [`resolve_target_weekend`] applied to a local calendar date.
pub fn target_weekend_for_date(date: NaiveDate) -> Weekend {
    // Monday = 0 ... Sunday = 6
    let weekday = i64::from(date.weekday().num_days_from_monday());
    let friday = if weekday >= 4 {
        date - Duration::days(weekday - 4)
    } else {
        date + Duration::days(4 - weekday)
    };
    Weekend::starting(friday)
}

/// Turns a definition's day offset into a concrete date.
pub fn date_for_offset(friday: NaiveDate, day: WeekendDay) -> NaiveDate {
    friday + Duration::days(i64::from(day.offset()))
}

/// The weekend whose Friday is the latest Friday on or before `date`.
///
/// Used to file any task, including mid-week ones, under a weekend.
pub fn weekend_containing(date: NaiveDate) -> Weekend {
    let since_friday = (i64::from(date.weekday().num_days_from_monday()) - 4).rem_euclid(7);
    Weekend::starting(date - Duration::days(since_friday))
}
