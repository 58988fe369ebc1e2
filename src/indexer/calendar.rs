//! Which days of a month have logs for a contact.

use std::collections::BTreeSet;

use chrono::{Datelike, Months, NaiveDate};

use super::merger::LogCollection;
use crate::models::{ContactId, Roster};
use crate::source::LogSource;

/// Log-bearing days of one month. Rebuilt on every month or contact change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarMonthSummary {
    pub year: i32,
    /// 1-12
    pub month: u32,
    pub days: BTreeSet<u32>,
    pub latest_day: Option<u32>,
}

impl CalendarMonthSummary {
    pub fn empty(year: i32, month: u32) -> Self {
        Self { year, month, days: BTreeSet::new(), latest_day: None }
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn is_marked(&self, day: u32) -> bool {
        self.days.contains(&day)
    }
}

/// Mark every day of `year`-`month` on which `contact` has a log.
pub fn summarize<S: LogSource + ?Sized>(
    source: &S,
    roster: &Roster,
    contact: ContactId,
    year: i32,
    month: u32,
) -> CalendarMonthSummary {
    let collection = LogCollection::collect(source, roster, contact);
    let mut summary = CalendarMonthSummary::empty(year, month);

    for log in collection.iter() {
        let date = source.timestamp(log).date();
        if date.year() == year && date.month() == month {
            summary.days.insert(date.day());
            summary.latest_day = summary.latest_day.max(Some(date.day()));
        }
    }
    summary
}

/// The most recent day on which `contact` has a log
pub fn latest_log_date<S: LogSource + ?Sized>(
    source: &S,
    roster: &Roster,
    contact: ContactId,
) -> Option<NaiveDate> {
    let collection = LogCollection::collect(source, roster, contact);
    collection
        .iter()
        .map(|log| source.timestamp(log).date())
        .max_by_key(|date| (date.year(), date.month(), date.day()))
}

/// The month currently shown by the calendar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarCursor {
    pub year: i32,
    pub month: u32,
}

impl CalendarCursor {
    pub fn new(year: i32, month: u32) -> Self {
        Self { year, month: month.clamp(1, 12) }
    }

    pub fn containing(date: NaiveDate) -> Self {
        Self { year: date.year(), month: date.month() }
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    /// `day` of the shown month, if it exists
    pub fn day(&self, day: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, day)
    }

    pub fn days_in_month(&self) -> u32 {
        self.first_day()
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .map_or(31, |last| last.day())
    }

    pub fn next_month(&mut self) {
        self.shift(Months::new(1), true);
    }

    pub fn prev_month(&mut self) {
        self.shift(Months::new(1), false);
    }

    pub fn next_year(&mut self) {
        self.shift(Months::new(12), true);
    }

    pub fn prev_year(&mut self) {
        self.shift(Months::new(12), false);
    }

    fn shift(&mut self, months: Months, forward: bool) {
        let first = self.first_day();
        let moved =
            if forward { first.checked_add_months(months) } else { first.checked_sub_months(months) };
        if let Some(moved) = moved {
            *self = Self::containing(moved);
        }
    }
}
