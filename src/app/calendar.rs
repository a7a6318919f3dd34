// src/app/calendar.rs
//
// Date-availability index derived from the ordered session list, plus the
// month-cursor state behind the calendar popup. Pure logic only; the grid
// painting lives in ui/calendar.rs.

use std::collections::{BTreeSet, HashMap};

use chrono::{Datelike, NaiveDate};

use crate::app::pipeline::Session;

/// Monday-first header row of the month grid.
pub const WEEKDAY_HEADER: [&str; 7] = ["LUN", "MAR", "MER", "JEU", "VEN", "SAM", "DIM"];

/// Months with two or fewer remaining screening dates open on the next month.
const NEARLY_EXHAUSTED_MAX: usize = 2;

/// `date -> index of the first session on that date` plus the set of dates
/// with at least one session. Rebuilt wholesale on every feed refresh.
#[derive(Clone, Debug, Default)]
pub struct CalendarIndex {
    first_by_date: HashMap<String, usize>,
    available: BTreeSet<String>,
}

impl CalendarIndex {
    /// One pass over the ordered list; first occurrence per date wins.
    pub fn build(ordered: &[Session]) -> Self {
        let mut index = Self::default();
        for (i, s) in ordered.iter().enumerate() {
            index.first_by_date.entry(s.date.clone()).or_insert(i);
            index.available.insert(s.date.clone());
        }
        index
    }

    pub fn first_index(&self, date: &str) -> Option<usize> {
        self.first_by_date.get(date).copied()
    }

    pub fn is_available(&self, date: &str) -> bool {
        self.available.contains(date)
    }

    pub fn available_dates(&self) -> impl Iterator<Item = &str> {
        self.available.iter().map(String::as_str)
    }

    /// Exact date hit, else the first session on the nearest later date.
    /// Lexicographic comparison is sound here: dates are ISO strings and the
    /// session list is time-ordered, hence date-ordered.
    pub fn resolve_date_or_next(&self, date: &str, ordered: &[Session]) -> Option<usize> {
        if let Some(i) = self.first_index(date) {
            return Some(i);
        }
        ordered.iter().position(|s| s.date.as_str() >= date)
    }

    /// Remaining available dates in `(year, month)` counting from `from_day`.
    fn remaining_in_month(&self, year: i32, month: u32, from_day: u32) -> usize {
        self.available
            .iter()
            .filter(|d| {
                parse_iso(d).is_some_and(|(y, m, day)| y == year && m == month && day >= from_day)
            })
            .count()
    }
}

fn parse_iso(date: &str) -> Option<(i32, u32, u32)> {
    let d = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;
    Some((d.year(), d.month(), d.day()))
}

pub fn iso_date(year: i32, month: u32, day: u32) -> String {
    format!("{year:04}-{month:02}-{day:02}")
}

/// Month advance with year rollover in both directions.
pub fn shift_month(year: i32, month: u32, delta: i32) -> (i32, u32) {
    debug_assert!((1..=12).contains(&month));
    let zero = month as i32 - 1 + delta;
    let year = year + zero.div_euclid(12);
    (year, zero.rem_euclid(12) as u32 + 1)
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (ny, nm) = shift_month(year, month, 1);
    let first = NaiveDate::from_ymd_opt(year, month, 1);
    let next = NaiveDate::from_ymd_opt(ny, nm, 1);
    match (first, next) {
        (Some(a), Some(b)) => (b - a).num_days() as u32,
        _ => 30,
    }
}

/// Number of leading blank cells before the 1st in a Monday-first grid.
pub fn leading_blanks(year: i32, month: u32) -> usize {
    NaiveDate::from_ymd_opt(year, month, 1)
        .map(|d| d.weekday().num_days_from_monday() as usize)
        .unwrap_or(0)
}

/// Visible-month cursor for the calendar popup. Unset until first opened.
#[derive(Clone, Copy, Debug, Default)]
pub struct CalendarCursor {
    cursor: Option<(i32, u32)>,
}

impl CalendarCursor {
    /// Cursor for the open popup; derives the default from `today` on first
    /// open, skipping ahead one month when the current month is nearly out
    /// of screening dates.
    pub fn open(&mut self, today: NaiveDate, index: &CalendarIndex) -> (i32, u32) {
        if let Some(cur) = self.cursor {
            return cur;
        }
        let (mut year, mut month) = (today.year(), today.month());
        if index.remaining_in_month(year, month, today.day()) <= NEARLY_EXHAUSTED_MAX {
            (year, month) = shift_month(year, month, 1);
        }
        self.cursor = Some((year, month));
        (year, month)
    }

    pub fn shift(&mut self, delta: i32) {
        if let Some((y, m)) = self.cursor {
            self.cursor = Some(shift_month(y, m, delta));
        }
    }

    pub fn reset(&mut self) {
        self.cursor = None;
    }

    pub fn current(&self) -> Option<(i32, u32)> {
        self.cursor
    }
}
