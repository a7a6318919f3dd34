// src/app/program.rs
//
// Data contracts for the three auxiliary tabs: the dated PDF programme
// bundles, the upcoming-releases poster grid, and the archives list (past
// bundles). Selection logic is pure; fetching lives in feed.rs.

use chrono::NaiveDate;
use serde::Deserialize;

/// One printed programme issue: `[debut, fin]` validity interval + PDF file.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct ProgramBundle {
    #[serde(deserialize_with = "crate::app::feed::stringish")]
    pub numero: Option<String>,
    pub debut: Option<String>,
    pub fin: Option<String>,
    pub fichier: Option<String>,
}

impl ProgramBundle {
    fn debut_date(&self) -> Option<NaiveDate> {
        parse_date(self.debut.as_deref()?)
    }

    fn fin_date(&self) -> Option<NaiveDate> {
        parse_date(self.fin.as_deref()?)
    }

    fn contains(&self, day: NaiveDate) -> bool {
        match (self.debut_date(), self.fin_date()) {
            (Some(a), Some(b)) => a <= day && day <= b,
            _ => false,
        }
    }
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()
}

/// The issue whose interval contains `today`; overlapping intervals resolve
/// to the latest start date (first entry wins an exact start-date tie).
pub fn current_issue(bundles: &[ProgramBundle], today: NaiveDate) -> Option<usize> {
    let mut best: Option<(usize, NaiveDate)> = None;
    for (i, b) in bundles.iter().enumerate() {
        if !b.contains(today) {
            continue;
        }
        let Some(debut) = b.debut_date() else { continue };
        match best {
            Some((_, prev)) if debut <= prev => {}
            _ => best = Some((i, debut)),
        }
    }
    best.map(|(i, _)| i)
}

/// The issue with the earliest start date strictly after `today`.
pub fn next_issue(bundles: &[ProgramBundle], today: NaiveDate) -> Option<usize> {
    let mut best: Option<(usize, NaiveDate)> = None;
    for (i, b) in bundles.iter().enumerate() {
        let Some(debut) = b.debut_date() else { continue };
        if debut <= today {
            continue;
        }
        match best {
            Some((_, prev)) if debut >= prev => {}
            _ => best = Some((i, debut)),
        }
    }
    best.map(|(i, _)| i)
}

/// Past issues (ended before `today`), newest first.
pub fn archive_issues(bundles: &[ProgramBundle], today: NaiveDate) -> Vec<usize> {
    let mut past: Vec<(usize, NaiveDate)> = bundles
        .iter()
        .enumerate()
        .filter_map(|(i, b)| {
            let fin = b.fin_date()?;
            (fin < today).then_some((i, b.debut_date().unwrap_or(fin)))
        })
        .collect();
    past.sort_by(|a, b| b.1.cmp(&a.1));
    past.into_iter().map(|(i, _)| i).collect()
}

/// One "coming soon" poster card.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpcomingCard {
    pub poster: Option<String>,
    pub alt: Option<String>,
}
