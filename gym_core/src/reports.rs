//! Read-only queries behind the history, progress and calendar views.
//!
//! Every query returns `None` when there is nothing to show, which the
//! caller presents as an informational "no data" message.

use crate::{Error, Result, WorkoutEntry};
use chrono::{Datelike, NaiveDate};
use std::collections::BTreeMap;

/// One row of the history table
#[derive(Clone, Debug, PartialEq)]
pub struct HistoryRow<'a> {
    pub entry: &'a WorkoutEntry,
    /// Set on every row whose 1RM equals the all-time maximum
    pub is_best: bool,
}

/// One point of an exercise's 1RM series
#[derive(Clone, Debug, PartialEq)]
pub struct ProgressPoint {
    pub date: NaiveDate,
    pub one_rep_max: f64,
}

/// Workout counts shown under a calendar month
#[derive(Clone, Debug, PartialEq)]
pub struct CalendarView {
    pub year: i32,
    pub month: u32,
    /// Day of month -> number of entries, across the whole history
    pub day_counts: BTreeMap<u32, usize>,
}

/// All entries in insertion order, flagging the all-time best 1RM rows
pub fn history(entries: &[WorkoutEntry]) -> Option<Vec<HistoryRow<'_>>> {
    let best = best_one_rep_max(entries)?;

    Some(
        entries
            .iter()
            .map(|entry| HistoryRow {
                entry,
                is_best: entry.one_rep_max == best,
            })
            .collect(),
    )
}

/// Highest stored 1RM across all entries
pub fn best_one_rep_max(entries: &[WorkoutEntry]) -> Option<f64> {
    entries
        .iter()
        .map(|e| e.one_rep_max)
        .reduce(f64::max)
}

/// 1RM series for `exercise`, oldest first
///
/// Entries sharing a date keep their insertion order.
pub fn progress(entries: &[WorkoutEntry], exercise: &str) -> Option<Vec<ProgressPoint>> {
    let mut points: Vec<ProgressPoint> = entries
        .iter()
        .filter(|e| e.exercise == exercise)
        .map(|e| ProgressPoint {
            date: e.date,
            one_rep_max: e.one_rep_max,
        })
        .collect();

    if points.is_empty() {
        return None;
    }

    // sort_by_key is stable
    points.sort_by_key(|p| p.date);
    Some(points)
}

/// Day-of-month workout counts to display under `year`/`month`
///
/// The counts cover every recorded date, not just the selected month: an
/// entry on 1 March and one on 1 July both count towards day 1 whatever
/// month is on screen.
pub fn calendar(entries: &[WorkoutEntry], year: i32, month: u32) -> Result<Option<CalendarView>> {
    if NaiveDate::from_ymd_opt(year, month, 1).is_none() {
        return Err(Error::InvalidInput(format!(
            "{}-{:02} is not a calendar month",
            year, month
        )));
    }

    if entries.is_empty() {
        return Ok(None);
    }

    Ok(Some(CalendarView {
        year,
        month,
        day_counts: day_of_month_counts(entries),
    }))
}

/// Count entries per day of month over the full history
pub fn day_of_month_counts(entries: &[WorkoutEntry]) -> BTreeMap<u32, usize> {
    let mut counts = BTreeMap::new();
    for entry in entries {
        *counts.entry(entry.date.day()).or_insert(0) += 1;
    }
    counts
}

/// Most recently logged entry
pub fn latest(entries: &[WorkoutEntry]) -> Option<&WorkoutEntry> {
    entries.last()
}

/// Distinct exercise names in the order they were first logged
pub fn exercises(entries: &[WorkoutEntry]) -> Vec<&str> {
    let mut names: Vec<&str> = Vec::new();
    for entry in entries {
        if !names.contains(&entry.exercise.as_str()) {
            names.push(&entry.exercise);
        }
    }
    names
}
