//! Read-only day views.

use serde::Serialize;
use tasktide_core::{earliest_occurrence, DayKey, Task};

use super::{open_store, parse_day, print_json, CmdResult};

#[derive(Serialize)]
struct OverdueRow<'a> {
    #[serde(flatten)]
    task: &'a Task,
    earliest: Option<DayKey>,
}

/// Tasks due on a day, with done/overdue flags.
pub fn today(date: Option<String>) -> CmdResult {
    let store = open_store()?;
    let day = parse_day(date.as_deref())?;
    print_json(&store.due_on(day))
}

pub fn overdue(date: Option<String>) -> CmdResult {
    let store = open_store()?;
    let day = parse_day(date.as_deref())?;
    let rows: Vec<OverdueRow<'_>> = store
        .overdue(day)
        .into_iter()
        .map(|task| OverdueRow {
            task,
            earliest: earliest_occurrence(task),
        })
        .collect();
    print_json(&rows)
}

/// Column layout of a day's calendar slots.
pub fn layout(date: Option<String>) -> CmdResult {
    let store = open_store()?;
    let day = parse_day(date.as_deref())?;
    print_json(&store.calendar_layout(day))
}
