//! Recurrence rules: is a task due on a day, is it overdue, when does it
//! first (or next) occur.
//!
//! All functions are pure over `(task, day)` and never fail. Days are
//! [`DayKey`]s, so every comparison is between exact UTC-midnight values.

use crate::day::DayKey;
use crate::task::{Recurrence, Task};

/// Whether `task` has an occurrence on `date`.
///
/// - daily: always.
/// - scheduled: the weekday matches, or `date` lies in any range. Either
///   condition is enough on its own.
/// - backlog: `date` is one of the planned dates.
pub fn is_due_on(task: &Task, date: DayKey) -> bool {
    match &task.recurrence {
        Recurrence::Daily { .. } => true,
        Recurrence::Scheduled {
            days_of_week,
            date_ranges,
        } => {
            days_of_week.contains(&date.weekday()) || date_ranges.iter().any(|r| r.contains(date))
        }
        Recurrence::Backlog { planned_dates } => planned_dates.contains(&date),
    }
}

/// Whether `task` has slipped past its last chance to run before `today`.
///
/// Completed and daily tasks are never overdue. A scheduled task is overdue
/// once any of its date ranges has ended; one without ranges recurs
/// indefinitely and never is. A backlog task is overdue when its *latest*
/// planned date is in the past.
pub fn is_overdue(task: &Task, today: DayKey) -> bool {
    if task.completed {
        return false;
    }
    match &task.recurrence {
        Recurrence::Daily { .. } => false,
        Recurrence::Scheduled { date_ranges, .. } => date_ranges.iter().any(|r| r.end < today),
        Recurrence::Backlog { planned_dates } => planned_dates
            .iter()
            .max()
            .is_some_and(|latest| *latest < today),
    }
}

/// First day the task is anchored to, if the kind has one.
pub fn earliest_occurrence(task: &Task) -> Option<DayKey> {
    match &task.recurrence {
        Recurrence::Daily { .. } => None,
        Recurrence::Scheduled { date_ranges, .. } => date_ranges.iter().map(|r| r.start).min(),
        Recurrence::Backlog { planned_dates } => planned_dates.iter().min().copied(),
    }
}

/// First day on or after `from` on which [`is_due_on`] holds.
pub fn next_occurrence(task: &Task, from: DayKey) -> Option<DayKey> {
    match &task.recurrence {
        Recurrence::Daily { .. } => Some(from),
        Recurrence::Scheduled {
            days_of_week,
            date_ranges,
        } => {
            let by_weekday = (0..7)
                .map(|offset| from.add_days(offset))
                .find(|d| days_of_week.contains(&d.weekday()));
            let by_range = date_ranges
                .iter()
                .filter(|r| r.end >= from && r.start <= r.end)
                .map(|r| r.start.max(from))
                .min();
            match (by_weekday, by_range) {
                (Some(a), Some(b)) => Some(a.min(b)),
                (a, b) => a.or(b),
            }
        }
        Recurrence::Backlog { planned_dates } => {
            planned_dates.iter().filter(|d| **d >= from).min().copied()
        }
    }
}

/// Whether the occurrence on `date` has been completed.
///
/// Daily tasks track completion per day; every other kind uses the task-wide
/// `completed` flag.
pub fn is_done_on(task: &Task, date: DayKey) -> bool {
    match &task.recurrence {
        Recurrence::Daily { done_dates } => done_dates.contains(&date),
        _ => task.completed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::DateRange;

    fn day(y: i32, m: u32, d: u32) -> DayKey {
        DayKey::from_ymd(y, m, d).unwrap()
    }

    fn scheduled(days: &[u8], ranges: Vec<DateRange>) -> Task {
        Task::with_id(
            "s",
            "Scheduled",
            Recurrence::scheduled(days.iter().copied(), ranges).unwrap(),
        )
    }

    #[test]
    fn daily_is_always_due_and_never_overdue() {
        let mut task = Task::with_id("d", "Daily", Recurrence::daily());
        assert!(is_due_on(&task, day(2024, 3, 15)));
        task.completed = false;
        assert!(!is_overdue(&task, day(2030, 1, 1)));
        assert_eq!(earliest_occurrence(&task), None);
    }

    #[test]
    fn scheduled_matches_weekday_or_range() {
        // 2024-03-18 is a Monday.
        let task = scheduled(&[1], vec![DateRange::new(day(2024, 3, 20), day(2024, 3, 22))]);
        assert!(is_due_on(&task, day(2024, 3, 18)));
        assert!(!is_due_on(&task, day(2024, 3, 19)));
        assert!(is_due_on(&task, day(2024, 3, 20)));
        assert!(is_due_on(&task, day(2024, 3, 22)));
        assert!(!is_due_on(&task, day(2024, 3, 23)));
    }

    #[test]
    fn scheduled_overdue_needs_an_ended_range() {
        let weekday_only = scheduled(&[1, 3, 5], vec![]);
        assert!(!is_overdue(&weekday_only, day(2030, 1, 1)));

        let ranged = scheduled(
            &[],
            vec![
                DateRange::new(day(2024, 3, 1), day(2024, 3, 5)),
                DateRange::new(day(2024, 4, 1), day(2024, 4, 5)),
            ],
        );
        assert!(!is_overdue(&ranged, day(2024, 3, 5)));
        assert!(is_overdue(&ranged, day(2024, 3, 6)));
    }

    #[test]
    fn backlog_overdue_uses_latest_planned_date() {
        let mut task = Task::with_id(
            "b",
            "Backlog",
            Recurrence::backlog(vec![day(2024, 3, 1), day(2024, 3, 30)]),
        );
        assert!(!is_overdue(&task, day(2024, 3, 15)));
        assert!(is_overdue(&task, day(2024, 3, 31)));
        task.completed = true;
        assert!(!is_overdue(&task, day(2024, 3, 31)));

        let empty = Task::with_id("e", "Empty", Recurrence::backlog(vec![]));
        assert!(!is_overdue(&empty, day(2024, 3, 31)));
    }

    #[test]
    fn earliest_occurrence_per_kind() {
        let s = scheduled(
            &[2],
            vec![
                DateRange::new(day(2024, 5, 1), day(2024, 5, 3)),
                DateRange::new(day(2024, 4, 1), day(2024, 4, 3)),
            ],
        );
        assert_eq!(earliest_occurrence(&s), Some(day(2024, 4, 1)));
        assert_eq!(earliest_occurrence(&scheduled(&[2], vec![])), None);

        let b = Task::with_id(
            "b",
            "Backlog",
            Recurrence::backlog(vec![day(2024, 6, 9), day(2024, 6, 2)]),
        );
        assert_eq!(earliest_occurrence(&b), Some(day(2024, 6, 2)));
    }

    #[test]
    fn next_occurrence_picks_earliest_source() {
        // From Tuesday 2024-03-19: next Friday is 03-22, range starts 03-21.
        let task = scheduled(&[5], vec![DateRange::new(day(2024, 3, 21), day(2024, 3, 25))]);
        assert_eq!(next_occurrence(&task, day(2024, 3, 19)), Some(day(2024, 3, 21)));

        // Inside an active range, today counts.
        assert_eq!(next_occurrence(&task, day(2024, 3, 24)), Some(day(2024, 3, 24)));

        let never = scheduled(&[], vec![DateRange::new(day(2024, 1, 1), day(2024, 1, 2))]);
        assert_eq!(next_occurrence(&never, day(2024, 3, 1)), None);
    }

    #[test]
    fn next_occurrence_backlog_skips_past_dates() {
        let task = Task::with_id(
            "b",
            "Backlog",
            Recurrence::backlog(vec![day(2024, 3, 1), day(2024, 3, 10)]),
        );
        assert_eq!(next_occurrence(&task, day(2024, 3, 2)), Some(day(2024, 3, 10)));
        assert_eq!(next_occurrence(&task, day(2024, 3, 11)), None);
    }

    #[test]
    fn done_tracking_differs_by_kind() {
        let mut daily = Task::with_id("d", "Daily", Recurrence::daily());
        daily.mark_done_on(day(2024, 3, 15));
        assert!(is_done_on(&daily, day(2024, 3, 15)));
        assert!(!is_done_on(&daily, day(2024, 3, 16)));

        let mut backlog = Task::with_id("b", "Backlog", Recurrence::backlog(vec![]));
        assert!(!is_done_on(&backlog, day(2024, 3, 15)));
        backlog.completed = true;
        assert!(is_done_on(&backlog, day(2024, 3, 15)));
    }
}
