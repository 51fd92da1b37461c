//! Column layout for one day's time slots.
//!
//! Intervals are grouped into connected components of the overlap graph: an
//! interval joins a group as soon as it overlaps *any* member, so a group can
//! hold members that never overlap each other (A-B and B-C, but not A-C).
//! Every member of a group gets `total_columns = group size` and a distinct
//! column in discovery order. This does not minimise the column count.

use serde::{Deserialize, Serialize};

use crate::day::{ClockTime, DayKey};
use crate::error::ValidationError;
use crate::task::Task;

/// A slot reduced to minutes since midnight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeInterval {
    pub owner_id: String,
    pub start_minutes: u16,
    pub end_minutes: u16,
}

impl TimeInterval {
    pub fn new(owner_id: impl Into<String>, start: ClockTime, end: ClockTime) -> Self {
        Self {
            owner_id: owner_id.into(),
            start_minutes: start.minutes(),
            end_minutes: end.minutes(),
        }
    }

    /// Build from `HH:MM` strings.
    ///
    /// # Errors
    /// Returns an error if either time fails to parse. Inverted ranges are
    /// accepted.
    pub fn from_hhmm(
        owner_id: impl Into<String>,
        start: &str,
        end: &str,
    ) -> Result<Self, ValidationError> {
        Ok(Self::new(owner_id, ClockTime::parse(start)?, ClockTime::parse(end)?))
    }

    /// Overlap with exclusive endpoints: touching intervals do not overlap.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start_minutes < other.end_minutes && other.start_minutes < self.end_minutes
    }
}

/// Layout result for one interval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnAssignment {
    pub interval: TimeInterval,
    pub column: usize,
    pub total_columns: usize,
}

/// Collect the slots of non-archived tasks placed on `day`.
pub fn intervals_for_day<'a>(
    tasks: impl IntoIterator<Item = &'a Task>,
    day: DayKey,
) -> Vec<TimeInterval> {
    tasks
        .into_iter()
        .filter(|t| !t.archived)
        .flat_map(|t| {
            t.slots_on(day)
                .map(move |s| TimeInterval::new(t.id.clone(), s.start_time, s.end_time))
        })
        .collect()
}

/// Assign display columns to one day's intervals.
///
/// Output is ordered by `(start_minutes, column)`.
pub fn assign_columns(intervals: &[TimeInterval]) -> Vec<ColumnAssignment> {
    // Stable: equal starts keep input order.
    let mut order: Vec<usize> = (0..intervals.len()).collect();
    order.sort_by_key(|&i| intervals[i].start_minutes);

    // Each group is a list of positions in `order` (discovery indices).
    let mut groups: Vec<Vec<usize>> = Vec::new();
    for (discovered, &idx) in order.iter().enumerate() {
        let current = &intervals[idx];
        let touching: Vec<usize> = groups
            .iter()
            .enumerate()
            .filter(|(_, members)| {
                members
                    .iter()
                    .any(|&m| intervals[order[m]].overlaps(current))
            })
            .map(|(g, _)| g)
            .collect();

        match touching.split_first() {
            None => groups.push(vec![discovered]),
            Some((&first, rest)) => {
                // Bridging intervals merge every group they touch.
                for &g in rest.iter().rev() {
                    let absorbed = groups.remove(g);
                    groups[first].extend(absorbed);
                }
                groups[first].push(discovered);
                groups[first].sort_unstable();
            }
        }
    }

    let order = &order;
    let mut out: Vec<ColumnAssignment> = groups
        .iter()
        .flat_map(|members| {
            let total = members.len();
            members.iter().enumerate().map(move |(column, &m)| ColumnAssignment {
                interval: intervals[order[m]].clone(),
                column,
                total_columns: total,
            })
        })
        .collect();
    out.sort_by_key(|a| (a.interval.start_minutes, a.column));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn iv(id: &str, start: &str, end: &str) -> TimeInterval {
        TimeInterval::from_hhmm(id, start, end).unwrap()
    }

    fn find<'a>(out: &'a [ColumnAssignment], id: &str) -> &'a ColumnAssignment {
        out.iter().find(|a| a.interval.owner_id == id).unwrap()
    }

    #[test]
    fn overlapping_pair_and_singleton() {
        let out = assign_columns(&[
            iv("A", "09:00", "10:00"),
            iv("B", "09:30", "10:30"),
            iv("C", "11:00", "12:00"),
        ]);
        assert_eq!((find(&out, "A").column, find(&out, "A").total_columns), (0, 2));
        assert_eq!((find(&out, "B").column, find(&out, "B").total_columns), (1, 2));
        assert_eq!((find(&out, "C").column, find(&out, "C").total_columns), (0, 1));
    }

    #[test]
    fn touching_endpoints_do_not_overlap() {
        let out = assign_columns(&[iv("A", "09:00", "10:00"), iv("B", "10:00", "11:00")]);
        assert!(out.iter().all(|a| a.column == 0 && a.total_columns == 1));
    }

    #[test]
    fn chain_forms_one_group_of_full_size() {
        let out = assign_columns(&[
            iv("A", "09:00", "10:00"),
            iv("B", "09:45", "11:00"),
            iv("C", "10:30", "12:00"),
        ]);
        assert!(out.iter().all(|a| a.total_columns == 3));
        assert_eq!(find(&out, "C").column, 2);
    }

    #[test]
    fn long_interval_groups_disjoint_children() {
        // B and C never overlap each other but both overlap A.
        let out = assign_columns(&[
            iv("A", "09:00", "17:00"),
            iv("B", "10:00", "11:00"),
            iv("C", "13:00", "14:00"),
        ]);
        assert!(out.iter().all(|a| a.total_columns == 3));
        assert_eq!(find(&out, "A").column, 0);
        assert_eq!(find(&out, "B").column, 1);
        assert_eq!(find(&out, "C").column, 2);
    }

    #[test]
    fn equal_starts_keep_input_order() {
        let out = assign_columns(&[iv("X", "08:00", "09:00"), iv("Y", "08:00", "08:30")]);
        assert_eq!(find(&out, "X").column, 0);
        assert_eq!(find(&out, "Y").column, 1);
    }

    #[test]
    fn output_sorted_by_start_then_column() {
        let out = assign_columns(&[
            iv("late", "15:00", "16:00"),
            iv("early", "08:00", "09:00"),
            iv("early2", "08:00", "08:30"),
        ]);
        let ids: Vec<_> = out.iter().map(|a| a.interval.owner_id.as_str()).collect();
        assert_eq!(ids, ["early", "early2", "late"]);
    }

    #[test]
    fn empty_input() {
        assert!(assign_columns(&[]).is_empty());
    }

    #[test]
    fn intervals_for_day_skips_archived_and_other_days() {
        use crate::task::{Recurrence, TimeSlot};
        let d = DayKey::from_ymd(2024, 3, 15).unwrap();
        let slot = |date| {
            TimeSlot::new(
                date,
                ClockTime::parse("09:00").unwrap(),
                ClockTime::parse("10:00").unwrap(),
            )
        };
        let a = Task::with_id("a", "A", Recurrence::daily())
            .with_slot(slot(d))
            .with_slot(slot(d.add_days(1)));
        let mut b = Task::with_id("b", "B", Recurrence::daily()).with_slot(slot(d));
        b.archived = true;

        let ivs = intervals_for_day([&a, &b], d);
        assert_eq!(ivs.len(), 1);
        assert_eq!(ivs[0].owner_id, "a");
        assert_eq!((ivs[0].start_minutes, ivs[0].end_minutes), (540, 600));
    }
}
