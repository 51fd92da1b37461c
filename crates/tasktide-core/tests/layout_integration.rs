//! Integration tests for calendar column layout.

use proptest::prelude::*;
use tasktide_core::{assign_columns, ColumnAssignment, TimeInterval};

fn find<'a>(out: &'a [ColumnAssignment], owner: &str) -> &'a ColumnAssignment {
    out.iter().find(|a| a.interval.owner_id == owner).unwrap()
}

#[test]
fn test_overlapping_pair_and_singleton() {
    let input = vec![
        TimeInterval::from_hhmm("A", "09:00", "10:00").unwrap(),
        TimeInterval::from_hhmm("B", "09:30", "10:30").unwrap(),
        TimeInterval::from_hhmm("C", "11:00", "12:00").unwrap(),
    ];
    let out = assign_columns(&input);

    assert_eq!((find(&out, "A").column, find(&out, "A").total_columns), (0, 2));
    assert_eq!((find(&out, "B").column, find(&out, "B").total_columns), (1, 2));
    assert_eq!((find(&out, "C").column, find(&out, "C").total_columns), (0, 1));
}

#[test]
fn test_transitive_chain_shares_one_group() {
    // A overlaps B, B overlaps C, A and C are disjoint.
    let input = vec![
        TimeInterval::from_hhmm("C", "10:30", "11:30").unwrap(),
        TimeInterval::from_hhmm("A", "09:00", "10:00").unwrap(),
        TimeInterval::from_hhmm("B", "09:45", "10:45").unwrap(),
    ];
    let out = assign_columns(&input);
    assert!(out.iter().all(|a| a.total_columns == 3));
    let columns: Vec<usize> = ["A", "B", "C"].iter().map(|o| find(&out, o).column).collect();
    assert_eq!(columns, vec![0, 1, 2]);
}

#[test]
fn test_back_to_back_blocks_stay_separate() {
    let input = vec![
        TimeInterval::from_hhmm("A", "09:00", "10:00").unwrap(),
        TimeInterval::from_hhmm("B", "10:00", "11:00").unwrap(),
        TimeInterval::from_hhmm("C", "11:00", "24:00").unwrap(),
    ];
    let out = assign_columns(&input);
    assert!(out.iter().all(|a| a.column == 0 && a.total_columns == 1));
}

fn any_interval() -> impl Strategy<Value = (u16, u16)> {
    (0u16..1440, 1u16..240).prop_map(|(start, len)| (start, (start + len).min(1440)))
}

proptest! {
    #[test]
    fn prop_overlapping_intervals_share_group_and_differ_in_column(
        raw in proptest::collection::vec(any_interval(), 0..12)
    ) {
        let input: Vec<TimeInterval> = raw
            .iter()
            .enumerate()
            .map(|(i, &(start, end))| TimeInterval {
                owner_id: format!("t{i}"),
                start_minutes: start,
                end_minutes: end,
            })
            .collect();
        let out = assign_columns(&input);
        prop_assert_eq!(out.len(), input.len());

        for a in &out {
            prop_assert!(a.column < a.total_columns);
        }
        for (i, a) in out.iter().enumerate() {
            for b in &out[i + 1..] {
                if a.interval.overlaps(&b.interval) {
                    prop_assert_eq!(a.total_columns, b.total_columns);
                    prop_assert_ne!(a.column, b.column);
                }
            }
        }
        for pair in out.windows(2) {
            prop_assert!(
                (pair[0].interval.start_minutes, pair[0].column)
                    <= (pair[1].interval.start_minutes, pair[1].column)
            );
        }
    }
}
