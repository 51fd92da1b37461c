//! Events emitted by focus timer and active-queue transitions.

use serde::{Deserialize, Serialize};

use crate::timer::{Phase, TimerSettings};

/// Every focus timer and active-queue transition produces Events.
/// The store forwards them to the UI layer; `CurrentTaskChanged` is the
/// signal used to highlight the current task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    TimerStarted {
        phase: Phase,
        seconds_left: u64,
        resumed: bool,
        at_ms: u64,
    },
    TimerStopped {
        phase: Phase,
        seconds_left: u64,
        at_ms: u64,
    },
    TimerReset {
        phase: Phase,
        seconds_left: u64,
    },
    /// A work countdown ran out. `at_ms` is the instant it reached zero,
    /// which may lie before the tick that observed it.
    WorkSessionCompleted {
        session_number: u32,
        credited_task_ids: Vec<String>,
        next_phase: Phase,
        at_ms: u64,
    },
    BreakCompleted {
        phase: Phase,
        next_work_seconds: u64,
        at_ms: u64,
    },
    SettingsChanged {
        settings: TimerSettings,
    },
    CurrentTaskChanged {
        previous: Option<String>,
        current: Option<String>,
    },
}
