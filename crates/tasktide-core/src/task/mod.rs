//! Task model.
//!
//! A task carries exactly one recurrence payload, selected by its `type` tag:
//!
//! ```text
//! daily      -> done_dates                     (completion tracked per day)
//! scheduled  -> days_of_week + date_ranges     (weekday pattern OR explicit windows)
//! backlog    -> planned_dates                  (runs only on listed days)
//! ```
//!
//! Fields belonging to the other kinds cannot be populated, so readers never
//! have to decide which of several optional fields is authoritative.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::day::{ClockTime, DayKey};
use crate::error::ValidationError;

/// Closed range of days; both `start` and `end` are included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: DayKey,
    pub end: DayKey,
}

impl DateRange {
    pub fn new(start: DayKey, end: DayKey) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, day: DayKey) -> bool {
        self.start <= day && day <= self.end
    }
}

/// Recurrence kind with its payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Recurrence {
    /// Due every day; `done_dates` records the days it was ticked off.
    Daily {
        #[serde(default)]
        done_dates: BTreeSet<DayKey>,
    },
    /// Due on matching weekdays (0 = Sunday) or inside any date range.
    Scheduled {
        #[serde(default)]
        days_of_week: BTreeSet<u8>,
        #[serde(default)]
        date_ranges: Vec<DateRange>,
    },
    /// Due only on the planned days.
    Backlog {
        #[serde(default)]
        planned_dates: Vec<DayKey>,
    },
}

impl Recurrence {
    pub fn daily() -> Self {
        Recurrence::Daily {
            done_dates: BTreeSet::new(),
        }
    }

    /// Weekday pattern and optional explicit windows.
    ///
    /// # Errors
    /// Returns an error if a weekday is outside `0..=6`.
    pub fn scheduled(
        days_of_week: impl IntoIterator<Item = u8>,
        date_ranges: Vec<DateRange>,
    ) -> Result<Self, ValidationError> {
        let mut days = BTreeSet::new();
        for d in days_of_week {
            if d > 6 {
                return Err(ValidationError::InvalidWeekday(d));
            }
            days.insert(d);
        }
        Ok(Recurrence::Scheduled {
            days_of_week: days,
            date_ranges,
        })
    }

    pub fn backlog(planned_dates: Vec<DayKey>) -> Self {
        Recurrence::Backlog { planned_dates }
    }

    pub fn kind(&self) -> RecurrenceKind {
        match self {
            Recurrence::Daily { .. } => RecurrenceKind::Daily,
            Recurrence::Scheduled { .. } => RecurrenceKind::Scheduled,
            Recurrence::Backlog { .. } => RecurrenceKind::Backlog,
        }
    }
}

/// Tag-only view of [`Recurrence`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecurrenceKind {
    Daily,
    Scheduled,
    Backlog,
}

impl RecurrenceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Scheduled => "scheduled",
            Self::Backlog => "backlog",
        }
    }
}

impl fmt::Display for RecurrenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A placement of the task on a specific day's clock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub date: DayKey,
    pub start_time: ClockTime,
    pub end_time: ClockTime,
    /// Remote calendar event this slot is mirrored to, once synced.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub google_event_id: Option<String>,
}

impl TimeSlot {
    pub fn new(date: DayKey, start_time: ClockTime, end_time: ClockTime) -> Self {
        Self {
            date,
            start_time,
            end_time,
            google_event_id: None,
        }
    }
}

/// Per-task focus timer overrides.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PomodoroSetting {
    /// Replaces the global work duration while this task is current.
    #[serde(default)]
    pub work_duration_sec: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier
    pub id: String,
    /// Task title
    pub title: String,
    /// Recurrence kind and its payload
    pub recurrence: Recurrence,
    /// Clock placements, zero or more per day
    #[serde(default)]
    pub time_slots: Vec<TimeSlot>,
    /// Whether the task is completed (ignored for daily tasks)
    #[serde(default)]
    pub completed: bool,
    /// Archived tasks are hidden from day views
    #[serde(default)]
    pub archived: bool,
    /// Number of completed pomodoros
    #[serde(default)]
    pub completed_pomodoros: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pomodoro_setting: Option<PomodoroSetting>,
}

impl Task {
    /// Create a new task with a generated id.
    pub fn new(title: impl Into<String>, recurrence: Recurrence) -> Self {
        let id = format!("task-{}-{}", Utc::now().timestamp(), uuid::Uuid::new_v4());
        Self::with_id(id, title, recurrence)
    }

    pub fn with_id(id: impl Into<String>, title: impl Into<String>, recurrence: Recurrence) -> Self {
        Task {
            id: id.into(),
            title: title.into(),
            recurrence,
            time_slots: Vec::new(),
            completed: false,
            archived: false,
            completed_pomodoros: 0,
            pomodoro_setting: None,
        }
    }

    pub fn kind(&self) -> RecurrenceKind {
        self.recurrence.kind()
    }

    /// Per-task work duration override, if any.
    pub fn work_duration_override(&self) -> Option<u64> {
        self.pomodoro_setting.and_then(|s| s.work_duration_sec)
    }

    pub fn with_work_duration(mut self, secs: u64) -> Self {
        self.pomodoro_setting = Some(PomodoroSetting {
            work_duration_sec: Some(secs),
        });
        self
    }

    pub fn with_slot(mut self, slot: TimeSlot) -> Self {
        self.time_slots.push(slot);
        self
    }

    /// Slots placed on `day`.
    pub fn slots_on(&self, day: DayKey) -> impl Iterator<Item = &TimeSlot> {
        self.time_slots.iter().filter(move |s| s.date == day)
    }

    /// Record a daily completion. Returns `false` for non-daily tasks.
    pub fn mark_done_on(&mut self, day: DayKey) -> bool {
        match &mut self.recurrence {
            Recurrence::Daily { done_dates } => {
                done_dates.insert(day);
                true
            }
            _ => false,
        }
    }

    /// Add a planned day to a backlog task. Returns `false` for other kinds.
    pub fn plan_on(&mut self, day: DayKey) -> bool {
        match &mut self.recurrence {
            Recurrence::Backlog { planned_dates } => {
                if !planned_dates.contains(&day) {
                    planned_dates.push(day);
                    planned_dates.sort();
                }
                true
            }
            _ => false,
        }
    }
}
