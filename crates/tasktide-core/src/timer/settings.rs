use serde::{Deserialize, Serialize};

use crate::task::Task;

/// Global focus timer durations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerSettings {
    #[serde(default = "default_work_duration")]
    pub work_duration_sec: u64,
    #[serde(default = "default_short_break")]
    pub short_break_sec: u64,
    #[serde(default = "default_long_break")]
    pub long_break_sec: u64,
    /// Every n-th completed work session is followed by a long break.
    /// Zero disables long breaks.
    #[serde(default = "default_cycles")]
    pub cycles_until_long_break: u32,
}

fn default_work_duration() -> u64 {
    25 * 60
}
fn default_short_break() -> u64 {
    5 * 60
}
fn default_long_break() -> u64 {
    15 * 60
}
fn default_cycles() -> u32 {
    4
}

impl Default for TimerSettings {
    fn default() -> Self {
        Self {
            work_duration_sec: default_work_duration(),
            short_break_sec: default_short_break(),
            long_break_sec: default_long_break(),
            cycles_until_long_break: default_cycles(),
        }
    }
}

impl TimerSettings {
    /// Merge a partial update. Returns whether anything changed.
    pub fn apply(&mut self, patch: &TimerSettingsPatch) -> bool {
        let before = *self;
        if let Some(v) = patch.work_duration_sec {
            self.work_duration_sec = v;
        }
        if let Some(v) = patch.short_break_sec {
            self.short_break_sec = v;
        }
        if let Some(v) = patch.long_break_sec {
            self.long_break_sec = v;
        }
        if let Some(v) = patch.cycles_until_long_break {
            self.cycles_until_long_break = v;
        }
        before != *self
    }
}

/// Partial settings update; `None` leaves a field untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerSettingsPatch {
    #[serde(default)]
    pub work_duration_sec: Option<u64>,
    #[serde(default)]
    pub short_break_sec: Option<u64>,
    #[serde(default)]
    pub long_break_sec: Option<u64>,
    #[serde(default)]
    pub cycles_until_long_break: Option<u32>,
}

impl From<TimerSettings> for TimerSettingsPatch {
    fn from(settings: TimerSettings) -> Self {
        Self {
            work_duration_sec: Some(settings.work_duration_sec),
            short_break_sec: Some(settings.short_break_sec),
            long_break_sec: Some(settings.long_break_sec),
            cycles_until_long_break: Some(settings.cycles_until_long_break),
        }
    }
}

/// Lookup for per-task work duration overrides.
///
/// The timer only knows task ids; whoever owns the tasks answers this.
pub trait WorkDurationSource {
    fn work_duration_override(&self, task_id: &str) -> Option<u64>;
}

impl WorkDurationSource for [Task] {
    fn work_duration_override(&self, task_id: &str) -> Option<u64> {
        self.iter()
            .find(|t| t.id == task_id)
            .and_then(Task::work_duration_override)
    }
}

impl WorkDurationSource for Vec<Task> {
    fn work_duration_override(&self, task_id: &str) -> Option<u64> {
        self.as_slice().work_duration_override(task_id)
    }
}

impl WorkDurationSource for std::collections::BTreeMap<String, u64> {
    fn work_duration_override(&self, task_id: &str) -> Option<u64> {
        self.get(task_id).copied()
    }
}

/// Source with no overrides; every work session uses the global duration.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOverrides;

impl WorkDurationSource for NoOverrides {
    fn work_duration_override(&self, _task_id: &str) -> Option<u64> {
        None
    }
}
