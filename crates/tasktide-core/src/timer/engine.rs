//! Focus timer state machine.
//!
//! The timer is wall-clock based. It does not use internal threads - the
//! caller passes the current time into every transition and is responsible
//! for calling `tick()` periodically.
//!
//! ## State Transitions
//!
//! ```text
//!            start(work)                 countdown hits 0
//! Stopped ---------------> RunningWork ------------------> RunningBreak
//!    ^  <--- stop/reset ---     ^                               |
//!    |                          +------- countdown hits 0 ------+
//!    +-------------------- stop/reset ---------------------------+
//! ```
//!
//! ## Drift correction
//!
//! `tick()` measures whole seconds elapsed since the last anchor and replays
//! every phase change inside that span. One tick after a ten minute gap ends
//! in exactly the state of six hundred one-second ticks; the sub-second
//! remainder stays in the anchor.

use serde::{Deserialize, Serialize};

use super::queue::ActiveTaskQueue;
use super::settings::{TimerSettings, TimerSettingsPatch, WorkDurationSource};
use crate::events::Event;

/// Which countdown is loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Work,
    ShortBreak,
    LongBreak,
}

impl Phase {
    pub fn is_break(self) -> bool {
        !matches!(self, Phase::Work)
    }
}

/// Externally visible state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerStatus {
    Stopped,
    RunningWork,
    RunningBreak,
}

/// Serializable view of the timer for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    pub status: TimerStatus,
    pub is_running: bool,
    pub is_break: bool,
    pub phase: Phase,
    pub seconds_left: u64,
    pub completed_work_sessions: u32,
    pub current_task_id: Option<String>,
    pub active_task_ids: Vec<String>,
    pub settings: TimerSettings,
}

/// Core focus timer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FocusTimer {
    settings: TimerSettings,
    is_running: bool,
    phase: Phase,
    seconds_left: u64,
    completed_work_sessions: u32,
    active: ActiveTaskQueue,
    /// Ids that were active when the current work session began.
    #[serde(default)]
    session_task_ids: Vec<String>,
    /// Stopped part-way through a countdown; `start` resumes instead of reloading.
    #[serde(default)]
    paused_mid_phase: bool,
    /// Wall-clock anchor (epoch ms) of the last whole second accounted for.
    #[serde(default)]
    last_tick_at_ms: Option<u64>,
}

impl Default for FocusTimer {
    fn default() -> Self {
        Self::new(TimerSettings::default())
    }
}

impl FocusTimer {
    /// Create a stopped timer with a work countdown loaded.
    pub fn new(settings: TimerSettings) -> Self {
        Self {
            settings,
            is_running: false,
            phase: Phase::Work,
            seconds_left: settings.work_duration_sec,
            completed_work_sessions: 0,
            active: ActiveTaskQueue::new(),
            session_task_ids: Vec::new(),
            paused_mid_phase: false,
            last_tick_at_ms: None,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn status(&self) -> TimerStatus {
        match (self.is_running, self.phase.is_break()) {
            (false, _) => TimerStatus::Stopped,
            (true, false) => TimerStatus::RunningWork,
            (true, true) => TimerStatus::RunningBreak,
        }
    }

    pub fn is_running(&self) -> bool {
        self.is_running
    }

    pub fn is_break(&self) -> bool {
        self.phase.is_break()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn seconds_left(&self) -> u64 {
        self.seconds_left
    }

    pub fn completed_work_sessions(&self) -> u32 {
        self.completed_work_sessions
    }

    pub fn settings(&self) -> &TimerSettings {
        &self.settings
    }

    pub fn active_task_ids(&self) -> &[String] {
        self.active.ids()
    }

    pub fn current_task_id(&self) -> Option<&str> {
        self.active.current()
    }

    pub fn session_task_ids(&self) -> &[String] {
        &self.session_task_ids
    }

    pub fn last_tick_at_ms(&self) -> Option<u64> {
        self.last_tick_at_ms
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            status: self.status(),
            is_running: self.is_running,
            is_break: self.is_break(),
            phase: self.phase,
            seconds_left: self.seconds_left,
            completed_work_sessions: self.completed_work_sessions,
            current_task_id: self.current_task_id().map(str::to_string),
            active_task_ids: self.active.ids().to_vec(),
            settings: self.settings,
        }
    }

    /// Countdown length `phase` would load right now.
    pub fn duration_for<D>(&self, phase: Phase, durations: &D) -> u64
    where
        D: WorkDurationSource + ?Sized,
    {
        match phase {
            Phase::Work => self
                .active
                .current()
                .and_then(|id| durations.work_duration_override(id))
                .unwrap_or(self.settings.work_duration_sec),
            Phase::ShortBreak => self.settings.short_break_sec,
            Phase::LongBreak => self.settings.long_break_sec,
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start (or resume) the timer.
    ///
    /// `is_break` selects the mode; `None` keeps the current one. A countdown
    /// that was stopped part-way resumes when the mode is unchanged,
    /// otherwise a fresh duration is loaded: work sessions honour the current
    /// task's override, breaks always use the global durations. Returns
    /// `None` if the timer is already running in the requested mode.
    pub fn start<D>(&mut self, is_break: Option<bool>, durations: &D, now_ms: u64) -> Option<Event>
    where
        D: WorkDurationSource + ?Sized,
    {
        let target = match is_break {
            None => self.phase,
            Some(false) => Phase::Work,
            Some(true) if self.phase.is_break() => self.phase,
            Some(true) => self.break_after_work(),
        };
        if self.is_running && target == self.phase {
            return None;
        }

        let resumed =
            !self.is_running && self.paused_mid_phase && target == self.phase && self.seconds_left > 0;
        if !resumed {
            self.load(target, durations);
        }
        self.is_running = true;
        self.paused_mid_phase = false;
        self.last_tick_at_ms = Some(now_ms);
        tracing::debug!(phase = ?self.phase, seconds_left = self.seconds_left, resumed, "focus timer started");

        Some(Event::TimerStarted {
            phase: self.phase,
            seconds_left: self.seconds_left,
            resumed,
            at_ms: now_ms,
        })
    }

    /// Stop the timer, keeping mode and countdown so `start` can resume.
    ///
    /// Whole seconds elapsed since the last tick are accounted for first, so
    /// the returned events may include phase completions.
    pub fn stop<D>(&mut self, durations: &D, now_ms: u64) -> Vec<Event>
    where
        D: WorkDurationSource + ?Sized,
    {
        self.stop_capped(durations, now_ms, None)
    }

    /// Like [`stop`](Self::stop), with the final catch-up limited as in
    /// [`tick_capped`](Self::tick_capped).
    pub fn stop_capped<D>(
        &mut self,
        durations: &D,
        now_ms: u64,
        max_catch_up_secs: Option<u64>,
    ) -> Vec<Event>
    where
        D: WorkDurationSource + ?Sized,
    {
        if !self.is_running {
            return Vec::new();
        }
        let mut events = self.tick_capped(durations, now_ms, max_catch_up_secs);
        self.is_running = false;
        self.paused_mid_phase = true;
        self.last_tick_at_ms = None;
        tracing::debug!(phase = ?self.phase, seconds_left = self.seconds_left, "focus timer stopped");
        events.push(Event::TimerStopped {
            phase: self.phase,
            seconds_left: self.seconds_left,
            at_ms: now_ms,
        });
        events
    }

    /// Advance by the wall-clock time elapsed since the last tick.
    ///
    /// No-op when stopped or when less than a full second has passed.
    pub fn tick<D>(&mut self, durations: &D, now_ms: u64) -> Vec<Event>
    where
        D: WorkDurationSource + ?Sized,
    {
        self.tick_capped(durations, now_ms, None)
    }

    /// Like [`tick`](Self::tick), but replays at most `max_catch_up_secs`.
    ///
    /// Elapsed time beyond the cap is dropped from the front of the gap; the
    /// anchor still moves up to `now_ms`.
    pub fn tick_capped<D>(
        &mut self,
        durations: &D,
        now_ms: u64,
        max_catch_up_secs: Option<u64>,
    ) -> Vec<Event>
    where
        D: WorkDurationSource + ?Sized,
    {
        if !self.is_running {
            return Vec::new();
        }
        let Some(mut anchor) = self.last_tick_at_ms else {
            self.last_tick_at_ms = Some(now_ms);
            return Vec::new();
        };

        let elapsed_ms = now_ms.saturating_sub(anchor);
        if elapsed_ms < 1000 {
            return Vec::new();
        }
        let mut elapsed_secs = elapsed_ms / 1000;
        if let Some(cap) = max_catch_up_secs {
            if elapsed_secs > cap {
                let skipped = elapsed_secs - cap;
                tracing::warn!(skipped_secs = skipped, "focus timer catch-up capped");
                anchor += skipped * 1000;
                elapsed_secs = cap;
            }
        }
        self.last_tick_at_ms = Some(anchor + elapsed_secs * 1000);
        self.replay(elapsed_secs, anchor, durations)
    }

    /// Stop and reload the current mode's duration; the session count restarts.
    pub fn reset<D>(&mut self, durations: &D) -> Event
    where
        D: WorkDurationSource + ?Sized,
    {
        self.is_running = false;
        self.paused_mid_phase = false;
        self.last_tick_at_ms = None;
        self.completed_work_sessions = 0;
        self.seconds_left = self.duration_for(self.phase, durations);
        tracing::debug!(phase = ?self.phase, "focus timer reset");
        Event::TimerReset {
            phase: self.phase,
            seconds_left: self.seconds_left,
        }
    }

    /// Merge new settings. A stopped timer shows the new duration at once; a
    /// running countdown is left as it is.
    pub fn set_settings<D>(&mut self, patch: &TimerSettingsPatch, durations: &D) -> Option<Event>
    where
        D: WorkDurationSource + ?Sized,
    {
        if !self.settings.apply(patch) {
            return None;
        }
        if !self.is_running {
            self.seconds_left = self.duration_for(self.phase, durations);
            self.paused_mid_phase = false;
        }
        Some(Event::SettingsChanged {
            settings: self.settings,
        })
    }

    // ── Active task queue ────────────────────────────────────────────

    pub fn add_active_task(&mut self, id: &str) -> Option<Event> {
        self.with_current_tracking(|queue| {
            queue.add(id);
        })
    }

    pub fn remove_active_task(&mut self, id: &str) -> Option<Event> {
        self.with_current_tracking(|queue| {
            queue.remove(id);
        })
    }

    pub fn reorder_active_tasks<S: AsRef<str>>(&mut self, order: &[S]) -> Option<Event> {
        self.with_current_tracking(|queue| queue.reorder(order))
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn with_current_tracking(&mut self, f: impl FnOnce(&mut ActiveTaskQueue)) -> Option<Event> {
        let previous = self.active.current().map(str::to_string);
        f(&mut self.active);
        let current = self.active.current().map(str::to_string);
        (previous != current).then_some(Event::CurrentTaskChanged { previous, current })
    }

    fn break_after_work(&self) -> Phase {
        let cycles = self.settings.cycles_until_long_break;
        if self.completed_work_sessions > 0
            && self.completed_work_sessions.checked_rem(cycles) == Some(0)
        {
            Phase::LongBreak
        } else {
            Phase::ShortBreak
        }
    }

    fn load<D>(&mut self, phase: Phase, durations: &D)
    where
        D: WorkDurationSource + ?Sized,
    {
        self.phase = phase;
        self.seconds_left = self.duration_for(phase, durations);
        if phase == Phase::Work {
            self.session_task_ids = self.active.ids().to_vec();
        }
    }

    /// Consume `secs` whole seconds starting at `from_ms`, completing phases
    /// as their countdowns run out.
    fn replay<D>(&mut self, secs: u64, from_ms: u64, durations: &D) -> Vec<Event>
    where
        D: WorkDurationSource + ?Sized,
    {
        let mut events = Vec::new();
        let mut consumed = 0;
        while consumed < secs {
            // A zero-length countdown still takes one second to expire.
            let step = self.seconds_left.min(secs - consumed).max(1);
            self.seconds_left = self.seconds_left.saturating_sub(step);
            consumed += step;
            if self.seconds_left == 0 {
                events.push(self.complete_phase(durations, from_ms + consumed * 1000));
            }
        }
        events
    }

    fn complete_phase<D>(&mut self, durations: &D, at_ms: u64) -> Event
    where
        D: WorkDurationSource + ?Sized,
    {
        match self.phase {
            Phase::Work => {
                self.completed_work_sessions += 1;
                let credited_task_ids: Vec<String> = self
                    .session_task_ids
                    .iter()
                    .filter(|id| self.active.contains(id.as_str()))
                    .cloned()
                    .collect();
                let next = self.break_after_work();
                self.load(next, durations);
                tracing::info!(
                    session = self.completed_work_sessions,
                    credited = credited_task_ids.len(),
                    next_phase = ?next,
                    "work session completed"
                );
                Event::WorkSessionCompleted {
                    session_number: self.completed_work_sessions,
                    credited_task_ids,
                    next_phase: next,
                    at_ms,
                }
            }
            finished @ (Phase::ShortBreak | Phase::LongBreak) => {
                self.load(Phase::Work, durations);
                tracing::debug!(phase = ?finished, "break completed");
                Event::BreakCompleted {
                    phase: finished,
                    next_work_seconds: self.seconds_left,
                    at_ms,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::settings::NoOverrides;
    use std::collections::BTreeMap;

    const T0: u64 = 1_700_000_000_000;

    fn timer() -> FocusTimer {
        FocusTimer::new(TimerSettings::default())
    }

    #[test]
    fn start_stop_resume() {
        let mut t = timer();
        assert_eq!(t.status(), TimerStatus::Stopped);

        assert!(t.start(None, &NoOverrides, T0).is_some());
        assert_eq!(t.status(), TimerStatus::RunningWork);
        assert!(t.start(None, &NoOverrides, T0).is_none());

        t.tick(&NoOverrides, T0 + 10_000);
        assert_eq!(t.seconds_left(), 1490);

        t.stop(&NoOverrides, T0 + 12_500);
        assert_eq!(t.status(), TimerStatus::Stopped);
        assert_eq!(t.seconds_left(), 1488);

        match t.start(None, &NoOverrides, T0 + 60_000) {
            Some(Event::TimerStarted { resumed, seconds_left, .. }) => {
                assert!(resumed);
                assert_eq!(seconds_left, 1488);
            }
            other => panic!("Expected TimerStarted, got {other:?}"),
        }
    }

    #[test]
    fn sub_second_tick_is_noop() {
        let mut t = timer();
        t.start(None, &NoOverrides, T0);
        assert!(t.tick(&NoOverrides, T0 + 999).is_empty());
        assert_eq!(t.seconds_left(), 1500);
        assert_eq!(t.last_tick_at_ms(), Some(T0));
    }

    #[test]
    fn remainder_stays_in_anchor() {
        let mut t = timer();
        t.start(None, &NoOverrides, T0);
        t.tick(&NoOverrides, T0 + 1_700);
        assert_eq!(t.seconds_left(), 1499);
        assert_eq!(t.last_tick_at_ms(), Some(T0 + 1_000));
        t.tick(&NoOverrides, T0 + 2_100);
        assert_eq!(t.seconds_left(), 1498);
    }

    #[test]
    fn tick_when_stopped_is_noop() {
        let mut t = timer();
        assert!(t.tick(&NoOverrides, T0 + 100_000).is_empty());
        assert_eq!(t.seconds_left(), 1500);
    }

    #[test]
    fn work_completion_loads_short_break() {
        let mut t = timer();
        t.start(None, &NoOverrides, T0);
        let events = t.tick(&NoOverrides, T0 + 1_500_000);
        assert_eq!(t.status(), TimerStatus::RunningBreak);
        assert_eq!(t.phase(), Phase::ShortBreak);
        assert_eq!(t.seconds_left(), 300);
        assert_eq!(t.completed_work_sessions(), 1);
        assert!(matches!(
            events.as_slice(),
            [Event::WorkSessionCompleted { session_number: 1, next_phase: Phase::ShortBreak, .. }]
        ));
    }

    #[test]
    fn fourth_session_earns_long_break() {
        let mut t = timer();
        t.start(None, &NoOverrides, T0);
        // Three work + short break cycles, then a fourth work session.
        let span = 3 * (1500 + 300) + 1500;
        t.tick(&NoOverrides, T0 + span * 1000);
        assert_eq!(t.completed_work_sessions(), 4);
        assert_eq!(t.phase(), Phase::LongBreak);
        assert_eq!(t.seconds_left(), 900);
    }

    #[test]
    fn zero_cycles_never_long_break() {
        let mut t = FocusTimer::new(TimerSettings {
            cycles_until_long_break: 0,
            ..TimerSettings::default()
        });
        t.start(None, &NoOverrides, T0);
        t.tick(&NoOverrides, T0 + 1_500_000);
        assert_eq!(t.phase(), Phase::ShortBreak);
    }

    #[test]
    fn work_uses_current_task_override_breaks_do_not() {
        let overrides: BTreeMap<String, u64> = [("deep".to_string(), 3000)].into_iter().collect();
        let mut t = timer();
        t.add_active_task("deep");
        t.start(None, &overrides, T0);
        assert_eq!(t.seconds_left(), 3000);

        t.tick(&overrides, T0 + 3_000_000);
        assert_eq!(t.phase(), Phase::ShortBreak);
        assert_eq!(t.seconds_left(), 300);

        // The head changes during the break; the next work session follows it.
        t.add_active_task("light");
        t.reorder_active_tasks(&["light"]);
        t.tick(&overrides, T0 + 3_300_000);
        assert_eq!(t.phase(), Phase::Work);
        assert_eq!(t.seconds_left(), 1500);
    }

    #[test]
    fn credits_every_task_active_since_session_start() {
        let mut t = timer();
        t.add_active_task("a");
        t.add_active_task("b");
        t.start(None, &NoOverrides, T0);
        t.add_active_task("late");
        let events = t.tick(&NoOverrides, T0 + 1_500_000);
        match &events[0] {
            Event::WorkSessionCompleted { credited_task_ids, .. } => {
                assert_eq!(credited_task_ids, &["a", "b"]);
            }
            other => panic!("Expected WorkSessionCompleted, got {other:?}"),
        }
    }

    #[test]
    fn removed_task_is_not_credited() {
        let mut t = timer();
        t.add_active_task("a");
        t.add_active_task("b");
        t.start(None, &NoOverrides, T0);
        t.remove_active_task("a");
        let events = t.tick(&NoOverrides, T0 + 1_500_000);
        match &events[0] {
            Event::WorkSessionCompleted { credited_task_ids, .. } => {
                assert_eq!(credited_task_ids, &["b"]);
            }
            other => panic!("Expected WorkSessionCompleted, got {other:?}"),
        }
    }

    #[test]
    fn reset_reloads_and_clears_sessions() {
        let mut t = timer();
        t.start(None, &NoOverrides, T0);
        t.tick(&NoOverrides, T0 + 1_600_000);
        assert_eq!(t.phase(), Phase::ShortBreak);
        t.reset(&NoOverrides);
        assert_eq!(t.status(), TimerStatus::Stopped);
        assert_eq!(t.phase(), Phase::ShortBreak);
        assert_eq!(t.seconds_left(), 300);
        assert_eq!(t.completed_work_sessions(), 0);
    }

    #[test]
    fn settings_apply_immediately_only_when_stopped() {
        let mut t = timer();
        let patch = TimerSettingsPatch {
            work_duration_sec: Some(600),
            ..Default::default()
        };
        assert!(t.set_settings(&patch, &NoOverrides).is_some());
        assert_eq!(t.seconds_left(), 600);

        t.start(None, &NoOverrides, T0);
        let patch = TimerSettingsPatch {
            work_duration_sec: Some(1200),
            ..Default::default()
        };
        t.set_settings(&patch, &NoOverrides);
        assert_eq!(t.seconds_left(), 600);
        assert_eq!(t.settings().work_duration_sec, 1200);
    }

    #[test]
    fn explicit_break_start_switches_mode() {
        let mut t = timer();
        t.start(None, &NoOverrides, T0);
        assert!(t.start(Some(true), &NoOverrides, T0 + 5_000).is_some());
        assert_eq!(t.status(), TimerStatus::RunningBreak);
        assert_eq!(t.seconds_left(), 300);
    }

    #[test]
    fn queue_changes_report_current_task() {
        let mut t = timer();
        assert_eq!(
            t.add_active_task("a"),
            Some(Event::CurrentTaskChanged {
                previous: None,
                current: Some("a".into())
            })
        );
        assert_eq!(t.add_active_task("b"), None);
        assert_eq!(
            t.remove_active_task("a"),
            Some(Event::CurrentTaskChanged {
                previous: Some("a".into()),
                current: Some("b".into())
            })
        );
        assert_eq!(
            t.remove_active_task("b"),
            Some(Event::CurrentTaskChanged {
                previous: Some("b".into()),
                current: None
            })
        );
        assert!(t.active_task_ids().is_empty());
        assert_eq!(t.current_task_id(), None);
    }

    #[test]
    fn capped_tick_drops_excess() {
        let mut t = timer();
        t.start(None, &NoOverrides, T0);
        let year_ms = 365 * 24 * 3_600_000;
        t.tick_capped(&NoOverrides, T0 + year_ms + 400, Some(100));
        assert_eq!(t.seconds_left(), 1400);
        assert_eq!(t.completed_work_sessions(), 0);
        assert_eq!(t.last_tick_at_ms(), Some(T0 + year_ms));
    }

    #[test]
    fn capped_stop_drops_excess() {
        let mut t = timer();
        t.start(None, &NoOverrides, T0);
        let events = t.stop_capped(&NoOverrides, T0 + 10 * 24 * 3_600_000, Some(100));
        assert!(matches!(&events[..], [Event::TimerStopped { seconds_left: 1400, .. }]));
        assert_eq!(t.completed_work_sessions(), 0);
        assert_eq!(t.status(), TimerStatus::Stopped);
    }

    #[test]
    fn timer_state_roundtrips_through_json() {
        let mut t = timer();
        t.add_active_task("a");
        t.start(None, &NoOverrides, T0);
        let json = serde_json::to_string(&t).unwrap();
        let decoded: FocusTimer = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, t);
    }
}
