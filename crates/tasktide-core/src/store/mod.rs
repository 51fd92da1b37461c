//! In-memory task store.
//!
//! The store owns the task collection and the focus timer, applies every
//! mutation synchronously, and records the matching outbound command in its
//! [`SyncQueue`]. Local state is the source of truth for all views; delivery
//! of queued commands happens elsewhere and reports back through the queue.
//!
//! The scheduling engines (`recurrence`, `layout`, `timer`) stay pure: the
//! store only feeds them data and applies what they return.

mod sync_queue;

pub use sync_queue::{SyncCommand, SyncCommandKind, SyncQueue};

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::day::DayKey;
use crate::error::{CoreError, Result};
use crate::events::Event;
use crate::layout::{assign_columns, intervals_for_day, ColumnAssignment};
use crate::recurrence;
use crate::storage::Config;
use crate::task::{Recurrence, Task, TimeSlot};
use crate::timer::{Clock, FocusTimer, SystemClock, TimerSettingsPatch, WorkDurationSource};

/// Serializable store contents.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreSnapshot {
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub timer: FocusTimer,
    #[serde(default)]
    pub sync: SyncQueue,
}

impl StoreSnapshot {
    /// Read a snapshot written by [`save_to`](Self::save_to). A missing file
    /// yields `None`.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Option<Self>> {
        match std::fs::read_to_string(path) {
            Ok(json) => Ok(Some(serde_json::from_str(&json)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Write as pretty JSON through a temporary file renamed into place.
    ///
    /// # Errors
    /// Returns an error if serialization or the write fails.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let text = serde_json::to_string_pretty(self)?;
        let tmp_path = path.with_extension("json.tmp");
        std::fs::write(&tmp_path, text)?;
        std::fs::rename(&tmp_path, path)?;
        Ok(())
    }
}

/// One row of a day view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayEntry<'a> {
    pub task: &'a Task,
    pub done: bool,
    pub overdue: bool,
}

pub struct TaskStore<C: Clock = SystemClock> {
    tasks: Vec<Task>,
    timer: FocusTimer,
    sync: SyncQueue,
    max_catch_up_secs: Option<u64>,
    clock: C,
}

impl TaskStore<SystemClock> {
    pub fn new(config: &Config) -> Self {
        Self::with_clock(config, SystemClock)
    }
}

impl<C: Clock> TaskStore<C> {
    pub fn with_clock(config: &Config, clock: C) -> Self {
        Self::from_snapshot(
            StoreSnapshot {
                tasks: Vec::new(),
                timer: FocusTimer::new(config.timer.settings()),
                sync: SyncQueue::new(config.sync.max_attempts),
            },
            config,
            clock,
        )
    }

    /// Rebuild from persisted contents. In-flight commands stay in flight
    /// until acknowledged, failed, or requeued.
    ///
    /// `config.timer` is authoritative for durations: persisted timer settings
    /// are overwritten, and a stopped countdown reloads if they differ.
    pub fn from_snapshot(snapshot: StoreSnapshot, config: &Config, clock: C) -> Self {
        let mut sync = snapshot.sync;
        sync.set_max_attempts(config.sync.max_attempts);
        let mut timer = snapshot.timer;
        let patch = TimerSettingsPatch::from(config.timer.settings());
        if timer.set_settings(&patch, snapshot.tasks.as_slice()).is_some() {
            tracing::debug!("timer settings updated from config");
        }
        Self {
            tasks: snapshot.tasks,
            timer,
            sync,
            max_catch_up_secs: Some(config.timer.max_catch_up_secs),
            clock,
        }
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            tasks: self.tasks.clone(),
            timer: self.timer.clone(),
            sync: self.sync.clone(),
        }
    }

    // ── Tasks ────────────────────────────────────────────────────────

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Add a new task.
    ///
    /// # Errors
    /// Returns an error if a task with the same id exists.
    pub fn insert_task(&mut self, task: Task) -> Result<()> {
        if self.task(&task.id).is_some() {
            return Err(CoreError::DuplicateTask(task.id));
        }
        self.sync.enqueue(SyncCommandKind::UpsertTask {
            task_id: task.id.clone(),
        });
        for slot in &task.time_slots {
            self.sync.enqueue(SyncCommandKind::UpsertCalendarEvent {
                task_id: task.id.clone(),
                slot: slot.clone(),
            });
        }
        tracing::debug!(task_id = %task.id, kind = %task.kind(), "task inserted");
        self.tasks.push(task);
        Ok(())
    }

    /// Apply `f` to a task and queue an upsert.
    ///
    /// # Errors
    /// Returns an error if the task does not exist.
    pub fn update_task<R>(&mut self, id: &str, f: impl FnOnce(&mut Task) -> R) -> Result<R> {
        let task = self.task_mut(id)?;
        let out = f(task);
        self.sync.enqueue(SyncCommandKind::UpsertTask {
            task_id: id.to_string(),
        });
        Ok(out)
    }

    /// Remove a task, drop it from the active queue, and queue remote deletes.
    /// Elapsed timer time is accounted for first; the returned events include
    /// that catch-up.
    ///
    /// # Errors
    /// Returns an error if the task does not exist.
    pub fn delete_task(&mut self, id: &str) -> Result<(Task, Vec<Event>)> {
        if self.task(id).is_none() {
            return Err(CoreError::TaskNotFound(id.to_string()));
        }
        // Sessions that already ran out still credit the task.
        let mut events = self.tick_timer();
        let pos = self
            .tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| CoreError::TaskNotFound(id.to_string()))?;
        let task = self.tasks.remove(pos);
        for slot in &task.time_slots {
            if let Some(event_id) = &slot.google_event_id {
                self.sync.enqueue(SyncCommandKind::DeleteCalendarEvent {
                    task_id: task.id.clone(),
                    google_event_id: event_id.clone(),
                });
            }
        }
        self.sync.enqueue(SyncCommandKind::DeleteTask {
            task_id: task.id.clone(),
        });
        events.extend(self.timer.remove_active_task(id));
        tracing::debug!(task_id = %id, "task deleted");
        Ok((task, events))
    }

    /// Mark the occurrence on `day` done: per day for daily tasks, for good
    /// otherwise.
    ///
    /// # Errors
    /// Returns an error if the task does not exist.
    pub fn mark_done(&mut self, id: &str, day: DayKey) -> Result<()> {
        self.update_task(id, |task| {
            if !task.mark_done_on(day) {
                task.completed = true;
            }
        })
    }

    /// Plan a backlog task on `day`. Returns `false` for other kinds.
    ///
    /// # Errors
    /// Returns an error if the task does not exist.
    pub fn plan(&mut self, id: &str, day: DayKey) -> Result<bool> {
        if !matches!(self.task_mut(id)?.recurrence, Recurrence::Backlog { .. }) {
            return Ok(false);
        }
        self.update_task(id, |task| task.plan_on(day))
    }

    /// Place a task on the clock and queue the calendar mirror.
    ///
    /// # Errors
    /// Returns an error if the task does not exist.
    pub fn add_time_slot(&mut self, id: &str, slot: TimeSlot) -> Result<()> {
        self.update_task(id, |task| task.time_slots.push(slot.clone()))?;
        self.sync.enqueue(SyncCommandKind::UpsertCalendarEvent {
            task_id: id.to_string(),
            slot,
        });
        Ok(())
    }

    /// Remove the `index`-th slot of a task.
    ///
    /// # Errors
    /// Returns an error if the task or slot does not exist.
    pub fn remove_time_slot(&mut self, id: &str, index: usize) -> Result<TimeSlot> {
        let task = self.task_mut(id)?;
        if index >= task.time_slots.len() {
            return Err(crate::error::ValidationError::InvalidValue {
                field: "slot".into(),
                message: format!("task {id} has no slot #{index}"),
            }
            .into());
        }
        let slot = task.time_slots.remove(index);
        if let Some(event_id) = &slot.google_event_id {
            self.sync.enqueue(SyncCommandKind::DeleteCalendarEvent {
                task_id: id.to_string(),
                google_event_id: event_id.clone(),
            });
        }
        self.sync.enqueue(SyncCommandKind::UpsertTask {
            task_id: id.to_string(),
        });
        Ok(slot)
    }

    /// Store the remote event id the calendar assigned to a slot.
    ///
    /// # Errors
    /// Returns an error if the task does not exist.
    pub fn link_calendar_event(&mut self, id: &str, slot: &TimeSlot, event_id: &str) -> Result<bool> {
        self.update_task(id, |task| {
            match task
                .time_slots
                .iter_mut()
                .find(|s| s.date == slot.date && s.start_time == slot.start_time && s.end_time == slot.end_time)
            {
                Some(found) => {
                    found.google_event_id = Some(event_id.to_string());
                    true
                }
                None => false,
            }
        })
    }

    fn task_mut(&mut self, id: &str) -> Result<&mut Task> {
        self.tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| CoreError::TaskNotFound(id.to_string()))
    }

    // ── Views ────────────────────────────────────────────────────────

    /// Non-archived tasks due on `day`, in insertion order.
    pub fn due_on(&self, day: DayKey) -> Vec<DayEntry<'_>> {
        self.tasks
            .iter()
            .filter(|t| !t.archived && recurrence::is_due_on(t, day))
            .map(|t| DayEntry {
                task: t,
                done: recurrence::is_done_on(t, day),
                overdue: recurrence::is_overdue(t, day),
            })
            .collect()
    }

    /// Non-archived tasks overdue as of `today`.
    pub fn overdue(&self, today: DayKey) -> Vec<&Task> {
        self.tasks
            .iter()
            .filter(|t| !t.archived && recurrence::is_overdue(t, today))
            .collect()
    }

    /// Column layout of `day`'s time slots.
    pub fn calendar_layout(&self, day: DayKey) -> Vec<ColumnAssignment> {
        assign_columns(&intervals_for_day(&self.tasks, day))
    }

    // ── Focus timer ──────────────────────────────────────────────────

    pub fn timer(&self) -> &FocusTimer {
        &self.timer
    }

    /// Start or resume the timer after catching up with elapsed time.
    pub fn start_timer(&mut self, is_break: Option<bool>) -> Vec<Event> {
        let mut events = self.tick_timer();
        let now = self.clock.now_ms();
        events.extend(self.timer.start(is_break, self.tasks.as_slice(), now));
        events
    }

    pub fn stop_timer(&mut self) -> Vec<Event> {
        let now = self.clock.now_ms();
        let events = self
            .timer
            .stop_capped(self.tasks.as_slice(), now, self.max_catch_up_secs);
        self.apply_credits(&events);
        events
    }

    /// Advance the timer to now, capped by the configured catch-up limit,
    /// and credit pomodoros to tasks for every completed work session.
    pub fn tick_timer(&mut self) -> Vec<Event> {
        let now = self.clock.now_ms();
        let events = self
            .timer
            .tick_capped(self.tasks.as_slice(), now, self.max_catch_up_secs);
        self.apply_credits(&events);
        events
    }

    /// Credit anything that already ran out, then reset.
    pub fn reset_timer(&mut self) -> Vec<Event> {
        let mut events = self.tick_timer();
        events.push(self.timer.reset(self.tasks.as_slice()));
        events
    }

    pub fn set_timer_settings(&mut self, patch: &TimerSettingsPatch) -> Vec<Event> {
        let mut events = self.tick_timer();
        events.extend(self.timer.set_settings(patch, self.tasks.as_slice()));
        events
    }

    /// Queue a task for focus credit. Like every queue change, elapsed timer
    /// time is credited against the queue as it was before the change.
    ///
    /// # Errors
    /// Returns an error if the task does not exist.
    pub fn add_active_task(&mut self, id: &str) -> Result<Vec<Event>> {
        if self.task(id).is_none() {
            return Err(CoreError::TaskNotFound(id.to_string()));
        }
        let mut events = self.tick_timer();
        events.extend(self.timer.add_active_task(id));
        Ok(events)
    }

    pub fn remove_active_task(&mut self, id: &str) -> Vec<Event> {
        let mut events = self.tick_timer();
        events.extend(self.timer.remove_active_task(id));
        events
    }

    pub fn reorder_active_tasks<S: AsRef<str>>(&mut self, order: &[S]) -> Vec<Event> {
        let mut events = self.tick_timer();
        events.extend(self.timer.reorder_active_tasks(order));
        events
    }

    fn apply_credits(&mut self, events: &[Event]) {
        for event in events {
            if let Event::WorkSessionCompleted {
                credited_task_ids, ..
            } = event
            {
                for id in credited_task_ids {
                    if let Err(e) = self.update_task(id, |task| task.completed_pomodoros += 1) {
                        tracing::debug!(task_id = %id, error = %e, "pomodoro credit skipped");
                    }
                }
            }
        }
    }

    // ── Sync ─────────────────────────────────────────────────────────

    pub fn sync_queue(&self) -> &SyncQueue {
        &self.sync
    }

    pub fn sync_queue_mut(&mut self) -> &mut SyncQueue {
        &mut self.sync
    }
}

impl<C: Clock> WorkDurationSource for TaskStore<C> {
    fn work_duration_override(&self, task_id: &str) -> Option<u64> {
        self.tasks.as_slice().work_duration_override(task_id)
    }
}
