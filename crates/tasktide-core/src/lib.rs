//! # Tasktide Core Library
//!
//! Scheduling core for the tasktide task planner. All operations are
//! available through the standalone `tasktide` CLI, which is a thin layer
//! over this library.
//!
//! ## Architecture
//!
//! - **Recurrence**: pure date rules deciding when a daily, scheduled or
//!   backlog task is due, overdue, or next occurs
//! - **Layout**: overlap grouping and column assignment for a day's
//!   calendar blocks
//! - **Timer**: a wall-clock-driven focus timer that requires the caller to
//!   periodically invoke `tick()` and replays elapsed whole seconds
//! - **Store**: in-memory task collection with an outbound sync queue
//! - **Storage**: TOML-based configuration and data directory resolution
//!
//! ## Key Components
//!
//! - [`FocusTimer`]: Work/break state machine with an active task queue
//! - [`TaskStore`]: Task mutations, day views and timer credit bookkeeping
//! - [`Config`]: Application configuration management

pub mod day;
pub mod error;
pub mod events;
pub mod layout;
pub mod recurrence;
pub mod storage;
pub mod store;
pub mod task;
pub mod timer;

pub use day::{ClockTime, DayKey};
pub use error::{ConfigError, CoreError, ValidationError};
pub use events::Event;
pub use layout::{assign_columns, intervals_for_day, ColumnAssignment, TimeInterval};
pub use recurrence::{earliest_occurrence, is_done_on, is_due_on, is_overdue, next_occurrence};
pub use storage::Config;
pub use store::{DayEntry, StoreSnapshot, SyncCommand, SyncCommandKind, SyncQueue, TaskStore};
pub use task::{DateRange, PomodoroSetting, Recurrence, RecurrenceKind, Task, TimeSlot};
pub use timer::{
    Clock, FocusTimer, ManualClock, Phase, SystemClock, TimerSettings, TimerSettingsPatch,
    TimerSnapshot, TimerStatus, WorkDurationSource,
};
