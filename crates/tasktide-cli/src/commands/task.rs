use clap::{Subcommand, ValueEnum};
use tasktide_core::{ClockTime, DateRange, DayKey, Recurrence, Task, TimeSlot};

use super::{open_store, parse_day, print_json, save_store, CmdResult};

#[derive(Clone, Copy, ValueEnum)]
pub enum KindArg {
    Daily,
    Scheduled,
    Backlog,
}

#[derive(Subcommand)]
pub enum TaskAction {
    /// Create a new task
    Create {
        /// Task title
        title: String,
        #[arg(long, value_enum, default_value = "daily")]
        kind: KindArg,
        /// Weekdays for scheduled tasks, 0 = Sunday
        #[arg(long, value_delimiter = ',')]
        days: Vec<u8>,
        /// Date range for scheduled tasks, START..END (inclusive)
        #[arg(long = "range")]
        ranges: Vec<String>,
        /// Planned date for backlog tasks (YYYY-MM-DD)
        #[arg(long = "plan")]
        planned: Vec<String>,
        /// Work session length override in seconds
        #[arg(long)]
        work_duration: Option<u64>,
    },
    /// List tasks
    List {
        /// Include archived tasks
        #[arg(long)]
        all: bool,
    },
    /// Show a single task
    Get { id: String },
    /// Mark a task done (daily tasks: for the given day only)
    Done {
        id: String,
        #[arg(long)]
        date: Option<String>,
    },
    /// Plan a backlog task on a day
    Plan { id: String, date: String },
    /// Place a task on the calendar
    Slot {
        id: String,
        /// YYYY-MM-DD
        date: String,
        /// HH:MM
        start: String,
        /// HH:MM
        end: String,
    },
    /// Remove a calendar slot by index
    Unslot { id: String, index: usize },
    /// Set or clear the work session length override
    WorkDuration {
        id: String,
        /// Seconds; omit to clear
        seconds: Option<u64>,
    },
    /// Hide a task from day views
    Archive { id: String },
    /// Delete a task
    Delete { id: String },
}

fn parse_range(s: &str) -> Result<DateRange, Box<dyn std::error::Error>> {
    let (start, end) = s
        .split_once("..")
        .ok_or_else(|| format!("invalid range '{s}', expected START..END"))?;
    Ok(DateRange::new(
        DayKey::parse_ymd(start)?,
        DayKey::parse_ymd(end)?,
    ))
}

fn build_recurrence(
    kind: KindArg,
    days: Vec<u8>,
    ranges: &[String],
    planned: &[String],
) -> Result<Recurrence, Box<dyn std::error::Error>> {
    Ok(match kind {
        KindArg::Daily => Recurrence::daily(),
        KindArg::Scheduled => {
            let ranges = ranges
                .iter()
                .map(|r| parse_range(r))
                .collect::<Result<Vec<_>, _>>()?;
            Recurrence::scheduled(days, ranges)?
        }
        KindArg::Backlog => {
            let mut dates = planned
                .iter()
                .map(|d| DayKey::parse_ymd(d))
                .collect::<Result<Vec<_>, _>>()?;
            dates.sort();
            dates.dedup();
            Recurrence::backlog(dates)
        }
    })
}

pub fn run(action: TaskAction) -> CmdResult {
    let mut store = open_store()?;

    match action {
        TaskAction::Create {
            title,
            kind,
            days,
            ranges,
            planned,
            work_duration,
        } => {
            let recurrence = build_recurrence(kind, days, &ranges, &planned)?;
            let mut task = Task::new(title, recurrence);
            if let Some(secs) = work_duration {
                task = task.with_work_duration(secs);
            }
            let id = task.id.clone();
            store.insert_task(task)?;
            print_json(&store.task(&id))?;
        }
        TaskAction::List { all } => {
            let tasks: Vec<&Task> = store.tasks().iter().filter(|t| all || !t.archived).collect();
            return print_json(&tasks);
        }
        TaskAction::Get { id } => {
            let task = store
                .task(&id)
                .ok_or_else(|| tasktide_core::CoreError::TaskNotFound(id.clone()))?;
            return print_json(task);
        }
        TaskAction::Done { id, date } => {
            store.mark_done(&id, parse_day(date.as_deref())?)?;
            print_json(&store.task(&id))?;
        }
        TaskAction::Plan { id, date } => {
            if !store.plan(&id, DayKey::parse_ymd(&date)?)? {
                return Err(format!("task {id} is not a backlog task").into());
            }
            print_json(&store.task(&id))?;
        }
        TaskAction::Slot {
            id,
            date,
            start,
            end,
        } => {
            let slot = TimeSlot::new(
                DayKey::parse_ymd(&date)?,
                ClockTime::parse(&start)?,
                ClockTime::parse(&end)?,
            );
            store.add_time_slot(&id, slot)?;
            print_json(&store.task(&id))?;
        }
        TaskAction::Unslot { id, index } => {
            let slot = store.remove_time_slot(&id, index)?;
            print_json(&slot)?;
        }
        TaskAction::WorkDuration { id, seconds } => {
            store.update_task(&id, |task| {
                task.pomodoro_setting = seconds.map(|s| tasktide_core::PomodoroSetting {
                    work_duration_sec: Some(s),
                });
            })?;
            print_json(&store.task(&id))?;
        }
        TaskAction::Archive { id } => {
            store.update_task(&id, |task| task.archived = true)?;
            print_json(&store.task(&id))?;
        }
        TaskAction::Delete { id } => {
            let (task, events) = store.delete_task(&id)?;
            for event in &events {
                print_json(event)?;
            }
            print_json(&task)?;
        }
    }

    save_store(&store)
}
