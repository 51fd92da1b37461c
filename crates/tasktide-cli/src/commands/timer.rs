use clap::Subcommand;
use tasktide_core::{Config, Event, TimerSettingsPatch};

use super::{open_store, print_json, save_store, CmdResult};

#[derive(Subcommand)]
pub enum TimerAction {
    /// Start or resume the timer
    Start {
        /// Start a break instead of a work session
        #[arg(long = "break", conflicts_with = "work")]
        take_break: bool,
        /// Start a work session even during a break
        #[arg(long)]
        work: bool,
    },
    /// Stop the timer, keeping the countdown
    Stop,
    /// Stop and reload the current mode's duration
    Reset,
    /// Catch up with elapsed time and print the timer state as JSON
    Status,
    /// Change timer durations (saved to config)
    Settings {
        #[arg(long)]
        work: Option<u64>,
        #[arg(long)]
        short_break: Option<u64>,
        #[arg(long)]
        long_break: Option<u64>,
        #[arg(long)]
        cycles: Option<u32>,
    },
}

fn print_events(events: &[Event]) -> CmdResult {
    for event in events {
        print_json(event)?;
    }
    Ok(())
}

pub fn run(action: TimerAction) -> CmdResult {
    let mut store = open_store()?;

    // Each store operation first accounts for time passed since the last run.
    let events = match action {
        TimerAction::Start { take_break, work } => {
            let mode = match (take_break, work) {
                (true, _) => Some(true),
                (_, true) => Some(false),
                _ => None,
            };
            store.start_timer(mode)
        }
        TimerAction::Stop => store.stop_timer(),
        TimerAction::Reset => store.reset_timer(),
        TimerAction::Status => store.tick_timer(),
        TimerAction::Settings {
            work,
            short_break,
            long_break,
            cycles,
        } => {
            // Durations live in config.toml; the store re-applies them on load.
            let mut config = Config::load()?;
            let timer = &mut config.timer;
            timer.work_duration_sec = work.unwrap_or(timer.work_duration_sec);
            timer.short_break_sec = short_break.unwrap_or(timer.short_break_sec);
            timer.long_break_sec = long_break.unwrap_or(timer.long_break_sec);
            timer.cycles_until_long_break = cycles.unwrap_or(timer.cycles_until_long_break);
            config.save()?;

            let patch = TimerSettingsPatch {
                work_duration_sec: work,
                short_break_sec: short_break,
                long_break_sec: long_break,
                cycles_until_long_break: cycles,
            };
            store.set_timer_settings(&patch)
        }
    };

    print_events(&events)?;
    print_json(&store.timer().snapshot())?;
    save_store(&store)
}
