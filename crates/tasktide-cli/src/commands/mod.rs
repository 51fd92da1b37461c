pub mod config;
pub mod day;
pub mod queue;
pub mod sync;
pub mod task;
pub mod timer;

use std::path::PathBuf;

use serde::Serialize;
use tasktide_core::storage::data_dir;
use tasktide_core::{Config, DayKey, StoreSnapshot, SystemClock, TaskStore};

pub type CmdResult = Result<(), Box<dyn std::error::Error>>;

const STATE_FILE: &str = "state.json";

fn state_path() -> Result<PathBuf, Box<dyn std::error::Error>> {
    Ok(data_dir()?.join(STATE_FILE))
}

/// Load config and the persisted store, or a fresh store on first run.
pub fn open_store() -> Result<TaskStore, Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let path = state_path()?;
    match StoreSnapshot::load_from(&path)? {
        Some(snapshot) => {
            tracing::debug!(path = %path.display(), tasks = snapshot.tasks.len(), "store loaded");
            Ok(TaskStore::from_snapshot(snapshot, &config, SystemClock))
        }
        None => Ok(TaskStore::new(&config)),
    }
}

pub fn save_store(store: &TaskStore) -> CmdResult {
    let path = state_path()?;
    store.snapshot().save_to(&path)?;
    tracing::debug!(path = %path.display(), "store saved");
    Ok(())
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> CmdResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// `YYYY-MM-DD`, or today when absent.
pub fn parse_day(date: Option<&str>) -> Result<DayKey, Box<dyn std::error::Error>> {
    match date {
        Some(s) => Ok(DayKey::parse_ymd(s)?),
        None => Ok(DayKey::today()),
    }
}
