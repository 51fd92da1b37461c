use clap::Subcommand;
use serde::Serialize;
use tasktide_core::SyncCommand;

use super::{open_store, print_json, save_store, CmdResult};

#[derive(Subcommand)]
pub enum SyncAction {
    /// Show pending, in-flight and failed commands
    Status,
    /// Hand out up to N commands for delivery
    Drain {
        #[arg(long, default_value = "10")]
        limit: usize,
    },
    /// Acknowledge a delivered command
    Ack { command_id: String },
    /// Report a failed delivery
    Fail { command_id: String, message: String },
    /// Requeue undelivered in-flight commands and give parked ones a fresh
    /// set of attempts
    Retry,
}

#[derive(Serialize)]
struct SyncStatus<'a> {
    pending: Vec<&'a SyncCommand>,
    in_flight: &'a [SyncCommand],
    failed: &'a [SyncCommand],
}

pub fn run(action: SyncAction) -> CmdResult {
    let mut store = open_store()?;

    match action {
        SyncAction::Status => {
            let queue = store.sync_queue();
            return print_json(&SyncStatus {
                pending: queue.pending().collect(),
                in_flight: queue.in_flight(),
                failed: queue.failed(),
            });
        }
        SyncAction::Drain { limit } => {
            let batch = store.sync_queue_mut().drain_ready(limit);
            print_json(&batch)?;
        }
        SyncAction::Ack { command_id } => {
            if !store.sync_queue_mut().acknowledge(&command_id) {
                return Err(format!("command {command_id} is not in flight").into());
            }
            println!("ok");
        }
        SyncAction::Fail {
            command_id,
            message,
        } => {
            if !store.sync_queue_mut().report_failure(&command_id, message) {
                return Err(format!("command {command_id} is not in flight").into());
            }
            println!("ok");
        }
        SyncAction::Retry => {
            let queue = store.sync_queue_mut();
            queue.requeue_in_flight();
            let n = queue.retry_failed();
            println!("{n} failed command(s) requeued");
        }
    }

    save_store(&store)
}
