use clap::Subcommand;

use super::{open_store, print_json, save_store, CmdResult};

#[derive(Subcommand)]
pub enum QueueAction {
    /// Add a task to the active queue
    Add { task_id: String },
    /// Remove a task from the active queue
    Remove { task_id: String },
    /// Reorder the queue; ids not listed keep their relative order at the end
    Reorder {
        #[arg(required = true)]
        task_ids: Vec<String>,
    },
    /// List active task ids, current first
    List,
}

pub fn run(action: QueueAction) -> CmdResult {
    let mut store = open_store()?;

    let events = match action {
        QueueAction::Add { task_id } => store.add_active_task(&task_id)?,
        QueueAction::Remove { task_id } => store.remove_active_task(&task_id),
        QueueAction::Reorder { task_ids } => store.reorder_active_tasks(&task_ids),
        QueueAction::List => {
            return print_json(store.timer().active_task_ids());
        }
    };

    for event in &events {
        print_json(event)?;
    }
    print_json(store.timer().active_task_ids())?;
    save_store(&store)
}
