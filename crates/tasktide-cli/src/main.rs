use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "tasktide", version, about = "Tasktide CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Focus timer control
    Timer {
        #[command(subcommand)]
        action: commands::timer::TimerAction,
    },
    /// Active task queue for focus credit
    Queue {
        #[command(subcommand)]
        action: commands::queue::QueueAction,
    },
    /// Task management
    Task {
        #[command(subcommand)]
        action: commands::task::TaskAction,
    },
    /// Tasks due on a day (default: today)
    Today {
        #[arg(long)]
        date: Option<String>,
    },
    /// Tasks that slipped past their last planned day
    Overdue {
        #[arg(long)]
        date: Option<String>,
    },
    /// Calendar column layout for a day
    Layout {
        #[arg(long)]
        date: Option<String>,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Outbound sync queue
    Sync {
        #[command(subcommand)]
        action: commands::sync::SyncAction,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Timer { action } => commands::timer::run(action),
        Commands::Queue { action } => commands::queue::run(action),
        Commands::Task { action } => commands::task::run(action),
        Commands::Today { date } => commands::day::today(date),
        Commands::Overdue { date } => commands::day::overdue(date),
        Commands::Layout { date } => commands::day::layout(date),
        Commands::Config { action } => commands::config::run(action),
        Commands::Sync { action } => commands::sync::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
