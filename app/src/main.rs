#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

use clap::{Parser, Subcommand};
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;
use uuid::Uuid;
use voxtask_config::Config;
use voxtask_core::{EntityResolver, Interpreter};
use voxtask_storage::{TaskRecord, TaskStore};

#[derive(Parser)]
#[command(name = "voxtask")]
#[command(about = "voxtask voice command interpreter", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Interpret one transcribed command
    Parse {
        /// The transcribed command text
        text: String,

        /// Persist the extraction as a task record
        #[arg(short, long)]
        save: bool,
    },
    /// List stored task records, newest first
    Tasks,
    /// Delete a stored task record
    Delete {
        /// Record id to delete
        id: Uuid,
    },
    /// Initialize configuration
    Init,
    /// Show version
    Version,
}

fn main() -> anyhow::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();

    match cli.command {
        Commands::Parse { text, save } => {
            let config = Config::load()?;
            let interpreter = Interpreter::with_parts(
                Box::new(voxtask_core::RuleTokenizer::new()),
                voxtask_core::DeadlineResolver::default(),
                EntityResolver::new(config.interpreter.low_confidence_threshold),
            );

            let result =
                interpreter.interpret(&text, &config.interpreter.users, &config.interpreter.categories);

            println!("{}", serde_json::to_string_pretty(&result)?);

            if save {
                let store = TaskStore::new(&config.storage.tasks_dir)?;
                let record = TaskRecord::new("cli".to_string(), text, result);
                let path = store.save(&record)?;
                info!(path = %path.display(), "saved task record");
            }
        }
        Commands::Tasks => {
            let config = Config::load()?;
            let store = TaskStore::new(&config.storage.tasks_dir)?;

            let records = store.list()?;
            if records.is_empty() {
                println!("No stored tasks.");
            }
            for record in records {
                println!(
                    "{}  {}  {} -> {}",
                    record.id,
                    record.created_at.format("%Y-%m-%d %H:%M:%S"),
                    record.task.title.as_deref().unwrap_or("<no title>"),
                    record.task.assignee.as_deref().unwrap_or("<no assignee>"),
                );
            }
        }
        Commands::Delete { id } => {
            let config = Config::load()?;
            let store = TaskStore::new(&config.storage.tasks_dir)?;

            if store.delete(id)? {
                println!("Deleted task {id}");
            } else {
                println!("No task with id {id}");
            }
        }
        Commands::Init => {
            Config::create_config()?;
        }
        Commands::Version => {
            println!("voxtask {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
