//! Plait CLI entry point

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "plait")]
#[command(about = "Copy, paste and three-way compare of model snapshots", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarize a model snapshot
    Inspect {
        /// Snapshot document to read
        snapshot: PathBuf,
    },
    /// Record the changes from ancestor to incoming in the current model
    Compare {
        ancestor: PathBuf,
        current: PathBuf,
        incoming: PathBuf,

        /// Write the current model, change records included, to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Copy elements and paste them onto a diagram of the same model
    Duplicate {
        snapshot: PathBuf,

        /// Diagram to paste onto
        #[arg(short, long)]
        diagram: u64,

        /// Duplicate the defining elements too, instead of sharing them
        #[arg(long)]
        full: bool,

        /// Also copy everything the copied elements own
        #[arg(long)]
        closure: bool,

        /// Ids of the elements or items to copy
        #[arg(required = true)]
        ids: Vec<u64>,
    },
    /// Show version
    Version,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging; output goes to stderr so stdout stays parseable
    let log_level = if cli.verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!(
            "plait={0},plait_core={0},plait_copypaste={0},plait_changeset={0}",
            log_level
        ))
    });
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::debug!("Plait v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Inspect { snapshot } => commands::inspect(&snapshot),
        Commands::Compare {
            ancestor,
            current,
            incoming,
            output,
        } => commands::compare(&ancestor, &current, &incoming, output.as_deref()),
        Commands::Duplicate {
            snapshot,
            diagram,
            full,
            closure,
            ids,
        } => commands::duplicate(&snapshot, diagram, &ids, full, closure),
        Commands::Version => {
            println!("Plait v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
