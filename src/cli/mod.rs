//! Command-line interface.

pub mod commands;
pub mod context;
pub mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::errors::DomainError;

#[derive(Parser, Debug)]
#[command(name = "reflecto")]
#[command(about = "Reflecto - deterministic daily reflection pipeline", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Configuration file (defaults to .reflecto/config.yaml with local overrides)
    #[arg(short, long, global = true, env = "REFLECTO_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize the .reflecto directory, configuration and database
    Init(commands::init::InitArgs),
    /// Create, replay, verify and stream sessions
    Session(commands::session::SessionArgs),
    /// Run the daily update for a user and day
    Daily(commands::daily::DailyArgs),
    /// Answer today's questions interactively and print the resulting flow context
    Ask(commands::ask::AskArgs),
    /// Score a free-text mood note from 1 to 10
    Mood(commands::mood::MoodArgs),
    /// Inspect or update a user's rolling memory
    Memory(commands::memory::MemoryArgs),
}

/// Print `err` to stderr, as JSON in JSON mode, and exit non-zero.
///
/// Determinism violations exit with status 3 so scripts can tell them apart.
pub fn handle_error(err: anyhow::Error, json_mode: bool) -> ! {
    let determinism = err
        .downcast_ref::<DomainError>()
        .is_some_and(DomainError::is_determinism_violation);

    if json_mode {
        let body = serde_json::json!({
            "error": format!("{err:#}"),
            "determinism_violation": determinism,
        });
        eprintln!("{body}");
    } else {
        eprintln!("{} {err:#}", console::style("error:").red().bold());
    }

    std::process::exit(if determinism { 3 } else { 1 })
}
