use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use serde::Serialize;
use serde_json::Value;

use super::read_json_input;
use crate::adapters::stores::FileMemoryStore;
use crate::cli::output::{output, table, CommandOutput};
use crate::domain::models::{Config, DailyState, HistoryEntry, MemoryPatterns, RollingMemory};
use crate::domain::ports::MemoryStore;
use crate::services::memory_intelligence::{analyze_memory_patterns, update_memory};

#[derive(Args, Debug)]
pub struct MemoryArgs {
    #[command(subcommand)]
    pub command: MemoryCommands,
}

#[derive(Subcommand, Debug)]
pub enum MemoryCommands {
    /// Show a user's rolling memory and the patterns found in it
    Show {
        /// User ID
        user_id: String,
    },
    /// Append one day's state to a user's rolling memory
    Update {
        /// User ID
        user_id: String,
        /// Daily state JSON file ({date, mood, energy, ...}); "-" for stdin
        #[arg(short, long)]
        state: PathBuf,
    },
}

#[derive(Debug, Serialize)]
pub struct MemoryReport {
    pub user_id: String,
    pub memory: RollingMemory,
    pub patterns: MemoryPatterns,
}

impl CommandOutput for MemoryReport {
    fn to_human(&self) -> String {
        let memory = &self.memory;
        let mut lines = vec![format!(
            "Rolling memory for {} ({} day(s))",
            self.user_id,
            memory.history.len()
        )];

        let mut t = table(&["Category", "Recurring"]);
        for (category, labels) in [
            ("moods", &memory.recurring_moods),
            ("stressors", &memory.recurring_stressors),
            ("focus", &memory.recurring_focus_patterns),
            ("themes", &memory.recurring_themes),
        ] {
            let shown = if labels.is_empty() { "-".to_string() } else { labels.join(", ") };
            t.add_row(vec![category.to_string(), shown]);
        }
        lines.push(t.to_string());
        lines.push(format!(
            "Energy trend: {:?}  Meaning trend: {:?}",
            self.patterns.energy_trend, self.patterns.meaning_trend
        ));
        lines.join("\n")
    }
}

pub async fn execute(args: MemoryArgs, config: &Config, json_mode: bool) -> Result<()> {
    let store = FileMemoryStore::new(&config.stores.profile_dir);

    let (user_id, memory) = match args.command {
        MemoryCommands::Show { user_id } => {
            let memory = store.load_memory(&user_id).await?;
            (user_id, memory)
        }
        MemoryCommands::Update { user_id, state } => {
            let value: Value = read_json_input(&state).await?;
            let today = DailyState::from_value(&value).context("Invalid daily state")?;
            let previous = store.load_memory(&user_id).await?;
            let memory = update_memory(&previous, &today);
            store.save_memory(&user_id, &memory).await?;
            (user_id, memory)
        }
    };

    let history: Vec<HistoryEntry> = memory.history.iter().map(HistoryEntry::from).collect();
    let patterns = analyze_memory_patterns(&history);
    output(
        &MemoryReport {
            user_id,
            memory,
            patterns,
        },
        json_mode,
    );
    Ok(())
}
