//! `reflecto mood`: score a free-text mood note.

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use crate::cli::context::llm_bridge;
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::Config;
use crate::services::{score_mood, DeterminismGuard};

#[derive(Args, Debug)]
pub struct MoodArgs {
    /// The note to score, e.g. "feeling great today"
    pub note: String,
}

#[derive(Debug, Serialize)]
pub struct MoodScore {
    pub note: String,
    pub score: Option<u8>,
}

impl CommandOutput for MoodScore {
    fn to_human(&self) -> String {
        match self.score {
            Some(score) => format!("Mood score: {score}/10"),
            None => "No mood score could be derived.".to_string(),
        }
    }
}

pub async fn execute(args: MoodArgs, config: &Config, json_mode: bool) -> Result<()> {
    let guard = DeterminismGuard::from_config(config.determinism.deterministic);
    let bridge = llm_bridge(config)?;
    let score = score_mood(&args.note, bridge.as_deref(), guard).await;
    output(
        &MoodScore {
            note: args.note,
            score,
        },
        json_mode,
    );
    Ok(())
}
