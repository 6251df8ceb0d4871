//! `reflecto ask`: walk through today's questions on the terminal.

use std::io::BufRead;

use anyhow::{Context, Result};
use clap::Args;

use crate::cli::output::{output, CommandOutput};
use crate::services::question_flow::{FlowTranscript, ReflectionFlow};

/// Answer given when stdin closes mid-flow.
const END_OF_INPUT: &str = "stop";

#[derive(Args, Debug)]
pub struct AskArgs {
    /// Current energy from 1 to 10; 3 or below keeps it to two questions
    #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=10))]
    pub energy: Option<u8>,
}

impl CommandOutput for FlowTranscript {
    fn to_human(&self) -> String {
        let answered = self.answered.iter().filter(|a| a.answer.is_some()).count();
        let skipped = self.answered.len() - answered;
        let mut out = format!("Answered {answered}, skipped {skipped}.");
        if self.deep_agreed {
            out.push_str(" Went deeper.");
        }
        if self.stopped {
            out.push_str(" Stopped early.");
        }
        out.push_str("\nFlow context: ");
        out.push_str(&serde_json::to_string(&self.flow_context()).unwrap_or_default());
        out
    }
}

/// Run the flow against `input`, echoing each prompt to `prompt`.
pub fn run_flow(
    energy: Option<u8>,
    mut input: impl BufRead,
    mut prompt: impl FnMut(&str),
) -> FlowTranscript {
    ReflectionFlow::new(energy).run(|question| {
        prompt(question);
        let mut line = String::new();
        match input.read_line(&mut line) {
            Ok(0) | Err(_) => END_OF_INPUT.to_string(),
            Ok(_) => line.trim_end().to_string(),
        }
    })
}

pub async fn execute(args: AskArgs, json_mode: bool) -> Result<()> {
    let transcript = tokio::task::spawn_blocking(move || {
        let stdin = std::io::stdin();
        run_flow(args.energy, stdin.lock(), |question| {
            eprintln!("{}", console::style(question).cyan());
        })
    })
    .await
    .context("Question flow task failed")?;

    output(&transcript, json_mode);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_flow_reads_answers_line_by_line() {
        let mut prompts = Vec::new();
        let transcript = run_flow(Some(2), Cursor::new("tired\nskip\n"), |q| prompts.push(q.to_string()));

        assert_eq!(prompts.len(), 2);
        assert_eq!(transcript.answered[0].answer.as_deref(), Some("tired"));
        assert_eq!(transcript.answered[1].answer, None);
        assert_eq!(transcript.flow_context().questions_asked, Some(2));
        assert!(transcript.to_human().starts_with("Answered 1, skipped 1."));
    }

    #[test]
    fn test_closed_input_stops_gently() {
        let transcript = run_flow(Some(8), Cursor::new(""), |_| {});
        assert!(transcript.stopped);
        assert!(transcript.answered.is_empty());
        assert_eq!(transcript.exchanges[1], END_OF_INPUT);
    }
}
