//! Turns a free-text mood note into a 1-10 score.

use tracing::{debug, warn};

use super::determinism::DeterminismGuard;
use crate::domain::ports::LlmBridge;

/// Checked in order; the first whole-word hit wins.
pub const MOOD_KEYWORDS: [(&str, u8); 17] = [
    ("great", 8),
    ("good", 7),
    ("okay", 5),
    ("fine", 6),
    ("bad", 3),
    ("sad", 2),
    ("tired", 4),
    ("stressed", 2),
    ("happy", 8),
    ("excellent", 9),
    ("terrible", 1),
    ("amazing", 9),
    ("awful", 1),
    ("calm", 7),
    ("energized", 8),
    ("angry", 2),
    ("worried", 3),
];

fn clamp_score(score: u64) -> u8 {
    u8::try_from(score.clamp(1, 10)).unwrap_or(10)
}

fn words(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|w| !w.is_empty())
}

/// Score from the keyword table, then from the first standalone 1-2 digit number.
pub fn score_without_llm(note: &str) -> Option<u8> {
    let lower = note.to_lowercase();
    let found: Vec<&str> = words(&lower).collect();

    if let Some((_, score)) = MOOD_KEYWORDS.iter().find(|(k, _)| found.contains(k)) {
        return Some(clamp_score(u64::from(*score)));
    }

    found
        .iter()
        .find(|w| (1..=2).contains(&w.len()) && w.chars().all(|c| c.is_ascii_digit()))
        .and_then(|w| w.parse::<u64>().ok())
        .map(clamp_score)
}

fn first_number(text: &str) -> Option<u64> {
    let start = text.find(|c: char| c.is_ascii_digit())?;
    let digits: String = text[start..].chars().take_while(char::is_ascii_digit).collect();
    // An overlong run still reads as "very high".
    Some(digits.parse().unwrap_or(u64::MAX))
}

/// Score a note, falling back to the LLM bridge when no local rule matches.
///
/// In deterministic mode a bridge that is not deterministic-safe is skipped.
/// Any bridge failure yields `None`.
pub async fn score_mood(
    note: &str,
    llm: Option<&dyn LlmBridge>,
    guard: DeterminismGuard,
) -> Option<u8> {
    if note.trim().is_empty() {
        return None;
    }
    if let Some(score) = score_without_llm(note) {
        return Some(score);
    }

    let llm = llm?;
    if guard.check_llm(llm).is_err() {
        debug!(bridge = llm.name(), "Mood scoring skipped unsafe bridge");
        return None;
    }

    let prompt = format!(
        "Assign a mood score from 1 (very negative) to 10 (very positive) for the following \
         statement: '{note}'. Respond with only the number."
    );
    match llm.generate(&prompt).await {
        Ok(reply) => first_number(&reply).map(clamp_score),
        Err(e) => {
            warn!(bridge = llm.name(), error = %e, "Mood scoring bridge failed");
            None
        }
    }
}
