//! Voice: adjusts delivery of the response text without changing its content.

use crate::domain::models::{
    EmotionalTone, EnergyLevel, PresenceDescriptor, SilenceDescriptor, Voice, VoiceResult,
};

const TAKE_CARE: &str = " Take care.";
/// Trailing clauses this short are dropped by the minimal voice.
const SHORT_CLAUSE_WORDS: usize = 5;

/// Select a voice in priority order and apply it to `text`.
///
/// Closure beats a warm tone, which beats low energy. Anything else keeps
/// the text untouched.
pub fn apply_voice(
    text: &str,
    presence: &PresenceDescriptor,
    silence: &SilenceDescriptor,
) -> VoiceResult {
    if silence.should_close {
        VoiceResult {
            voice: Voice::Minimal,
            text: minimal(text),
            notes: "Minimal: condensed, direct phrasing.".to_string(),
        }
    } else if presence.emotional_tone == EmotionalTone::Warm {
        VoiceResult {
            voice: Voice::Soft,
            text: soft(text),
            notes: "Soft: gentle cadence, softened edges.".to_string(),
        }
    } else if presence.energy_level == EnergyLevel::Low {
        VoiceResult {
            voice: Voice::Grounded,
            text: grounded(text),
            notes: "Grounded: slower rhythm, fewer clauses.".to_string(),
        }
    } else {
        VoiceResult {
            voice: Voice::Steady,
            text: text.to_string(),
            notes: "Steady: neutral, calm delivery.".to_string(),
        }
    }
}

fn sentences(text: &str) -> Vec<&str> {
    text.split('.')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

fn minimal(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if !collapsed.ends_with('.') {
        return collapsed;
    }
    let parts = sentences(&collapsed);
    match parts.split_last() {
        Some((last, kept))
            if !kept.is_empty() && last.split_whitespace().count() <= SHORT_CLAUSE_WORDS =>
        {
            format!("{}.", kept.join(". "))
        }
        _ => collapsed,
    }
}

fn soft(text: &str) -> String {
    let parts = sentences(text);
    let mut out = match parts.split_first() {
        Some((first, rest)) => {
            let first = comma_pause(first);
            if rest.is_empty() {
                first
            } else {
                format!("{first}. {}", rest.join(". "))
            }
        }
        None => text.to_string(),
    };
    if !out.ends_with(TAKE_CARE) {
        out = format!("{}.{TAKE_CARE}", out.trim_end_matches('.'));
    }
    out
}

/// Replace the first space past the middle of a long clause with ", ".
fn comma_pause(clause: &str) -> String {
    if clause.contains(',') || clause.split_whitespace().count() <= 4 {
        return clause.to_string();
    }
    let middle = clause
        .char_indices()
        .nth(clause.chars().count() / 2)
        .map_or(clause.len(), |(i, _)| i);
    match clause[middle..].find(' ') {
        Some(offset) => {
            let at = middle + offset;
            format!("{}, {}", &clause[..at], &clause[at + 1..])
        }
        None => clause.to_string(),
    }
}

fn grounded(text: &str) -> String {
    let text = if text.contains(',') {
        text.replace(',', ".").replace("..", ".")
    } else {
        text.to_string()
    };
    format!("{}.", sentences(&text).join(". "))
}
