//! Closing: when and how to gently end the interaction.

use crate::domain::models::{
    ClosingDescriptor, ClosureStyle, FlowContext, PresenceDescriptor, SilenceDescriptor,
    VoiceResult,
};

const CLOSE_AFTER_QUESTIONS: u32 = 4;

/// Voice labels that earn a warm closing.
const WARM_VOICES: [&str; 4] = ["warm", "caring", "gentle", "soft"];

/// Decide closure and pick the phrase from the fixed table.
pub fn decide_closing(
    presence: &PresenceDescriptor,
    silence: &SilenceDescriptor,
    voice: &VoiceResult,
    flow: &FlowContext,
) -> ClosingDescriptor {
    let notes = if silence.should_close {
        "Closure triggered by silence descriptor."
    } else if flow
        .questions_asked
        .is_some_and(|q| q >= CLOSE_AFTER_QUESTIONS)
    {
        "Closure triggered by number of questions."
    } else {
        return ClosingDescriptor {
            should_close: false,
            closing_style: ClosureStyle::None,
            closing_phrase: None,
            notes: "No closure triggered.".to_string(),
        };
    };

    let closing_style = if WARM_VOICES.contains(&voice.voice.as_str()) {
        ClosureStyle::Warm
    } else {
        ClosureStyle::Gentle
    };

    ClosingDescriptor {
        should_close: true,
        closing_style,
        closing_phrase: Some(closing_phrase(closing_style, presence.energy).to_string()),
        notes: notes.to_string(),
    }
}

/// Phrase table keyed by style and whether energy is low.
pub const fn closing_phrase(style: ClosureStyle, energy: Option<u8>) -> &'static str {
    let tired = matches!(energy, Some(e) if e <= 4);
    match (style, tired) {
        (ClosureStyle::Warm, true) => "We can leave this here for today.",
        (ClosureStyle::Warm, false) => "We don't have to do more right now.",
        (_, true) => "It's okay to stop here.",
        (_, false) => "We can come back to this when you're ready.",
    }
}
