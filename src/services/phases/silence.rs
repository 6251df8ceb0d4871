//! Silence: whether to pause and whether to wind the conversation down.

use crate::domain::models::{
    ClosureStyle, EmotionalTone, FlowContext, MemoryPatterns, Pacing, PauseType,
    PresenceDescriptor, SilenceDescriptor, Trend,
};

/// Questions after which silence asks for closure.
const CLOSE_AFTER_QUESTIONS: u32 = 6;

/// Decide pausing and closure from presence, memory and flow.
pub fn decide_silence(
    presence: &PresenceDescriptor,
    memory: &MemoryPatterns,
    flow: &FlowContext,
) -> SilenceDescriptor {
    let mut notes = Vec::new();
    let mut should_pause = false;

    if presence.energy.is_some_and(|e| e <= 5) {
        should_pause = true;
        notes.push("Low energy triggers pause.");
    }
    if presence.stress.is_some_and(|s| s >= 7) {
        should_pause = true;
        notes.push("High stress triggers pause.");
    }
    if memory.meaning_trend == Trend::Declining {
        should_pause = true;
        notes.push("Declining meaning trend triggers pause.");
    }

    let warm = presence.emotional_tone == EmotionalTone::Warm;
    let pause_type = if !should_pause {
        PauseType::None
    } else if presence.pacing == Pacing::Slow {
        notes.push("Slow pacing → long pause.");
        PauseType::Long
    } else if warm {
        notes.push("Warm tone → short pause.");
        PauseType::Short
    } else {
        notes.push("Default to long pause.");
        PauseType::Long
    };

    let should_close = flow
        .questions_asked
        .is_some_and(|q| q >= CLOSE_AFTER_QUESTIONS);
    let mut closure_style = ClosureStyle::None;
    if should_close {
        closure_style = ClosureStyle::Gentle;
        notes.push("Many questions answered → gentle closure.");
        if warm {
            closure_style = ClosureStyle::Warm;
            notes.push("Warm tone → warm closure.");
        }
    }

    SilenceDescriptor {
        should_pause,
        pause_type,
        should_close,
        closure_style,
        notes: notes.join(" "),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn presence(energy: u8, stress: u8) -> PresenceDescriptor {
        PresenceDescriptor {
            energy: Some(energy),
            stress: Some(stress),
            ..PresenceDescriptor::default()
        }
    }

    fn asked(n: u32) -> FlowContext {
        FlowContext {
            questions_asked: Some(n),
            ..FlowContext::default()
        }
    }

    #[test]
    fn test_no_triggers() {
        let silence = decide_silence(&presence(8, 2), &MemoryPatterns::default(), &asked(1));
        assert!(!silence.should_pause);
        assert_eq!(silence.pause_type, PauseType::None);
        assert!(!silence.should_close);
        assert_eq!(silence.closure_style, ClosureStyle::None);
        assert_eq!(silence.notes, "");
    }

    #[test]
    fn test_low_energy_and_slow_pacing_pause_long() {
        let mut p = presence(3, 8);
        p.pacing = Pacing::Slow;
        let silence = decide_silence(&p, &MemoryPatterns::default(), &FlowContext::default());
        assert!(silence.should_pause);
        assert_eq!(silence.pause_type, PauseType::Long);
        assert_eq!(
            silence.notes,
            "Low energy triggers pause. High stress triggers pause. Slow pacing → long pause."
        );
    }

    #[test]
    fn test_declining_meaning_with_warm_tone() {
        let mut p = presence(8, 2);
        p.emotional_tone = EmotionalTone::Warm;
        let memory = MemoryPatterns {
            meaning_trend: Trend::Declining,
            ..MemoryPatterns::default()
        };
        let silence = decide_silence(&p, &memory, &asked(6));
        assert_eq!(silence.pause_type, PauseType::Short);
        assert!(silence.should_close);
        assert_eq!(silence.closure_style, ClosureStyle::Warm);
        assert!(silence.notes.ends_with("Warm tone → warm closure."));
    }

    #[test]
    fn test_default_presence_never_pauses_on_numbers() {
        let silence = decide_silence(
            &PresenceDescriptor::default(),
            &MemoryPatterns::default(),
            &asked(7),
        );
        assert!(!silence.should_pause);
        assert!(silence.should_close);
        assert_eq!(silence.closure_style, ClosureStyle::Gentle);
    }
}
