//! Continuity: gently recall one past pattern, or none.

use crate::domain::models::{
    ContinuityDescriptor, MemoryPatterns, RecallStyle, SilenceDescriptor, Trend,
};

pub const MEANING_RISING_PHRASE: &str = "There's a gentle sense of meaning growing here.";
pub const ENERGY_DECLINING_PHRASE: &str = "If things feel a little heavier lately, that's okay.";
pub const RECURRING_THEME_PHRASE: &str =
    "This feels like something that's been visiting you lately.";

/// Pick at most one recall, first matching branch wins.
pub fn decide_continuity(
    memory: &MemoryPatterns,
    silence: &SilenceDescriptor,
) -> ContinuityDescriptor {
    if silence.should_close {
        return ContinuityDescriptor {
            should_recall: false,
            recall_style: RecallStyle::None,
            recall_phrase: None,
            notes: "Silence requested closure. No recall.".to_string(),
        };
    }

    let (recall_style, phrase, notes) = if memory.meaning_trend == Trend::Rising {
        (
            RecallStyle::Gentle,
            Some(MEANING_RISING_PHRASE),
            "Meaning trend rising → gentle recall.",
        )
    } else if memory.energy_trend == Trend::Declining {
        (
            RecallStyle::Soft,
            Some(ENERGY_DECLINING_PHRASE),
            "Energy trend declining → soft reassurance.",
        )
    } else if !memory.recurring_themes.is_empty() {
        (
            RecallStyle::Gentle,
            Some(RECURRING_THEME_PHRASE),
            "Recurring theme present → gentle recall.",
        )
    } else {
        (RecallStyle::None, None, "No recall-worthy pattern found.")
    };

    ContinuityDescriptor {
        should_recall: recall_style != RecallStyle::None,
        recall_style,
        recall_phrase: phrase.map(str::to_string),
        notes: notes.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open() -> SilenceDescriptor {
        SilenceDescriptor {
            should_pause: false,
            pause_type: crate::domain::models::PauseType::None,
            should_close: false,
            closure_style: crate::domain::models::ClosureStyle::None,
            notes: String::new(),
        }
    }

    #[test]
    fn test_closure_blocks_recall() {
        let memory = MemoryPatterns {
            meaning_trend: Trend::Rising,
            ..MemoryPatterns::default()
        };
        let silence = SilenceDescriptor {
            should_close: true,
            ..open()
        };
        let continuity = decide_continuity(&memory, &silence);
        assert!(!continuity.should_recall);
        assert_eq!(continuity.recall_phrase, None);
    }

    #[test]
    fn test_priority_order() {
        let memory = MemoryPatterns {
            meaning_trend: Trend::Rising,
            energy_trend: Trend::Declining,
            recurring_themes: vec!["work".to_string()],
            ..MemoryPatterns::default()
        };
        let continuity = decide_continuity(&memory, &open());
        assert_eq!(continuity.recall_style, RecallStyle::Gentle);
        assert_eq!(continuity.recall_phrase.as_deref(), Some(MEANING_RISING_PHRASE));

        let memory = MemoryPatterns {
            meaning_trend: Trend::Stable,
            ..memory
        };
        let continuity = decide_continuity(&memory, &open());
        assert_eq!(continuity.recall_style, RecallStyle::Soft);
        assert_eq!(continuity.recall_phrase.as_deref(), Some(ENERGY_DECLINING_PHRASE));

        let memory = MemoryPatterns {
            energy_trend: Trend::Stable,
            ..memory
        };
        let continuity = decide_continuity(&memory, &open());
        assert_eq!(continuity.recall_phrase.as_deref(), Some(RECURRING_THEME_PHRASE));
    }

    #[test]
    fn test_nothing_to_recall() {
        let continuity = decide_continuity(&MemoryPatterns::default(), &open());
        assert!(!continuity.should_recall);
        assert_eq!(continuity.recall_style, RecallStyle::None);
        assert_eq!(continuity.notes, "No recall-worthy pattern found.");
    }
}
