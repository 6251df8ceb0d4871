//! Typed descriptors produced by the phase engines.
//!
//! Field names and label strings are part of the stored session format and
//! the event journal, so they serialize exactly as listed here.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! label_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $label)]
                $variant,
            )+
        }

        impl $name {
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $label,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

label_enum!(
    /// Coarse energy band.
    EnergyLevel { Low => "low", Medium => "medium", High => "high" }
);

label_enum!(
    /// Emotional tone. Presence only ever yields soft, neutral or steady;
    /// warm and grounded are accepted from callers that shape text directly.
    EmotionalTone {
        Soft => "soft",
        Neutral => "neutral",
        Steady => "steady",
        Warm => "warm",
        Grounded => "grounded",
    }
);

label_enum!(
    /// Holding style. `Contained` is only supplied by callers.
    PresenceStyle {
        Holding => "holding",
        Open => "open",
        Grounded => "grounded",
        Contained => "contained",
    }
);

label_enum!(
    /// Conversational pacing.
    Pacing { Slow => "slow", Normal => "normal", Spacious => "spacious" }
);

label_enum!(
    /// Facial/bodily expression of the avatar.
    Expression { Subtle => "subtle", Neutral => "neutral", Alert => "alert" }
);

label_enum!(
    /// Length of a pause.
    PauseType { Short => "short", Long => "long", None => "none" }
);

label_enum!(
    /// How a closure is delivered; shared by silence and closing.
    ClosureStyle { Gentle => "gentle", Warm => "warm", None => "none" }
);

label_enum!(
    /// How a past pattern is recalled.
    RecallStyle { Soft => "soft", Gentle => "gentle", None => "none" }
);

label_enum!(
    /// Delivery voice chosen for the response text.
    Voice {
        Minimal => "minimal",
        Soft => "soft",
        Grounded => "grounded",
        Steady => "steady",
    }
);

/// Output of the presence phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresenceDescriptor {
    pub energy_level: EnergyLevel,
    pub emotional_tone: EmotionalTone,
    pub presence_style: PresenceStyle,
    pub pacing: Pacing,
    pub expression: Expression,
    pub notes: String,
    /// Raw energy reading the descriptor was built from.
    #[serde(skip)]
    pub energy: Option<u8>,
    /// Raw stress reading the descriptor was built from.
    #[serde(skip)]
    pub stress: Option<u8>,
}

impl Default for PresenceDescriptor {
    fn default() -> Self {
        Self {
            energy_level: EnergyLevel::Medium,
            emotional_tone: EmotionalTone::Neutral,
            presence_style: PresenceStyle::Holding,
            pacing: Pacing::Normal,
            expression: Expression::Neutral,
            notes: "No daily state provided.".to_string(),
            energy: None,
            stress: None,
        }
    }
}

/// Output of the silence phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SilenceDescriptor {
    pub should_pause: bool,
    pub pause_type: PauseType,
    pub should_close: bool,
    pub closure_style: ClosureStyle,
    pub notes: String,
}

/// Output of the continuity phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContinuityDescriptor {
    pub should_recall: bool,
    pub recall_style: RecallStyle,
    pub recall_phrase: Option<String>,
    pub notes: String,
}

/// Output of the voice phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceResult {
    pub voice: Voice,
    pub text: String,
    pub notes: String,
}

/// Output of the closing phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClosingDescriptor {
    pub should_close: bool,
    pub closing_style: ClosureStyle,
    pub closing_phrase: Option<String>,
    pub notes: String,
}
