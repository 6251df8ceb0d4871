//! Presence: how the avatar holds itself today.

use crate::domain::models::{
    DailyState, EmotionalTone, EnergyLevel, Expression, FlowContext, MemoryPatterns, Pacing,
    PresenceDescriptor, PresenceStyle,
};

/// Map today's numeric state, memory and flow into qualitative descriptors.
///
/// Without a daily state the neutral default descriptor is returned.
pub fn build_presence(
    today: Option<&DailyState>,
    memory: &MemoryPatterns,
    flow: &FlowContext,
) -> PresenceDescriptor {
    let Some(state) = today else {
        return PresenceDescriptor::default();
    };

    let energy_level = match state.energy() {
        e if e <= 4 => EnergyLevel::Low,
        e if e >= 7 => EnergyLevel::High,
        _ => EnergyLevel::Medium,
    };

    let emotional_tone = if state.stress() >= 7 {
        EmotionalTone::Soft
    } else if state.mood() >= 7 {
        EmotionalTone::Steady
    } else {
        EmotionalTone::Neutral
    };

    let presence_style = match flow.main_mode.as_deref() {
        Some("closure") => PresenceStyle::Grounded,
        Some("explore") => PresenceStyle::Open,
        _ => PresenceStyle::Holding,
    };

    let pacing = if energy_level == EnergyLevel::Low {
        Pacing::Slow
    } else if memory.is_improving() {
        Pacing::Spacious
    } else {
        Pacing::Normal
    };

    let expression = if state.stress() <= 3 {
        Expression::Alert
    } else if memory.is_stable() {
        Expression::Neutral
    } else {
        Expression::Subtle
    };

    PresenceDescriptor {
        notes: format!(
            "Energy: {energy_level}, Tone: {emotional_tone}, Style: {presence_style}, \
             Pacing: {pacing}, Expression: {expression}."
        ),
        energy_level,
        emotional_tone,
        presence_style,
        pacing,
        expression,
        energy: Some(state.energy()),
        stress: Some(state.stress()),
    }
}
