//! One day's numeric self-report.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::errors::{DomainError, DomainResult};

/// Score used for any bounded field the caller leaves out.
pub const DEFAULT_SCORE: i64 = 5;

/// Names of the bounded fields, in wire order.
pub const SCORE_FIELDS: [&str; 7] = [
    "energy",
    "mood",
    "stress",
    "focus",
    "confidence",
    "body",
    "meaning",
];

/// A validated daily self-report.
///
/// Every bounded field is guaranteed to lie in `1..=10`. Instances can only be
/// obtained through [`DailyState::builder`] or deserialization, both of which
/// validate, so a `DailyState` in hand is always well-formed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawDailyState")]
pub struct DailyState {
    date: String,
    energy: u8,
    mood: u8,
    stress: u8,
    focus: u8,
    confidence: u8,
    body: u8,
    meaning: u8,
    optional_topic: Option<String>,
    optional_text: Option<String>,
}

impl DailyState {
    pub fn builder(date: impl Into<String>) -> DailyStateBuilder {
        DailyStateBuilder::new(date)
    }

    pub fn date(&self) -> &str {
        &self.date
    }

    pub const fn energy(&self) -> u8 {
        self.energy
    }

    pub const fn mood(&self) -> u8 {
        self.mood
    }

    pub const fn stress(&self) -> u8 {
        self.stress
    }

    pub const fn focus(&self) -> u8 {
        self.focus
    }

    pub const fn confidence(&self) -> u8 {
        self.confidence
    }

    pub const fn body(&self) -> u8 {
        self.body
    }

    pub const fn meaning(&self) -> u8 {
        self.meaning
    }

    pub fn optional_topic(&self) -> Option<&str> {
        self.optional_topic.as_deref()
    }

    pub fn optional_text(&self) -> Option<&str> {
        self.optional_text.as_deref()
    }

    /// Parse a loosely-typed JSON map, defaulting any missing score to 5.
    pub fn from_value(value: &Value) -> DomainResult<Self> {
        let raw: RawDailyState = serde_json::from_value(value.clone())?;
        Self::try_from(raw)
    }

    /// Whether a JSON map carries at least one bounded field.
    pub fn has_scores(value: &Value) -> bool {
        value
            .as_object()
            .is_some_and(|map| SCORE_FIELDS.iter().any(|f| map.contains_key(*f)))
    }
}

/// Wire shape accepted before validation.
#[derive(Debug, Deserialize)]
struct RawDailyState {
    date: String,
    #[serde(default = "default_score_value")]
    energy: Value,
    #[serde(default = "default_score_value")]
    mood: Value,
    #[serde(default = "default_score_value")]
    stress: Value,
    #[serde(default = "default_score_value")]
    focus: Value,
    #[serde(default = "default_score_value")]
    confidence: Value,
    #[serde(default = "default_score_value")]
    body: Value,
    #[serde(default = "default_score_value")]
    meaning: Value,
    #[serde(default)]
    optional_topic: Option<String>,
    #[serde(default)]
    optional_text: Option<String>,
}

fn default_score_value() -> Value {
    Value::from(DEFAULT_SCORE)
}

fn score(field: &str, value: &Value) -> DomainResult<u8> {
    value
        .as_i64()
        .filter(|v| (1..=10).contains(v))
        .and_then(|v| u8::try_from(v).ok())
        .ok_or_else(|| DomainError::ScoreOutOfRange(field.to_string()))
}

impl TryFrom<RawDailyState> for DailyState {
    type Error = DomainError;

    fn try_from(raw: RawDailyState) -> Result<Self, Self::Error> {
        Ok(Self {
            energy: score("energy", &raw.energy)?,
            mood: score("mood", &raw.mood)?,
            stress: score("stress", &raw.stress)?,
            focus: score("focus", &raw.focus)?,
            confidence: score("confidence", &raw.confidence)?,
            body: score("body", &raw.body)?,
            meaning: score("meaning", &raw.meaning)?,
            date: raw.date,
            optional_topic: raw.optional_topic,
            optional_text: raw.optional_text,
        })
    }
}

/// Builder that validates on [`DailyStateBuilder::build`].
#[derive(Debug, Clone)]
pub struct DailyStateBuilder {
    date: String,
    scores: [i64; 7],
    optional_topic: Option<String>,
    optional_text: Option<String>,
}

impl DailyStateBuilder {
    fn new(date: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            scores: [DEFAULT_SCORE; 7],
            optional_topic: None,
            optional_text: None,
        }
    }

    pub const fn energy(mut self, v: i64) -> Self {
        self.scores[0] = v;
        self
    }

    pub const fn mood(mut self, v: i64) -> Self {
        self.scores[1] = v;
        self
    }

    pub const fn stress(mut self, v: i64) -> Self {
        self.scores[2] = v;
        self
    }

    pub const fn focus(mut self, v: i64) -> Self {
        self.scores[3] = v;
        self
    }

    pub const fn confidence(mut self, v: i64) -> Self {
        self.scores[4] = v;
        self
    }

    pub const fn body(mut self, v: i64) -> Self {
        self.scores[5] = v;
        self
    }

    pub const fn meaning(mut self, v: i64) -> Self {
        self.scores[6] = v;
        self
    }

    pub fn topic(mut self, topic: impl Into<String>) -> Self {
        self.optional_topic = Some(topic.into());
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.optional_text = Some(text.into());
        self
    }

    pub fn build(self) -> DomainResult<DailyState> {
        let [energy, mood, stress, focus, confidence, body, meaning] = self.scores.map(Value::from);
        DailyState::try_from(RawDailyState {
            date: self.date,
            energy,
            mood,
            stress,
            focus,
            confidence,
            body,
            meaning,
            optional_topic: self.optional_topic,
            optional_text: self.optional_text,
        })
    }
}
