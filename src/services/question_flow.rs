//! Question selection and the gentle answer-handling flow around it.

use serde::Serialize;

use crate::domain::models::FlowContext;

const DAILY_QUESTIONS: [&str; 5] = [
    "How does your energy feel right now?",
    "What kind of mood are you noticing today?",
    "Is anything weighing on you today?",
    "How is your focus feeling at the moment?",
    "Do you feel steady or uncertain right now?",
];

const DEEP_QUESTIONS: [&str; 3] = [
    "Is there something meaningful on your mind today?",
    "Would you like to gently reflect on something deeper?",
    "Is there a challenge you'd like to sit with for a moment?",
];

const DEEP_OFFER: &str = "Would you like to gently reflect on something deeper? (yes/no)";

pub const SKIP_MESSAGE: &str = "That's completely fine. We can skip any question—no pressure at all.";
pub const STOP_MESSAGE: &str = "Thank you for reflecting today. Remember, you can pause or stop \
                                anytime. Take care and be gentle with yourself.";
pub const DEEP_ACCEPTED_MESSAGE: &str =
    "Thank you for your openness. Let's gently reflect on something meaningful.";

const SKIP_ANSWERS: [&str; 5] = ["skip", "pass", "not today", "no thanks", "no thank you"];
const DEEP_YES_ANSWERS: [&str; 7] = ["yes", "sure", "okay", "ok", "let's do it", "i agree", "please"];

/// Energy at or below which only the first two questions are asked.
const LOW_ENERGY: u8 = 3;

/// Today's questions. Low energy gets two, otherwise all five plus one deep
/// question once the user agreed to go deeper.
pub fn today_questions(energy: Option<u8>, deep_agreed: bool) -> Vec<String> {
    if energy.is_some_and(|e| e <= LOW_ENERGY) {
        return DAILY_QUESTIONS[..2].iter().map(|q| (*q).to_string()).collect();
    }
    let mut questions: Vec<String> = DAILY_QUESTIONS.iter().map(|q| (*q).to_string()).collect();
    if deep_agreed {
        questions.push(DEEP_QUESTIONS[0].to_string());
    }
    questions
}

/// One recorded answer; `None` when the question was skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Answered {
    pub question: String,
    pub answer: Option<String>,
}

/// Everything said during one walk through the questions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlowTranscript {
    /// Questions, answers and replies in the order they were spoken.
    pub exchanges: Vec<String>,
    pub answered: Vec<Answered>,
    pub deep_agreed: bool,
    pub stopped: bool,
}

impl FlowTranscript {
    /// Flow context for a session created from this exchange.
    pub fn flow_context(&self) -> FlowContext {
        FlowContext {
            questions_asked: Some(u32::try_from(self.answered.len()).unwrap_or(u32::MAX)),
            deep_agreed: self.deep_agreed,
            ..FlowContext::default()
        }
    }
}

/// Stateful walk through today's questions.
#[derive(Debug, Clone, Default)]
pub struct ReflectionFlow {
    energy: Option<u8>,
    asked: Vec<String>,
    answered: Vec<Answered>,
    stopped: bool,
    deep_asked: bool,
    deep_agreed: bool,
}

impl ReflectionFlow {
    pub fn new(energy: Option<u8>) -> Self {
        Self {
            energy,
            ..Self::default()
        }
    }

    fn low_energy(&self) -> bool {
        self.energy.is_some_and(|e| e <= LOW_ENERGY)
    }

    fn medium_or_high_energy(&self) -> bool {
        self.energy.is_some_and(|e| e > LOW_ENERGY)
    }

    pub const fn stopped(&self) -> bool {
        self.stopped
    }

    pub const fn deep_agreed(&self) -> bool {
        self.deep_agreed
    }

    pub fn answered(&self) -> &[Answered] {
        &self.answered
    }

    pub fn next_questions(&mut self) -> Vec<String> {
        self.asked = today_questions(self.energy, self.deep_agreed);
        self.asked.clone()
    }

    /// Record an answer, returning the flow's reply when it has one.
    pub fn answer(&mut self, question: &str, answer: &str) -> Option<&'static str> {
        let normalized = answer.trim().to_lowercase();
        if SKIP_ANSWERS.contains(&normalized.as_str()) {
            self.answered.push(Answered {
                question: question.to_string(),
                answer: None,
            });
            return Some(SKIP_MESSAGE);
        }
        if normalized.contains("enough for today") || normalized == "stop" {
            self.stopped = true;
            return Some(STOP_MESSAGE);
        }
        if self.is_deep_permission(question, answer) {
            self.deep_agreed = true;
            return Some(DEEP_ACCEPTED_MESSAGE);
        }
        self.answered.push(Answered {
            question: question.to_string(),
            answer: Some(answer.to_string()),
        });
        None
    }

    fn is_deep_permission(&self, question: &str, answer: &str) -> bool {
        if !self.medium_or_high_energy() {
            return false;
        }
        let question = question.to_lowercase();
        (question.contains("something meaningful") || question.contains("gently reflect"))
            && DEEP_YES_ANSWERS.contains(&answer.trim().to_lowercase().as_str())
    }

    /// Run the whole exchange, asking `respond` for each answer.
    ///
    /// After the first answered question a medium or high energy user is
    /// offered one deeper question. Low energy or an explicit stop ends with
    /// the gentle stop message.
    pub fn run(mut self, mut respond: impl FnMut(&str) -> String) -> FlowTranscript {
        let mut exchanges = Vec::new();
        let questions = self.next_questions();

        for question in &questions {
            if self.stopped {
                break;
            }
            exchanges.push(question.clone());
            let answer = respond(question);
            exchanges.push(answer.clone());
            if let Some(reply) = self.answer(question, &answer) {
                exchanges.push(reply.to_string());
            }
            if self.stopped {
                break;
            }

            if !self.deep_asked && self.medium_or_high_energy() && !self.deep_agreed {
                exchanges.push(DEEP_OFFER.to_string());
                let reply = respond(DEEP_OFFER);
                exchanges.push(reply.clone());
                if self.is_deep_permission(DEEP_OFFER, &reply) {
                    self.deep_agreed = true;
                    let deep = today_questions(self.energy, true)
                        .into_iter()
                        .find(|q| !questions.contains(q));
                    if let Some(deep) = deep {
                        exchanges.push(deep.clone());
                        let answer = respond(&deep);
                        exchanges.push(answer.clone());
                        self.answer(&deep, &answer);
                    }
                }
                self.deep_asked = true;
            }
        }

        if self.low_energy() || self.stopped {
            exchanges.push(STOP_MESSAGE.to_string());
        }
        FlowTranscript {
            exchanges,
            answered: self.answered,
            deep_agreed: self.deep_agreed,
            stopped: self.stopped,
        }
    }
}
