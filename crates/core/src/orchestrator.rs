//! Turn Orchestration
//!
//! Drives one game step end to end: render the prompt, ask the model, validate
//! what came back, and push back on questions that were already asked.

use crate::{
    error::GameError,
    game_types::{GameAction, HistoryEntry, Message, PromptContext},
    interpreter::{JsonObject, action_type},
    llm_client::InferenceClient,
    prompts::build_messages,
    repeat::RepeatDetector,
};
use serde_json::Value;
use tracing::{debug, info, warn};

/// Longest question, in characters, passed back to the caller.
pub const MAX_QUESTION_CHARS: usize = 200;
/// Longest guess, in characters, passed back to the caller.
pub const MAX_GUESS_CHARS: usize = 120;
/// Model calls allowed per step when it keeps repeating itself.
pub const MAX_ATTEMPTS: usize = 3;

/// The caller's request for the next move.
#[derive(Debug, Clone)]
pub struct StepInput {
    pub domain: String,
    pub history: Vec<HistoryEntry>,
    /// Informational only.
    pub turns: usize,
    pub force_final: bool,
    pub hint: String,
}

pub struct TurnOrchestrator {
    client: InferenceClient,
    detector: RepeatDetector,
    max_attempts: usize,
}

impl TurnOrchestrator {
    pub fn new(client: InferenceClient) -> Self {
        Self {
            client,
            detector: RepeatDetector::default(),
            max_attempts: MAX_ATTEMPTS,
        }
    }

    pub fn with_detector(mut self, detector: RepeatDetector) -> Self {
        self.detector = detector;
        self
    }

    /// Produces the next action for the game described by `input`.
    ///
    /// A repeated question is answered with a corrective system message and
    /// another model call. Once the attempts run out the last question is
    /// returned even if it is still a repeat.
    pub async fn step(&self, input: StepInput) -> Result<GameAction, GameError> {
        let StepInput {
            domain,
            history,
            turns,
            force_final,
            hint,
        } = input;
        debug!(%domain, turns, force_final, "Starting step");

        let context = PromptContext {
            domain,
            history,
            force_final,
            hint,
        };
        let mut messages = build_messages(&context);

        let mut attempt = 1;
        loop {
            let object = self.client.call_inference(&messages).await?;
            let action = validate_action(&object)?;

            let repeated = match &action {
                GameAction::Ask { question } => self.detector.is_repeat(question, &context.history),
                _ => false,
            };
            if !repeated {
                return Ok(action);
            }

            if attempt >= self.max_attempts {
                warn!(attempts = attempt, "Model kept repeating questions; returning last one");
                return Ok(action);
            }

            if let GameAction::Ask { question } = &action {
                info!(attempt, %question, "Model repeated an earlier question; correcting");
                messages.push(correction_message(question));
            }
            attempt += 1;
        }
    }
}

fn correction_message(question: &str) -> Message {
    Message::system(format!(
        "You already asked \"{}\" (or something equivalent). Do not repeat it. \
         Ask about an attribute none of the previous questions has explored.",
        question
    ))
}

/// Turns a model object into a [`GameAction`], truncating text fields and
/// clamping confidence.
pub fn validate_action(object: &JsonObject) -> Result<GameAction, GameError> {
    match action_type(object) {
        Some("ask") => {
            let question = truncate_chars(&text_field(object, "question"), MAX_QUESTION_CHARS);
            if question.is_empty() {
                return Err(GameError::MissingField("question"));
            }
            Ok(GameAction::Ask { question })
        }
        Some(kind @ ("guess" | "final")) => {
            let guess = truncate_chars(&text_field(object, "guess"), MAX_GUESS_CHARS);
            if guess.is_empty() {
                return Err(GameError::MissingField("guess"));
            }
            let confidence = coerce_confidence(object.get("confidence"));
            Ok(if kind == "guess" {
                GameAction::Guess { guess, confidence }
            } else {
                GameAction::Final { guess, confidence }
            })
        }
        Some(other) => Err(GameError::InvalidType(other.to_string())),
        None => Err(GameError::InvalidType(String::new())),
    }
}

fn text_field(object: &JsonObject, key: &str) -> String {
    match object.get(key) {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

/// Keeps the first `max` characters of `text`.
pub fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

/// Reads a confidence value from a number or numeric string.
pub fn coerce_confidence(value: Option<&Value>) -> f64 {
    let raw = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    clamp_confidence(raw.unwrap_or(0.0))
}

/// Clamps into `[0, 1]`; non-finite values become 0.
pub fn clamp_confidence(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}
