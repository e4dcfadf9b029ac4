use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

/// One question the model asked and the answer the player gave.
///
/// The caller owns the game log and sends it back in full on every step; the
/// core never mutates it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HistoryEntry {
    #[schema(example = "Is it a man?")]
    pub q: String,
    #[schema(example = "yes")]
    pub a: String,
}

impl HistoryEntry {
    pub fn new(q: impl Into<String>, a: impl Into<String>) -> Self {
        Self {
            q: q.into(),
            a: a.into(),
        }
    }
}

/// The action produced for a single turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum GameAction {
    /// Ask the player one more yes/no question.
    Ask { question: String },
    /// A tentative guess; the game continues if it is wrong.
    Guess { guess: String, confidence: f64 },
    /// The model commits to its answer.
    Final { guess: String, confidence: f64 },
}

impl GameAction {
    /// The wire name of the action, as it appears in the `type` field.
    pub fn kind(&self) -> &'static str {
        match self {
            GameAction::Ask { .. } => "ask",
            GameAction::Guess { .. } => "guess",
            GameAction::Final { .. } => "final",
        }
    }
}

/// Everything the prompt builder needs to render one turn.
#[derive(Debug, Clone, Default)]
pub struct PromptContext {
    pub domain: String,
    pub history: Vec<HistoryEntry>,
    pub force_final: bool,
    pub hint: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::System => write!(f, "system"),
            Role::User => write!(f, "user"),
        }
    }
}

/// A single chat message as sent to the completion API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}
