//! API Request and Response Models
//!
//! These types describe the JSON bodies of the HTTP API and feed the OpenAPI
//! document generated with `utoipa`.

use serde::{Deserialize, Serialize};
use twentyq_core::{HistoryEntry, StepInput};
use utoipa::ToSchema;

pub const DEFAULT_DOMAIN: &str = "character";

/// Body of `POST /api/step`. Every field is optional.
#[derive(Deserialize, ToSchema, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct StepPayload {
    /// What kind of thing the player is thinking of. Defaults to "character".
    #[schema(example = "character")]
    #[serde(default)]
    pub domain: Option<String>,
    /// Every question asked so far, oldest first.
    #[serde(default)]
    pub history: Option<Vec<HistoryEntry>>,
    /// Defaults to the history length. Informational only.
    #[serde(default)]
    pub turns: Option<usize>,
    /// Ask the model to commit to a final guess this turn.
    #[serde(default)]
    pub force_final: Option<bool>,
    /// Free-text hint from the player.
    #[schema(example = "")]
    #[serde(default)]
    pub hint: Option<String>,
}

impl From<StepPayload> for StepInput {
    fn from(payload: StepPayload) -> Self {
        let history = payload.history.unwrap_or_default();
        let domain = payload
            .domain
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| DEFAULT_DOMAIN.to_string());
        StepInput {
            domain,
            turns: payload.turns.unwrap_or(history.len()),
            history,
            force_final: payload.force_final.unwrap_or(false),
            hint: payload.hint.unwrap_or_default(),
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema, Debug)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Serialize, Deserialize, ToSchema, Debug)]
pub struct HealthResponse {
    #[schema(example = "ok")]
    pub status: String,
}
