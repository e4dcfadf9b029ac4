//! Axum Handlers for the REST API
//!
//! This module contains the logic for handling HTTP requests for game steps.
//! It uses `utoipa` doc comments to generate OpenAPI documentation.

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use twentyq_core::{GameAction, GameError, StepInput};

use crate::{
    models::{ErrorResponse, HealthResponse, StepPayload},
    state::AppState,
};

pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    MethodNotAllowed(String),
    Game(GameError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(error) => {
                (StatusCode::BAD_REQUEST, Json(ErrorResponse { error })).into_response()
            }
            ApiError::NotFound(error) => {
                (StatusCode::NOT_FOUND, Json(ErrorResponse { error })).into_response()
            }
            ApiError::MethodNotAllowed(error) => {
                (StatusCode::METHOD_NOT_ALLOWED, Json(ErrorResponse { error })).into_response()
            }
            ApiError::Game(err) => {
                error!("Step failed: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse {
                        error: err.to_string(),
                    }),
                )
                    .into_response()
            }
        }
    }
}

impl From<GameError> for ApiError {
    fn from(err: GameError) -> Self {
        Self::Game(err)
    }
}

/// Decodes a step body. An empty body, with or without a content type, means
/// "all defaults".
fn parse_step_payload(body: &[u8]) -> Result<StepPayload, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(StepPayload::default());
    }
    serde_json::from_slice(body).map_err(|e| {
        warn!(error = %e, "Rejected step payload");
        ApiError::BadRequest(format!("Invalid JSON body: {e}"))
    })
}

/// Produce the next move of the guessing game.
#[utoipa::path(
    post,
    path = "/api/step",
    request_body = StepPayload,
    responses(
        (status = 200, description = "The model's next action", body = GameAction),
        (status = 400, description = "Malformed request body", body = ErrorResponse),
        (status = 500, description = "Missing configuration, upstream failure or unusable model output", body = ErrorResponse)
    )
)]
#[instrument(name = "step", skip_all, fields(domain, history_len, turns, force_final))]
pub async fn step(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<GameAction>, ApiError> {
    let input = StepInput::from(parse_step_payload(&body)?);

    let span = tracing::Span::current();
    span.record("domain", input.domain.as_str());
    span.record("history_len", input.history.len());
    span.record("turns", input.turns);
    span.record("force_final", input.force_final);

    let action = state.orchestrator.step(input).await?;
    info!(action = action.kind(), "Step complete");
    Ok(Json(action))
}

/// Liveness probe.
#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse)
    )
)]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Fallback for any unknown path under `/api`.
pub async fn api_not_found() -> ApiError {
    ApiError::NotFound("API route not found".to_string())
}

/// Fallback for a known `/api` path called with the wrong method.
pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed("Method not allowed".to_string())
}
