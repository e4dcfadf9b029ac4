//! Axum Router Configuration
//!
//! This module defines the complete HTTP routing for the application: the JSON
//! API under `/api`, the OpenAPI documentation, and static assets for
//! everything else.

use crate::{
    handlers,
    models::{ErrorResponse, HealthResponse, StepPayload},
    state::AppState,
};

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::services::ServeDir;
use twentyq_core::{GameAction, HistoryEntry};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(handlers::step, handlers::health),
    components(
        schemas(StepPayload, HistoryEntry, GameAction, ErrorResponse, HealthResponse)
    ),
    tags(
        (name = "20 Questions API", description = "Turn-by-turn moves for the guessing game")
    )
)]
pub struct ApiDoc;

/// Creates the main Axum router for the application.
pub fn create_router(app_state: Arc<AppState>) -> Router {
    let static_dir = app_state.config.static_dir.clone();

    let api_router = Router::new()
        .route("/step", post(handlers::step))
        .route("/health", get(handlers::health))
        .fallback(handlers::api_not_found)
        .method_not_allowed_fallback(handlers::method_not_allowed)
        .with_state(app_state);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .nest("/api", api_router)
        .fallback_service(ServeDir::new(static_dir))
}
