//! Shared Application State
//!
//! This module defines the `AppState` struct, which holds the resources every
//! handler shares. Nothing in it is mutable; each request runs independently.

use crate::config::Config;
use std::sync::Arc;
use twentyq_core::TurnOrchestrator;

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<TurnOrchestrator>,
    pub config: Arc<Config>,
}
