//! 20 Questions API Library Crate
//!
//! This library contains the HTTP layer of the guessing game service: the
//! configuration, application state, API handlers, and routing. The `api`
//! binary is a thin wrapper around this library.

pub mod config;
pub mod handlers;
pub mod models;
pub mod router;
pub mod state;
