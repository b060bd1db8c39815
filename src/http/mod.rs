//! HTTP API server for external clients (browser/mobile front end)
//!
//! This module provides a REST API for driving practice sessions:
//! - POST /sessions - Create a session (draws the first question)
//! - POST /sessions/:id/record/start - Begin a recording turn
//! - POST /sessions/:id/audio - Push captured PCM frames
//! - POST /sessions/:id/record/stop - Finish the turn, returns feedback
//! - POST /sessions/:id/question - Draw the next question
//! - POST /sessions/:id/clear - Reset the conversation
//! - DELETE /sessions/:id - Tear the session down
//! - GET /sessions/:id/snapshot - Read-only session view
//! - GET /sessions/:id/log - Conversation log
//! - GET /sessions/:id/recording - WAV audio of the most recent turn
//! - GET /users/:id/progress - Daily progress and recent sessions
//! - GET /health - Health check

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::{AppState, SessionEntry};
