//! HTTP request pipeline for the Highscore backend.
//!
//! This crate provides an Axum HTTP server that exposes user accounts,
//! per-user game state, and friend lists over JSON:
//!
//! | Method | Path | Success |
//! |--------|------|---------|
//! | `POST` | `/user` | `{id, name}` |
//! | `GET` | `/user` | `{users:[{id,name}]}` |
//! | `GET` | `/user/{id}/state` | `{gamesPlayed, score}` |
//! | `PUT` | `/user/{id}/state` | empty body |
//! | `GET` | `/user/{id}/friends` | `{friends:[{id,name,highscore}]}` |
//! | `PUT` | `/user/{id}/friends` | empty body |
//!
//! # Architecture
//!
//! Handlers receive the bound [`Datastore`](highscore_store::Datastore)
//! explicitly through [`AppState`] and return `Result<_, ApiError>`. On
//! success the handler produces the JSON (or empty) 200 response itself;
//! on failure [`ApiError`] renders the `{errorCode, errorMessage}`
//! envelope at the error's status (500 when unset) and logs the error's
//! structured fields.

pub mod error;
pub mod extract;
pub mod handlers;
pub mod router;
pub mod server;
pub mod state;

// Re-export primary types for convenience.
pub use error::{ApiError, ErrorResponse};
pub use router::{DEFAULT_REQUEST_TIMEOUT, build_router};
pub use server::{ServerConfig, ServerError, serve, shutdown_signal, start_server};
pub use state::AppState;
