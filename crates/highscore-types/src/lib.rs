//! Shared type definitions for the Highscore backend.
//!
//! This crate is the vocabulary spoken across the storage boundary: the
//! value objects handed out by every datastore adapter, and the
//! structured [`AppError`] that carries a stable machine-readable code
//! from the store all the way to the HTTP error envelope.
//!
//! # Modules
//!
//! - [`structs`] -- Value objects (`User`, `GameState`, `Friend`)
//! - [`error`] -- Structured error model and the registered error templates

pub mod error;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use error::{
    AppError, BAD_REQUEST, ENTRY_EXISTS, ErrorTemplate, INTERNAL, INVALID_KEY, NOT_FOUND,
};
pub use structs::{Friend, GameState, User};
