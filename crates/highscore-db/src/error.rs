//! Error types for pool lifecycle and configuration.
//!
//! Contract operations report failures as
//! [`AppError`](highscore_types::AppError); [`DbError`] only covers
//! connecting to and bootstrapping the database.

/// Errors that can occur while setting up the data layer.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// A `PostgreSQL` operation failed.
    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] sqlx::Error),

    /// A configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}
