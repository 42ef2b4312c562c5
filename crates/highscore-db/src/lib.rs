//! `PostgreSQL` adapter for the Highscore datastore contract.
//!
//! Every contract operation maps onto exactly one parameterized statement
//! against a single `users` table:
//!
//! ```text
//! users(id TEXT PRIMARY KEY, name TEXT, games_played INT, score INT, friends TEXT[])
//! ```
//!
//! Statements are registered by name and prepared at most once per
//! adapter instance (see [`statements`]). No operation opens an explicit
//! transaction; concurrent updates to the same row are last-write-wins.
//!
//! # Modules
//!
//! - [`postgres`] -- Connection pool configuration and schema bootstrap
//! - [`statements`] -- Named statement registry
//! - [`datastore`] -- The [`Datastore`](highscore_store::Datastore) implementation
//! - [`error`] -- Pool and configuration errors

pub mod datastore;
pub mod error;
pub mod postgres;
pub mod statements;

// Re-export primary types for convenience.
pub use datastore::PostgresDatastore;
pub use error::DbError;
pub use postgres::{PostgresConfig, PostgresPool};
pub use statements::{STATEMENT_CONFLICT, Statement, StatementRegistry};
