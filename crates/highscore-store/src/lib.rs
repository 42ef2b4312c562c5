//! Storage abstraction for the Highscore backend.
//!
//! The [`Datastore`] trait is the single capability contract that request
//! handlers call into. Two adapters implement it:
//!
//! - [`Simulator`] -- zero-I/O, deterministic, in-memory (this crate)
//! - `PostgresDatastore` -- production SQL adapter (`highscore-db`)
//!
//! Both adapters must behave identically with respect to ordering and the
//! error taxonomy. The [`conformance`] module (feature `conformance`)
//! holds the scenario suite every adapter is run against.
//!
//! # Modules
//!
//! - [`datastore`] -- The adapter contract
//! - [`simulator`] -- In-memory adapter
//! - [`conformance`] -- Shared adapter scenario suite

pub mod datastore;
pub mod simulator;

#[cfg(any(test, feature = "conformance"))]
pub mod conformance;

pub use datastore::{Datastore, MAX_GAMES_PLAYED, check_games_played};
pub use simulator::Simulator;
