//! Value objects exchanged across the storage boundary.
//!
//! Every adapter returns owned snapshots of these records. Mutating a
//! returned value never affects the store; callers must go back through
//! the datastore contract to change anything.

use serde::{Deserialize, Serialize};

/// A registered player.
///
/// The `id` is an opaque unique identifier (a versioned UUID string in
/// practice) and never changes once the user exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique user identifier.
    pub id: String,
    /// Display name (never empty).
    pub name: String,
}

/// Per-user game progress.
///
/// Owned 1:1 by a [`User`] and initialised to zero on creation. Updates
/// overwrite both fields at once: last write wins.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    /// Number of games the user has played.
    pub games_played: u32,
    /// The user's current score.
    pub score: i32,
}

/// A friend entry resolved at read time.
///
/// Carries the friend's live name and score as they were when the
/// friend list was read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Friend {
    /// The friend's user identifier.
    pub id: String,
    /// The friend's display name.
    pub name: String,
    /// The friend's current score.
    pub high_score: i32,
}
