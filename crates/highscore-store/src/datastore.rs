//! The datastore contract.
//!
//! Handlers are constructed with an explicit `Arc<dyn Datastore>`; the
//! concrete adapter is chosen once at startup and never looked up from
//! ambient state.
//!
//! # Operations
//!
//! | Operation | Errors |
//! |-----------|--------|
//! | [`new_user`](Datastore::new_user) | `ENTRY_EXISTS` if the id is taken |
//! | [`get_users`](Datastore::get_users) | none |
//! | [`user_exists`](Datastore::user_exists) | none |
//! | [`update_game_state`](Datastore::update_game_state) | `BAD_REQUEST` if `games_played` exceeds [`MAX_GAMES_PLAYED`], else `INVALID_KEY` for an unknown user |
//! | [`get_game_state`](Datastore::get_game_state) | `INVALID_KEY` for an unknown user |
//! | [`update_friends`](Datastore::update_friends) | `INVALID_KEY` for an unknown user |
//! | [`get_friends`](Datastore::get_friends) | `INVALID_KEY` for an unknown user or an unresolved friend |
//! | [`delete_user`](Datastore::delete_user) | none (idempotent) |
//!
//! Adapters may additionally surface uncoded wrapped failures (I/O,
//! connection, serialization) from any operation.

use async_trait::async_trait;
use highscore_types::{AppError, BAD_REQUEST, Friend, GameState, User};

/// Largest `games_played` any adapter stores (the SQL column is `INT`).
pub const MAX_GAMES_PLAYED: u32 = i32::MAX.unsigned_abs();

/// Reject a `games_played` above [`MAX_GAMES_PLAYED`].
///
/// Every adapter calls this before touching storage, so an oversized value
/// fails the same way regardless of whether the user exists.
///
/// # Errors
///
/// Returns [`BAD_REQUEST`] when the value does not fit.
pub fn check_games_played(games_played: u32) -> Result<i32, AppError> {
    i32::try_from(games_played).map_err(|e| {
        BAD_REQUEST
            .with_message("gamesPlayed is out of range")
            .with_field("games_played", games_played)
            .with_internal(e)
    })
}

/// Storage operations available to request handlers.
#[async_trait]
pub trait Datastore: Send + Sync {
    /// Create a user with a zeroed game state and an empty friend list.
    async fn new_user(&self, id: &str, name: &str) -> Result<User, AppError>;

    /// All users, ordered by id ascending.
    async fn get_users(&self) -> Result<Vec<User>, AppError>;

    /// Whether a user with `id` exists.
    async fn user_exists(&self, id: &str) -> Result<bool, AppError>;

    /// Overwrite a user's game state (last write wins).
    ///
    /// `games_played` above [`MAX_GAMES_PLAYED`] is rejected before the
    /// user is looked up.
    async fn update_game_state(
        &self,
        user_id: &str,
        games_played: u32,
        score: i32,
    ) -> Result<(), AppError>;

    /// A snapshot of a user's game state.
    async fn get_game_state(&self, user_id: &str) -> Result<GameState, AppError>;

    /// Replace a user's friend list.
    ///
    /// Friend ids are not checked for existence here; stale ids surface
    /// on the next [`get_friends`](Datastore::get_friends).
    async fn update_friends(&self, user_id: &str, friend_ids: &[String]) -> Result<(), AppError>;

    /// The user's friends resolved to their live name and score, ordered
    /// by id ascending.
    async fn get_friends(&self, user_id: &str) -> Result<Vec<Friend>, AppError>;

    /// Remove a user. Removing an absent id is not an error.
    async fn delete_user(&self, user_id: &str) -> Result<(), AppError>;
}
