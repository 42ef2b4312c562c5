//! In-memory datastore adapter.
//!
//! The [`Simulator`] keeps every user in a single ordered map behind a
//! [`tokio::sync::RwLock`]. Mutations hold the write lock for the whole
//! operation and reads hold the read lock, so each operation is an atomic
//! transaction over the entire map and a reader never observes a
//! half-applied update.
//!
//! Output ordering is part of the contract: users come out of the
//! [`BTreeMap`] in id order, and resolved friend lists are sorted by id
//! after resolution.

use std::collections::BTreeMap;

use async_trait::async_trait;
use highscore_types::{AppError, ENTRY_EXISTS, Friend, GameState, INVALID_KEY, User};
use tokio::sync::RwLock;

use crate::datastore::{Datastore, check_games_played};

/// The mutable record held for each user.
#[derive(Debug, Clone)]
struct SimUser {
    name: String,
    game_state: GameState,
    friend_ids: Vec<String>,
}

/// Deterministic in-memory [`Datastore`] used for tests and local runs.
#[derive(Debug, Default)]
pub struct Simulator {
    users: RwLock<BTreeMap<String, SimUser>>,
}

impl Simulator {
    /// Create an empty simulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored users.
    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    /// Whether the simulator holds no users.
    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

fn unknown_user(user_id: &str) -> AppError {
    INVALID_KEY
        .with_message("Invalid UserID")
        .with_field("user_id", user_id)
}

#[async_trait]
impl Datastore for Simulator {
    async fn new_user(&self, id: &str, name: &str) -> Result<User, AppError> {
        let mut users = self.users.write().await;
        if users.contains_key(id) {
            return Err(ENTRY_EXISTS
                .with_message("User already exists")
                .with_field("user_id", id));
        }

        users.insert(
            id.to_owned(),
            SimUser {
                name: name.to_owned(),
                game_state: GameState::default(),
                friend_ids: Vec::new(),
            },
        );
        tracing::debug!(user_id = id, "simulator: user created");

        Ok(User {
            id: id.to_owned(),
            name: name.to_owned(),
        })
    }

    async fn get_users(&self) -> Result<Vec<User>, AppError> {
        let users = self.users.read().await;
        Ok(users
            .iter()
            .map(|(id, user)| User {
                id: id.clone(),
                name: user.name.clone(),
            })
            .collect())
    }

    async fn user_exists(&self, id: &str) -> Result<bool, AppError> {
        Ok(self.users.read().await.contains_key(id))
    }

    async fn update_game_state(
        &self,
        user_id: &str,
        games_played: u32,
        score: i32,
    ) -> Result<(), AppError> {
        check_games_played(games_played)?;
        let mut users = self.users.write().await;
        let user = users.get_mut(user_id).ok_or_else(|| unknown_user(user_id))?;
        user.game_state = GameState {
            games_played,
            score,
        };
        Ok(())
    }

    async fn get_game_state(&self, user_id: &str) -> Result<GameState, AppError> {
        let users = self.users.read().await;
        users
            .get(user_id)
            .map(|user| user.game_state)
            .ok_or_else(|| unknown_user(user_id))
    }

    async fn update_friends(&self, user_id: &str, friend_ids: &[String]) -> Result<(), AppError> {
        let mut users = self.users.write().await;
        let user = users.get_mut(user_id).ok_or_else(|| unknown_user(user_id))?;
        user.friend_ids = friend_ids.to_vec();
        Ok(())
    }

    async fn get_friends(&self, user_id: &str) -> Result<Vec<Friend>, AppError> {
        let users = self.users.read().await;
        let user = users.get(user_id).ok_or_else(|| unknown_user(user_id))?;

        let mut friends = user
            .friend_ids
            .iter()
            .map(|friend_id| {
                users
                    .get(friend_id)
                    .map(|friend| Friend {
                        id: friend_id.clone(),
                        name: friend.name.clone(),
                        high_score: friend.game_state.score,
                    })
                    .ok_or_else(|| {
                        INVALID_KEY
                            .with_message("Invalid UserID in friends")
                            .with_field("user_id", user_id)
                            .with_field("friend_id", friend_id.as_str())
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        friends.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(friends)
    }

    async fn delete_user(&self, user_id: &str) -> Result<(), AppError> {
        if self.users.write().await.remove(user_id).is_some() {
            tracing::debug!(user_id, "simulator: user deleted");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn new_simulator_is_empty() {
        let sim = Simulator::new();
        assert!(sim.is_empty().await);
        assert!(sim.get_users().await.is_ok_and(|users| users.is_empty()));
    }

    #[tokio::test]
    async fn new_user_starts_with_zeroed_state_and_no_friends() {
        let sim = Simulator::new();
        assert!(sim.new_user("a", "alice").await.is_ok());

        assert_eq!(sim.get_game_state("a").await, Ok(GameState::default()));
        assert_eq!(sim.get_friends("a").await, Ok(Vec::new()));
        assert_eq!(sim.len().await, 1);
    }

    #[tokio::test]
    async fn duplicate_friend_entries_are_preserved() {
        let sim = Simulator::new();
        assert!(sim.new_user("a", "alice").await.is_ok());
        assert!(sim.new_user("b", "bob").await.is_ok());
        let ids = vec![String::from("b"), String::from("b")];
        assert!(sim.update_friends("a", &ids).await.is_ok());

        let friends = sim.get_friends("a").await.unwrap_or_default();
        assert_eq!(friends.len(), 2);
    }

    #[tokio::test]
    async fn unknown_user_error_carries_the_id() {
        let sim = Simulator::new();
        let err = sim.get_game_state("ghost").await.err();
        let err = err.unwrap_or_else(|| INVALID_KEY.error());
        assert!(err.is(&INVALID_KEY));
        assert_eq!(err.message(), "Invalid UserID");
        assert_eq!(
            err.fields().get("user_id").and_then(|v| v.as_str()),
            Some("ghost")
        );
    }
}
