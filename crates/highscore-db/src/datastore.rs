//! [`Datastore`] implementation backed by `PostgreSQL`.
//!
//! One statement, one round trip per operation. Behavior matches the
//! in-memory simulator exactly:
//!
//! - updates check the affected-row count and report an unknown user as
//!   `INVALID_KEY` rather than succeeding on zero rows
//! - listings are ordered with `COLLATE "C"` so ids sort byte-wise, the
//!   same way Rust strings compare
//! - a friend id that no longer resolves fails the whole friend read

use async_trait::async_trait;
use highscore_store::{Datastore, check_games_played};
use highscore_types::{AppError, ENTRY_EXISTS, Friend, GameState, INVALID_KEY, User};
use sqlx::PgPool;

use crate::postgres::PostgresPool;
use crate::statements::{Statement, StatementRegistry};

const NEW_USER: Statement = Statement::new(
    "new_user",
    "INSERT INTO users (id, name) VALUES ($1, $2) RETURNING id, name",
);

const GET_USERS: Statement = Statement::new(
    "get_users",
    r#"SELECT id, name FROM users ORDER BY id COLLATE "C""#,
);

const USER_EXISTS: Statement = Statement::new(
    "user_exists",
    "SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)",
);

const UPDATE_GAME_STATE: Statement = Statement::new(
    "update_game_state",
    "UPDATE users SET games_played = $1, score = $2 WHERE id = $3",
);

const GET_GAME_STATE: Statement = Statement::new(
    "get_game_state",
    "SELECT games_played, score FROM users WHERE id = $1",
);

const UPDATE_FRIENDS: Statement = Statement::new(
    "update_friends",
    "UPDATE users SET friends = $1 WHERE id = $2",
);

// One row per stored friend entry (duplicates kept). An owner with no
// friends yields a single all-NULL row; an unknown owner yields no rows.
const GET_FRIENDS: Statement = Statement::new(
    "get_friends",
    r#"SELECT t.fid AS friend_id, f.name, f.score
       FROM users o
       LEFT JOIN LATERAL unnest(o.friends) AS t(fid) ON TRUE
       LEFT JOIN users f ON f.id = t.fid
       WHERE o.id = $1
       ORDER BY t.fid COLLATE "C""#,
);

const DELETE_USER: Statement = Statement::new("delete_user", "DELETE FROM users WHERE id = $1");

/// A row of `(id, name)`.
#[derive(Debug, Clone, sqlx::FromRow)]
struct UserRow {
    id: String,
    name: String,
}

/// A row of `(games_played, score)`.
#[derive(Debug, Clone, Copy, sqlx::FromRow)]
struct GameStateRow {
    games_played: i32,
    score: i32,
}

/// One friend entry after the lateral join.
#[derive(Debug, Clone, sqlx::FromRow)]
struct FriendRow {
    friend_id: Option<String>,
    name: Option<String>,
    score: Option<i32>,
}

fn unknown_user(user_id: &str) -> AppError {
    INVALID_KEY
        .with_message("Invalid UserID")
        .with_field("user_id", user_id)
}

fn query_failed(statement: &Statement, err: &sqlx::Error) -> AppError {
    AppError::wrap(err).with_field("statement", statement.name())
}

/// The production [`Datastore`] adapter.
pub struct PostgresDatastore {
    pool: PgPool,
    statements: StatementRegistry,
}

impl PostgresDatastore {
    /// Build an adapter over an existing pool.
    pub fn new(pool: &PostgresPool) -> Self {
        Self {
            pool: pool.pool().clone(),
            statements: StatementRegistry::new(),
        }
    }

    async fn prepare(&self, statement: &Statement) -> Result<(), AppError> {
        self.statements.ensure(&self.pool, statement).await
    }
}

#[async_trait]
impl Datastore for PostgresDatastore {
    async fn new_user(&self, id: &str, name: &str) -> Result<User, AppError> {
        self.prepare(&NEW_USER).await?;
        let row = sqlx::query_as::<_, UserRow>(NEW_USER.sql())
            .bind(id)
            .bind(name)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match &e {
                sqlx::Error::Database(db) if db.is_unique_violation() => ENTRY_EXISTS
                    .with_message("User already exists")
                    .with_field("user_id", id)
                    .with_internal(db),
                _ => query_failed(&NEW_USER, &e),
            })?;

        Ok(User {
            id: row.id,
            name: row.name,
        })
    }

    async fn get_users(&self) -> Result<Vec<User>, AppError> {
        self.prepare(&GET_USERS).await?;
        let rows = sqlx::query_as::<_, UserRow>(GET_USERS.sql())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| query_failed(&GET_USERS, &e))?;

        Ok(rows
            .into_iter()
            .map(|row| User {
                id: row.id,
                name: row.name,
            })
            .collect())
    }

    async fn user_exists(&self, id: &str) -> Result<bool, AppError> {
        self.prepare(&USER_EXISTS).await?;
        sqlx::query_scalar::<_, bool>(USER_EXISTS.sql())
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| query_failed(&USER_EXISTS, &e))
    }

    async fn update_game_state(
        &self,
        user_id: &str,
        games_played: u32,
        score: i32,
    ) -> Result<(), AppError> {
        let games_played = check_games_played(games_played)?;

        self.prepare(&UPDATE_GAME_STATE).await?;
        let result = sqlx::query(UPDATE_GAME_STATE.sql())
            .bind(games_played)
            .bind(score)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| query_failed(&UPDATE_GAME_STATE, &e))?;

        if result.rows_affected() == 0 {
            return Err(unknown_user(user_id));
        }
        Ok(())
    }

    async fn get_game_state(&self, user_id: &str) -> Result<GameState, AppError> {
        self.prepare(&GET_GAME_STATE).await?;
        let row = sqlx::query_as::<_, GameStateRow>(GET_GAME_STATE.sql())
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| query_failed(&GET_GAME_STATE, &e))?
            .ok_or_else(|| unknown_user(user_id))?;

        let games_played = u32::try_from(row.games_played).map_err(|e| {
            AppError::wrap(&e)
                .with_field("user_id", user_id)
                .with_field("games_played", row.games_played)
        })?;

        Ok(GameState {
            games_played,
            score: row.score,
        })
    }

    async fn update_friends(&self, user_id: &str, friend_ids: &[String]) -> Result<(), AppError> {
        self.prepare(&UPDATE_FRIENDS).await?;
        let result = sqlx::query(UPDATE_FRIENDS.sql())
            .bind(friend_ids)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| query_failed(&UPDATE_FRIENDS, &e))?;

        if result.rows_affected() == 0 {
            return Err(unknown_user(user_id));
        }
        Ok(())
    }

    async fn get_friends(&self, user_id: &str) -> Result<Vec<Friend>, AppError> {
        self.prepare(&GET_FRIENDS).await?;
        let rows = sqlx::query_as::<_, FriendRow>(GET_FRIENDS.sql())
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| query_failed(&GET_FRIENDS, &e))?;

        if rows.is_empty() {
            return Err(unknown_user(user_id));
        }

        rows.into_iter()
            .filter_map(|row| row.friend_id.map(|id| (id, row.name, row.score)))
            .map(|(id, name, score)| match (name, score) {
                (Some(name), Some(high_score)) => Ok(Friend {
                    id,
                    name,
                    high_score,
                }),
                _ => Err(INVALID_KEY
                    .with_message("Invalid UserID in friends")
                    .with_field("user_id", user_id)
                    .with_field("friend_id", id)),
            })
            .collect()
    }

    async fn delete_user(&self, user_id: &str) -> Result<(), AppError> {
        self.prepare(&DELETE_USER).await?;
        let result = sqlx::query(DELETE_USER.sql())
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| query_failed(&DELETE_USER, &e))?;

        if result.rows_affected() > 0 {
            tracing::debug!(user_id, "user deleted");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use highscore_store::MAX_GAMES_PLAYED;
    use highscore_types::BAD_REQUEST;

    use super::*;

    #[tokio::test]
    #[allow(clippy::expect_used)]
    async fn oversized_games_played_is_rejected_before_any_query() {
        // Lazy pools never connect until a query runs.
        let pool = PgPool::connect_lazy("postgresql://highscore@localhost:1/highscore")
            .expect("well-formed url");
        let store = PostgresDatastore {
            pool,
            statements: StatementRegistry::new(),
        };

        let err = store
            .update_game_state("anyone", MAX_GAMES_PLAYED.saturating_add(1), 0)
            .await
            .err();
        assert!(err.is_some_and(|e| e.is(&BAD_REQUEST) && e.status() == Some(400)));
        assert!(store.statements.is_empty().await);
    }
}
