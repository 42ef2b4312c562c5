//! REST endpoint handlers.
//!
//! Every handler takes the bound store from [`AppState`], calls exactly
//! one [`Datastore`](highscore_store::Datastore) operation, and either
//! writes its own 200 response or returns an [`ApiError`].
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/user` | Create a user |
//! | `GET` | `/user` | List users |
//! | `GET` | `/user/{id}/state` | Read a user's game state |
//! | `PUT` | `/user/{id}/state` | Overwrite a user's game state |
//! | `GET` | `/user/{id}/friends` | Read a user's resolved friend list |
//! | `PUT` | `/user/{id}/friends` | Replace a user's friend list |

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::{StatusCode, Uri};
use highscore_types::{BAD_REQUEST, NOT_FOUND};
use uuid::Uuid;

use crate::error::ApiError;
use crate::extract::{JsonBody, UserId};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request and response bodies
// ---------------------------------------------------------------------------

/// Body of `POST /user`.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct UserCreateInput {
    /// Display name; trimmed before use.
    #[serde(default)]
    pub name: String,
}

/// Response of `POST /user`.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct UserCreateOutput {
    /// The generated user id.
    pub id: String,
    /// The stored name.
    pub name: String,
}

/// One entry of `GET /user`.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct UserEntry {
    /// User id.
    pub id: String,
    /// Display name.
    pub name: String,
}

/// Response of `GET /user`.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct UserGetOutput {
    /// All users, ordered by id.
    pub users: Vec<UserEntry>,
}

/// Body of `PUT /user/{id}/state` and response of `GET /user/{id}/state`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameStateBody {
    /// Number of games played.
    pub games_played: u32,
    /// Current score.
    pub score: i32,
}

/// Body of `PUT /user/{id}/friends`.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct FriendsUpdateInput {
    /// The complete new friend list. Missing or `null` means empty.
    #[serde(default)]
    pub friends: Option<Vec<String>>,
}

/// One entry of `GET /user/{id}/friends`.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FriendEntry {
    /// Friend's user id.
    pub id: String,
    /// Friend's current name.
    pub name: String,
    /// Friend's current score.
    pub highscore: i32,
}

/// Response of `GET /user/{id}/friends`.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FriendsGetOutput {
    /// Resolved friends, ordered by id.
    pub friends: Vec<FriendEntry>,
}

// ---------------------------------------------------------------------------
// /user
// ---------------------------------------------------------------------------

/// Create a user with a freshly generated UUID v7 id.
///
/// # Errors
///
/// [`BAD_REQUEST`] for a malformed body or a blank name; the store's
/// error if the insert fails.
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    JsonBody(input): JsonBody<UserCreateInput>,
) -> Result<Json<UserCreateOutput>, ApiError> {
    let name = input.name.trim();
    if name.is_empty() {
        return Err(ApiError(BAD_REQUEST.with_message("Invalid name")));
    }

    let id = Uuid::now_v7().to_string();
    let user = state
        .store
        .new_user(&id, name)
        .await
        .map_err(ApiError::from_store)?;

    tracing::info!(user_id = %user.id, "user created");
    Ok(Json(UserCreateOutput {
        id: user.id,
        name: user.name,
    }))
}

/// List every user, ordered by id.
///
/// # Errors
///
/// The store's error if the listing fails.
pub async fn list_users(
    State(state): State<Arc<AppState>>,
) -> Result<Json<UserGetOutput>, ApiError> {
    let users = state
        .store
        .get_users()
        .await
        .map_err(ApiError::from_store)?;

    Ok(Json(UserGetOutput {
        users: users
            .into_iter()
            .map(|u| UserEntry {
                id: u.id,
                name: u.name,
            })
            .collect(),
    }))
}

// ---------------------------------------------------------------------------
// /user/{id}/state
// ---------------------------------------------------------------------------

/// Read a user's game state.
///
/// # Errors
///
/// `INVALID_KEY` (400) if the user does not exist.
pub async fn get_game_state(
    State(state): State<Arc<AppState>>,
    user_id: UserId,
) -> Result<Json<GameStateBody>, ApiError> {
    let game_state = state
        .store
        .get_game_state(user_id.as_str())
        .await
        .map_err(ApiError::from_store)?;

    Ok(Json(GameStateBody {
        games_played: game_state.games_played,
        score: game_state.score,
    }))
}

/// Overwrite a user's game state.
///
/// # Errors
///
/// [`BAD_REQUEST`] for a malformed body; `INVALID_KEY` (400) if the user
/// does not exist.
pub async fn update_game_state(
    State(state): State<Arc<AppState>>,
    user_id: UserId,
    JsonBody(input): JsonBody<GameStateBody>,
) -> Result<StatusCode, ApiError> {
    state
        .store
        .update_game_state(user_id.as_str(), input.games_played, input.score)
        .await
        .map_err(ApiError::from_store)?;

    Ok(StatusCode::OK)
}

// ---------------------------------------------------------------------------
// /user/{id}/friends
// ---------------------------------------------------------------------------

/// Read a user's friend list, resolved to current names and scores.
///
/// # Errors
///
/// [`BAD_REQUEST`] if the id is not a UUID; `INVALID_KEY` (400) if the
/// user does not exist or a listed friend no longer does.
pub async fn get_friends(
    State(state): State<Arc<AppState>>,
    user_id: UserId,
) -> Result<Json<FriendsGetOutput>, ApiError> {
    Uuid::parse_str(user_id.as_str()).map_err(|e| {
        ApiError(
            BAD_REQUEST
                .with_message("Invalid user id")
                .with_field("user_id", user_id.as_str())
                .with_internal(e),
        )
    })?;

    let friends = state
        .store
        .get_friends(user_id.as_str())
        .await
        .map_err(ApiError::from_store)?;

    Ok(Json(FriendsGetOutput {
        friends: friends
            .into_iter()
            .map(|f| FriendEntry {
                id: f.id,
                name: f.name,
                highscore: f.high_score,
            })
            .collect(),
    }))
}

/// Replace a user's friend list. Friend ids are not checked here.
///
/// # Errors
///
/// [`BAD_REQUEST`] for a malformed body; `INVALID_KEY` (400) if the user
/// does not exist.
pub async fn update_friends(
    State(state): State<Arc<AppState>>,
    user_id: UserId,
    JsonBody(input): JsonBody<FriendsUpdateInput>,
) -> Result<StatusCode, ApiError> {
    let friends = input.friends.unwrap_or_default();
    state
        .store
        .update_friends(user_id.as_str(), &friends)
        .await
        .map_err(ApiError::from_store)?;

    Ok(StatusCode::OK)
}

// ---------------------------------------------------------------------------
// Fallback
// ---------------------------------------------------------------------------

/// Whether `path` is a user route with a blank `{id}` segment.
fn is_blank_user_route(path: &str) -> bool {
    let Some(rest) = path.strip_prefix("/user/") else {
        return false;
    };
    let mut segments = rest.split('/');
    match (segments.next(), segments.next(), segments.next()) {
        (Some(id), Some("state" | "friends"), None) => id.trim().is_empty(),
        _ => false,
    }
}

/// Answer unmatched requests.
///
/// The router cannot match an empty `{id}`, so `/user//state` and
/// `/user//friends` land here and get [`BAD_REQUEST`]. Anything else is
/// [`NOT_FOUND`].
pub async fn fallback(uri: Uri) -> ApiError {
    if is_blank_user_route(uri.path()) {
        return ApiError(BAD_REQUEST.with_message("Missing user id"));
    }
    ApiError(NOT_FOUND.error().with_field("path", uri.path()))
}
