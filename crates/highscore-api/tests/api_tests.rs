//! Integration tests for the HTTP endpoints.
//!
//! Tests use Axum's `Router` directly via `tower::ServiceExt` without
//! starting a TCP server. Each test gets its own seeded simulator: four
//! users `bot0..bot3`, where `bot0` has played 10 games, scored 110 and
//! lists the other three as friends.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use highscore_api::build_router;
use highscore_api::state::AppState;
use highscore_store::conformance::{self, EXTRA_USERS, USER_NAMES, USERS};
use highscore_store::{Datastore, Simulator};
use highscore_types::{AppError, Friend, GameState, User};
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

async fn seeded_store() -> Arc<Simulator> {
    let store = Arc::new(Simulator::new());
    conformance::seed(store.as_ref()).await.unwrap();
    store
}

fn app_with(store: Arc<dyn Datastore>) -> Router {
    build_router(
        Arc::new(AppState::new(store)),
        highscore_api::DEFAULT_REQUEST_TIMEOUT,
    )
}

async fn seeded_app() -> (Router, Arc<Simulator>) {
    let store = seeded_store().await;
    (app_with(store.clone()), store)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn with_json(method: &str, uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_owned()))
        .unwrap()
}

async fn body_bytes(body: Body) -> Vec<u8> {
    axum::body::to_bytes(body, usize::MAX).await.unwrap().to_vec()
}

async fn body_to_json(body: Body) -> Value {
    serde_json::from_slice(&body_bytes(body).await).unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = body_bytes(response.into_body()).await;
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

fn assert_envelope(json: &Value, code: &str, message: &str) {
    assert_eq!(json["errorCode"], code, "envelope: {json}");
    assert_eq!(json["errorMessage"], message, "envelope: {json}");
}

// ---------------------------------------------------------------------------
// POST /user, GET /user
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_user_returns_generated_id_and_trimmed_name() {
    let (app, store) = seeded_app().await;

    let (status, json) = send(&app, with_json("POST", "/user", r#"{"name": "  flaf  "}"#)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["name"], "flaf");

    let id = json["id"].as_str().unwrap();
    let parsed = Uuid::parse_str(id).unwrap();
    assert_eq!(parsed.get_version_num(), 7);
    assert!(store.user_exists(id).await.unwrap());
    assert_eq!(
        store.get_game_state(id).await.unwrap(),
        GameState::default()
    );
}

#[tokio::test]
async fn create_user_rejects_blank_name() {
    let (app, store) = seeded_app().await;

    let (status, json) = send(&app, with_json("POST", "/user", r#"{"name": "   "}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_envelope(&json, "EE001", "Invalid name");

    let (status, json) = send(&app, with_json("POST", "/user", "{}")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_envelope(&json, "EE001", "Invalid name");

    assert_eq!(store.len().await, USERS.len());
}

#[tokio::test]
async fn create_user_rejects_malformed_json() {
    let (app, _) = seeded_app().await;

    let (status, json) = send(&app, with_json("POST", "/user", r#"{"name": "#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_envelope(&json, "EE001", "Invalid JSON format");
}

#[tokio::test]
async fn list_users_returns_all_users_in_id_order() {
    let (app, _) = seeded_app().await;

    let response = app.oneshot(get("/user")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok()),
        Some("application/json")
    );

    let json = body_to_json(response.into_body()).await;
    let expected: Vec<Value> = USERS
        .iter()
        .zip(USER_NAMES)
        .map(|(id, name)| json!({"id": id, "name": name}))
        .collect();
    assert_eq!(json, json!({ "users": expected }));
}

#[tokio::test]
async fn list_users_on_empty_store_is_empty() {
    let app = app_with(Arc::new(Simulator::new()));
    let (status, json) = send(&app, get("/user")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!({"users": []}));
}

// ---------------------------------------------------------------------------
// /user/{id}/state
// ---------------------------------------------------------------------------

#[tokio::test]
async fn get_game_state_returns_seeded_state() {
    let (app, _) = seeded_app().await;
    let (status, json) = send(&app, get(&format!("/user/{}/state", USERS[0]))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!({"gamesPlayed": 10, "score": 110}));
}

#[tokio::test]
async fn get_game_state_of_unknown_user_is_bad_request() {
    let (app, _) = seeded_app().await;
    let (status, json) = send(&app, get(&format!("/user/{}/state", EXTRA_USERS[0]))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_envelope(&json, "D002", "Invalid UserID");
}

#[tokio::test]
async fn update_game_state_overwrites_previous_values() {
    let (app, _) = seeded_app().await;
    let uri = format!("/user/{}/state", USERS[1]);

    let (status, json) = send(
        &app,
        with_json("PUT", &uri, r#"{"gamesPlayed": 3, "score": -40}"#),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, Value::Null);

    let (status, json) = send(&app, get(&uri)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!({"gamesPlayed": 3, "score": -40}));
}

#[tokio::test]
async fn update_game_state_rejects_malformed_body() {
    let (app, store) = seeded_app().await;
    let uri = format!("/user/{}/state", USERS[0]);

    for body in [
        r#"{"gamesPlayed": "ten", "score": 1}"#,
        r#"{"gamesPlayed": -1, "score": 1}"#,
        r#"{"score": 1}"#,
        "not json",
    ] {
        let (status, json) = send(&app, with_json("PUT", &uri, body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body: {body}");
        assert_envelope(&json, "EE001", "Invalid JSON format");
    }

    assert_eq!(
        store.get_game_state(USERS[0]).await.unwrap(),
        GameState {
            games_played: 10,
            score: 110
        }
    );
}

#[tokio::test]
async fn update_game_state_requires_json_content_type() {
    let (app, store) = seeded_app().await;
    let request = Request::builder()
        .method("PUT")
        .uri(format!("/user/{}/state", USERS[0]))
        .body(Body::from(r#"{"gamesPlayed": 1, "score": 2}"#))
        .unwrap();

    let (status, json) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_envelope(&json, "EE001", "Invalid JSON format");
    assert_eq!(
        store.get_game_state(USERS[0]).await.unwrap().games_played,
        10
    );
}

#[tokio::test]
async fn update_game_state_of_unknown_user_is_bad_request() {
    let (app, _) = seeded_app().await;
    let uri = format!("/user/{}/state", EXTRA_USERS[0]);
    let (status, json) = send(&app, with_json("PUT", &uri, r#"{"gamesPlayed": 1, "score": 1}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_envelope(&json, "D002", "Invalid UserID");
}

#[tokio::test]
async fn empty_user_id_never_reaches_storage() {
    let (app, store) = seeded_app().await;

    let (status, json) = send(
        &app,
        with_json("PUT", "/user//state", r#"{"gamesPlayed": 1, "score": 1}"#),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_envelope(&json, "EE001", "Missing user id");

    let (status, json) = send(&app, get("/user//friends")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_envelope(&json, "EE001", "Missing user id");

    let (status, json) = send(&app, get("/user/%20/state")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_envelope(&json, "EE001", "Missing user id");

    assert_eq!(store.len().await, USERS.len());
}

// ---------------------------------------------------------------------------
// /user/{id}/friends
// ---------------------------------------------------------------------------

#[tokio::test]
async fn get_friends_resolves_seeded_friends_in_id_order() {
    let (app, _) = seeded_app().await;
    let (status, json) = send(&app, get(&format!("/user/{}/friends", USERS[0]))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json,
        json!({"friends": [
            {"id": USERS[1], "name": "bot1", "highscore": 0},
            {"id": USERS[2], "name": "bot2", "highscore": 0},
            {"id": USERS[3], "name": "bot3", "highscore": 0},
        ]})
    );
}

#[tokio::test]
async fn get_friends_reflects_current_scores() {
    let (app, store) = seeded_app().await;
    store.update_game_state(USERS[2], 4, 77).await.unwrap();

    let (_, json) = send(&app, get(&format!("/user/{}/friends", USERS[0]))).await;
    assert_eq!(json["friends"][1]["id"], USERS[2]);
    assert_eq!(json["friends"][1]["highscore"], 77);
}

#[tokio::test]
async fn get_friends_rejects_non_uuid_id() {
    let (app, _) = seeded_app().await;
    let (status, json) = send(&app, get("/user/bot0/friends")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_envelope(&json, "EE001", "Invalid user id");
}

#[tokio::test]
async fn get_friends_of_unknown_user_is_bad_request() {
    let (app, _) = seeded_app().await;
    let (status, json) = send(&app, get(&format!("/user/{}/friends", EXTRA_USERS[1]))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_envelope(&json, "D002", "Invalid UserID");
}

#[tokio::test]
async fn update_friends_replaces_the_list() {
    let (app, _) = seeded_app().await;
    let uri = format!("/user/{}/friends", USERS[1]);
    let body = json!({"friends": [USERS[3], USERS[0]]}).to_string();

    let (status, json) = send(&app, with_json("PUT", &uri, &body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, Value::Null);

    let (_, json) = send(&app, get(&uri)).await;
    assert_eq!(
        json,
        json!({"friends": [
            {"id": USERS[0], "name": "bot0", "highscore": 110},
            {"id": USERS[3], "name": "bot3", "highscore": 0},
        ]})
    );

    let (status, _) = send(&app, with_json("PUT", &uri, r#"{"friends": []}"#)).await;
    assert_eq!(status, StatusCode::OK);
    let (_, json) = send(&app, get(&uri)).await;
    assert_eq!(json, json!({"friends": []}));
}

#[tokio::test]
async fn unresolved_friend_fails_the_read() {
    let (app, _) = seeded_app().await;
    let uri = format!("/user/{}/friends", USERS[1]);
    let body = json!({"friends": [USERS[2], EXTRA_USERS[2]]}).to_string();

    let (status, _) = send(&app, with_json("PUT", &uri, &body)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, json) = send(&app, get(&uri)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_envelope(&json, "D002", "Invalid UserID in friends");
}

#[tokio::test]
async fn update_friends_of_unknown_user_is_bad_request() {
    let (app, _) = seeded_app().await;
    let uri = format!("/user/{}/friends", EXTRA_USERS[0]);
    let (status, json) = send(&app, with_json("PUT", &uri, r#"{"friends": []}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_envelope(&json, "D002", "Invalid UserID");
}

#[tokio::test]
async fn update_friends_rejects_malformed_body() {
    let (app, _) = seeded_app().await;
    let uri = format!("/user/{}/friends", USERS[0]);
    let (status, json) = send(&app, with_json("PUT", &uri, r#"{"friends": "bot1"}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_envelope(&json, "EE001", "Invalid JSON format");
}

// ---------------------------------------------------------------------------
// Fallback and internal failures
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unknown_path_is_not_found_envelope() {
    let (app, _) = seeded_app().await;
    let (status, json) = send(&app, get("/leaderboard")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_envelope(&json, "EE002", "Resource not found");
}

/// A store whose every call fails with an uncoded low-level error.
struct BrokenStore;

fn broken() -> AppError {
    AppError::wrap(&std::io::Error::other("connection reset"))
}

#[async_trait]
impl Datastore for BrokenStore {
    async fn new_user(&self, _id: &str, _name: &str) -> Result<User, AppError> {
        Err(broken())
    }
    async fn get_users(&self) -> Result<Vec<User>, AppError> {
        Err(broken())
    }
    async fn user_exists(&self, _id: &str) -> Result<bool, AppError> {
        Err(broken())
    }
    async fn update_game_state(&self, _: &str, _: u32, _: i32) -> Result<(), AppError> {
        Err(broken())
    }
    async fn get_game_state(&self, _: &str) -> Result<GameState, AppError> {
        Err(broken())
    }
    async fn update_friends(&self, _: &str, _: &[String]) -> Result<(), AppError> {
        Err(broken())
    }
    async fn get_friends(&self, _: &str) -> Result<Vec<Friend>, AppError> {
        Err(broken())
    }
    async fn delete_user(&self, _: &str) -> Result<(), AppError> {
        Err(broken())
    }
}

#[tokio::test]
async fn uncoded_store_failure_is_internal_error() {
    let app = app_with(Arc::new(BrokenStore));

    let (status, json) = send(&app, get("/user")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_envelope(&json, "EE000", "connection reset");

    let (status, json) = send(&app, with_json("POST", "/user", r#"{"name": "flaf"}"#)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_envelope(&json, "EE000", "connection reset");
}
