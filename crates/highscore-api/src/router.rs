//! Axum router construction.
//!
//! Assembles the user routes into a single [`Router`] with request
//! tracing and a per-request timeout.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::routing::get;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Default per-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Build the complete Axum router.
///
/// The router includes:
/// - `POST /user`, `GET /user`
/// - `GET /user/{id}/state`, `PUT /user/{id}/state`
/// - `GET /user/{id}/friends`, `PUT /user/{id}/friends`
/// - a fallback answering everything else with an error envelope
///
/// Requests running longer than `request_timeout` are cut off with
/// `408 Request Timeout`.
pub fn build_router(state: Arc<AppState>, request_timeout: Duration) -> Router {
    Router::new()
        .route(
            "/user",
            get(handlers::list_users).post(handlers::create_user),
        )
        .route(
            "/user/{id}/state",
            get(handlers::get_game_state).put(handlers::update_game_state),
        )
        .route(
            "/user/{id}/friends",
            get(handlers::get_friends).put(handlers::update_friends),
        )
        .fallback(handlers::fallback)
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
