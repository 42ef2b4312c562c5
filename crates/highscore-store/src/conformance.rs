//! Adapter conformance suite.
//!
//! Every [`Datastore`] adapter must pass these scenarios unmodified. The
//! simulator runs them as ordinary tests; the `PostgreSQL` adapter runs
//! them against a live database. Any divergence between adapters is a bug.
//!
//! Each scenario starts with [`reset`], which deletes every id the suite
//! touches and re-seeds the fixture, so the scenarios can share one store
//! when run sequentially via [`run_all`].
//!
//! # Fixture
//!
//! | User | Name | Games played | Score | Friends |
//! |------|------|--------------|-------|---------|
//! | `USERS[0]` | `bot0` | 10 | 110 | `USERS[1..=3]` |
//! | `USERS[1]` | `bot1` | 0 | 0 | -- |
//! | `USERS[2]` | `bot2` | 0 | 0 | -- |
//! | `USERS[3]` | `bot3` | 0 | 0 | -- |

// Test support: panicking on a failed expectation is the point.
#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::missing_panics_doc,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects
)]

use highscore_types::{AppError, BAD_REQUEST, ENTRY_EXISTS, GameState, INVALID_KEY};

use crate::datastore::{Datastore, MAX_GAMES_PLAYED};

/// Fixture user ids, in ascending order.
pub const USERS: [&str; 4] = [
    "aee6feba-043b-4ba4-a7a4-9d6705595049",
    "bee6feba-043b-4ba4-a7a4-9d6705595049",
    "cee6feba-043b-4ba4-a7a4-9d6705595049",
    "dee6feba-043b-4ba4-a7a4-9d6705595049",
];

/// Fixture user names, parallel to [`USERS`].
pub const USER_NAMES: [&str; 4] = ["bot0", "bot1", "bot2", "bot3"];

/// Ids that scenarios create on top of the fixture.
pub const EXTRA_USERS: [&str; 3] = [
    "fee6feba-043b-4ba4-a7a4-9d6705595049",
    "0ee6feba-043b-4ba4-a7a4-9d6705595049",
    "eee6feba-043b-4ba4-a7a4-9d6705595049",
];

/// Seed the fixture into `store` through the contract itself.
pub async fn seed(store: &dyn Datastore) -> Result<(), AppError> {
    for (id, name) in USERS.iter().zip(USER_NAMES) {
        store.new_user(id, name).await?;
    }
    let friends: Vec<String> = USERS[1..].iter().map(|id| (*id).to_owned()).collect();
    store.update_friends(USERS[0], &friends).await?;
    store.update_game_state(USERS[0], 10, 110).await?;
    Ok(())
}

/// Remove everything the suite may have created, then seed the fixture.
pub async fn reset(store: &dyn Datastore) {
    for id in USERS.iter().chain(EXTRA_USERS.iter()) {
        store.delete_user(id).await.expect("delete during reset");
    }
    seed(store).await.expect("seed fixture");
}

fn ids(list: &[&str]) -> Vec<String> {
    list.iter().map(|id| (*id).to_owned()).collect()
}

/// `get_users` returns the fixture ordered by id.
pub async fn get_users_lists_fixture_in_id_order(store: &dyn Datastore) {
    reset(store).await;
    let users = store.get_users().await.expect("get_users");
    let got: Vec<(&str, &str)> = users
        .iter()
        .map(|u| (u.id.as_str(), u.name.as_str()))
        .collect();
    let want: Vec<(&str, &str)> = USERS.iter().copied().zip(USER_NAMES).collect();
    assert_eq!(got, want);
}

/// `user_exists` reports present and absent ids.
pub async fn user_exists_reports_presence(store: &dyn Datastore) {
    reset(store).await;
    assert!(store.user_exists(USERS[0]).await.expect("user_exists"));
    assert!(!store.user_exists(EXTRA_USERS[0]).await.expect("user_exists"));
}

/// `get_game_state` returns the seeded state.
pub async fn get_game_state_returns_seeded_state(store: &dyn Datastore) {
    reset(store).await;
    let state = store.get_game_state(USERS[0]).await.expect("get_game_state");
    assert_eq!(
        state,
        GameState {
            games_played: 10,
            score: 110
        }
    );
}

/// `get_friends` resolves each id to its live name and score, in id order.
pub async fn get_friends_resolves_fixture(store: &dyn Datastore) {
    reset(store).await;
    let friends = store.get_friends(USERS[0]).await.expect("get_friends");
    let got: Vec<(&str, &str, i32)> = friends
        .iter()
        .map(|f| (f.id.as_str(), f.name.as_str(), f.high_score))
        .collect();
    assert_eq!(
        got,
        vec![
            (USERS[1], USER_NAMES[1], 0),
            (USERS[2], USER_NAMES[2], 0),
            (USERS[3], USER_NAMES[3], 0),
        ]
    );
}

/// A created user appears exactly once; a second create with the same id
/// fails with `ENTRY_EXISTS`.
pub async fn new_user_is_listed_once_and_rejects_duplicates(store: &dyn Datastore) {
    reset(store).await;
    let user = store
        .new_user(EXTRA_USERS[0], "flaf")
        .await
        .expect("new_user");
    assert_eq!(user.id, EXTRA_USERS[0]);
    assert_eq!(user.name, "flaf");

    let users = store.get_users().await.expect("get_users");
    assert_eq!(users.len(), USERS.len() + 1);
    assert_eq!(
        users.iter().filter(|u| u.id == EXTRA_USERS[0]).count(),
        1
    );
    assert_eq!(users.last().map(|u| u.id.as_str()), Some(EXTRA_USERS[0]));

    let err = store
        .new_user(EXTRA_USERS[0], "again")
        .await
        .expect_err("duplicate id must fail");
    assert!(err.is(&ENTRY_EXISTS), "unexpected error: {err}");

    let users = store.get_users().await.expect("get_users");
    let kept = users.iter().find(|u| u.id == EXTRA_USERS[0]).expect("kept");
    assert_eq!(kept.name, "flaf", "a duplicate create must not overwrite");
}

/// `get_users` is sorted regardless of insertion order.
pub async fn get_users_sorts_out_of_order_inserts(store: &dyn Datastore) {
    reset(store).await;
    for id in EXTRA_USERS {
        store.new_user(id, "late").await.expect("new_user");
    }
    let users = store.get_users().await.expect("get_users");
    let got: Vec<&str> = users.iter().map(|u| u.id.as_str()).collect();
    let mut want = got.clone();
    want.sort_unstable();
    assert_eq!(got, want);
    assert_eq!(got.first().copied(), Some(EXTRA_USERS[1]));
}

/// Game state updates overwrite; nothing accumulates.
pub async fn update_game_state_last_write_wins(store: &dyn Datastore) {
    reset(store).await;
    store
        .update_game_state(USERS[3], 1, 200)
        .await
        .expect("first update");
    store
        .update_game_state(USERS[3], 0, -5)
        .await
        .expect("second update");
    let state = store.get_game_state(USERS[3]).await.expect("get_game_state");
    assert_eq!(
        state,
        GameState {
            games_played: 0,
            score: -5
        }
    );
}

/// Game state operations on an unknown user fail with `INVALID_KEY`.
pub async fn game_state_of_unknown_user_is_invalid_key(store: &dyn Datastore) {
    reset(store).await;
    let err = store
        .update_game_state(EXTRA_USERS[0], 1, 1)
        .await
        .expect_err("update on unknown id must fail");
    assert!(err.is(&INVALID_KEY), "unexpected error: {err}");

    let err = store
        .get_game_state(EXTRA_USERS[0])
        .await
        .expect_err("read of unknown id must fail");
    assert!(err.is(&INVALID_KEY), "unexpected error: {err}");
}

/// `games_played` up to [`MAX_GAMES_PLAYED`] is stored; anything larger
/// fails with `BAD_REQUEST` before the user is looked up and leaves the
/// stored state untouched.
pub async fn update_game_state_rejects_out_of_range(store: &dyn Datastore) {
    reset(store).await;
    store
        .update_game_state(USERS[1], MAX_GAMES_PLAYED, 7)
        .await
        .expect("largest games_played is accepted");
    assert_eq!(
        store.get_game_state(USERS[1]).await.expect("get_game_state"),
        GameState {
            games_played: MAX_GAMES_PLAYED,
            score: 7
        }
    );

    let err = store
        .update_game_state(USERS[1], MAX_GAMES_PLAYED + 1, 8)
        .await
        .expect_err("oversized games_played must fail");
    assert!(err.is(&BAD_REQUEST), "unexpected error: {err}");
    assert_eq!(err.status(), Some(400));

    let err = store
        .update_game_state(EXTRA_USERS[0], u32::MAX, 0)
        .await
        .expect_err("oversized games_played must fail for unknown ids too");
    assert!(err.is(&BAD_REQUEST), "unexpected error: {err}");

    assert_eq!(
        store.get_game_state(USERS[1]).await.expect("get_game_state"),
        GameState {
            games_played: MAX_GAMES_PLAYED,
            score: 7
        }
    );
}

/// An emptied friend list reads back empty.
pub async fn update_friends_to_empty(store: &dyn Datastore) {
    reset(store).await;
    store
        .update_friends(USERS[0], &[])
        .await
        .expect("update_friends");
    let friends = store.get_friends(USERS[0]).await.expect("get_friends");
    assert!(friends.is_empty());
}

/// Friends are resolved and sorted by id, each with the friend's current
/// score.
pub async fn update_friends_resolves_sorted_with_scores(store: &dyn Datastore) {
    reset(store).await;
    store
        .update_friends(USERS[3], &ids(&[USERS[1], USERS[0]]))
        .await
        .expect("update_friends");
    let friends = store.get_friends(USERS[3]).await.expect("get_friends");
    let got: Vec<(&str, i32)> = friends
        .iter()
        .map(|f| (f.id.as_str(), f.high_score))
        .collect();
    assert_eq!(got, vec![(USERS[0], 110), (USERS[1], 0)]);

    // Scores are read live, not captured at write time.
    store
        .update_game_state(USERS[1], 3, 42)
        .await
        .expect("update_game_state");
    let friends = store.get_friends(USERS[3]).await.expect("get_friends");
    assert_eq!(friends.get(1).map(|f| f.high_score), Some(42));
}

/// Whatever `update_friends` accepts reads back as the same set of ids.
pub async fn update_friends_round_trips_as_a_set(store: &dyn Datastore) {
    reset(store).await;
    let written = ids(&[USERS[2], USERS[0], USERS[3]]);
    store
        .update_friends(USERS[1], &written)
        .await
        .expect("update_friends");
    let friends = store.get_friends(USERS[1]).await.expect("get_friends");
    let mut read: Vec<String> = friends.into_iter().map(|f| f.id).collect();
    let mut expected = written;
    read.sort_unstable();
    expected.sort_unstable();
    assert_eq!(read, expected);
}

/// Friend ids are not validated on write; an unresolved id fails the
/// whole read with `INVALID_KEY`.
pub async fn get_friends_fails_on_unresolved_friend(store: &dyn Datastore) {
    reset(store).await;
    store
        .update_friends(USERS[2], &ids(&[USERS[1], EXTRA_USERS[2]]))
        .await
        .expect("unknown friend ids are accepted on write");
    let err = store
        .get_friends(USERS[2])
        .await
        .expect_err("unresolved friend must fail the read");
    assert!(err.is(&INVALID_KEY), "unexpected error: {err}");

    // Deleting a listed friend has the same effect.
    store.delete_user(USERS[3]).await.expect("delete_user");
    let err = store
        .get_friends(USERS[0])
        .await
        .expect_err("deleted friend must fail the read");
    assert!(err.is(&INVALID_KEY), "unexpected error: {err}");
}

/// Friend operations on an unknown user fail with `INVALID_KEY`.
pub async fn friends_of_unknown_user_is_invalid_key(store: &dyn Datastore) {
    reset(store).await;
    let err = store
        .update_friends(EXTRA_USERS[0], &ids(&[USERS[0]]))
        .await
        .expect_err("update on unknown id must fail");
    assert!(err.is(&INVALID_KEY), "unexpected error: {err}");

    let err = store
        .get_friends(EXTRA_USERS[0])
        .await
        .expect_err("read of unknown id must fail");
    assert!(err.is(&INVALID_KEY), "unexpected error: {err}");
}

/// Deleting removes the user; deleting again is not an error.
pub async fn delete_user_is_idempotent(store: &dyn Datastore) {
    reset(store).await;
    store.delete_user(USERS[0]).await.expect("delete_user");
    let users = store.get_users().await.expect("get_users");
    assert_eq!(users.len(), USERS.len() - 1);
    assert!(users.iter().all(|u| u.id != USERS[0]));
    assert!(!store.user_exists(USERS[0]).await.expect("user_exists"));

    store
        .delete_user(USERS[0])
        .await
        .expect("second delete is a no-op");
    store
        .delete_user(EXTRA_USERS[0])
        .await
        .expect("deleting a never-created id is a no-op");
}

/// Run every scenario in sequence against one store.
pub async fn run_all(store: &dyn Datastore) {
    get_users_lists_fixture_in_id_order(store).await;
    user_exists_reports_presence(store).await;
    get_game_state_returns_seeded_state(store).await;
    get_friends_resolves_fixture(store).await;
    new_user_is_listed_once_and_rejects_duplicates(store).await;
    get_users_sorts_out_of_order_inserts(store).await;
    update_game_state_last_write_wins(store).await;
    game_state_of_unknown_user_is_invalid_key(store).await;
    update_game_state_rejects_out_of_range(store).await;
    update_friends_to_empty(store).await;
    update_friends_resolves_sorted_with_scores(store).await;
    update_friends_round_trips_as_a_set(store).await;
    get_friends_fails_on_unresolved_friend(store).await;
    friends_of_unknown_user_is_invalid_key(store).await;
    delete_user_is_idempotent(store).await;

    for id in USERS.iter().chain(EXTRA_USERS.iter()) {
        store.delete_user(id).await.expect("final cleanup");
    }
}
