// Integration tests for feed assembly
//
// Ordering, page caps, single batched author lookup and the fail-closed join.

mod common;

use chrono::{Duration, Utc};
use common::{Harness, InMemoryIdentityProvider, InMemoryRateLimiter};
use status_service::error::AppError;
use status_service::services;
use std::sync::Arc;
use uuid::Uuid;

#[tokio::test]
async fn test_get_all_caps_at_page_size_and_orders_desc() {
    let h = Harness::standard();
    let now = Utc::now();
    for i in 0..150 {
        let author = if i % 2 == 0 { "user_alice" } else { "user_bob" };
        h.posts.seed(author, "🎉", now - Duration::seconds(i));
    }

    let feed = services::get_all(&h.anonymous()).await.unwrap();

    assert_eq!(feed.len(), 100);
    for pair in feed.windows(2) {
        assert!(pair[0].post.created_at >= pair[1].post.created_at);
    }
    assert_eq!(feed[0].post.created_at, now);
    assert_eq!(h.identity.batch_calls(), 1);
}

#[tokio::test]
async fn test_equal_timestamps_have_stable_order() {
    let h = Harness::standard();
    let at = Utc::now();
    for _ in 0..5 {
        h.posts.seed("user_alice", "🎉", at);
    }

    let first: Vec<Uuid> = services::get_all(&h.anonymous())
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.post.id)
        .collect();
    let second: Vec<Uuid> = services::get_all(&h.anonymous())
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.post.id)
        .collect();

    assert_eq!(first, second);
}

#[tokio::test]
async fn test_get_by_author_only_returns_that_author() {
    let h = Harness::standard();
    let now = Utc::now();
    h.posts.seed("user_alice", "🎉", now - Duration::seconds(3));
    h.posts.seed("user_bob", "🐶", now - Duration::seconds(2));
    h.posts.seed("user_alice", "🥳", now - Duration::seconds(1));

    let feed = services::get_by_author(&h.anonymous(), "user_alice")
        .await
        .unwrap();

    assert_eq!(feed.len(), 2);
    assert_eq!(feed[0].post.content, "🥳");
    assert_eq!(feed[1].post.content, "🎉");
    assert!(feed.iter().all(|p| p.author.username == "alice"));
}

#[tokio::test]
async fn test_get_by_author_unknown_user_is_empty() {
    let h = Harness::standard();
    h.posts.seed("user_alice", "🎉", Utc::now());

    let feed = services::get_by_author(&h.anonymous(), "user_nobody")
        .await
        .unwrap();

    assert!(feed.is_empty());
    assert_eq!(h.identity.batch_calls(), 0);
}

#[tokio::test]
async fn test_get_by_id_nonexistent_is_not_found() {
    let h = Harness::standard();

    let err = services::get_by_id(&h.anonymous(), Uuid::new_v4())
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_unresolvable_author_fails_entire_feed() {
    let h = Harness::standard();
    let now = Utc::now();
    h.posts.seed("user_alice", "🎉", now);
    h.posts.seed("user_deleted", "👻", now - Duration::seconds(1));

    let err = services::get_all(&h.anonymous()).await.unwrap_err();
    assert!(matches!(err, AppError::Internal(_)));
}

#[tokio::test]
async fn test_author_without_username_fails_get_by_id() {
    let h = Harness::new(
        InMemoryIdentityProvider::new().with_user("user_anon", None),
        Arc::new(InMemoryRateLimiter::per_minute(3)),
    );
    let post = h.posts.seed("user_anon", "🎉", Utc::now());

    let err = services::get_by_id(&h.anonymous(), post.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Internal(_)));
}

#[tokio::test]
async fn test_profile_lookup() {
    let h = Harness::standard();

    let profile = services::get_user_by_username(&h.anonymous(), "alice")
        .await
        .unwrap();
    assert_eq!(profile.id, "user_alice");

    let profile = services::get_user_by_username(&h.anonymous(), "Alice")
        .await
        .unwrap();
    assert_eq!(profile.id, "user_alice");

    let err = services::get_user_by_username(&h.anonymous(), "mallory")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}
