//! In-memory stand-ins for the external stores.
//!
//! They implement the same traits as the PostgreSQL, Redis and identity-provider
//! adapters so the services and the HTTP surface can be exercised without any
//! infrastructure.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::Serialize;
use status_service::config::{FeedConfig, SessionConfig};
use status_service::context::{CallContext, Stores, UserId};
use status_service::db::PostRepository;
use status_service::error::{AppError, Result};
use status_service::identity::IdentityProvider;
use status_service::middleware::SessionVerifier;
use status_service::models::{Post, UserProfile};
use status_service::rate_limit::{RateLimitDecision, RateLimiter};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;
use uuid::Uuid;

pub const SESSION_SECRET: &str = "integration-test-secret";

// =====================================================================
// Posts
// =====================================================================

#[derive(Default)]
pub struct InMemoryPostRepository {
    posts: Mutex<Vec<Post>>,
}

impl InMemoryPostRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a post with an explicit timestamp, bypassing admission.
    pub fn seed(&self, author_id: &str, content: &str, created_at: DateTime<Utc>) -> Post {
        let post = Post {
            id: Uuid::new_v4(),
            author_id: author_id.to_string(),
            content: content.to_string(),
            created_at,
        };
        self.posts.lock().unwrap().push(post.clone());
        post
    }

    pub fn count(&self) -> usize {
        self.posts.lock().unwrap().len()
    }

    fn sorted(&self) -> Vec<Post> {
        let mut posts = self.posts.lock().unwrap().clone();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        posts
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn create_post(&self, author_id: &str, content: &str) -> Result<Post> {
        Ok(self.seed(author_id, content, Utc::now()))
    }

    async fn find_post_by_id(&self, post_id: Uuid) -> Result<Option<Post>> {
        Ok(self
            .posts
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == post_id)
            .cloned())
    }

    async fn find_recent_posts(&self, limit: i64) -> Result<Vec<Post>> {
        Ok(self.sorted().into_iter().take(limit as usize).collect())
    }

    async fn find_posts_by_author(&self, author_id: &str, limit: i64) -> Result<Vec<Post>> {
        Ok(self
            .sorted()
            .into_iter()
            .filter(|p| p.author_id == author_id)
            .take(limit as usize)
            .collect())
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

// =====================================================================
// Identity provider
// =====================================================================

#[derive(Default)]
pub struct InMemoryIdentityProvider {
    users: Mutex<HashMap<String, UserProfile>>,
    batch_calls: AtomicUsize,
}

impl InMemoryIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(self, id: &str, username: Option<&str>) -> Self {
        self.users.lock().unwrap().insert(
            id.to_string(),
            UserProfile {
                id: id.to_string(),
                username: username.map(str::to_string),
                image_url: format!("https://img.example.com/{}.png", id),
            },
        );
        self
    }

    /// Number of `get_users_by_ids` calls, for N+1 checks.
    pub fn batch_calls(&self) -> usize {
        self.batch_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityProvider for InMemoryIdentityProvider {
    async fn get_users_by_ids(&self, user_ids: &[String]) -> Result<Vec<UserProfile>> {
        self.batch_calls.fetch_add(1, Ordering::SeqCst);
        let users = self.users.lock().unwrap();
        Ok(user_ids
            .iter()
            .filter_map(|id| users.get(id).cloned())
            .collect())
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<UserProfile>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .values()
            .find(|u| {
                u.username
                    .as_deref()
                    .is_some_and(|name| name.eq_ignore_ascii_case(username))
            })
            .cloned())
    }
}

// =====================================================================
// Rate limiters
// =====================================================================

/// Exact sliding log on the Tokio clock, so paused-time tests can move the window.
pub struct InMemoryRateLimiter {
    max_requests: u32,
    window: Duration,
    log: Mutex<HashMap<String, VecDeque<Instant>>>,
}

impl InMemoryRateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            log: Mutex::new(HashMap::new()),
        }
    }

    pub fn per_minute(max_requests: u32) -> Self {
        Self::new(max_requests, Duration::from_secs(60))
    }
}

#[async_trait]
impl RateLimiter for InMemoryRateLimiter {
    async fn limit(&self, identifier: &str) -> Result<RateLimitDecision> {
        let now = Instant::now();
        let mut log = self.log.lock().unwrap();
        let entries = log.entry(identifier.to_string()).or_default();

        while let Some(oldest) = entries.front() {
            if now.duration_since(*oldest) >= self.window {
                entries.pop_front();
            } else {
                break;
            }
        }

        let allowed = (entries.len() as u32) < self.max_requests;
        if allowed {
            entries.push_back(now);
        }

        let reset_after = entries
            .front()
            .map(|oldest| self.window.saturating_sub(now.duration_since(*oldest)))
            .unwrap_or_default();

        Ok(RateLimitDecision {
            allowed,
            remaining: self.max_requests.saturating_sub(entries.len() as u32),
            reset_after,
        })
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

/// Limiter whose backend is always down.
pub struct UnavailableRateLimiter;

#[async_trait]
impl RateLimiter for UnavailableRateLimiter {
    async fn limit(&self, _identifier: &str) -> Result<RateLimitDecision> {
        Err(AppError::ServiceUnavailable(
            "rate limiter: connection refused".to_string(),
        ))
    }

    async fn ping(&self) -> Result<()> {
        Err(AppError::ServiceUnavailable("connection refused".to_string()))
    }
}

// =====================================================================
// Fixtures
// =====================================================================

pub struct Harness {
    pub posts: Arc<InMemoryPostRepository>,
    pub identity: Arc<InMemoryIdentityProvider>,
    pub stores: Stores,
}

impl Harness {
    pub fn new(identity: InMemoryIdentityProvider, limiter: Arc<dyn RateLimiter>) -> Self {
        let posts = Arc::new(InMemoryPostRepository::new());
        let identity = Arc::new(identity);
        let stores = Stores::new(
            posts.clone(),
            identity.clone(),
            limiter,
            FeedConfig::default(),
        );
        Self {
            posts,
            identity,
            stores,
        }
    }

    /// Two known users, 3 posts per minute.
    pub fn standard() -> Self {
        Self::new(
            InMemoryIdentityProvider::new()
                .with_user("user_alice", Some("alice"))
                .with_user("user_bob", Some("bob")),
            Arc::new(InMemoryRateLimiter::per_minute(3)),
        )
    }

    pub fn as_user(&self, user_id: &str) -> CallContext {
        CallContext::authenticated(UserId(user_id.to_string()), self.stores.clone())
    }

    pub fn anonymous(&self) -> CallContext {
        CallContext::anonymous(self.stores.clone())
    }
}

pub fn session_verifier() -> Arc<SessionVerifier> {
    Arc::new(
        SessionVerifier::from_config(&SessionConfig {
            public_key_pem: None,
            hmac_secret: Some(SESSION_SECRET.to_string()),
            issuer: None,
        })
        .expect("test session verifier"),
    )
}

/// A signed HS256 session token for `user_id`, valid for five minutes.
pub fn session_token(user_id: &str) -> String {
    #[derive(Serialize)]
    struct Claims<'a> {
        sub: &'a str,
        exp: i64,
        sid: &'a str,
    }

    encode(
        &Header::new(Algorithm::HS256),
        &Claims {
            sub: user_id,
            exp: Utc::now().timestamp() + 300,
            sid: "sess_test",
        },
        &EncodingKey::from_secret(SESSION_SECRET.as_bytes()),
    )
    .expect("encode session token")
}
