//! Per-call context.
//!
//! Every service function receives a `CallContext` carrying the caller identity
//! (if any) and handles to the external stores. Nothing is read from ambient
//! globals, which keeps the services callable from tests without a server.

use crate::config::FeedConfig;
use crate::db::PostRepository;
use crate::error::{AppError, Result};
use crate::identity::IdentityProvider;
use crate::rate_limit::RateLimiter;
use std::fmt;
use std::sync::Arc;

/// Identity-provider user id of an authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UserId(pub String);

impl UserId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Shared store handles, cloned cheaply into each call.
#[derive(Clone)]
pub struct Stores {
    pub posts: Arc<dyn PostRepository>,
    pub identity: Arc<dyn IdentityProvider>,
    pub limiter: Arc<dyn RateLimiter>,
    pub feed: FeedConfig,
}

impl Stores {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        identity: Arc<dyn IdentityProvider>,
        limiter: Arc<dyn RateLimiter>,
        feed: FeedConfig,
    ) -> Self {
        Self {
            posts,
            identity,
            limiter,
            feed,
        }
    }
}

pub struct CallContext {
    pub caller: Option<UserId>,
    pub stores: Stores,
}

impl CallContext {
    pub fn anonymous(stores: Stores) -> Self {
        Self {
            caller: None,
            stores,
        }
    }

    pub fn authenticated(caller: UserId, stores: Stores) -> Self {
        Self {
            caller: Some(caller),
            stores,
        }
    }

    /// The authenticated caller, or `Unauthenticated`.
    pub fn require_caller(&self) -> Result<&UserId> {
        self.caller
            .as_ref()
            .ok_or_else(|| AppError::Unauthenticated("Sign in to post".to_string()))
    }
}
