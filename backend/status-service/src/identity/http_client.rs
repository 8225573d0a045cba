/// HTTP client for the identity provider's backend user API
///
/// Uses `GET {api_url}/v1/users` with repeated `user_id` or `username` query
/// parameters and a bearer secret key.
use super::IdentityProvider;
use crate::config::{IdentityConfig, MAX_PAGE_SIZE};
use crate::error::{AppError, Result};
use crate::metrics::IDENTITY_LOOKUP_DURATION_SECONDS;
use crate::models::UserProfile;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::{Duration, Instant};
use tracing::{debug, error};

/// Raw user object; unknown fields are ignored.
#[derive(Debug, Deserialize)]
struct DirectoryUser {
    id: String,
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    image_url: Option<String>,
}

impl From<DirectoryUser> for UserProfile {
    fn from(user: DirectoryUser) -> Self {
        UserProfile {
            id: user.id,
            username: user.username,
            image_url: user.image_url.unwrap_or_default(),
        }
    }
}

#[derive(Clone)]
pub struct HttpIdentityProvider {
    client: Client,
    users_url: String,
    secret_key: String,
}

impl HttpIdentityProvider {
    pub fn new(cfg: &IdentityConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(cfg.timeout_ms))
            .build()
            .map_err(|e| AppError::Internal(format!("failed to build identity client: {}", e)))?;

        Ok(Self {
            client,
            users_url: format!("{}/v1/users", cfg.api_url.trim_end_matches('/')),
            secret_key: cfg.secret_key.clone(),
        })
    }

    async fn list_users(&self, operation: &str, query: &[(&str, &str)]) -> Result<Vec<UserProfile>> {
        let start = Instant::now();
        let response = self
            .client
            .get(&self.users_url)
            .bearer_auth(&self.secret_key)
            .query(query)
            .send()
            .await;

        IDENTITY_LOOKUP_DURATION_SECONDS
            .with_label_values(&[operation])
            .observe(start.elapsed().as_secs_f64());

        let response = response.map_err(|e| {
            error!(operation, "identity provider request failed: {}", e);
            AppError::from(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!(operation, %status, %body, "identity provider returned error");
            return Err(AppError::ServiceUnavailable(format!(
                "identity provider returned {}",
                status
            )));
        }

        let users: Vec<DirectoryUser> = response.json().await?;
        debug!(operation, count = users.len(), "identity lookup completed");

        Ok(users.into_iter().map(UserProfile::from).collect())
    }
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    async fn get_users_by_ids(&self, user_ids: &[String]) -> Result<Vec<UserProfile>> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }

        let limit = MAX_PAGE_SIZE.to_string();
        let mut query: Vec<(&str, &str)> = user_ids
            .iter()
            .take(MAX_PAGE_SIZE as usize)
            .map(|id| ("user_id", id.as_str()))
            .collect();
        query.push(("limit", limit.as_str()));

        self.list_users("by_ids", &query).await
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<UserProfile>> {
        let users = self
            .list_users("by_username", &[("username", username), ("limit", "10")])
            .await?;

        Ok(pick_username_match(users, username))
    }
}

/// The directory matches usernames case-insensitively; so do we.
fn pick_username_match(users: Vec<UserProfile>, username: &str) -> Option<UserProfile> {
    users.into_iter().find(|u| {
        u.username
            .as_deref()
            .is_some_and(|name| name.eq_ignore_ascii_case(username))
    })
}
