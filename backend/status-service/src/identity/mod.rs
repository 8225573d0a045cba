/// Identity provider adapter
///
/// Users live in a hosted identity provider. This service only reads public
/// profile projections (`id`, `username`, `imageUrl`) and never caches them.
pub mod http_client;

pub use http_client::HttpIdentityProvider;

use crate::error::Result;
use crate::models::UserProfile;
use async_trait::async_trait;

/// Read-only lookups against the user directory.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Batch lookup. Unknown ids are simply absent from the result.
    async fn get_users_by_ids(&self, user_ids: &[String]) -> Result<Vec<UserProfile>>;

    /// Exact username lookup.
    async fn get_user_by_username(&self, username: &str) -> Result<Option<UserProfile>>;
}
