/// Profile lookup
use crate::context::CallContext;
use crate::error::{AppError, Result};
use crate::models::UserProfile;

/// Resolve a public profile by exact username.
pub async fn get_user_by_username(ctx: &CallContext, username: &str) -> Result<UserProfile> {
    ctx.stores
        .identity
        .get_user_by_username(username)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
}
