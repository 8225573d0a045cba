use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::profile::Author;

/// Upper bound on post length, in characters.
pub const MAX_CONTENT_CHARS: u64 = 280;

/// A status update as stored in the `posts` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: Uuid,
    pub author_id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Body of `posts.create`.
///
/// Only `content` is read from the client. Any author field a client sends is
/// dropped during deserialization; the author always comes from the session.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreatePostRequest {
    #[validate(
        length(min = 1, max = 280, message = "Content must be between 1 and 280 characters"),
        custom(
            function = "crate::validators::validate_emoji_only",
            message = "Only emojis are allowed!"
        )
    )]
    pub content: String,
}

/// A post joined with its resolved author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostWithAuthor {
    pub post: Post,
    pub author: Author,
}
