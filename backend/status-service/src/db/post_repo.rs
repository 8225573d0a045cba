use crate::error::Result;
use crate::models::Post;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

/// Storage for posts. Reads are ordered newest first with `id` as tie-breaker.
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Insert a post; the store assigns `id` and `created_at`.
    async fn create_post(&self, author_id: &str, content: &str) -> Result<Post>;

    /// Find a post by ID
    async fn find_post_by_id(&self, post_id: Uuid) -> Result<Option<Post>>;

    /// Most recent posts across all authors
    async fn find_recent_posts(&self, limit: i64) -> Result<Vec<Post>>;

    /// Most recent posts by one author
    async fn find_posts_by_author(&self, author_id: &str, limit: i64) -> Result<Vec<Post>>;

    /// Connectivity probe for readiness checks
    async fn ping(&self) -> Result<()>;
}

/// PostgreSQL-backed repository.
#[derive(Clone)]
pub struct PgPostRepository {
    pool: PgPool,
}

impl PgPostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PostRepository for PgPostRepository {
    async fn create_post(&self, author_id: &str, content: &str) -> Result<Post> {
        let post = sqlx::query_as::<_, Post>(
            r#"
            INSERT INTO posts (author_id, content)
            VALUES ($1, $2)
            RETURNING id, author_id, content, created_at
            "#,
        )
        .bind(author_id)
        .bind(content)
        .fetch_one(&self.pool)
        .await?;

        Ok(post)
    }

    async fn find_post_by_id(&self, post_id: Uuid) -> Result<Option<Post>> {
        let post = sqlx::query_as::<_, Post>(
            r#"
            SELECT id, author_id, content, created_at
            FROM posts
            WHERE id = $1
            "#,
        )
        .bind(post_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(post)
    }

    async fn find_recent_posts(&self, limit: i64) -> Result<Vec<Post>> {
        let posts = sqlx::query_as::<_, Post>(
            r#"
            SELECT id, author_id, content, created_at
            FROM posts
            ORDER BY created_at DESC, id DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(posts)
    }

    async fn find_posts_by_author(&self, author_id: &str, limit: i64) -> Result<Vec<Post>> {
        let posts = sqlx::query_as::<_, Post>(
            r#"
            SELECT id, author_id, content, created_at
            FROM posts
            WHERE author_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2
            "#,
        )
        .bind(author_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(posts)
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
