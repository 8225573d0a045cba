/// Feed assembly - read procedures joined with author profiles
///
/// Authors are resolved with a single batched identity lookup per call. The join
/// fails closed: if any author on the page is missing or has no username, the
/// whole read fails rather than returning a partial feed.
use crate::context::CallContext;
use crate::error::{AppError, Result};
use crate::metrics::FEED_READS_TOTAL;
use crate::models::{Author, Post, PostWithAuthor};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// Global feed, newest first.
pub async fn get_all(ctx: &CallContext) -> Result<Vec<PostWithAuthor>> {
    let result = async {
        let posts = ctx
            .stores
            .posts
            .find_recent_posts(ctx.stores.feed.page_size)
            .await?;
        attach_authors(ctx, posts).await
    }
    .await;

    record("get_all", &result);
    result
}

/// A single post. Unknown ids are `NotFound`.
pub async fn get_by_id(ctx: &CallContext, post_id: Uuid) -> Result<PostWithAuthor> {
    let result = async {
        let post = ctx
            .stores
            .posts
            .find_post_by_id(post_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

        attach_authors(ctx, vec![post])
            .await?
            .pop()
            .ok_or_else(|| AppError::Internal("Author join dropped the post".to_string()))
    }
    .await;

    record("get_by_id", &result);
    result
}

/// One author's feed, newest first.
pub async fn get_by_author(ctx: &CallContext, author_id: &str) -> Result<Vec<PostWithAuthor>> {
    let result = async {
        let posts = ctx
            .stores
            .posts
            .find_posts_by_author(author_id, ctx.stores.feed.page_size)
            .await?;
        attach_authors(ctx, posts).await
    }
    .await;

    record("get_by_author", &result);
    result
}

async fn attach_authors(ctx: &CallContext, posts: Vec<Post>) -> Result<Vec<PostWithAuthor>> {
    if posts.is_empty() {
        return Ok(Vec::new());
    }

    let mut seen = HashSet::new();
    let author_ids: Vec<String> = posts
        .iter()
        .filter(|p| seen.insert(p.author_id.as_str()))
        .map(|p| p.author_id.clone())
        .collect();

    let authors: HashMap<String, Author> = ctx
        .stores
        .identity
        .get_users_by_ids(&author_ids)
        .await?
        .into_iter()
        .filter_map(|profile| Author::try_from(profile).ok())
        .map(|author| (author.id.clone(), author))
        .collect();

    posts
        .into_iter()
        .map(|post| match authors.get(&post.author_id) {
            Some(author) => Ok(PostWithAuthor {
                author: author.clone(),
                post,
            }),
            None => {
                tracing::error!(
                    post_id = %post.id,
                    author_id = %post.author_id,
                    "author could not be resolved"
                );
                Err(AppError::Internal("Author not found".to_string()))
            }
        })
        .collect()
}

fn record<T>(procedure: &str, result: &Result<T>) {
    let outcome = match result {
        Ok(_) => "ok",
        Err(AppError::NotFound(_)) => "not_found",
        Err(_) => "error",
    };
    FEED_READS_TOTAL
        .with_label_values(&[procedure, outcome])
        .inc();
}
