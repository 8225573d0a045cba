/// Post admission - the only write path in the service
use crate::context::CallContext;
use crate::error::{AppError, Result};
use crate::metrics::POST_ADMISSIONS_TOTAL;
use crate::models::{CreatePostRequest, Post};
use tracing::{info, warn};
use validator::Validate;

/// Create a post for the authenticated caller.
///
/// Steps run strictly in order and each gates the next:
/// 1. shape validation (regardless of authentication state)
/// 2. authentication
/// 3. rate limit check (fails closed if the limiter is unavailable)
/// 4. insert, with the author taken from the context
pub async fn create_post(ctx: &CallContext, req: CreatePostRequest) -> Result<Post> {
    if let Err(errors) = req.validate() {
        POST_ADMISSIONS_TOTAL.with_label_values(&["invalid"]).inc();
        return Err(AppError::from(errors));
    }

    let author_id = match ctx.require_caller() {
        Ok(caller) => caller,
        Err(err) => {
            POST_ADMISSIONS_TOTAL
                .with_label_values(&["unauthenticated"])
                .inc();
            return Err(err);
        }
    };

    let decision = match ctx.stores.limiter.limit(author_id.as_str()).await {
        Ok(decision) => decision,
        Err(err) => {
            warn!(%author_id, "rate limiter unavailable, rejecting post: {}", err);
            POST_ADMISSIONS_TOTAL.with_label_values(&["error"]).inc();
            return Err(err);
        }
    };

    if !decision.allowed {
        POST_ADMISSIONS_TOTAL
            .with_label_values(&["rate_limited"])
            .inc();
        // Round up so clients never retry a moment too early.
        let retry_after_secs = (decision.reset_after.as_millis() as u64).div_ceil(1000).max(1);
        return Err(AppError::TooManyRequests { retry_after_secs });
    }

    let post = match ctx
        .stores
        .posts
        .create_post(author_id.as_str(), &req.content)
        .await
    {
        Ok(post) => post,
        Err(err) => {
            POST_ADMISSIONS_TOTAL.with_label_values(&["error"]).inc();
            return Err(err);
        }
    };

    POST_ADMISSIONS_TOTAL.with_label_values(&["created"]).inc();
    info!(
        post_id = %post.id,
        %author_id,
        remaining = decision.remaining,
        "post created"
    );

    Ok(post)
}
