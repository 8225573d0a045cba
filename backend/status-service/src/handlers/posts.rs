/// Post handlers - HTTP endpoints for post operations
use crate::context::{CallContext, Stores, UserId};
use crate::error::{AppError, Result};
use crate::models::CreatePostRequest;
use crate::services;
use actix_web::{web, HttpResponse};
use uuid::Uuid;

/// List the global feed
pub async fn get_all_posts(stores: web::Data<Stores>) -> Result<HttpResponse> {
    let ctx = CallContext::anonymous(stores.get_ref().clone());
    let feed = services::get_all(&ctx).await?;
    Ok(HttpResponse::Ok().json(feed))
}

/// Get a post by ID
pub async fn get_post(stores: web::Data<Stores>, post_id: web::Path<String>) -> Result<HttpResponse> {
    // A malformed id cannot name an existing post.
    let post_id = Uuid::parse_str(&post_id)
        .map_err(|_| AppError::NotFound("Post not found".to_string()))?;

    let ctx = CallContext::anonymous(stores.get_ref().clone());
    let post = services::get_by_id(&ctx, post_id).await?;
    Ok(HttpResponse::Ok().json(post))
}

/// Get posts for a user
pub async fn get_user_posts(
    stores: web::Data<Stores>,
    user_id: web::Path<String>,
) -> Result<HttpResponse> {
    let ctx = CallContext::anonymous(stores.get_ref().clone());
    let feed = services::get_by_author(&ctx, &user_id).await?;
    Ok(HttpResponse::Ok().json(feed))
}

/// Create a new post
///
/// The caller is optional at extraction time so that malformed content is reported
/// as a validation error even without a session.
pub async fn create_post(
    stores: web::Data<Stores>,
    caller: Option<UserId>,
    req: web::Json<CreatePostRequest>,
) -> Result<HttpResponse> {
    let ctx = CallContext {
        caller,
        stores: stores.get_ref().clone(),
    };
    let post = services::create_post(&ctx, req.into_inner()).await?;
    Ok(HttpResponse::Created().json(post))
}
