/// Profile handlers
use crate::context::{CallContext, Stores};
use crate::error::Result;
use crate::services;
use actix_web::{web, HttpResponse};

/// Get a public profile by username
pub async fn get_user_by_username(
    stores: web::Data<Stores>,
    username: web::Path<String>,
) -> Result<HttpResponse> {
    let ctx = CallContext::anonymous(stores.get_ref().clone());
    let profile = services::get_user_by_username(&ctx, &username).await?;
    Ok(HttpResponse::Ok().json(profile))
}
