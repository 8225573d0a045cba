/// HTTP handlers for the remote procedure surface
///
/// | Procedure                  | Route                               |
/// |----------------------------|-------------------------------------|
/// | posts.getAll               | `GET  /api/v1/posts`                |
/// | posts.getById              | `GET  /api/v1/posts/{id}`           |
/// | posts.getPostsByUserId     | `GET  /api/v1/posts/user/{user_id}` |
/// | posts.create               | `POST /api/v1/posts`                |
/// | profile.getUserByUsername  | `GET  /api/v1/profile/{username}`   |
pub mod health;
pub mod posts;
pub mod profile;

pub use posts::{create_post, get_all_posts, get_post, get_user_posts};
pub use profile::get_user_by_username;

use crate::error::AppError;
use actix_web::web;

/// Mount the procedure routes. Callers wrap the scope with the session gate.
pub fn configure(cfg: &mut web::ServiceConfig) {
    // Unparseable bodies are reported like any other validation failure.
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| AppError::validation("body", err.to_string()).into()),
    )
    .service(
        web::scope("/posts")
            .service(
                web::resource("")
                    .route(web::get().to(get_all_posts))
                    .route(web::post().to(create_post)),
            )
            .service(web::resource("/user/{user_id}").route(web::get().to(get_user_posts)))
            .service(web::resource("/{post_id}").route(web::get().to(get_post))),
    )
    .service(web::resource("/profile/{username}").route(web::get().to(get_user_by_username)));
}
