/// Business logic layer for status-service
///
/// - `admission`: the post creation path (validate, authenticate, rate limit, persist)
/// - `feed`: read procedures joining posts with author profiles
/// - `profile`: public profile lookup
pub mod admission;
pub mod feed;
pub mod profile;

pub use admission::create_post;
pub use feed::{get_all, get_by_author, get_by_id};
pub use profile::get_user_by_username;
