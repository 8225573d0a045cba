/// Data models for status-service
///
/// - `Post`: an emoji status update, owned by this service
/// - `UserProfile` / `Author`: public projections of identity-provider users
/// - `PostWithAuthor`: the read view model joining the two
pub mod post;
pub mod profile;

pub use post::{CreatePostRequest, Post, PostWithAuthor, MAX_CONTENT_CHARS};
pub use profile::{Author, UserProfile};
