//! Input validators shared by request models.

use once_cell::sync::Lazy;
use regex::Regex;
use validator::ValidationError;

/// Emoji-only: every code point is pictographic or an emoji component
/// (ZWJ, variation selectors, skin tones, regional indicators, keycap parts).
static EMOJI_ONLY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:\p{Extended_Pictographic}|\p{Emoji_Component})+$")
        .expect("emoji regex must compile")
});

pub fn is_emoji_only(value: &str) -> bool {
    EMOJI_ONLY.is_match(value)
}

/// `validator` adapter for [`is_emoji_only`].
pub fn validate_emoji_only(value: &str) -> Result<(), ValidationError> {
    if is_emoji_only(value) {
        Ok(())
    } else {
        Err(ValidationError::new("emoji"))
    }
}
