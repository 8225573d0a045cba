use serde::{Deserialize, Serialize};

/// Public projection of an identity-provider user.
///
/// `username` is optional upstream; it is only made mandatory at the feed join
/// boundary (see [`Author`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub username: Option<String>,
    pub image_url: String,
}

/// A profile whose username has been resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub id: String,
    pub username: String,
    pub image_url: String,
}

impl TryFrom<UserProfile> for Author {
    type Error = UserProfile;

    /// Fails (handing the profile back) when the username is missing or blank.
    fn try_from(profile: UserProfile) -> Result<Self, Self::Error> {
        match profile.username.as_deref() {
            Some(name) if !name.trim().is_empty() => Ok(Author {
                username: name.to_string(),
                id: profile.id,
                image_url: profile.image_url,
            }),
            _ => Err(profile),
        }
    }
}
