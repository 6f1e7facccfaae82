use serde::{Deserialize, Serialize};

/// The tokens and user id held for the current session.
///
/// An access token that is present and non-empty means the session is
/// considered logged in.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Credential {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub user_id: Option<String>,
}

impl Credential {
    pub fn new(
        access_token: impl Into<String>,
        refresh_token: Option<String>,
        user_id: Option<String>,
    ) -> Self {
        Credential {
            access_token: Some(access_token.into()),
            refresh_token,
            user_id,
        }
    }

    /// The access token, if one is present and non-empty.
    pub fn access(&self) -> Option<&str> {
        self.access_token.as_deref().filter(|t| !t.is_empty())
    }

    /// The refresh token, if one is present and non-empty.
    pub fn refresh(&self) -> Option<&str> {
        self.refresh_token.as_deref().filter(|t| !t.is_empty())
    }

    pub fn has_access(&self) -> bool {
        self.access().is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.access_token.is_none() && self.refresh_token.is_none() && self.user_id.is_none()
    }
}
