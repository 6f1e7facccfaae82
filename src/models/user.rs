use serde::{Deserialize, Serialize};

/// Profile returned by the `me` endpoint.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub id: i64,
    pub email: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub is_verified: bool,
}

fn default_active() -> bool {
    true
}

impl UserProfile {
    /// Best name to show for the user: nickname, then username, then email.
    pub fn display_name(&self) -> Option<&str> {
        self.nickname
            .as_deref()
            .or(self.username.as_deref())
            .or(self.email.as_deref())
    }
}
