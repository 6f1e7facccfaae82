use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// How the refresh call proves who we are.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default, JsonSchema)]
pub enum RefreshMode {
    /// `Authorization: Bearer <refresh token>`.
    #[default]
    #[serde(rename = "header")]
    Header,
    /// The backend issued the refresh credential as a cookie; no header is sent.
    #[serde(rename = "cookie")]
    Cookie,
}

/// Refresh routine settings.
/// - mode: header or cookie based refresh credential.
/// - rotation: whether a refresh token returned by the backend replaces the stored one.
/// - require_refresh_token: fail fast (and log out) when no refresh token is
///   stored. Unset means required in header mode only.
/// - coalesce: share one in-flight refresh between concurrent 401s.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct RefreshConfig {
    #[serde(default)]
    pub mode: RefreshMode,
    #[serde(default = "default_true")]
    pub rotation: bool,
    #[serde(default)]
    pub require_refresh_token: Option<bool>,
    #[serde(default = "default_true")]
    pub coalesce: bool,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            mode: RefreshMode::default(),
            rotation: true,
            require_refresh_token: None,
            coalesce: true,
        }
    }
}

impl RefreshConfig {
    /// Cookie deployments never store a refresh token, so only header mode
    /// requires one unless configured otherwise.
    pub fn requires_refresh_token(&self) -> bool {
        self.require_refresh_token
            .unwrap_or(self.mode == RefreshMode::Header)
    }
}

fn default_true() -> bool {
    true
}
