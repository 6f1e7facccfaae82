use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub const LOCAL_API_URL: &str = "http://localhost:8000";
pub const LOCAL_ALT_API_URL: &str = "http://localhost:8001";
pub const DEV_API_URL: &str = "https://dev-api.tuum.dev";
pub const PROD_API_URL: &str = "https://api.tuum.dev";

/// Where the API lives and which paths the session talks to.
///
/// `base_url` wins when present. Otherwise the base is picked from `host`,
/// the host the embedding application was served from.
#[derive(Deserialize, Serialize, Debug, Clone, Default, JsonSchema)]
pub struct ApiConfig {
    pub base_url: Option<String>,
    pub host: Option<String>,
    #[serde(default)]
    pub endpoints: EndpointsConfig,
}

impl ApiConfig {
    pub fn resolve_base_url(&self) -> String {
        let base = match &self.base_url {
            Some(url) => url.as_str(),
            None => base_url_for_host(self.host.as_deref().unwrap_or_default()),
        };
        base.trim_end_matches('/').to_string()
    }
}

/// Maps the serving host to an API base.
pub fn base_url_for_host(host: &str) -> &'static str {
    if host.contains("localhost:8001") {
        LOCAL_ALT_API_URL
    } else if host.contains("localhost:8000") {
        LOCAL_API_URL
    } else if host.contains("dev.") {
        DEV_API_URL
    } else {
        PROD_API_URL
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct EndpointsConfig {
    #[serde(default = "default_refresh")]
    pub refresh: String,
    #[serde(default = "default_login")]
    pub login: String,
    #[serde(default = "default_logout")]
    pub logout: String,
    #[serde(default = "default_me")]
    pub me: String,
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            refresh: default_refresh(),
            login: default_login(),
            logout: default_logout(),
            me: default_me(),
        }
    }
}

fn default_refresh() -> String {
    "/user/v1/token/refresh".to_string()
}

fn default_login() -> String {
    "/user/v1/login".to_string()
}

fn default_logout() -> String {
    "/user/v1/logout".to_string()
}

fn default_me() -> String {
    "/user/v1/me".to_string()
}
