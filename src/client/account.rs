//! Account calls built on top of the session: login, logout and the
//! profile lookups used to check whether the user is still signed in.

use serde_json::json;
use tracing::{debug, info, warn};

use super::request::RequestOptions;
use super::session::Session;
use crate::error::SessionError;
use crate::models::{Credential, TokenResponse, UserProfile};

impl Session {
    /// Logs in with email and password and stores the returned tokens.
    pub async fn login(&self, email: &str, password: &str) -> Result<Credential, SessionError> {
        let url = self.url_for(&self.config.api.endpoints.login);
        let request = RequestOptions::post()
            .json(json!({ "email": email, "password": password }))
            .prepare(url, None)?;

        let response = self.transport.send(request).await?;
        if !response.is_success() {
            warn!(status = response.status().as_u16(), "Login rejected");
            return Err(SessionError::LoginRejected {
                status: response.status().as_u16(),
                body: response.text(),
            });
        }

        let token: TokenResponse = response.json()?;
        self.save_tokens(
            &token.access_token,
            token.refresh_token.as_deref(),
            token.user_id.as_deref(),
        )
        .await?;

        info!(user_id = token.user_id.as_deref().unwrap_or("unknown"), "Logged in");
        Ok(Credential::new(token.access_token, token.refresh_token, token.user_id))
    }

    /// Logs out on the server. Returns `false`, leaving the local session in
    /// place, when the server does not confirm.
    pub async fn logout(&self) -> Result<bool, SessionError> {
        let response = self
            .request(&self.config.api.endpoints.logout, RequestOptions::post())
            .await?;

        if !response.is_success() {
            warn!(status = response.status().as_u16(), "Logout was not confirmed");
            return Ok(false);
        }

        self.store.clear().await.map_err(SessionError::Store)?;
        info!("Logged out");
        self.listener.on_logged_out(&self.config.login_url);
        Ok(true)
    }

    /// Whether the server still accepts this session.
    pub async fn check_login_status(&self) -> bool {
        match self.get(&self.config.api.endpoints.me).await {
            Ok(response) => response.is_success(),
            Err(e) => {
                debug!("Login status check failed: {}", e);
                false
            }
        }
    }

    /// The signed-in user's profile, or `None` if it cannot be fetched.
    pub async fn user_info(&self) -> Option<UserProfile> {
        let response = match self.get(&self.config.api.endpoints.me).await {
            Ok(response) if response.is_success() => response,
            Ok(response) => {
                debug!(status = response.status().as_u16(), "Profile lookup refused");
                return None;
            }
            Err(e) => {
                debug!("Profile lookup failed: {}", e);
                return None;
            }
        };

        match response.json::<UserProfile>() {
            Ok(profile) => Some(profile),
            Err(e) => {
                warn!("Profile could not be decoded: {}", e);
                None
            }
        }
    }
}
