//! Renewing the access token.
//!
//! The refresh call goes straight to the transport and never through
//! `Session::request`, so a 401 from the refresh endpoint cannot loop.

use tracing::{debug, error, info, warn};

use super::request::RequestOptions;
use super::session::Session;
use crate::config::RefreshMode;
use crate::error::SessionError;
use crate::models::{Credential, TokenResponse};

impl Session {
    /// Called after `stale_token` was rejected with a 401.
    ///
    /// With coalescing on, refreshes are serialized. Whoever gets the lock
    /// first refreshes; later callers find a different token in the store
    /// and reuse it, or find the store empty because the refresh failed and
    /// fail the same way without calling the endpoint again.
    pub(crate) async fn renew_after_unauthorized(&self, stale_token: &str) -> Result<(), SessionError> {
        if !self.config.refresh.coalesce {
            return self.refresh().await.map(|_| ());
        }

        let _guard = self.refresh_lock.lock().await;
        let current = self.store.read().await;
        match current.access() {
            None => Err(SessionError::SessionExpired {
                reason: "session ended while waiting for refresh".to_string(),
            }),
            Some(token) if token != stale_token => {
                debug!("Access token already renewed by a concurrent refresh");
                Ok(())
            }
            Some(_) => self.refresh().await.map(|_| ()),
        }
    }

    /// Exchanges the stored refresh credential for a new access token and
    /// saves it. Any failure forces a logout before returning
    /// `SessionExpired`; the refresh is never retried.
    pub async fn refresh(&self) -> Result<Credential, SessionError> {
        let current = self.store.read().await;
        let refresh_token = current.refresh().map(str::to_string);

        if self.config.refresh.requires_refresh_token() && refresh_token.is_none() {
            warn!("No refresh token stored, cannot renew session");
            return Err(self.expire("no refresh token stored").await);
        }

        let bearer = match self.config.refresh.mode {
            RefreshMode::Header => refresh_token.as_deref(),
            RefreshMode::Cookie => None,
        };
        let url = self.url_for(&self.config.api.endpoints.refresh);
        let request = match RequestOptions::post().prepare(url, bearer) {
            Ok(request) => request,
            Err(e) => {
                warn!("Refresh request could not be built: {}", e);
                return Err(self.expire("stored refresh token cannot be sent").await);
            }
        };

        let response = match self.transport.send(request).await {
            Ok(response) => response,
            Err(e) => {
                warn!("Refresh request failed: {}", e);
                return Err(self.expire(&format!("refresh request failed: {}", e)).await);
            }
        };

        if !response.is_success() {
            warn!(status = response.status().as_u16(), "Refresh rejected");
            return Err(self
                .expire(&format!("refresh rejected with status {}", response.status()))
                .await);
        }

        let token: TokenResponse = match response.json() {
            Ok(token) => token,
            Err(e) => {
                warn!("Refresh response could not be decoded: {}", e);
                return Err(self.expire("refresh response could not be decoded").await);
            }
        };

        let refresh_token = if self.config.refresh.rotation {
            token.refresh_token.or(current.refresh_token)
        } else {
            current.refresh_token
        };
        let user_id = token.user_id.or(current.user_id);

        if let Err(e) = self
            .store
            .save(&token.access_token, refresh_token.as_deref(), user_id.as_deref())
            .await
        {
            error!("Failed to store renewed credential: {}", e);
            return Err(self.expire(&format!("renewed credential could not be stored: {}", e)).await);
        }

        info!("Session renewed");
        Ok(Credential::new(token.access_token, refresh_token, user_id))
    }

    async fn expire(&self, reason: &str) -> SessionError {
        self.force_logout().await;
        SessionError::SessionExpired {
            reason: reason.to_string(),
        }
    }
}
