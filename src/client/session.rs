//! The session: one explicitly constructed object that owns the credential
//! store, the transport and the listener, and issues authenticated requests.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, error, info};

use super::request::RequestOptions;
use super::response::ApiResponse;
use super::transport::{ReqwestTransport, Transport};
use crate::config::ConfigV1;
use crate::error::SessionError;
use crate::events::{LoggingListener, SessionListener};
use crate::models::Credential;
use crate::store::{create_store, Store};

/// Cheap to clone; clones share the store, transport and refresh lock.
#[derive(Clone)]
pub struct Session {
    pub(crate) config: Arc<ConfigV1>,
    pub(crate) base_url: Arc<str>,
    pub(crate) store: Arc<dyn Store>,
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) listener: Arc<dyn SessionListener>,
    pub(crate) refresh_lock: Arc<Mutex<()>>,
}

pub struct SessionBuilder {
    config: ConfigV1,
    store: Option<Arc<dyn Store>>,
    transport: Option<Arc<dyn Transport>>,
    listener: Option<Arc<dyn SessionListener>>,
}

impl SessionBuilder {
    pub fn store(mut self, store: Arc<dyn Store>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn listener(mut self, listener: Arc<dyn SessionListener>) -> Self {
        self.listener = Some(listener);
        self
    }

    /// Anything not supplied comes from the config: the store backend, a
    /// reqwest transport and the logging listener.
    pub fn build(self) -> Result<Session, SessionError> {
        let store = match self.store {
            Some(store) => store,
            None => create_store(&self.config.store),
        };
        let transport: Arc<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::new(&self.config.transport)?),
        };
        let listener = self
            .listener
            .unwrap_or_else(|| Arc::new(LoggingListener) as Arc<dyn SessionListener>);
        let base_url: Arc<str> = Arc::from(self.config.api.resolve_base_url());

        info!(
            "Session ready for '{}' using the {} store",
            base_url,
            store.get_name()
        );

        Ok(Session {
            config: Arc::new(self.config),
            base_url,
            store,
            transport,
            listener,
            refresh_lock: Arc::new(Mutex::new(())),
        })
    }
}

impl Session {
    pub fn builder(config: ConfigV1) -> SessionBuilder {
        SessionBuilder {
            config,
            store: None,
            transport: None,
            listener: None,
        }
    }

    pub fn new(config: ConfigV1) -> Result<Self, SessionError> {
        Self::builder(config).build()
    }

    pub fn config(&self) -> &ConfigV1 {
        &self.config
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }

    /// Absolute URLs are used as they are; anything else is appended to the API base.
    pub fn url_for(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    pub async fn credential(&self) -> Credential {
        self.store.read().await
    }

    pub async fn is_logged_in(&self) -> bool {
        self.store.has_access().await
    }

    /// Stores a credential obtained outside this session (e.g. a login
    /// handled by another component).
    pub async fn save_tokens(
        &self,
        access_token: &str,
        refresh_token: Option<&str>,
        user_id: Option<&str>,
    ) -> Result<(), SessionError> {
        self.store
            .save(access_token, refresh_token, user_id)
            .await
            .map_err(SessionError::Store)
    }

    /// Sends `options` to `path` with the stored access token.
    ///
    /// Without an access token nothing is sent and `NotAuthenticated` is
    /// returned. A 401 triggers one refresh; when it succeeds the original
    /// options are sent once more with the new token and that response is
    /// returned whatever its status. When it fails the session is torn down
    /// and `SessionExpired` is returned. Every other status is handed back
    /// as is.
    pub async fn request(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<ApiResponse, SessionError> {
        let credential = self.store.read().await;
        let access_token = match credential.access() {
            Some(token) => token.to_string(),
            None => {
                debug!(path, "No access token stored, request not sent");
                return Err(SessionError::NotAuthenticated);
            }
        };

        let url = self.url_for(path);
        let response = self.send_with_token(&url, &options, &access_token).await?;
        if !response.is_unauthorized() {
            return Ok(response);
        }

        info!(path, "Access token rejected, renewing session");
        self.renew_after_unauthorized(&access_token).await?;

        let renewed = self.store.read().await;
        let access_token = renewed
            .access()
            .ok_or_else(|| SessionError::SessionExpired {
                reason: "no access token after refresh".to_string(),
            })?
            .to_string();

        debug!(path, "Retrying request with renewed access token");
        self.send_with_token(&url, &options, &access_token).await
    }

    pub async fn get(&self, path: &str) -> Result<ApiResponse, SessionError> {
        self.request(path, RequestOptions::get()).await
    }

    async fn send_with_token(
        &self,
        url: &str,
        options: &RequestOptions,
        access_token: &str,
    ) -> Result<ApiResponse, SessionError> {
        let request = options.prepare(url.to_string(), Some(access_token))?;
        Ok(self.transport.send(request).await?)
    }

    /// Clears the store and tells the listener to send the user to the login page.
    pub async fn force_logout(&self) {
        if let Err(e) = self.store.clear().await {
            error!("Failed to clear credential store during forced logout: {}", e);
        }
        info!("Session torn down");
        self.listener.on_session_expired(&self.config.login_url);
    }
}
