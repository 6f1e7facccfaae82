//! User-visible side effects of session transitions.
//!
//! The session never redirects or prompts by itself. The embedding
//! application decides what "send the user to the login page" means by
//! handing a `SessionListener` to the session builder.

use tracing::{info, warn};

pub trait SessionListener: Send + Sync {
    /// The session was torn down because it could not be renewed.
    fn on_session_expired(&self, login_url: &str);

    /// The user logged out on purpose.
    fn on_logged_out(&self, _login_url: &str) {}
}

/// Default listener: reports the expiry and the redirect target through the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingListener;

impl SessionListener for LoggingListener {
    fn on_session_expired(&self, login_url: &str) {
        warn!("Your session has expired. Please log in again.");
        info!(login_url, "Redirecting to login");
    }

    fn on_logged_out(&self, login_url: &str) {
        info!(login_url, "Logged out, redirecting to login");
    }
}

impl<F> SessionListener for F
where
    F: Fn(&str) + Send + Sync,
{
    fn on_session_expired(&self, login_url: &str) {
        self(login_url)
    }
}
