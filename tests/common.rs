#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use figment::{
    providers::{Format, Yaml},
    Figment,
};
use tuum_session::config::{Config, ConfigV1};
use tuum_session::{Session, SessionListener};

/// Counts listener notifications instead of redirecting anywhere.
#[derive(Default)]
pub struct RecordingListener {
    pub expired: AtomicUsize,
    pub logged_out: AtomicUsize,
}

impl RecordingListener {
    pub fn expired(&self) -> usize {
        self.expired.load(Ordering::SeqCst)
    }

    pub fn logged_out(&self) -> usize {
        self.logged_out.load(Ordering::SeqCst)
    }
}

impl SessionListener for RecordingListener {
    fn on_session_expired(&self, _login_url: &str) {
        self.expired.fetch_add(1, Ordering::SeqCst);
    }

    fn on_logged_out(&self, _login_url: &str) {
        self.logged_out.fetch_add(1, Ordering::SeqCst);
    }
}

/// A config pointing at `base_url`; `refresh` is spliced in verbatim under
/// the `refresh:` key and may be empty.
pub fn build_config(base_url: &str, refresh: &str) -> ConfigV1 {
    let yaml = format!(
        r#"
version: "1.0.0"
logging:
  level: "warn"
  format: "json"
api:
  base_url: "{base_url}"
refresh:
  mode: "header"
{refresh}
store:
  type: "memory"
login_url: "/login"
"#
    );

    let config: Config = Figment::new()
        .merge(Yaml::string(&yaml))
        .extract()
        .expect("Failed to parse integration test config");

    match config {
        Config::ConfigV1(cfg) => cfg,
    }
}

pub fn build_session(config: ConfigV1) -> (Session, Arc<RecordingListener>) {
    let listener = Arc::new(RecordingListener::default());
    let session = Session::builder(config)
        .listener(listener.clone())
        .build()
        .expect("session should build");
    (session, listener)
}
