use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, error, warn};

use super::Store;
use crate::models::Credential;

#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct FileStoreConfig {
    pub path: String,
}

/// Keeps the credential as a JSON document on disk so a CLI session can
/// outlive the process. Writes go to a sibling temp file and are renamed
/// into place.
pub struct FileStore {
    path: PathBuf,
    // serializes file access within this process
    lock: Mutex<()>,
}

impl FileStore {
    pub fn new(config: &FileStoreConfig) -> Self {
        FileStore {
            path: PathBuf::from(&config.path),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl Store for FileStore {
    fn get_name(&self) -> &str {
        "file"
    }

    async fn save(
        &self,
        access_token: &str,
        refresh_token: Option<&str>,
        user_id: Option<&str>,
    ) -> Result<(), String> {
        let credential = Credential::new(
            access_token,
            refresh_token.map(str::to_string),
            user_id.map(str::to_string),
        );
        let body = serde_json::to_vec_pretty(&credential)
            .map_err(|e| format!("Failed to serialize credential: {}", e))?;

        let _guard = self.lock.lock().await;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| format!("Failed to create '{}': {}", parent.display(), e))?;
            }
        }

        let temp = self.temp_path();
        tokio::fs::write(&temp, body)
            .await
            .map_err(|e| format!("Failed to write '{}': {}", temp.display(), e))?;
        tokio::fs::rename(&temp, &self.path)
            .await
            .map_err(|e| format!("Failed to move credential into '{}': {}", self.path.display(), e))?;

        debug!("Credential saved to '{}'.", self.path.display());
        Ok(())
    }

    async fn read(&self) -> Credential {
        let _guard = self.lock.lock().await;
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Credential::default(),
            Err(e) => {
                error!("Failed to read credential file '{}': {}", self.path.display(), e);
                return Credential::default();
            }
        };

        match serde_json::from_slice(&raw) {
            Ok(credential) => credential,
            Err(e) => {
                warn!(
                    "Credential file '{}' is not valid JSON, treating it as empty: {}",
                    self.path.display(),
                    e
                );
                Credential::default()
            }
        }
    }

    async fn clear(&self) -> Result<(), String> {
        let _guard = self.lock.lock().await;
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {
                debug!("Credential file '{}' removed.", self.path.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(format!("Failed to remove '{}': {}", self.path.display(), e)),
        }
    }
}
