use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use super::{file_store::FileStore, memory_store::MemoryStore};
use crate::config::{StoreBackend, StoreConfig};
use crate::models::Credential;

/// The Store trait abstracts where the session's credential lives.
///
/// `save` and `clear` replace the whole credential in one step; `read` never
/// fails and reports a missing or unreadable credential as empty.
#[async_trait]
pub trait Store: Send + Sync {
    fn get_name(&self) -> &str;

    async fn save(
        &self,
        access_token: &str,
        refresh_token: Option<&str>,
        user_id: Option<&str>,
    ) -> Result<(), String>;

    async fn read(&self) -> Credential;

    async fn clear(&self) -> Result<(), String>;

    async fn has_access(&self) -> bool {
        self.read().await.has_access()
    }
}

/// Creates a concrete store implementation based on the StoreConfig.
pub fn create_store(config: &StoreConfig) -> Arc<dyn Store> {
    match &config.backend {
        StoreBackend::Memory => {
            info!("Using in-memory credential store.");
            Arc::new(MemoryStore::new())
        }
        StoreBackend::File(file_config) => {
            info!("Using file credential store at '{}'.", file_config.path);
            Arc::new(FileStore::new(file_config))
        }
    }
}
