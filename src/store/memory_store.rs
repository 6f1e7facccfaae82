use std::sync::RwLock;

use async_trait::async_trait;
use tracing::debug;

use super::Store;
use crate::models::Credential;

/// Process-local store. One instance per session; nothing survives a restart.
#[derive(Default)]
pub struct MemoryStore {
    credential: RwLock<Credential>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore {
            credential: RwLock::new(Credential::default()),
        }
    }
}

#[async_trait]
impl Store for MemoryStore {
    fn get_name(&self) -> &str {
        "memory"
    }

    async fn save(
        &self,
        access_token: &str,
        refresh_token: Option<&str>,
        user_id: Option<&str>,
    ) -> Result<(), String> {
        let mut credential = self
            .credential
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *credential = Credential::new(
            access_token,
            refresh_token.map(str::to_string),
            user_id.map(str::to_string),
        );
        debug!("Credential saved to memory store.");
        Ok(())
    }

    async fn read(&self) -> Credential {
        self.credential
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    async fn clear(&self) -> Result<(), String> {
        let mut credential = self
            .credential
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *credential = Credential::default();
        debug!("Memory store cleared.");
        Ok(())
    }
}
