//! Token store implementations.
//!
//! Two implementations of the `TokenStore` seam: an in-memory map for
//! tests and ephemeral sessions, and a TOML file under the user config
//! directory for persistent logins.

use async_trait::async_trait;
use duet_core::error::{DuetError, Result};
use duet_core::session::TokenStore;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

/// In-memory token store.
#[derive(Default)]
pub struct MemoryTokenStore {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn get(&self, key: &str) -> Option<String> {
        self.values.read().await.get(key).cloned()
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.values
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.values.write().await.remove(key);
        Ok(())
    }
}

/// File-backed token store.
///
/// Values live in a flat TOML table, rewritten whole on every mutation.
/// Contention is not a concern here: a single client process owns the
/// file.
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    /// Creates a store backed by the given file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Creates a store at the default location under the user config
    /// directory (`<config>/duet/credentials.toml`).
    ///
    /// # Errors
    ///
    /// Returns a config error if the platform has no config directory.
    pub fn new_default() -> Result<Self> {
        let base = dirs::config_dir()
            .ok_or_else(|| DuetError::config("no user config directory available"))?;
        Ok(Self::new(base.join("duet").join("credentials.toml")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<HashMap<String, String>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => toml::from_str(&raw).map_err(|e| DuetError::Serialization {
                format: "TOML".to_string(),
                message: e.to_string(),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, values: &HashMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let raw = toml::to_string(values).map_err(|e| DuetError::Serialization {
            format: "TOML".to_string(),
            message: e.to_string(),
        })?;
        tokio::fs::write(&self.path, raw).await?;
        Ok(())
    }
}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn get(&self, key: &str) -> Option<String> {
        match self.load().await {
            Ok(values) => values.get(key).cloned(),
            Err(e) => {
                // An unreadable store means "no session", same as a
                // missing one. Never log the values themselves.
                tracing::warn!("[TokenStore] Failed to read store: {}", e);
                None
            }
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self.load().await?;
        values.insert(key.to_string(), value.to_string());
        self.save(&values).await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let mut values = self.load().await?;
        if values.remove(key).is_some() {
            self.save(&values).await?;
        }
        Ok(())
    }
}
