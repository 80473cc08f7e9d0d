//! Durable credential storage backends

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::sync::RwLock;
use vitrine_domain::{Result, VitrineError};

/// Object-safe durable key-value store for session credentials.
///
/// This trait allows dependency injection and testing with in-memory
/// implementations. Failures are reported as `VitrineError::Storage`;
/// implementations must never panic, since the session store treats a
/// broken backend as a degraded mode rather than a fatal condition.
#[async_trait]
pub trait CredentialBackend: Send + Sync {
    /// Read a stored value, `None` when the key has never been written.
    async fn load(&self, key: &str) -> Result<Option<String>>;

    /// Write or overwrite a value.
    async fn store(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a value; removing an absent key is not an error.
    async fn delete(&self, key: &str) -> Result<()>;
}

/// In-memory backend for tests and storage-less degraded mode
#[derive(Default)]
pub struct MemoryBackend {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialBackend for MemoryBackend {
    async fn load(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn store(&self, key: &str, value: &str) -> Result<()> {
        self.entries.write().await.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}

/// JSON-file-backed store: one flat object of string entries.
///
/// The whole map is rewritten on every mutation; the value set is three
/// small entries, so simplicity wins over incremental writes.
pub struct FileBackend {
    path: PathBuf,
    entries: RwLock<HashMap<String, String>>,
}

impl FileBackend {
    /// Open (or create on first write) the store at `path`.
    ///
    /// # Errors
    ///
    /// Returns `VitrineError::Storage` when the file exists but cannot be
    /// read or parsed.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        let entries = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => serde_json::from_str(&raw).map_err(|err| {
                VitrineError::Storage(format!(
                    "credential file {} is corrupt: {}",
                    path.display(),
                    err
                ))
            })?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(err) => {
                return Err(VitrineError::Storage(format!(
                    "failed to read {}: {}",
                    path.display(),
                    err
                )))
            }
        };

        Ok(Self { path, entries: RwLock::new(entries) })
    }

    async fn persist(&self, entries: &HashMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|err| {
                VitrineError::Storage(format!("failed to create {}: {}", parent.display(), err))
            })?;
        }

        let raw = serde_json::to_string_pretty(entries)
            .map_err(|err| VitrineError::Storage(format!("failed to encode credentials: {}", err)))?;

        tokio::fs::write(&self.path, raw).await.map_err(|err| {
            VitrineError::Storage(format!("failed to write {}: {}", self.path.display(), err))
        })
    }
}

#[async_trait]
impl CredentialBackend for FileBackend {
    async fn load(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn store(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.write().await;
        entries.insert(key.to_string(), value.to_string());
        self.persist(&entries).await
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.write().await;
        entries.remove(key);
        self.persist(&entries).await
    }
}
