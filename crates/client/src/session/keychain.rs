//! System keychain backend
//!
//! Durable store backed by the OS keychain, for desktop deployments where
//! tokens should not sit in a plain file.

use async_trait::async_trait;
use keyring::Entry;
use vitrine_domain::{Result, VitrineError};

use super::backend::CredentialBackend;

/// Keychain-backed credential store; one keychain entry per storage key.
pub struct KeychainBackend {
    service: String,
}

impl KeychainBackend {
    /// `service` namespaces the entries (e.g. "Vitrine.session").
    #[must_use]
    pub fn new(service: impl Into<String>) -> Self {
        Self { service: service.into() }
    }

    fn entry(&self, key: &str) -> Result<Entry> {
        Entry::new(&self.service, key)
            .map_err(|err| VitrineError::Storage(format!("keychain entry unavailable: {}", err)))
    }
}

#[async_trait]
impl CredentialBackend for KeychainBackend {
    async fn load(&self, key: &str) -> Result<Option<String>> {
        match self.entry(key)?.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(err) => Err(VitrineError::Storage(format!("keychain read failed: {}", err))),
        }
    }

    async fn store(&self, key: &str, value: &str) -> Result<()> {
        self.entry(key)?
            .set_password(value)
            .map_err(|err| VitrineError::Storage(format!("keychain write failed: {}", err)))
    }

    async fn delete(&self, key: &str) -> Result<()> {
        match self.entry(key)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(err) => Err(VitrineError::Storage(format!("keychain delete failed: {}", err))),
        }
    }
}
