//! Token & tenant store
//!
//! Read precedence is memory, then the durable backend, then the cookie
//! jar; a value found only in a fallback layer is promoted into memory.
//! Writes go through to every layer in the same call, so a new token is
//! picked up by the next request with no separate activation step.
//! Persistence failures degrade to memory-only operation: they are logged
//! and never surfaced to the caller.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, warn};
use vitrine_domain::constants::{
    COOKIE_SIZE_ADVISORY_BYTES, STORAGE_KEY_ACCESS_TOKEN, STORAGE_KEY_COMPANY_ID,
    STORAGE_KEY_REFRESH_TOKEN,
};
use vitrine_domain::Credentials;

use super::backend::CredentialBackend;
use super::cookies::CookieJar;

/// Process-wide session state with write-through persistence.
///
/// The store is the exclusive owner of the access token, refresh token,
/// and tenant id; nothing else in the application writes them, and readers
/// must go through the getters so the layer precedence stays intact.
pub struct SessionStore {
    credentials: RwLock<Credentials>,
    durable: Option<Arc<dyn CredentialBackend>>,
    cookies: CookieJar,
}

impl SessionStore {
    #[must_use]
    pub fn new(durable: Option<Arc<dyn CredentialBackend>>, cookies: CookieJar) -> Self {
        Self { credentials: RwLock::new(Credentials::default()), durable, cookies }
    }

    /// Memory-only store, used in tests and when every persistence layer
    /// is unavailable.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(None, CookieJar::new(false))
    }

    /// Hydrate memory from the persistence layers. Call once on startup;
    /// lazily reading through the getters works too, this just front-loads
    /// the I/O.
    pub async fn initialize(&self) {
        let access = self.fallback(STORAGE_KEY_ACCESS_TOKEN).await;
        let refresh = self.fallback(STORAGE_KEY_REFRESH_TOKEN).await;
        let tenant = self.fallback(STORAGE_KEY_COMPANY_ID).await;

        let mut credentials = self.credentials.write().await;
        if credentials.access_token.is_none() {
            credentials.access_token = access;
        }
        if credentials.refresh_token.is_none() {
            credentials.refresh_token = refresh;
        }
        if credentials.tenant_id.is_none() {
            credentials.tenant_id = tenant;
        }

        debug!(
            authenticated = credentials.access_token.is_some(),
            "session store initialized"
        );
    }

    pub async fn set_access_token(&self, token: Option<&str>) {
        self.credentials.write().await.access_token = token.map(str::to_string);
        self.write_through(STORAGE_KEY_ACCESS_TOKEN, token).await;
    }

    pub async fn set_refresh_token(&self, token: Option<&str>) {
        self.credentials.write().await.refresh_token = token.map(str::to_string);
        self.write_through(STORAGE_KEY_REFRESH_TOKEN, token).await;
    }

    pub async fn set_tenant_id(&self, id: Option<&str>) {
        self.credentials.write().await.tenant_id = id.map(str::to_string);
        self.write_through(STORAGE_KEY_COMPANY_ID, id).await;
    }

    /// Routing slug for the current tenant. Memory-only: the slug is
    /// re-resolved at login and is not part of the persisted session.
    pub async fn set_tenant_slug(&self, slug: Option<&str>) {
        self.credentials.write().await.tenant_slug = slug.map(str::to_string);
    }

    pub async fn access_token(&self) -> Option<String> {
        if let Some(token) = self.credentials.read().await.access_token.clone() {
            return Some(token);
        }
        let recovered = self.fallback(STORAGE_KEY_ACCESS_TOKEN).await?;
        self.credentials.write().await.access_token = Some(recovered.clone());
        Some(recovered)
    }

    pub async fn refresh_token(&self) -> Option<String> {
        if let Some(token) = self.credentials.read().await.refresh_token.clone() {
            return Some(token);
        }
        let recovered = self.fallback(STORAGE_KEY_REFRESH_TOKEN).await?;
        self.credentials.write().await.refresh_token = Some(recovered.clone());
        Some(recovered)
    }

    pub async fn tenant_id(&self) -> Option<String> {
        if let Some(id) = self.credentials.read().await.tenant_id.clone() {
            return Some(id);
        }
        let recovered = self.fallback(STORAGE_KEY_COMPANY_ID).await?;
        self.credentials.write().await.tenant_id = Some(recovered.clone());
        Some(recovered)
    }

    pub async fn tenant_slug(&self) -> Option<String> {
        self.credentials.read().await.tenant_slug.clone()
    }

    /// Clear the token pair, keeping the tenant. Used when a refresh is
    /// rejected and the session is beyond recovery.
    pub async fn clear_tokens(&self) {
        self.set_access_token(None).await;
        self.set_refresh_token(None).await;
    }

    /// Clear everything (logout).
    pub async fn clear(&self) {
        {
            let mut credentials = self.credentials.write().await;
            *credentials = Credentials::default();
        }
        self.write_through(STORAGE_KEY_ACCESS_TOKEN, None).await;
        self.write_through(STORAGE_KEY_REFRESH_TOKEN, None).await;
        self.write_through(STORAGE_KEY_COMPANY_ID, None).await;
        debug!("session cleared");
    }

    /// `Set-Cookie` headers reflecting the current session state, for
    /// handing to a server-rendered response.
    pub async fn set_cookie_headers(&self) -> Vec<String> {
        let mut headers = Vec::with_capacity(3);
        for key in
            [STORAGE_KEY_ACCESS_TOKEN, STORAGE_KEY_REFRESH_TOKEN, STORAGE_KEY_COMPANY_ID]
        {
            headers.push(self.cookies.set_cookie_header(key).await);
        }
        headers
    }

    async fn write_through(&self, key: &str, value: Option<&str>) {
        match value {
            Some(value) => {
                if value.len() > COOKIE_SIZE_ADVISORY_BYTES {
                    warn!(
                        key,
                        bytes = value.len(),
                        "value exceeds common cookie size limits and may be dropped by the browser"
                    );
                }
                if let Some(backend) = &self.durable {
                    if let Err(err) = backend.store(key, value).await {
                        warn!(key, error = %err, "durable store write failed; continuing with in-memory value");
                    }
                }
                self.cookies.set(key, value).await;
            }
            None => {
                if let Some(backend) = &self.durable {
                    if let Err(err) = backend.delete(key).await {
                        warn!(key, error = %err, "durable store delete failed");
                    }
                }
                self.cookies.remove(key).await;
            }
        }
    }

    async fn fallback(&self, key: &str) -> Option<String> {
        if let Some(backend) = &self.durable {
            match backend.load(key).await {
                Ok(Some(value)) => {
                    debug!(key, "credential recovered from durable store");
                    return Some(value);
                }
                Ok(None) => {}
                Err(err) => warn!(key, error = %err, "durable store read failed"),
            }
        }
        if let Some(value) = self.cookies.get(key).await {
            debug!(key, "credential recovered from cookie");
            return Some(value);
        }
        None
    }
}
