//! Client configuration
//!
//! Loads configuration from environment variables with hosted defaults.
//!
//! ## Environment Variables
//! - `VITRINE_API_BASE_URL`: backend origin (default: the hosted API)
//! - `VITRINE_DEFAULT_TENANT`: tenant slug sent when no session tenant is
//!   resolved, so public endpoints route correctly
//! - `VITRINE_HTTP_TIMEOUT_SECS`: request timeout in seconds
//! - `VITRINE_CREDENTIAL_FILE`: durable credential store location

use std::path::PathBuf;
use std::time::Duration;

use url::Url;
use vitrine_domain::constants::{
    API_PREFIX, DEFAULT_API_ORIGIN, DEFAULT_HTTP_TIMEOUT_SECS, DEFAULT_TENANT_SLUG,
};
use vitrine_domain::{Result, VitrineError};

/// Configuration for the storefront API clients
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend origin, e.g. `https://api.vitrine.shop`
    pub base_url: String,
    /// Tenant slug used when the session has not resolved one
    pub default_tenant_slug: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// Durable credential store location, `None` for memory-only sessions
    pub credential_file: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_ORIGIN.to_string(),
            default_tenant_slug: DEFAULT_TENANT_SLUG.to_string(),
            timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            credential_file: None,
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables, falling back to the
    /// hosted defaults for anything unset.
    ///
    /// # Errors
    ///
    /// Returns `VitrineError::Config` if a variable is present but invalid
    /// (unparseable URL or timeout).
    pub fn from_env() -> Result<Self> {
        let base_url = std::env::var("VITRINE_API_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_API_ORIGIN.to_string());

        let default_tenant_slug = std::env::var("VITRINE_DEFAULT_TENANT")
            .unwrap_or_else(|_| DEFAULT_TENANT_SLUG.to_string());

        let timeout = match std::env::var("VITRINE_HTTP_TIMEOUT_SECS") {
            Ok(raw) => {
                let secs = raw.parse::<u64>().map_err(|e| {
                    VitrineError::Config(format!("Invalid VITRINE_HTTP_TIMEOUT_SECS: {}", e))
                })?;
                Duration::from_secs(secs)
            }
            Err(_) => Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        };

        let credential_file = std::env::var("VITRINE_CREDENTIAL_FILE").ok().map(PathBuf::from);

        let config = Self { base_url, default_tenant_slug, timeout, credential_file };
        config.validate()?;

        tracing::debug!(base_url = %config.base_url, "client configuration loaded");
        Ok(config)
    }

    /// Validate the base URL.
    ///
    /// # Errors
    ///
    /// Returns `VitrineError::Config` for unparseable URLs or non-HTTP
    /// schemes.
    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.base_url)
            .map_err(|e| VitrineError::Config(format!("Invalid base URL: {}", e)))?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(VitrineError::Config(format!(
                "Unsupported URL scheme: {}",
                url.scheme()
            )));
        }

        Ok(())
    }

    /// Absolute URL for an endpoint path relative to the API prefix.
    #[must_use]
    pub fn endpoint_url(&self, path: &str) -> String {
        let origin = self.base_url.trim_end_matches('/');
        if path.starts_with('/') {
            format!("{}{}{}", origin, API_PREFIX, path)
        } else {
            format!("{}{}/{}", origin, API_PREFIX, path)
        }
    }

    /// True when the configured origin is HTTPS; controls the `Secure`
    /// cookie attribute.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}
