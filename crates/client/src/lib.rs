//! # Vitrine Client
//!
//! Client-side data plane for the Vitrine storefront.
//!
//! This crate contains:
//! - Session store (tokens + tenant, triple-persisted)
//! - HTTP transport with an explicit timeout policy
//! - Authenticated API client with single-flight token refresh
//! - Server-side read client for server-rendered requests
//! - Auth endpoint wrappers (login, register, logout)
//!
//! ## Architecture
//! - All backend traffic funnels through [`api::ApiClient`]
//! - Token and tenant state is owned exclusively by [`session::SessionStore`]
//! - Server-rendered code uses [`ssr::ReadClient`], which reads credentials
//!   from inbound request cookies and never refreshes

pub mod api;
pub mod auth;
pub mod config;
pub mod http;
pub mod session;
pub mod ssr;

// Re-export commonly used items
pub use api::{ApiClient, Payload, RequestOptions, UploadFile};
pub use auth::AuthApi;
pub use config::ClientConfig;
pub use http::HttpClient;
pub use session::{
    CookieJar, CredentialBackend, FileBackend, KeychainBackend, MemoryBackend, SessionStore,
};
pub use ssr::{ReadClient, ReadFallback};
