//! Application constants
//!
//! Centralized location for the header names, storage keys, and defaults
//! shared by the client and server-side read path.

// Backend routing headers
pub const HEADER_COMPANY_SLUG: &str = "X-Company-Slug";
pub const HEADER_COMPANY_ID: &str = "X-Company-Id";

// Storage keys (durable store entries and cookie names must stay in sync)
pub const STORAGE_KEY_ACCESS_TOKEN: &str = "auth_token";
pub const STORAGE_KEY_REFRESH_TOKEN: &str = "refresh_token";
pub const STORAGE_KEY_COMPANY_ID: &str = "company_id";

// Cookie attributes
pub const COOKIE_MAX_AGE_SECS: u64 = 31_536_000; // ~1 year
pub const COOKIE_SIZE_ADVISORY_BYTES: usize = 3800; // common 4 KiB limit minus attributes

// API defaults
pub const DEFAULT_API_ORIGIN: &str = "https://api.vitrine.shop";
pub const DEFAULT_TENANT_SLUG: &str = "vitrine";
pub const API_PREFIX: &str = "/api";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

// Auth endpoints (relative to the API prefix)
pub const ENDPOINT_LOGIN: &str = "/auth/login/";
pub const ENDPOINT_REFRESH: &str = "/auth/refresh/";
pub const ENDPOINT_REGISTER: &str = "/auth/register/";
