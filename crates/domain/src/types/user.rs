//! User and tenant types
//!
//! Shapes mirror the storefront backend's serializers; identifiers are
//! opaque strings on the wire.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Storefront user account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreUser {
    pub id: String,
    pub username: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_joined: Option<DateTime<Utc>>,
}

/// Tenant (store/organization) the session is scoped to
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Company {
    pub id: String,
    pub name: String,
    /// URL-safe identifier used for backend routing
    pub slug: String,
}
