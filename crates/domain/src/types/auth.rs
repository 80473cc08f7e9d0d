//! Auth and session types

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::user::{Company, StoreUser};

/// Session credentials held by the client
///
/// All fields are optional: an anonymous session carries none of them.
/// `tenant_slug` is a routing convenience resolved at login and is never
/// persisted; the other three values are mirrored into durable storage
/// and cookies.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub tenant_id: Option<String>,
    pub tenant_slug: Option<String>,
}

/// Token pair returned by the refresh endpoint
///
/// The backend may rotate the refresh token; when it does, the new value
/// must replace the stored one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionTokens {
    pub access: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh: Option<String>,
}

/// Payload for `POST /auth/login/`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
    pub company_slug: String,
}

/// Response from `POST /auth/login/`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access: String,
    pub refresh: String,
    pub user: StoreUser,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<Company>,
}

/// Payload for `POST /auth/register/`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    pub company_name: String,
    pub company_slug: String,
}

/// Response from `POST /auth/register/`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub user: StoreUser,
    pub company: Company,
    /// Present when registration logs the user straight in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens: Option<SessionTokens>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refresh_response_tolerates_missing_rotation() {
        let tokens: SessionTokens =
            serde_json::from_str(r#"{"access": "new-access"}"#).expect("valid payload");

        assert_eq!(tokens.access, "new-access");
        assert!(tokens.refresh.is_none());
    }

    #[test]
    fn login_response_parses_backend_shape() {
        let raw = r#"{
            "access": "a-token",
            "refresh": "r-token",
            "user": {"id": "7", "username": "mara", "email": "mara@example.com"},
            "company": {"id": "3", "name": "Mara's Plants", "slug": "maras-plants"}
        }"#;

        let response: LoginResponse = serde_json::from_str(raw).expect("valid payload");

        assert_eq!(response.access, "a-token");
        assert_eq!(response.user.username, "mara");
        assert_eq!(response.company.as_ref().map(|c| c.slug.as_str()), Some("maras-plants"));
    }
}
