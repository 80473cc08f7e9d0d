//! Error types used throughout the client

use std::fmt;
use std::time::Duration;

use serde_json::Value;
use thiserror::Error;

/// Structured failure returned by the storefront backend.
///
/// Carries everything calling code needs to react programmatically:
/// the human-readable message, a machine code (backend-supplied or
/// `HTTP_<status>`), the numeric status, the request URL, and the raw
/// response body when one was present.
#[derive(Debug, Clone)]
pub struct ApiFailure {
    /// Human-readable message, assembled from the response body
    pub message: String,
    /// Backend error code, or `HTTP_<status>` when the backend sent none
    pub code: String,
    /// HTTP status code
    pub status: u16,
    /// Request URL the failure originated from
    pub url: String,
    /// Raw response body for per-field inspection, `None` when empty
    pub body: Option<Value>,
}

impl fmt::Display for ApiFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ApiFailure {}

/// Main error type for the Vitrine client
#[derive(Error, Debug)]
pub enum VitrineError {
    /// Non-2xx backend response with a structured failure payload
    #[error("{0}")]
    Api(ApiFailure),

    /// Token refresh failed irrecoverably; the caller must re-authenticate.
    ///
    /// Raised instead of navigating to a login page from the data layer;
    /// a top-level UI boundary is expected to map this to navigation.
    #[error("Session expired: re-authentication required")]
    SessionExpired,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl VitrineError {
    /// HTTP status of the underlying backend failure, if any
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api(failure) => Some(failure.status),
            _ => None,
        }
    }

    /// True when the error indicates the session is no longer usable
    #[must_use]
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::SessionExpired) || self.status() == Some(401)
    }
}

/// Result type alias for Vitrine operations
pub type Result<T> = std::result::Result<T, VitrineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_failure_displays_message_only() {
        let failure = ApiFailure {
            message: "Email: This field is required.".to_string(),
            code: "HTTP_422".to_string(),
            status: 422,
            url: "https://api.example.com/api/auth/register/".to_string(),
            body: None,
        };

        assert_eq!(failure.to_string(), "Email: This field is required.");
        assert_eq!(VitrineError::Api(failure).to_string(), "Email: This field is required.");
    }

    #[test]
    fn status_is_exposed_for_api_errors_only() {
        let failure = ApiFailure {
            message: "nope".to_string(),
            code: "HTTP_500".to_string(),
            status: 500,
            url: "https://api.example.com/api/orders/".to_string(),
            body: None,
        };

        assert_eq!(VitrineError::Api(failure).status(), Some(500));
        assert_eq!(VitrineError::SessionExpired.status(), None);
        assert_eq!(VitrineError::Network("down".to_string()).status(), None);
    }

    #[test]
    fn auth_failures_are_recognized() {
        let unauthorized = ApiFailure {
            message: "HTTP 401: Unauthorized".to_string(),
            code: "HTTP_401".to_string(),
            status: 401,
            url: "https://api.example.com/api/orders/".to_string(),
            body: None,
        };

        assert!(VitrineError::Api(unauthorized).is_auth_failure());
        assert!(VitrineError::SessionExpired.is_auth_failure());
        assert!(!VitrineError::Network("down".to_string()).is_auth_failure());
    }
}
