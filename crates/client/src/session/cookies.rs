//! Cookie codec for session values
//!
//! Cookies are the cross-context transport: client code persists tokens
//! into them so server-rendered requests can read them back off the
//! inbound `Cookie` header. Attribute policy: `Path=/`, `Max-Age` of about
//! one year, `SameSite=Lax`, plus `Secure` on HTTPS origins.

use std::collections::HashMap;

use tokio::sync::RwLock;
use vitrine_domain::constants::COOKIE_MAX_AGE_SECS;

/// Parse an inbound `Cookie` header into name/value pairs.
///
/// Malformed pairs (no `=`, empty name) are skipped rather than rejected.
#[must_use]
pub fn parse_cookie_header(header: &str) -> HashMap<String, String> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .map(|(name, value)| (name.trim().to_string(), value.trim().to_string()))
        .filter(|(name, _)| !name.is_empty())
        .collect()
}

/// Render a `Set-Cookie` value for a session entry.
#[must_use]
pub fn set_cookie(name: &str, value: &str, secure: bool) -> String {
    let mut cookie =
        format!("{}={}; Path=/; Max-Age={}; SameSite=Lax", name, value, COOKIE_MAX_AGE_SECS);
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Render a `Set-Cookie` value that removes a session entry.
#[must_use]
pub fn expire_cookie(name: &str, secure: bool) -> String {
    let mut cookie = format!("{}=; Path=/; Max-Age=0; SameSite=Lax", name);
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// In-process mirror of the session cookies held by the user agent.
pub struct CookieJar {
    values: RwLock<HashMap<String, String>>,
    secure: bool,
}

impl CookieJar {
    /// Empty jar. `secure` controls the `Secure` attribute on rendered
    /// cookies and should match the API origin's scheme.
    #[must_use]
    pub fn new(secure: bool) -> Self {
        Self { values: RwLock::new(HashMap::new()), secure }
    }

    /// Jar seeded from an inbound `Cookie` header.
    #[must_use]
    pub fn from_header(header: &str, secure: bool) -> Self {
        Self { values: RwLock::new(parse_cookie_header(header)), secure }
    }

    pub async fn get(&self, name: &str) -> Option<String> {
        self.values.read().await.get(name).cloned()
    }

    pub async fn set(&self, name: &str, value: &str) {
        self.values.write().await.insert(name.to_string(), value.to_string());
    }

    pub async fn remove(&self, name: &str) {
        self.values.write().await.remove(name);
    }

    /// `Set-Cookie` header value reflecting the entry's current state:
    /// a long-lived cookie when set, an immediate expiry when cleared.
    pub async fn set_cookie_header(&self, name: &str) -> String {
        match self.values.read().await.get(name) {
            Some(value) => set_cookie(name, value, self.secure),
            None => expire_cookie(name, self.secure),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_header() {
        let cookies = parse_cookie_header("auth_token=abc; company_id=42");

        assert_eq!(cookies.get("auth_token").map(String::as_str), Some("abc"));
        assert_eq!(cookies.get("company_id").map(String::as_str), Some("42"));
    }

    #[test]
    fn skips_malformed_pairs() {
        let cookies = parse_cookie_header("auth_token=abc; junk; =orphan; refresh_token=r1");

        assert_eq!(cookies.len(), 2);
        assert_eq!(cookies.get("refresh_token").map(String::as_str), Some("r1"));
    }

    #[test]
    fn values_containing_equals_survive() {
        let cookies = parse_cookie_header("auth_token=abc==");
        assert_eq!(cookies.get("auth_token").map(String::as_str), Some("abc=="));
    }

    #[test]
    fn renders_attributes_for_secure_origin() {
        let rendered = set_cookie("auth_token", "abc", true);

        assert_eq!(
            rendered,
            format!("auth_token=abc; Path=/; Max-Age={}; SameSite=Lax; Secure", COOKIE_MAX_AGE_SECS)
        );
    }

    #[test]
    fn omits_secure_attribute_for_plain_http() {
        let rendered = set_cookie("auth_token", "abc", false);
        assert!(!rendered.contains("Secure"));
    }

    #[test]
    fn expiry_renders_zero_max_age() {
        let rendered = expire_cookie("auth_token", false);
        assert_eq!(rendered, "auth_token=; Path=/; Max-Age=0; SameSite=Lax");
    }

    #[tokio::test]
    async fn jar_tracks_set_and_remove() {
        let jar = CookieJar::new(true);

        jar.set("auth_token", "abc").await;
        assert_eq!(jar.get("auth_token").await.as_deref(), Some("abc"));
        assert!(jar.set_cookie_header("auth_token").await.contains("auth_token=abc"));

        jar.remove("auth_token").await;
        assert_eq!(jar.get("auth_token").await, None);
        assert!(jar.set_cookie_header("auth_token").await.contains("Max-Age=0"));
    }
}
