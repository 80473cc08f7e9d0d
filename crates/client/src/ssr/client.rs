//! Unauthenticated-tolerant read client for server-rendered requests
//!
//! Server-rendered code cannot reach the client-side durable store, so
//! credentials come from the inbound request's `Cookie` header. There is
//! no refresh logic here and no write surface beyond a simple POST. A
//! missing or rejected resource degrades to an empty value when the
//! caller marks the endpoint as tolerant, so a page renders an empty
//! state instead of crashing on content that does not exist yet.

use reqwest::{header, Method, RequestBuilder, Response, StatusCode};
use serde_json::{json, Value};
use tracing::warn;
use vitrine_domain::constants::{
    HEADER_COMPANY_ID, HEADER_COMPANY_SLUG, STORAGE_KEY_ACCESS_TOKEN, STORAGE_KEY_COMPANY_ID,
};
use vitrine_domain::{Result, VitrineError};

use crate::api::failure_from_response;
use crate::config::ClientConfig;
use crate::http::HttpClient;
use crate::session::parse_cookie_header;

/// How a read endpoint degrades on 401/404.
///
/// An explicit capability flag per call; the endpoint's tolerance is not
/// guessed from the shape of its URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadFallback {
    /// Listing endpoint: resolve to an empty collection
    EmptyList,
    /// Single-resource endpoint: resolve to `null`
    NullResource,
    /// No degradation: surface the error
    Strict,
}

/// Read client for server-rendered requests.
pub struct ReadClient {
    http: HttpClient,
    config: ClientConfig,
    access_token: Option<String>,
    tenant_id: Option<String>,
}

impl ReadClient {
    /// Anonymous client (no inbound cookies).
    ///
    /// # Errors
    ///
    /// Returns `VitrineError::Config` when the configured base URL is
    /// invalid.
    pub fn new(config: ClientConfig) -> Result<Self> {
        Self::with_credentials(config, None, None)
    }

    /// Build a client from an inbound request's `Cookie` header.
    ///
    /// Reads the access token and tenant id cookies; anything else in the
    /// header is ignored.
    ///
    /// # Errors
    ///
    /// Returns `VitrineError::Config` when the configured base URL is
    /// invalid.
    pub fn from_cookie_header(config: ClientConfig, cookie_header: &str) -> Result<Self> {
        let cookies = parse_cookie_header(cookie_header);
        let access_token = cookies.get(STORAGE_KEY_ACCESS_TOKEN).cloned();
        let tenant_id = cookies.get(STORAGE_KEY_COMPANY_ID).cloned();
        Self::with_credentials(config, access_token, tenant_id)
    }

    fn with_credentials(
        config: ClientConfig,
        access_token: Option<String>,
        tenant_id: Option<String>,
    ) -> Result<Self> {
        config.validate()?;
        let http = HttpClient::builder().timeout(config.timeout).build()?;
        Ok(Self { http, config, access_token, tenant_id })
    }

    /// GET with per-endpoint degradation.
    ///
    /// # Errors
    ///
    /// Returns an error for non-2xx statuses not covered by `fallback`.
    pub async fn get(
        &self,
        path: &str,
        query: &[(&str, &str)],
        fallback: ReadFallback,
    ) -> Result<Value> {
        let url = self.config.endpoint_url(path);

        let mut builder = self.base_request(Method::GET, &url);
        if !query.is_empty() {
            builder = builder.query(query);
        }

        let response = self.http.send(builder).await?;
        let status = response.status();

        if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::NOT_FOUND) {
            match fallback {
                ReadFallback::EmptyList => {
                    warn!(%url, %status, "read endpoint unavailable; rendering empty collection");
                    return Ok(json!([]));
                }
                ReadFallback::NullResource => {
                    warn!(%url, %status, "read endpoint unavailable; rendering null");
                    return Ok(Value::Null);
                }
                ReadFallback::Strict => {}
            }
        }

        read_json(response, &url).await
    }

    /// Simple POST for the rare server-side mutation. No degradation and
    /// no refresh.
    ///
    /// # Errors
    ///
    /// Returns an error for any non-2xx status.
    pub async fn post(&self, path: &str, body: &Value) -> Result<Value> {
        let url = self.config.endpoint_url(path);

        let builder = self
            .base_request(Method::POST, &url)
            .header(header::CONTENT_TYPE, "application/json")
            .json(body);

        let response = self.http.send(builder).await?;
        read_json(response, &url).await
    }

    fn base_request(&self, method: Method, url: &str) -> RequestBuilder {
        let mut builder = self
            .http
            .request(method, url)
            .header(HEADER_COMPANY_SLUG, self.config.default_tenant_slug.clone());

        if let Some(tenant_id) = &self.tenant_id {
            builder = builder.header(HEADER_COMPANY_ID, tenant_id);
        }
        if let Some(token) = &self.access_token {
            builder = builder.bearer_auth(token);
        }

        builder
    }
}

async fn read_json(response: Response, url: &str) -> Result<Value> {
    let status = response.status();

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(VitrineError::Api(failure_from_response(status, url, &body)));
    }

    let text = response
        .text()
        .await
        .map_err(|err| VitrineError::Network(format!("failed to read response body: {}", err)))?;

    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_str(&text).unwrap_or(Value::String(text)))
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn config_for(server: &MockServer) -> ClientConfig {
        ClientConfig { base_url: server.uri(), ..Default::default() }
    }

    #[tokio::test]
    async fn missing_listing_degrades_to_empty_collection() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/articles/"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = ReadClient::new(config_for(&server)).expect("read client");
        let value = client.get("/articles/", &[], ReadFallback::EmptyList).await.expect("value");

        assert_eq!(value, json!([]));
    }

    #[tokio::test]
    async fn missing_resource_degrades_to_null() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/pages/about/"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = ReadClient::new(config_for(&server)).expect("read client");
        let value =
            client.get("/pages/about/", &[], ReadFallback::NullResource).await.expect("value");

        assert_eq!(value, Value::Null);
    }

    #[tokio::test]
    async fn unauthorized_reads_degrade_the_same_way() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/articles/"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let client = ReadClient::new(config_for(&server)).expect("read client");
        let value = client.get("/articles/", &[], ReadFallback::EmptyList).await.expect("value");

        assert_eq!(value, json!([]));
    }

    #[tokio::test]
    async fn strict_endpoints_surface_the_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/orders/17/"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = ReadClient::new(config_for(&server)).expect("read client");
        let result = client.get("/orders/17/", &[], ReadFallback::Strict).await;

        match result {
            Err(VitrineError::Api(failure)) => assert_eq!(failure.status, 404),
            other => panic!("expected a 404 error, got {:?}", other.err()),
        }
    }

    #[tokio::test]
    async fn server_errors_are_never_degraded() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/articles/"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = ReadClient::new(config_for(&server)).expect("read client");
        let result = client.get("/articles/", &[], ReadFallback::EmptyList).await;

        match result {
            Err(VitrineError::Api(failure)) => {
                assert_eq!(failure.status, 500);
                assert_eq!(failure.message, "HTTP 500: Internal Server Error");
            }
            other => panic!("expected a 500 error, got {:?}", other.err()),
        }
    }

    #[tokio::test]
    async fn credentials_come_from_the_inbound_cookie_header() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/orders/"))
            .and(header("Authorization", "Bearer cookie-token"))
            .and(header("X-Company-Id", "42"))
            .and(header("X-Company-Slug", "vitrine"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "results": [] })))
            .expect(1)
            .mount(&server)
            .await;

        let client = ReadClient::from_cookie_header(
            config_for(&server),
            "auth_token=cookie-token; company_id=42; theme=dark",
        )
        .expect("read client");

        let value = client.get("/orders/", &[], ReadFallback::Strict).await.expect("value");
        assert_eq!(value, json!({ "results": [] }));
    }

    #[tokio::test]
    async fn simple_post_passes_through() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/newsletter/subscribe/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "subscribed": true })))
            .mount(&server)
            .await;

        let client = ReadClient::new(config_for(&server)).expect("read client");
        let value = client
            .post("/newsletter/subscribe/", &json!({ "email": "mara@example.com" }))
            .await
            .expect("value");

        assert_eq!(value, json!({ "subscribed": true }));
    }
}
