//! API client for the storefront backend
//!
//! All feature modules (catalog, cart, orders, content) are thin wrappers
//! over this one client. It owns header attachment, response decoding,
//! structured error construction, and the 401 refresh-and-replay
//! protocol.

use std::sync::Arc;

use reqwest::multipart::{Form, Part};
use reqwest::{header, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, instrument};
use vitrine_domain::constants::{ENDPOINT_REFRESH, HEADER_COMPANY_ID, HEADER_COMPANY_SLUG};
use vitrine_domain::{Result, VitrineError};

use super::errors::failure_from_response;
use super::refresh::RefreshCoordinator;
use crate::config::ClientConfig;
use crate::http::HttpClient;
use crate::session::SessionStore;

/// Per-request options
#[derive(Debug, Clone, Copy)]
pub struct RequestOptions {
    /// Attach `Authorization: Bearer <token>` when a token is available.
    /// Login and refresh calls disable this so a stale token is never
    /// sent alongside fresh credentials.
    pub attach_auth: bool,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self { attach_auth: true }
    }
}

impl RequestOptions {
    /// Options for endpoints that must not see an Authorization header.
    #[must_use]
    pub fn unauthenticated() -> Self {
        Self { attach_auth: false }
    }
}

/// Decoded 2xx response body
#[derive(Debug, Clone)]
pub enum Payload {
    /// `application/json` response, parsed
    Json(Value),
    /// Anything else, as raw text
    Text(String),
}

impl Payload {
    /// Collapse into a JSON value; text becomes a JSON string.
    #[must_use]
    pub fn into_json(self) -> Value {
        match self {
            Self::Json(value) => value,
            Self::Text(text) => Value::String(text),
        }
    }
}

/// One file in a multipart upload
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub filename: String,
    pub bytes: Vec<u8>,
    /// MIME type; the transport picks a default when absent
    pub content_type: Option<String>,
}

/// Authenticated API client.
///
/// Construct one instance at startup and share it (`Arc`) across the
/// application; the single-flight refresh guarantee is per instance.
pub struct ApiClient {
    http: HttpClient,
    config: ClientConfig,
    store: Arc<SessionStore>,
    refresh: RefreshCoordinator,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns `VitrineError::Config` when the configured base URL is
    /// invalid, or `VitrineError::Internal` when the transport cannot be
    /// built.
    pub fn new(config: ClientConfig, store: Arc<SessionStore>) -> Result<Self> {
        config.validate()?;
        let http = HttpClient::builder().timeout(config.timeout).build()?;
        Ok(Self { http, config, store, refresh: RefreshCoordinator::new() })
    }

    /// Session store backing this client.
    #[must_use]
    pub fn session(&self) -> &Arc<SessionStore> {
        &self.store
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Execute a GET request.
    ///
    /// # Errors
    ///
    /// Returns an error when the request fails or the response cannot be
    /// deserialized into `R`.
    #[instrument(skip(self), fields(path = %path))]
    pub async fn get<R: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<R> {
        let payload =
            self.execute(Method::GET, path, query, None, RequestOptions::default()).await?;
        decode(payload)
    }

    /// Execute a POST request with a JSON body.
    ///
    /// # Errors
    ///
    /// Returns an error when the request fails or the response cannot be
    /// deserialized into `R`.
    pub async fn post<B: Serialize, R: DeserializeOwned>(&self, path: &str, body: &B) -> Result<R> {
        self.post_with(path, body, RequestOptions::default()).await
    }

    /// POST with explicit options (e.g. `RequestOptions::unauthenticated()`
    /// for login).
    ///
    /// # Errors
    ///
    /// Returns an error when the request fails or the response cannot be
    /// deserialized into `R`.
    #[instrument(skip(self, body), fields(path = %path))]
    pub async fn post_with<B: Serialize, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        options: RequestOptions,
    ) -> Result<R> {
        let body = to_body(body)?;
        let payload = self.execute(Method::POST, path, &[], Some(body), options).await?;
        decode(payload)
    }

    /// Execute a PUT request with a JSON body.
    ///
    /// # Errors
    ///
    /// Returns an error when the request fails or the response cannot be
    /// deserialized into `R`.
    pub async fn put<B: Serialize, R: DeserializeOwned>(&self, path: &str, body: &B) -> Result<R> {
        let body = to_body(body)?;
        let payload =
            self.execute(Method::PUT, path, &[], Some(body), RequestOptions::default()).await?;
        decode(payload)
    }

    /// Execute a PATCH request with a JSON body.
    ///
    /// # Errors
    ///
    /// Returns an error when the request fails or the response cannot be
    /// deserialized into `R`.
    pub async fn patch<B: Serialize, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<R> {
        let body = to_body(body)?;
        let payload =
            self.execute(Method::PATCH, path, &[], Some(body), RequestOptions::default()).await?;
        decode(payload)
    }

    /// Execute a DELETE request.
    ///
    /// # Errors
    ///
    /// Returns an error when the request fails or the response cannot be
    /// deserialized into `R`. A bodyless 204 decodes into `()`.
    pub async fn delete<R: DeserializeOwned>(&self, path: &str) -> Result<R> {
        let payload =
            self.execute(Method::DELETE, path, &[], None, RequestOptions::default()).await?;
        decode(payload)
    }

    /// Low-level escape hatch returning the raw payload.
    ///
    /// # Errors
    ///
    /// Returns an error when the request fails.
    pub async fn fetch(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<Value>,
        options: RequestOptions,
    ) -> Result<Payload> {
        self.execute(method, path, query, body, options).await
    }

    /// Upload one or more files as multipart form data.
    ///
    /// A single file is sent under the `file` field, several under
    /// `files[]`; extra form fields are flattened alongside. The 401
    /// refresh protocol applies; the form is rebuilt for the replay.
    ///
    /// # Errors
    ///
    /// Returns an error when the request fails or the response cannot be
    /// deserialized into `R`.
    #[instrument(skip(self, files, fields), fields(path = %path, files = files.len()))]
    pub async fn upload<R: DeserializeOwned>(
        &self,
        path: &str,
        files: &[UploadFile],
        fields: &[(String, String)],
    ) -> Result<R> {
        let url = self.config.endpoint_url(path);
        let options = RequestOptions::default();

        let response = self.dispatch_multipart(&url, files, fields, options).await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            if let Some(_token) = self.recover_session().await? {
                debug!(%url, "replaying upload with refreshed token");
                let retried = self.dispatch_multipart(&url, files, fields, options).await?;
                return decode(decode_response(retried, &url).await?);
            }
        }

        decode(decode_response(response, &url).await?)
    }

    async fn execute(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<Value>,
        options: RequestOptions,
    ) -> Result<Payload> {
        let url = self.config.endpoint_url(path);

        let response =
            self.dispatch(method.clone(), &url, query, body.as_ref(), options).await?;

        if response.status() == StatusCode::UNAUTHORIZED && options.attach_auth {
            if let Some(_token) = self.recover_session().await? {
                debug!(%url, "replaying request with refreshed token");
                let retried = self.dispatch(method, &url, query, body.as_ref(), options).await?;
                // A second 401 propagates as an ordinary error: one replay
                // per original call, never a second refresh.
                return decode_response(retried, &url).await;
            }
        }

        decode_response(response, &url).await
    }

    /// Run the refresh protocol for a 401.
    ///
    /// `Ok(Some(_))` means a fresh token is in the store and the request
    /// should be replayed. `Ok(None)` means no refresh was possible (no
    /// refresh token), so the original 401 stands. `Err(SessionExpired)`
    /// means a refresh ran and failed; the tokens are already cleared.
    async fn recover_session(&self) -> Result<Option<String>> {
        if self.store.refresh_token().await.is_none() {
            return Ok(None);
        }

        let refresh_url = self.config.endpoint_url(ENDPOINT_REFRESH);
        match self
            .refresh
            .refresh(self.http.clone(), refresh_url, Arc::clone(&self.store))
            .await
        {
            Some(token) => Ok(Some(token)),
            None => Err(VitrineError::SessionExpired),
        }
    }

    async fn dispatch(
        &self,
        method: Method,
        url: &str,
        query: &[(&str, &str)],
        body: Option<&Value>,
        options: RequestOptions,
    ) -> Result<Response> {
        let mut builder = self
            .base_request(method, url, options)
            .await
            .header(header::CONTENT_TYPE, "application/json");

        if !query.is_empty() {
            builder = builder.query(query);
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }

        self.http.send(builder).await
    }

    async fn dispatch_multipart(
        &self,
        url: &str,
        files: &[UploadFile],
        fields: &[(String, String)],
        options: RequestOptions,
    ) -> Result<Response> {
        let form = build_form(files, fields)?;
        let builder = self.base_request(Method::POST, url, options).await.multipart(form);
        self.http.send(builder).await
    }

    async fn base_request(
        &self,
        method: Method,
        url: &str,
        options: RequestOptions,
    ) -> RequestBuilder {
        let slug = self
            .store
            .tenant_slug()
            .await
            .unwrap_or_else(|| self.config.default_tenant_slug.clone());

        let mut builder = self.http.request(method, url).header(HEADER_COMPANY_SLUG, slug);

        if let Some(tenant_id) = self.store.tenant_id().await {
            builder = builder.header(HEADER_COMPANY_ID, tenant_id);
        }

        if options.attach_auth {
            if let Some(token) = self.store.access_token().await {
                builder = builder.bearer_auth(token);
            }
        }

        builder
    }
}

fn build_form(files: &[UploadFile], fields: &[(String, String)]) -> Result<Form> {
    let mut form = Form::new();
    let field_name = if files.len() > 1 { "files[]" } else { "file" };

    for file in files {
        let mut part = Part::bytes(file.bytes.clone()).file_name(file.filename.clone());
        if let Some(content_type) = &file.content_type {
            part = part.mime_str(content_type).map_err(|err| {
                VitrineError::Internal(format!(
                    "invalid content type for {}: {}",
                    file.filename, err
                ))
            })?;
        }
        form = form.part(field_name, part);
    }

    for (name, value) in fields {
        form = form.text(name.clone(), value.clone());
    }

    Ok(form)
}

async fn decode_response(response: Response, url: &str) -> Result<Payload> {
    let status = response.status();

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(VitrineError::Api(failure_from_response(status, url, &body)));
    }

    let is_json = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.contains("application/json"));

    let text = response
        .text()
        .await
        .map_err(|err| VitrineError::Network(format!("failed to read response body: {}", err)))?;

    if is_json {
        if text.trim().is_empty() {
            return Ok(Payload::Json(Value::Null));
        }
        serde_json::from_str(&text).map(Payload::Json).map_err(|err| {
            VitrineError::Internal(format!("failed to parse response from {}: {}", url, err))
        })
    } else if text.is_empty() {
        // 204-style responses carry no body and no content type
        Ok(Payload::Json(Value::Null))
    } else {
        Ok(Payload::Text(text))
    }
}

fn decode<R: DeserializeOwned>(payload: Payload) -> Result<R> {
    serde_json::from_value(payload.into_json())
        .map_err(|err| VitrineError::Internal(format!("unexpected response shape: {}", err)))
}

fn to_body<B: Serialize>(body: &B) -> Result<Value> {
    serde_json::to_value(body)
        .map_err(|err| VitrineError::Internal(format!("failed to serialize request body: {}", err)))
}
