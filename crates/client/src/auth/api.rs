//! Login, registration, and logout
//!
//! Thin wrapper over [`ApiClient`] that persists the returned session.
//! Login and registration omit the Authorization header so a stale token
//! never rides along with fresh credentials.

use std::sync::Arc;

use tracing::info;
use vitrine_domain::constants::{ENDPOINT_LOGIN, ENDPOINT_REGISTER};
use vitrine_domain::{LoginRequest, LoginResponse, RegisterRequest, RegisterResponse, Result};

use crate::api::{ApiClient, RequestOptions};

/// Auth operations against the storefront backend.
pub struct AuthApi {
    client: Arc<ApiClient>,
}

impl AuthApi {
    #[must_use]
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// Log in and persist the returned session.
    ///
    /// On success the access token, refresh token, and tenant id are in
    /// every persistence layer; the next request picks them up with no
    /// separate activation step.
    ///
    /// # Errors
    ///
    /// Returns the backend's structured error (e.g. invalid credentials)
    /// without touching the stored session.
    pub async fn login(&self, request: &LoginRequest) -> Result<LoginResponse> {
        let response: LoginResponse = self
            .client
            .post_with(ENDPOINT_LOGIN, request, RequestOptions::unauthenticated())
            .await?;

        let store = self.client.session();
        store.set_access_token(Some(&response.access)).await;
        store.set_refresh_token(Some(&response.refresh)).await;
        if let Some(company) = &response.company {
            store.set_tenant_id(Some(&company.id)).await;
            store.set_tenant_slug(Some(&company.slug)).await;
        }

        info!("login successful");
        Ok(response)
    }

    /// Register a new account (and tenant), persisting tokens when the
    /// backend logs the user straight in.
    ///
    /// # Errors
    ///
    /// Returns the backend's structured error, typically field validation.
    pub async fn register(&self, request: &RegisterRequest) -> Result<RegisterResponse> {
        let response: RegisterResponse = self
            .client
            .post_with(ENDPOINT_REGISTER, request, RequestOptions::unauthenticated())
            .await?;

        let store = self.client.session();
        if let Some(tokens) = &response.tokens {
            store.set_access_token(Some(&tokens.access)).await;
            if let Some(refresh) = tokens.refresh.as_deref() {
                store.set_refresh_token(Some(refresh)).await;
            }
        }
        store.set_tenant_id(Some(&response.company.id)).await;
        store.set_tenant_slug(Some(&response.company.slug)).await;

        info!("registration successful");
        Ok(response)
    }

    /// Log out: clear the session from every persistence layer. Local
    /// only; the backend holds no server-side session to invalidate.
    pub async fn logout(&self) {
        self.client.session().clear().await;
        info!("logged out");
    }
}
