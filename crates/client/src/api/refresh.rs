//! Single-flight token refresh
//!
//! Every caller that hits a 401 while a refresh is running must observe
//! the outcome of the same network call: the first caller installs a
//! shared future, later callers clone and await it, and the slot is
//! cleared once it resolves. Without the guard, N concurrent 401s would
//! issue N redundant refresh calls and could race on which rotated
//! refresh token is persisted last.

use std::sync::Arc;

use futures::future::{BoxFuture, Shared};
use futures::FutureExt;
use reqwest::Method;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use vitrine_domain::SessionTokens;

use crate::http::HttpClient;
use crate::session::SessionStore;

type SharedRefresh = Shared<BoxFuture<'static, Option<String>>>;

/// Coordinates refresh attempts so at most one network call is in flight.
#[derive(Default)]
pub(crate) struct RefreshCoordinator {
    in_flight: Mutex<Option<SharedRefresh>>,
}

impl RefreshCoordinator {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Resolve to a fresh access token, or `None` when the session is
    /// beyond recovery (both tokens have been cleared by then).
    pub(crate) async fn refresh(
        &self,
        http: HttpClient,
        url: String,
        store: Arc<SessionStore>,
    ) -> Option<String> {
        let shared = {
            let mut slot = self.in_flight.lock().await;
            match slot.as_ref() {
                Some(existing) => {
                    debug!("joining in-flight token refresh");
                    existing.clone()
                }
                None => {
                    let fut = run_refresh(http, url, store).boxed().shared();
                    *slot = Some(fut.clone());
                    fut
                }
            }
        };

        let outcome = shared.clone().await;

        // Clear the slot, but only if it still holds the future we awaited;
        // a later refresh may already have been installed.
        let mut slot = self.in_flight.lock().await;
        if slot.as_ref().is_some_and(|current| current.ptr_eq(&shared)) {
            *slot = None;
        }

        outcome
    }
}

async fn run_refresh(http: HttpClient, url: String, store: Arc<SessionStore>) -> Option<String> {
    let Some(refresh_token) = store.refresh_token().await else {
        debug!("refresh requested without a refresh token");
        return None;
    };

    let body = serde_json::json!({ "refresh": refresh_token });
    // No Authorization header: the refresh token in the body is the credential
    let request = http.request(Method::POST, &url).json(&body);

    let response = match http.send(request).await {
        Ok(response) => response,
        Err(err) => {
            warn!(error = %err, "token refresh request failed");
            store.clear_tokens().await;
            return None;
        }
    };

    if !response.status().is_success() {
        warn!(status = %response.status(), "token refresh rejected");
        store.clear_tokens().await;
        return None;
    }

    match response.json::<SessionTokens>().await {
        Ok(tokens) => {
            store.set_access_token(Some(&tokens.access)).await;
            if let Some(rotated) = tokens.refresh.as_deref() {
                debug!("refresh token rotated by backend");
                store.set_refresh_token(Some(rotated)).await;
            }
            info!("access token refreshed");
            Some(tokens.access)
        }
        Err(err) => {
            warn!(error = %err, "token refresh returned an unreadable body");
            store.clear_tokens().await;
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    async fn store_with_refresh_token(token: &str) -> Arc<SessionStore> {
        let store = Arc::new(SessionStore::in_memory());
        store.set_refresh_token(Some(token)).await;
        store
    }

    #[tokio::test]
    async fn concurrent_callers_share_one_network_call() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/refresh/"))
            .and(body_json(serde_json::json!({ "refresh": "r-1" })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "access": "fresh" }))
                    .set_delay(Duration::from_millis(100)),
            )
            .expect(1)
            .mount(&server)
            .await;

        let store = store_with_refresh_token("r-1").await;
        let http = HttpClient::new().unwrap();
        let url = format!("{}/auth/refresh/", server.uri());
        let coordinator = RefreshCoordinator::new();

        let (first, second) = tokio::join!(
            coordinator.refresh(http.clone(), url.clone(), store.clone()),
            coordinator.refresh(http.clone(), url.clone(), store.clone()),
        );

        assert_eq!(first.as_deref(), Some("fresh"));
        assert_eq!(second.as_deref(), Some("fresh"));
        assert_eq!(store.access_token().await.as_deref(), Some("fresh"));
    }

    #[tokio::test]
    async fn rotated_refresh_token_replaces_the_old_one() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/refresh/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(
                serde_json::json!({ "access": "fresh", "refresh": "r-2" }),
            ))
            .mount(&server)
            .await;

        let store = store_with_refresh_token("r-1").await;
        let http = HttpClient::new().unwrap();
        let url = format!("{}/auth/refresh/", server.uri());

        let outcome = RefreshCoordinator::new().refresh(http, url, store.clone()).await;

        assert_eq!(outcome.as_deref(), Some("fresh"));
        assert_eq!(store.refresh_token().await.as_deref(), Some("r-2"));
    }

    #[tokio::test]
    async fn rejected_refresh_clears_both_tokens() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/refresh/"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let store = store_with_refresh_token("r-1").await;
        store.set_access_token(Some("stale")).await;
        let http = HttpClient::new().unwrap();
        let url = format!("{}/auth/refresh/", server.uri());

        let outcome = RefreshCoordinator::new().refresh(http, url, store.clone()).await;

        assert_eq!(outcome, None);
        assert_eq!(store.access_token().await, None);
        assert_eq!(store.refresh_token().await, None);
    }

    #[tokio::test]
    async fn a_new_refresh_can_start_after_the_first_resolves() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/refresh/"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "access": "fresh" })),
            )
            .expect(2)
            .mount(&server)
            .await;

        let store = store_with_refresh_token("r-1").await;
        let http = HttpClient::new().unwrap();
        let url = format!("{}/auth/refresh/", server.uri());
        let coordinator = RefreshCoordinator::new();

        let first = coordinator.refresh(http.clone(), url.clone(), store.clone()).await;
        let second = coordinator.refresh(http, url, store).await;

        assert_eq!(first.as_deref(), Some("fresh"));
        assert_eq!(second.as_deref(), Some("fresh"));
    }
}
