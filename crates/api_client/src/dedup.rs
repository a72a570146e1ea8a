//! In-flight request deduplication
//!
//! Identical idempotent requests issued concurrently - same method, URL,
//! and body - share one underlying HTTP call and one response. The slot
//! is removed as soon as the shared response settles, so later calls hit
//! the network again.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use reqwest::{Client, Method, StatusCode};
use thiserror::Error;
use tracing::debug;

/// Status and body of a completed request, cheap to clone across waiters
pub type SharedResponse = (StatusCode, Bytes);

/// Deduplication errors; cloneable so every waiter receives the failure
#[derive(Debug, Clone, Error)]
pub enum DedupError {
    /// The underlying request failed
    #[error("request failed: {0}")]
    Request(String),
}

type Key = (Method, String, Bytes);
type InflightFuture = Shared<BoxFuture<'static, Result<SharedResponse, DedupError>>>;

/// Collapses concurrent identical requests into one in-flight call
#[derive(Clone)]
pub struct RequestDeduper {
    client: Client,
    inflight: Arc<Mutex<HashMap<Key, InflightFuture>>>,
}

impl std::fmt::Debug for RequestDeduper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestDeduper").finish_non_exhaustive()
    }
}

impl Default for RequestDeduper {
    fn default() -> Self {
        Self::new(Client::new())
    }
}

impl RequestDeduper {
    /// Create a deduper over an existing client
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self {
            client,
            inflight: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Deduplicated GET
    pub async fn get(&self, url: impl Into<String>) -> Result<SharedResponse, DedupError> {
        self.execute(Method::GET, url.into(), Bytes::new()).await
    }

    /// Deduplicated request with a body; only idempotent requests should
    /// be routed through here
    pub async fn execute(
        &self,
        method: Method,
        url: String,
        body: Bytes,
    ) -> Result<SharedResponse, DedupError> {
        let key: Key = (method.clone(), url.clone(), body.clone());

        let future = {
            let mut inflight = lock_inflight(&self.inflight);
            if let Some(existing) = inflight.get(&key) {
                debug!(%method, %url, "Joining in-flight request");
                existing.clone()
            } else {
                let client = self.client.clone();
                let slot_map = Arc::clone(&self.inflight);
                let slot_key = key.clone();

                let future: InflightFuture = async move {
                    let result = send(client, method, url, body).await;
                    // Settled: clear the slot so later calls go out again
                    lock_inflight(&slot_map).remove(&slot_key);
                    result
                }
                .boxed()
                .shared();

                inflight.insert(key, future.clone());
                future
            }
        };

        future.await
    }

    /// Number of currently in-flight deduplicated requests
    #[must_use]
    pub fn inflight_count(&self) -> usize {
        lock_inflight(&self.inflight).len()
    }
}

/// Mutex poisoning only happens when a waiter panicked; recover the map
fn lock_inflight(
    inflight: &Arc<Mutex<HashMap<Key, InflightFuture>>>,
) -> std::sync::MutexGuard<'_, HashMap<Key, InflightFuture>> {
    inflight.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

async fn send(
    client: Client,
    method: Method,
    url: String,
    body: Bytes,
) -> Result<SharedResponse, DedupError> {
    let mut request = client.request(method, &url);
    if !body.is_empty() {
        request = request.body(body);
    }

    let response = request
        .send()
        .await
        .map_err(|e| DedupError::Request(e.to_string()))?;
    let status = response.status();
    let bytes = response
        .bytes()
        .await
        .map_err(|e| DedupError::Request(e.to_string()))?;

    Ok((status, bytes))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[tokio::test]
    async fn concurrent_identical_gets_share_one_call() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/tasks"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_delay(Duration::from_millis(100))
                    .set_body_string("page-1"),
            )
            .expect(1)
            .mount(&server)
            .await;

        let deduper = RequestDeduper::default();
        let url = format!("{}/api/v1/tasks", server.uri());

        let (a, b) = tokio::join!(deduper.get(url.clone()), deduper.get(url.clone()));
        let (status_a, body_a) = a.unwrap();
        let (status_b, body_b) = b.unwrap();

        assert_eq!(status_a, StatusCode::OK);
        assert_eq!(status_a, status_b);
        assert_eq!(body_a, body_b);
        assert_eq!(body_a, Bytes::from("page-1"));

        server.verify().await;
    }

    #[tokio::test]
    async fn slot_clears_once_the_response_settles() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/tasks"))
            .respond_with(ResponseTemplate::new(200))
            .expect(2)
            .mount(&server)
            .await;

        let deduper = RequestDeduper::default();
        let url = format!("{}/api/v1/tasks", server.uri());

        deduper.get(url.clone()).await.unwrap();
        assert_eq!(deduper.inflight_count(), 0);

        // A later call is a fresh request
        deduper.get(url).await.unwrap();
        server.verify().await;
    }

    #[tokio::test]
    async fn different_urls_are_not_deduplicated() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(2)
            .mount(&server)
            .await;

        let deduper = RequestDeduper::default();
        let (a, b) = tokio::join!(
            deduper.get(format!("{}/api/v1/tasks", server.uri())),
            deduper.get(format!("{}/api/v1/users", server.uri())),
        );
        a.unwrap();
        b.unwrap();

        server.verify().await;
    }

    #[tokio::test]
    async fn failures_are_shared_and_then_cleared() {
        // No server: connection refused
        let deduper = RequestDeduper::default();
        let url = "http://127.0.0.1:1/api/v1/tasks".to_string();

        let (a, b) = tokio::join!(deduper.get(url.clone()), deduper.get(url));
        assert!(a.is_err());
        assert!(b.is_err());
        assert_eq!(deduper.inflight_count(), 0);
    }
}
