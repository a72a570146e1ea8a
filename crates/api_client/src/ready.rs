//! API readiness polling
//!
//! Callers wait for `GET /health` to answer 200 before issuing their
//! first real request: poll every 200 ms with a short per-attempt
//! timeout, for up to 60 s overall.

use std::time::{Duration, Instant};

use reqwest::Client;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Default delay between polls
const POLL_INTERVAL: Duration = Duration::from_millis(200);
/// Default overall budget
const OVERALL_TIMEOUT: Duration = Duration::from_secs(60);
/// Default per-attempt request timeout
const ATTEMPT_TIMEOUT: Duration = Duration::from_secs(2);

/// Readiness polling errors
#[derive(Debug, Error)]
pub enum ReadinessError {
    /// The API did not answer 200 within the overall budget
    #[error("API at {base_url} not ready after {waited_ms} ms ({attempts} attempts)")]
    TimedOut {
        base_url: String,
        waited_ms: u128,
        attempts: u32,
    },
}

/// Polls the API's health endpoint until it answers
#[derive(Debug, Clone)]
pub struct ApiReadyGate {
    client: Client,
    base_url: String,
    poll_interval: Duration,
    overall_timeout: Duration,
}

impl ApiReadyGate {
    /// Create a gate for the API at `base_url` (no trailing slash needed)
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(ATTEMPT_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            poll_interval: POLL_INTERVAL,
            overall_timeout: OVERALL_TIMEOUT,
        }
    }

    /// Override the poll interval (tests)
    #[must_use]
    pub const fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Override the overall budget (tests)
    #[must_use]
    pub const fn with_overall_timeout(mut self, timeout: Duration) -> Self {
        self.overall_timeout = timeout;
        self
    }

    /// Wait until `/health` answers 200, or give up after the budget
    pub async fn wait_ready(&self) -> Result<(), ReadinessError> {
        let url = format!("{}/health", self.base_url);
        let started = Instant::now();
        let mut attempts = 0u32;

        loop {
            attempts += 1;
            match self.client.get(&url).send().await {
                Ok(response) if response.status().is_success() => {
                    info!(attempts, waited_ms = %started.elapsed().as_millis(), "API ready");
                    return Ok(());
                }
                Ok(response) => {
                    debug!(status = %response.status(), attempts, "API not ready yet");
                }
                Err(e) => {
                    debug!(error = %e, attempts, "API unreachable");
                }
            }

            if started.elapsed() + self.poll_interval > self.overall_timeout {
                warn!(attempts, "Gave up waiting for the API");
                return Err(ReadinessError::TimedOut {
                    base_url: self.base_url.clone(),
                    waited_ms: started.elapsed().as_millis(),
                    attempts,
                });
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[tokio::test]
    async fn ready_api_passes_immediately() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "ok",
                "timestamp": "2030-01-01T00:00:00Z"
            })))
            .mount(&server)
            .await;

        let gate = ApiReadyGate::new(server.uri());
        gate.wait_ready().await.unwrap();
    }

    #[tokio::test]
    async fn gate_retries_until_healthy() {
        let server = MockServer::start().await;
        // Two failures, then healthy
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let gate = ApiReadyGate::new(server.uri())
            .with_poll_interval(Duration::from_millis(10));
        gate.wait_ready().await.unwrap();
    }

    #[tokio::test]
    async fn gate_gives_up_after_the_budget() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let gate = ApiReadyGate::new(server.uri())
            .with_poll_interval(Duration::from_millis(10))
            .with_overall_timeout(Duration::from_millis(100));

        let err = gate.wait_ready().await.unwrap_err();
        assert!(matches!(err, ReadinessError::TimedOut { .. }));
    }

    #[test]
    fn trailing_slash_is_normalized() {
        let gate = ApiReadyGate::new("http://localhost:8080/");
        assert_eq!(gate.base_url, "http://localhost:8080");
    }
}
