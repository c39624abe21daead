//! Shared request executor for provider clients.
//!
//! Every provider request goes through [`ProviderHttp::fetch_json`], which:
//! 1. waits on the provider's rate limiter before each attempt
//! 2. retries 429 / 5xx / network errors / timeouts with exponential backoff
//! 3. maps 401 to [`ProviderError::Auth`] (Spotify refreshes and retries once)
//! 4. treats every other 4xx as "no results" (`Ok(None)`)
//! 5. decodes the body into the provider's DTO, or fails with `Malformed`

use std::sync::Arc;
use std::time::Duration;

use reqwest::{RequestBuilder, StatusCode, header};
use serde::de::DeserializeOwned;

use super::domain::{ProviderError, ProviderId};
use super::ratelimit::{RateLimiter, RetryPolicy};
use crate::config::HttpConfig;

/// Response body that can signal throttling in-band.
///
/// Some APIs (Deezer) answer `200 OK` with an error object when the quota is
/// exhausted. Those DTOs override [`ApiBody::is_throttled`] so the executor
/// can back off exactly as it would for a 429.
pub trait ApiBody: DeserializeOwned {
    fn is_throttled(&self) -> bool {
        false
    }
}

/// Build a reqwest client with the shared timeouts and User-Agent
pub fn build_client(http: &HttpConfig) -> Result<reqwest::Client, ProviderError> {
    reqwest::Client::builder()
        .gzip(true)
        .user_agent(http.user_agent.clone())
        .timeout(http.request_timeout())
        .connect_timeout(http.connect_timeout())
        .build()
        .map_err(|e| ProviderError::Unavailable(format!("failed to build HTTP client: {e}")))
}

/// Rate-limited, retrying HTTP executor owned by one provider client
#[derive(Debug, Clone)]
pub struct ProviderHttp {
    provider: ProviderId,
    client: reqwest::Client,
    limiter: Arc<RateLimiter>,
    retry: RetryPolicy,
}

/// A failed attempt, with the server's `Retry-After` hint when it sent one
struct Failure {
    error: ProviderError,
    retry_after: Option<Duration>,
}

impl From<ProviderError> for Failure {
    fn from(error: ProviderError) -> Self {
        Self {
            error,
            retry_after: None,
        }
    }
}

impl ProviderHttp {
    pub fn new(
        provider: ProviderId,
        client: reqwest::Client,
        limiter: Arc<RateLimiter>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            provider,
            client,
            limiter,
            retry,
        }
    }

    /// Send a request built by `build` and decode a JSON body.
    ///
    /// `build` is called once per attempt because a `RequestBuilder` is
    /// consumed by `send`.
    pub async fn fetch_json<T, F>(&self, build: F) -> Result<Option<T>, ProviderError>
    where
        T: ApiBody,
        F: Fn(&reqwest::Client) -> RequestBuilder,
    {
        let mut attempt = 0;

        loop {
            self.limiter.acquire().await;

            match self.attempt::<T>(build(&self.client)).await {
                Ok(body) => return Ok(body),
                Err(Failure { error, .. }) if !error.is_retryable() => return Err(error),
                Err(Failure { error, retry_after }) => {
                    if !self.retry.should_retry(attempt) {
                        tracing::warn!(
                            provider = %self.provider,
                            attempts = attempt + 1,
                            "Retry budget exhausted: {}",
                            error
                        );
                        return Err(match error {
                            ProviderError::RateLimited => ProviderError::Unavailable(
                                "rate limited, retry budget exhausted".to_string(),
                            ),
                            other => other,
                        });
                    }

                    let delay = self.retry.delay_with_hint(attempt, retry_after);
                    tracing::debug!(
                        provider = %self.provider,
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        "Retrying after: {}",
                        error
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }

    /// One request. `Ok(None)` is a client error meaning "no results".
    async fn attempt<T: ApiBody>(&self, request: RequestBuilder) -> Result<Option<T>, Failure> {
        let response = request.send().await.map_err(|e| {
            let reason = if e.is_timeout() {
                format!("request timed out: {e}")
            } else {
                format!("network error: {e}")
            };
            ProviderError::Unavailable(reason)
        })?;

        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(Failure {
                error: ProviderError::RateLimited,
                retry_after: retry_after(response.headers()),
            });
        }

        if status.is_server_error() {
            return Err(ProviderError::Unavailable(format!(
                "HTTP {}: {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown")
            ))
            .into());
        }

        if status == StatusCode::UNAUTHORIZED {
            return Err(ProviderError::Auth(format!(
                "{} rejected credentials (HTTP 401)",
                self.provider
            ))
            .into());
        }

        if status.is_client_error() {
            tracing::debug!(
                provider = %self.provider,
                status = status.as_u16(),
                "Client error treated as no results"
            );
            return Ok(None);
        }

        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::Unavailable(format!("failed to read body: {e}")))?;

        let parsed = serde_json::from_str::<T>(&body)
            .map_err(|e| ProviderError::Malformed(e.to_string()))?;
        if parsed.is_throttled() {
            return Err(ProviderError::RateLimited.into());
        }
        Ok(Some(parsed))
    }
}

/// Parse a `Retry-After` header given in seconds
fn retry_after(headers: &header::HeaderMap) -> Option<Duration> {
    headers
        .get(header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use serde::Deserialize;
    use std::time::Instant;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

    #[derive(Debug, Deserialize)]
    struct Payload {
        value: String,
    }

    impl ApiBody for Payload {}

    #[derive(Debug, Deserialize)]
    struct Quota {
        #[serde(default)]
        throttled: bool,
    }

    impl ApiBody for Quota {
        fn is_throttled(&self) -> bool {
            self.throttled
        }
    }

    fn executor(max_attempts: u32) -> ProviderHttp {
        executor_with(reqwest::Client::new(), max_attempts, Duration::from_millis(20))
    }

    fn executor_with(
        client: reqwest::Client,
        max_attempts: u32,
        base_delay: Duration,
    ) -> ProviderHttp {
        ProviderHttp::new(
            ProviderId::Deezer,
            client,
            Arc::new(RateLimiter::new(100, Duration::from_secs(1))),
            RetryPolicy {
                max_attempts,
                base_delay,
                multiplier: 2.0,
                max_delay: Duration::from_millis(500),
            },
        )
    }

    /// Answers 429 `throttled` times, then 200, noting when each request
    /// arrived
    struct Throttling {
        throttled: usize,
        arrivals: Arc<Mutex<Vec<Instant>>>,
    }

    impl Respond for Throttling {
        fn respond(&self, _request: &Request) -> ResponseTemplate {
            let mut arrivals = self.arrivals.lock();
            arrivals.push(Instant::now());
            if arrivals.len() <= self.throttled {
                ResponseTemplate::new(429)
            } else {
                ResponseTemplate::new(200).set_body_string(r#"{"value":"ok"}"#)
            }
        }
    }

    #[test]
    fn test_retry_after_parsing() {
        let mut headers = header::HeaderMap::new();
        headers.insert(header::RETRY_AFTER, header::HeaderValue::from_static("3"));
        assert_eq!(retry_after(&headers), Some(Duration::from_secs(3)));

        headers.insert(
            header::RETRY_AFTER,
            header::HeaderValue::from_static("Wed, 21 Oct 2015 07:28:00 GMT"),
        );
        assert_eq!(retry_after(&headers), None);
    }

    #[tokio::test]
    async fn test_429_twice_then_success() {
        let server = MockServer::start().await;
        let arrivals = Arc::new(Mutex::new(Vec::new()));
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(Throttling {
                throttled: 2,
                arrivals: arrivals.clone(),
            })
            .mount(&server)
            .await;

        let http = executor_with(reqwest::Client::new(), 4, Duration::from_millis(50));
        let url = format!("{}/search", server.uri());

        let result: Option<Payload> = http.fetch_json(|c| c.get(&url)).await.unwrap();

        assert_eq!(result.unwrap().value, "ok");
        let arrivals = arrivals.lock().clone();
        assert_eq!(arrivals.len(), 3);
        let first_gap = arrivals[1] - arrivals[0];
        let second_gap = arrivals[2] - arrivals[1];
        // 50ms then 100ms of backoff
        assert!(first_gap >= Duration::from_millis(50), "first gap {first_gap:?}");
        assert!(second_gap >= Duration::from_millis(100), "second gap {second_gap:?}");
        assert!(second_gap > first_gap);
    }

    #[tokio::test]
    async fn test_timeouts_are_retried_then_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"{"value":"late"}"#)
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(100))
            .build()
            .unwrap();
        let http = executor_with(client, 3, Duration::from_millis(10));
        let url = server.uri();

        let result = http.fetch_json::<Payload, _>(|c| c.get(&url)).await;

        match result {
            Err(ProviderError::Unavailable(reason)) => assert!(reason.contains("timed out")),
            other => panic!("expected a timeout, got {other:?}"),
        }
        assert_eq!(server.received_requests().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_persistent_5xx_degrades_to_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let http = executor(3);
        let url = server.uri();
        let result = http.fetch_json::<Payload, _>(|c| c.get(&url)).await;

        assert!(matches!(result, Err(ProviderError::Unavailable(_))));
        assert_eq!(server.received_requests().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_rate_limit_exhaustion_is_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let http = executor(2);
        let url = server.uri();
        let result = http.fetch_json::<Payload, _>(|c| c.get(&url)).await;

        assert!(matches!(result, Err(ProviderError::Unavailable(_))));
    }

    #[tokio::test]
    async fn test_other_4xx_is_no_results_without_retry() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let http = executor(4);
        let url = server.uri();
        let result = http.fetch_json::<Payload, _>(|c| c.get(&url)).await.unwrap();

        assert!(result.is_none());
        assert_eq!(server.received_requests().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_401_is_auth_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let http = executor(4);
        let url = server.uri();
        let result = http.fetch_json::<Payload, _>(|c| c.get(&url)).await;

        assert!(matches!(result, Err(ProviderError::Auth(_))));
        assert_eq!(server.received_requests().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unexpected_shape_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"other": 1}"#))
            .mount(&server)
            .await;

        let http = executor(4);
        let url = server.uri();
        let result = http.fetch_json::<Payload, _>(|c| c.get(&url)).await;

        assert!(matches!(result, Err(ProviderError::Malformed(_))));
        // Not retryable
        assert_eq!(server.received_requests().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_in_body_throttle_is_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"throttled": true}"#))
            .up_to_n_times(1)
            .with_priority(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{}"#))
            .mount(&server)
            .await;

        let http = executor(3);
        let url = server.uri();
        let result = http.fetch_json::<Quota, _>(|c| c.get(&url)).await.unwrap();

        assert!(!result.unwrap().throttled);
        assert_eq!(server.received_requests().await.unwrap().len(), 2);
    }
}
