//! Page retrieval through third-party CORS forwarding proxies.
//!
//! ### Strategies
//! - **Race**: every proxy at once, each under its own timeout. The first
//!   qualifying response wins and the remaining tasks are aborted.
//! - **Sequential**: proxies in configured order, stopping at the first success.
//!
//! ### Success predicate
//! - HTTP 2xx
//! - body decodes in the proxy's declared format
//! - decoded body longer than the configured minimum
//!
//! Per-attempt failures are logged and folded into a single
//! `AllProxiesExhausted` error once every proxy has failed.

pub mod proxy;
pub mod url;

use std::time::{Duration, Instant};

use magpie_core::{AppConfig, Error, FetchStrategy, ProxyDescriptor};
use reqwest::Client;
use tokio::task::JoinSet;

pub use proxy::{ProxyError, attempt, decode_body};
pub use self::url::{UrlError, canonicalize, encode_target};

/// Configuration for the proxy fetcher.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// User agent sent to the proxies
    pub user_agent: String,

    /// Race or sequential fallback
    pub strategy: FetchStrategy,

    /// Proxies, in sequential order
    pub proxies: Vec<ProxyDescriptor>,

    /// Per-proxy timeout
    pub timeout: Duration,

    /// Decoded bodies must be longer than this
    pub min_response_chars: usize,
}

impl From<&AppConfig> for FetchConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
            strategy: config.strategy,
            proxies: config.proxies.clone(),
            timeout: config.proxy_timeout(),
            min_response_chars: config.min_response_chars,
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

/// Page content obtained through a proxy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyResponse {
    /// Decoded page body
    pub body: String,
    /// Name of the proxy that produced it
    pub proxy: String,
    /// Time the winning attempt took
    pub elapsed_ms: u64,
}

/// Stateless fetcher over a fixed set of proxies.
#[derive(Debug, Clone)]
pub struct ProxyFetcher {
    http: Client,
    config: FetchConfig,
}

impl ProxyFetcher {
    /// Create a new fetcher with the given configuration.
    pub fn new(config: FetchConfig) -> Result<Self, Error> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::HttpError(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, config })
    }

    /// Fetch a page using the configured strategy.
    pub async fn fetch(&self, target: &::url::Url) -> Result<ProxyResponse, Error> {
        match self.config.strategy {
            FetchStrategy::Race => self.race(target, self.config.timeout, self.config.min_response_chars).await,
            FetchStrategy::Sequential => {
                self.sequential(target, self.config.timeout, self.config.min_response_chars)
                    .await
            }
        }
    }

    /// Fetch a secondary resource (e.g. a stylesheet) by racing all proxies
    /// with a caller-chosen timeout and length floor.
    pub async fn fetch_resource(
        &self, target: &::url::Url, timeout: Duration, min_chars: usize,
    ) -> Result<ProxyResponse, Error> {
        self.race(target, timeout, min_chars).await
    }

    /// Issue every proxy concurrently and keep the first qualifying response.
    pub async fn race(&self, target: &::url::Url, timeout: Duration, min_chars: usize) -> Result<ProxyResponse, Error> {
        let mut attempts = JoinSet::new();

        for proxy in self.config.proxies.iter().cloned() {
            let http = self.http.clone();
            let target = target.clone();
            attempts.spawn(async move {
                let started = Instant::now();
                let result = attempt(&http, &proxy, &target, timeout, min_chars).await;
                (proxy.name, result, started.elapsed())
            });
        }

        let mut failures = Vec::new();
        while let Some(joined) = attempts.join_next().await {
            match joined {
                Ok((proxy, Ok(body), elapsed)) => {
                    // Losers are aborted; their outcomes are never observed.
                    attempts.abort_all();
                    tracing::debug!(%target, proxy = %proxy, elapsed_ms = elapsed.as_millis() as u64, "proxy won race");
                    return Ok(ProxyResponse { body, proxy, elapsed_ms: elapsed.as_millis() as u64 });
                }
                Ok((proxy, Err(e), _)) => {
                    tracing::debug!(%target, proxy = %proxy, error = %e, "proxy attempt failed");
                    failures.push(format!("{proxy}: {e}"));
                }
                Err(e) => {
                    tracing::warn!(%target, error = %e, "proxy task failed to complete");
                    failures.push(format!("task: {e}"));
                }
            }
        }

        tracing::warn!(%target, attempts = failures.len(), "all proxies failed");
        Err(Error::AllProxiesExhausted(failures.join("; ")))
    }

    /// Try proxies one at a time in configured order.
    pub async fn sequential(
        &self, target: &::url::Url, timeout: Duration, min_chars: usize,
    ) -> Result<ProxyResponse, Error> {
        let mut last: Option<(String, ProxyError)> = None;

        for proxy in &self.config.proxies {
            let started = Instant::now();
            match attempt(&self.http, proxy, target, timeout, min_chars).await {
                Ok(body) => {
                    let elapsed_ms = started.elapsed().as_millis() as u64;
                    tracing::debug!(%target, proxy = %proxy.name, elapsed_ms, "proxy succeeded");
                    return Ok(ProxyResponse { body, proxy: proxy.name.clone(), elapsed_ms });
                }
                Err(e) => {
                    tracing::debug!(%target, proxy = %proxy.name, error = %e, "proxy attempt failed, trying next");
                    last = Some((proxy.name.clone(), e));
                }
            }
        }

        let detail = match last {
            Some((proxy, e)) => format!("{} proxies failed, last {proxy}: {e}", self.config.proxies.len()),
            None => "no proxies configured".to_string(),
        };
        tracing::warn!(%target, %detail, "all proxies failed");
        Err(Error::AllProxiesExhausted(detail))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use magpie_core::ResponseFormat;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{method, path, query_param},
    };

    fn page(marker: &str) -> String {
        format!("<html><body><article>{marker} {}</article></body></html>", "filler text ".repeat(20))
    }

    fn raw_proxy(server: &MockServer, name: &str) -> ProxyDescriptor {
        ProxyDescriptor::new(name, format!("{}/{name}?url={{url}}", server.uri()), ResponseFormat::RawText)
    }

    fn fetcher(proxies: Vec<ProxyDescriptor>, strategy: FetchStrategy, timeout: Duration) -> ProxyFetcher {
        ProxyFetcher::new(FetchConfig {
            user_agent: "magpie-test".into(),
            strategy,
            proxies,
            timeout,
            min_response_chars: 100,
        })
        .unwrap()
    }

    fn target() -> ::url::Url {
        canonicalize("https://example.org/a").unwrap()
    }

    #[test]
    fn test_fetch_config_default() {
        let config = FetchConfig::default();
        assert_eq!(config.strategy, FetchStrategy::Race);
        assert_eq!(config.timeout, Duration::from_millis(8_000));
        assert_eq!(config.min_response_chars, 100);
        assert_eq!(config.proxies.len(), 2);
    }

    #[tokio::test]
    async fn test_race_faster_success_wins() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/fast"))
            .and(query_param("url", "https://example.org/a"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(page("FAST"))
                    .set_delay(Duration::from_millis(100)),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/slow"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(page("SLOW"))
                    .set_delay(Duration::from_millis(1_500)),
            )
            .mount(&server)
            .await;

        let fetcher = fetcher(
            vec![raw_proxy(&server, "slow"), raw_proxy(&server, "fast")],
            FetchStrategy::Race,
            Duration::from_secs(5),
        );
        let response = fetcher.fetch(&target()).await.unwrap();

        assert_eq!(response.proxy, "fast");
        assert!(response.body.contains("FAST"));
        assert!(!response.body.contains("SLOW"));
    }

    #[tokio::test]
    async fn test_race_fast_failure_does_not_win() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/broken"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/working"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(page("OK"))
                    .set_delay(Duration::from_millis(200)),
            )
            .mount(&server)
            .await;

        let fetcher = fetcher(
            vec![raw_proxy(&server, "broken"), raw_proxy(&server, "working")],
            FetchStrategy::Race,
            Duration::from_secs(5),
        );
        let response = fetcher.fetch(&target()).await.unwrap();
        assert_eq!(response.proxy, "working");
    }

    #[tokio::test]
    async fn test_race_all_fail() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/short"))
            .respond_with(ResponseTemplate::new(200).set_body_string("tiny"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let fetcher = fetcher(
            vec![raw_proxy(&server, "short"), raw_proxy(&server, "missing")],
            FetchStrategy::Race,
            Duration::from_secs(5),
        );
        let err = fetcher.fetch(&target()).await.unwrap_err();
        match err {
            Error::AllProxiesExhausted(detail) => {
                assert!(detail.contains("too short"));
                assert!(detail.contains("status 404"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_race_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(page("LATE"))
                    .set_delay(Duration::from_millis(2_000)),
            )
            .mount(&server)
            .await;

        let fetcher = fetcher(
            vec![raw_proxy(&server, "a"), raw_proxy(&server, "b")],
            FetchStrategy::Race,
            Duration::from_millis(200),
        );
        let err = fetcher.fetch(&target()).await.unwrap_err();
        match err {
            Error::AllProxiesExhausted(detail) => assert!(detail.contains("timed out")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_json_wrapped_proxy() {
        let server = MockServer::start().await;
        let envelope = serde_json::json!({ "contents": page("WRAPPED") });
        Mock::given(method("GET"))
            .and(path("/get"))
            .and(query_param("url", "https://example.org/a"))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope))
            .mount(&server)
            .await;

        let proxy = ProxyDescriptor::new("wrapped", format!("{}/get?url={{url}}", server.uri()), ResponseFormat::JsonWrapped);
        let fetcher = fetcher(vec![proxy], FetchStrategy::Race, Duration::from_secs(5));
        let response = fetcher.fetch(&target()).await.unwrap();
        assert!(response.body.starts_with("<html>"));
        assert!(response.body.contains("WRAPPED"));
    }

    #[tokio::test]
    async fn test_sequential_falls_through_in_order() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/first"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/second"))
            .respond_with(ResponseTemplate::new(200).set_body_string(page("SECOND")))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/third"))
            .respond_with(ResponseTemplate::new(200).set_body_string(page("THIRD")))
            .expect(0)
            .mount(&server)
            .await;

        let fetcher = fetcher(
            vec![raw_proxy(&server, "first"), raw_proxy(&server, "second"), raw_proxy(&server, "third")],
            FetchStrategy::Sequential,
            Duration::from_secs(5),
        );
        let response = fetcher.fetch(&target()).await.unwrap();
        assert_eq!(response.proxy, "second");
        assert!(response.body.contains("SECOND"));
    }

    #[tokio::test]
    async fn test_sequential_reports_last_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/first"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/second"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let fetcher = fetcher(
            vec![raw_proxy(&server, "first"), raw_proxy(&server, "second")],
            FetchStrategy::Sequential,
            Duration::from_secs(5),
        );
        let err = fetcher.fetch(&target()).await.unwrap_err();
        match err {
            Error::AllProxiesExhausted(detail) => {
                assert!(detail.contains("last second: status 403"));
                assert!(!detail.contains("500"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_sequential_timeout_moves_to_next_proxy() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/stalled"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(page("STALLED"))
                    .set_delay(Duration::from_millis(2_000)),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/backup"))
            .respond_with(ResponseTemplate::new(200).set_body_string(page("BACKUP")))
            .expect(1)
            .mount(&server)
            .await;

        let fetcher = fetcher(
            vec![raw_proxy(&server, "stalled"), raw_proxy(&server, "backup")],
            FetchStrategy::Sequential,
            Duration::from_millis(200),
        );
        let started = Instant::now();
        let response = fetcher.fetch(&target()).await.unwrap();

        assert_eq!(response.proxy, "backup");
        assert!(response.body.contains("BACKUP"));
        assert!(started.elapsed() < Duration::from_millis(1_500));
    }

    #[tokio::test]
    async fn test_fetch_resource_uses_own_floor() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/css"))
            .respond_with(ResponseTemplate::new(200).set_body_string("p{color:red}"))
            .mount(&server)
            .await;

        let fetcher = fetcher(vec![raw_proxy(&server, "css")], FetchStrategy::Sequential, Duration::from_secs(5));
        let sheet = canonicalize("https://example.org/site.css").unwrap();
        let response = fetcher.fetch_resource(&sheet, Duration::from_secs(1), 0).await.unwrap();
        assert_eq!(response.body, "p{color:red}");
    }
}
