//! Article retrieval: cache first, proxies on a miss, extraction either way.
//!
//! [`ArticleFetcher`] is the only place that decides between the cache and
//! the network. Cached raw HTML is re-extracted on every hit so repeated
//! requests inside the retention window yield identical text.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use magpie_core::cache::CachePolicy;
use magpie_core::{AppConfig, CacheDb, CacheStore, Error};
use serde::Serialize;
use url::Url;

use crate::extract::{ExtractConfig, ExtractionResult, Extractor, Link, SelectorExtractor, extract_styles};
use crate::fetch::{FetchConfig, ProxyFetcher, canonicalize};

/// Settings for the orchestration step that are not owned by fetch or cache.
#[derive(Debug, Clone, Copy)]
pub struct ArticleConfig {
    pub extract: ExtractConfig,
    pub extract_styles: bool,
    pub max_stylesheets: usize,
    pub stylesheet_timeout: Duration,
}

impl From<&AppConfig> for ArticleConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            extract: ExtractConfig::from(config),
            extract_styles: config.extract_styles,
            max_stylesheets: config.max_stylesheets,
            stylesheet_timeout: config.stylesheet_timeout(),
        }
    }
}

impl Default for ArticleConfig {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

/// Where an article's raw content came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArticleSource {
    Cache,
    /// Fetched live through the named proxy.
    Proxy(String),
}

/// A readable article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Article {
    pub url: String,
    pub title: Option<String>,
    pub text: String,
    pub paragraphs: Vec<String>,
    pub links: Vec<Link>,
    /// Collected CSS, empty unless style extraction is enabled
    #[serde(skip_serializing_if = "String::is_empty")]
    pub styles: String,
    pub source: ArticleSource,
}

impl Article {
    fn new(url: &Url, extracted: ExtractionResult, styles: String, source: ArticleSource) -> Self {
        Self {
            url: url.to_string(),
            title: extracted.title,
            text: extracted.text,
            paragraphs: extracted.paragraphs,
            links: extracted.links,
            styles,
            source,
        }
    }
}

/// Ticket for one article request; only the newest one is current.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestToken(u64);

pub struct ArticleFetcher {
    cache: CacheStore,
    fetcher: ProxyFetcher,
    extractor: Arc<dyn Extractor>,
    config: ArticleConfig,
    generation: AtomicU64,
}

impl ArticleFetcher {
    pub fn new(cache: CacheStore, fetcher: ProxyFetcher, config: ArticleConfig) -> Self {
        Self { cache, fetcher, extractor: Arc::new(SelectorExtractor), config, generation: AtomicU64::new(0) }
    }

    /// Build the full pipeline from application config over an open database.
    pub fn from_config(config: &AppConfig, db: CacheDb) -> Result<Self, Error> {
        let cache = CacheStore::new(db, CachePolicy::from(config));
        let fetcher = ProxyFetcher::new(FetchConfig::from(config))?;
        Ok(Self::new(cache, fetcher, ArticleConfig::from(config)))
    }

    pub fn with_extractor(mut self, extractor: Arc<dyn Extractor>) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    /// Start a new request, superseding every earlier token.
    pub fn begin_request(&self) -> RequestToken {
        RequestToken(self.generation.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, token: RequestToken) -> bool {
        self.generation.load(Ordering::SeqCst) == token.0
    }

    /// Fetch and extract the article at `url`.
    ///
    /// Any fetch or extraction failure is reported as `ArticleUnavailable`.
    /// Only content that extracts cleanly is written to the cache.
    pub async fn fetch_article(&self, url: &str) -> Result<Article, Error> {
        let target = canonicalize(url).map_err(|e| Error::InvalidUrl(e.to_string()))?;
        let key = target.as_str();

        if let Some(entry) = self.cache.get(key).await {
            match self.extract(&entry.raw_content, &target) {
                Ok(extracted) => return Ok(Article::new(&target, extracted, entry.styles, ArticleSource::Cache)),
                Err(e) => {
                    tracing::warn!(url = key, error = %e, "cached article no longer extracts, refetching");
                    self.cache.invalidate(key).await;
                }
            }
        }

        let response = self.fetcher.fetch(&target).await.map_err(Error::unavailable)?;
        let extracted = self.extract(&response.body, &target).map_err(Error::unavailable)?;

        let styles = if self.config.extract_styles {
            extract_styles(
                &self.fetcher,
                &response.body,
                &target,
                self.config.max_stylesheets,
                self.config.stylesheet_timeout,
            )
            .await
        } else {
            String::new()
        };

        self.cache.put(key, &response.body, &styles).await;
        tracing::info!(url = key, proxy = %response.proxy, elapsed_ms = response.elapsed_ms, "fetched article");

        Ok(Article::new(&target, extracted, styles, ArticleSource::Proxy(response.proxy)))
    }

    fn extract(&self, html: &str, base_url: &Url) -> Result<ExtractionResult, Error> {
        self.extractor.extract(html, base_url, &self.config.extract)
    }
}
