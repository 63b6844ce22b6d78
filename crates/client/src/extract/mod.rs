//! Readable text extraction.
//!
//! ### Algorithm
//! - Non-content elements (scripts, frames, navigation chrome) never contribute text.
//! - The main region is the first match of a prioritized selector list that
//!   does not sit inside excluded chrome and has text; otherwise the whole body.
//! - Block-level boundaries split paragraphs. Short paragraphs are dropped as
//!   residual boilerplate and the count is capped.
//!
//! Markup is parsed with `scraper` and never executed.
//!
//! ### Stable Abstraction
//! - Uses the `Extractor` trait so the orchestrator does not depend on the engine.

pub mod links;
pub mod styles;
pub mod text;

pub use links::{Link, extract_links};
pub use styles::{StyleSources, absolutize_css_urls, collect_style_sources, extract_styles};

use magpie_core::{AppConfig, Error};
use scraper::Html;
use url::Url;

/// Configuration for content extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractConfig {
    /// Paragraphs with fewer characters are dropped (default: 50)
    pub min_paragraph_chars: usize,

    /// Maximum number of paragraphs kept (default: 20)
    pub max_paragraphs: usize,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self { min_paragraph_chars: 50, max_paragraphs: 20 }
    }
}

impl From<&AppConfig> for ExtractConfig {
    fn from(config: &AppConfig) -> Self {
        Self { min_paragraph_chars: config.min_paragraph_chars, max_paragraphs: config.max_paragraphs }
    }
}

/// Result of content extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionResult {
    /// Page title
    pub title: Option<String>,
    /// Paragraphs joined by blank lines
    pub text: String,
    /// Length-filtered, bounded paragraphs
    pub paragraphs: Vec<String>,
    /// Links found in the content region
    pub links: Vec<Link>,
    /// Selector that located the region; `None` means whole-body fallback
    pub region: Option<&'static str>,
}

/// Stable extractor trait for content extraction.
pub trait Extractor: Send + Sync {
    /// Extract readable content from HTML.
    fn extract(&self, html: &str, base_url: &Url, config: &ExtractConfig) -> Result<ExtractionResult, Error>;
}

/// Selector-priority extractor built on `scraper`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SelectorExtractor;

impl Extractor for SelectorExtractor {
    fn extract(&self, html: &str, base_url: &Url, config: &ExtractConfig) -> Result<ExtractionResult, Error> {
        if html.trim().is_empty() {
            return Err(Error::ExtractFailed("empty document".into()));
        }

        let document = Html::parse_document(html);
        let title = text::title(&document);
        let region = text::select_region(&document);
        if region.selector.is_none() {
            tracing::debug!(%base_url, "no content region matched, using whole body");
        }

        let paragraphs = select_paragraphs(&region.blocks, config)?;
        let links = extract_links(region.element, base_url);

        Ok(ExtractionResult { title, text: paragraphs.join("\n\n"), paragraphs, links, region: region.selector })
    }
}

/// Apply the length filter and cap to text blocks.
///
/// When nothing survives the filter the whole text becomes one paragraph, so
/// short pages still yield something to work with.
fn select_paragraphs(blocks: &[String], config: &ExtractConfig) -> Result<Vec<String>, Error> {
    let paragraphs: Vec<String> = blocks
        .iter()
        .filter(|block| block.chars().count() >= config.min_paragraph_chars)
        .take(config.max_paragraphs)
        .cloned()
        .collect();

    if !paragraphs.is_empty() {
        return Ok(paragraphs);
    }

    if blocks.is_empty() {
        return Err(Error::ExtractFailed("no readable text".into()));
    }

    Ok(vec![blocks.join(" ")])
}

/// Extract readable content from HTML using the default extractor and limits.
pub fn extract_readable(html: &str, base_url: &Url) -> Result<ExtractionResult, Error> {
    SelectorExtractor.extract(html, base_url, &ExtractConfig::default())
}
