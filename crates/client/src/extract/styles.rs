//! Page style collection.
//!
//! Inline `<style>` text plus a bounded number of external stylesheets,
//! fetched through the proxies. Relative `url(...)` references are made
//! absolute so the styles still resolve away from the original page.
//! Any stylesheet that fails is simply left out.

use std::sync::LazyLock;
use std::time::Duration;

use futures_util::future::join_all;
use regex::{Captures, Regex};
use scraper::{Html, Selector};
use url::Url;

use crate::fetch::ProxyFetcher;

static STYLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("style").expect("invalid selector"));
static STYLESHEET: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("link[rel~=\"stylesheet\"][href]").expect("invalid selector"));
static CSS_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"url\(\s*['"]?([^'")\s]+)['"]?\s*\)"#).expect("invalid regex"));

/// Style material found in a document, before any network access.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleSources {
    pub inline: String,
    pub stylesheets: Vec<Url>,
}

/// Collect inline styles and up to `max_stylesheets` external sheet URLs.
pub fn collect_style_sources(html: &str, base_url: &Url, max_stylesheets: usize) -> StyleSources {
    let document = Html::parse_document(html);

    let inline = document
        .select(&STYLE)
        .map(|el| absolutize_css_urls(&el.text().collect::<String>(), base_url))
        .collect::<Vec<_>>()
        .join("\n");

    let stylesheets = document
        .select(&STYLESHEET)
        .filter_map(|el| el.value().attr("href"))
        .filter_map(|href| base_url.join(href.trim()).ok())
        .filter(|url| matches!(url.scheme(), "http" | "https"))
        .take(max_stylesheets)
        .collect();

    StyleSources { inline, stylesheets }
}

/// Rewrite relative `url(...)` references in `css` against `base`.
///
/// Data URIs, absolute URLs and fragment-only references are left alone.
pub fn absolutize_css_urls(css: &str, base: &Url) -> String {
    CSS_URL
        .replace_all(css, |caps: &Captures<'_>| {
            let reference = &caps[1];
            if reference.starts_with("data:") || reference.starts_with('#') || Url::parse(reference).is_ok() {
                return caps[0].to_string();
            }
            match base.join(reference) {
                Ok(absolute) => format!("url('{absolute}')"),
                Err(_) => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// Collect page styles, fetching external sheets concurrently.
pub async fn extract_styles(
    fetcher: &ProxyFetcher, html: &str, base_url: &Url, max_stylesheets: usize, timeout: Duration,
) -> String {
    let sources = collect_style_sources(html, base_url, max_stylesheets);

    let fetched = join_all(sources.stylesheets.iter().map(|sheet| async move {
        match fetcher.fetch_resource(sheet, timeout, 0).await {
            Ok(response) => {
                tracing::debug!(%sheet, chars = response.body.len(), "loaded stylesheet");
                Some(absolutize_css_urls(&response.body, sheet))
            }
            Err(e) => {
                tracing::debug!(%sheet, error = %e, "skipping stylesheet");
                None
            }
        }
    }))
    .await;

    std::iter::once(sources.inline)
        .chain(fetched.into_iter().flatten())
        .filter(|css| !css.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
