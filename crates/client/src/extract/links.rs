//! Link harvesting from the content region.

use std::collections::HashSet;
use std::sync::LazyLock;

use scraper::{ElementRef, Selector};
use url::Url;

use super::text::{collapse_whitespace, is_removed};

static ANCHOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a[href]").expect("invalid selector"));

/// A harvested link with text and href.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Link {
    /// Link text content, `None` when the anchor has no text
    pub text: Option<String>,
    /// Resolved absolute URL
    pub href: String,
}

/// Extract links under `region`, resolving relative URLs against `base_url`.
///
/// Only http(s) targets are kept. Fragments are stripped, links back to the
/// page itself and anchors inside navigation chrome are skipped, and
/// duplicates are removed keeping the first occurrence.
pub fn extract_links(region: ElementRef<'_>, base_url: &Url) -> Vec<Link> {
    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for anchor in region.select(&ANCHOR) {
        if is_removed(anchor) {
            continue;
        }

        let Some(href) = anchor.value().attr("href") else { continue };
        let Ok(mut resolved) = base_url.join(href.trim()) else { continue };
        if !matches!(resolved.scheme(), "http" | "https") {
            continue;
        }
        resolved.set_fragment(None);

        let mut base = base_url.clone();
        base.set_fragment(None);
        if resolved == base {
            continue;
        }

        let href = resolved.to_string();
        if !seen.insert(href.clone()) {
            continue;
        }

        let text = collapse_whitespace(&anchor.text().collect::<String>());
        links.push(Link { text: (!text.is_empty()).then_some(text), href });
    }

    links
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    fn links_of(html: &str, base: &str) -> Vec<Link> {
        let document = Html::parse_document(html);
        extract_links(document.root_element(), &Url::parse(base).unwrap())
    }

    #[test]
    fn test_extract_links_relative() {
        let links = links_of(
            r#"<html><body><a href="/about">About</a><a href="contact">Contact</a></body></html>"#,
            "https://example.com/path/",
        );

        assert_eq!(links.len(), 2);
        assert_eq!(links[0].text.as_deref(), Some("About"));
        assert_eq!(links[0].href, "https://example.com/about");
        assert_eq!(links[1].href, "https://example.com/path/contact");
    }

    #[test]
    fn test_extract_links_dedup_and_fragments() {
        let links = links_of(
            r##"<html><body>
                <a href="https://example.com/x#one">First</a>
                <a href="https://example.com/x#two">Second</a>
                <a href="#top">Top</a>
            </body></html>"##,
            "https://example.com/",
        );

        assert_eq!(links.len(), 1);
        assert_eq!(links[0].text.as_deref(), Some("First"));
        assert_eq!(links[0].href, "https://example.com/x");
    }

    #[test]
    fn test_extract_links_skips_chrome_and_other_schemes() {
        let links = links_of(
            r#"<html><body>
                <nav><a href="/home">Home</a></nav>
                <a href="mailto:someone@example.com">Mail</a>
                <a href="javascript:void(0)">Click</a>
                <a href="/story"><img src="x.png"></a>
            </body></html>"#,
            "https://example.com/",
        );

        assert_eq!(links.len(), 1);
        assert_eq!(links[0].href, "https://example.com/story");
        assert!(links[0].text.is_none());
    }
}
