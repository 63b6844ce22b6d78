//! Boilerplate removal, content-region selection and paragraph text.

use std::sync::LazyLock;

use ego_tree::iter::Edge;
use scraper::node::Element;
use scraper::{ElementRef, Html, Selector};

/// Elements that never contribute text.
const EXCLUDED_TAGS: &[&str] = &[
    "script", "style", "iframe", "noscript", "nav", "header", "footer", "aside", "form", "template", "svg", "button",
];

/// Class markers for navigation chrome.
const EXCLUDED_CLASSES: &[&str] = &["nav", "header", "footer", "menu", "sidebar"];

/// Main-content candidates, highest priority first.
const CONTENT_SELECTORS: &[&str] =
    &["article", "main", "[role=\"main\"]", ".article-body", ".story-body", ".content"];

/// Elements whose boundaries end a paragraph.
const BLOCK_TAGS: &[&str] = &[
    "p", "div", "section", "article", "main", "blockquote", "pre", "li", "ul", "ol", "dl", "dt", "dd", "h1", "h2",
    "h3", "h4", "h5", "h6", "table", "tr", "td", "th", "figure", "figcaption", "br", "hr",
];

static CONTENT: LazyLock<Vec<(&'static str, Selector)>> = LazyLock::new(|| {
    CONTENT_SELECTORS
        .iter()
        .map(|src| (*src, Selector::parse(src).expect("invalid content selector")))
        .collect()
});

static BODY: LazyLock<Selector> = LazyLock::new(|| Selector::parse("body").expect("invalid selector"));
static TITLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("title").expect("invalid selector"));
static H1: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h1").expect("invalid selector"));

/// True for elements treated as navigation chrome or non-content.
pub fn is_excluded(element: &Element) -> bool {
    EXCLUDED_TAGS.contains(&element.name())
        || element.attr("role") == Some("navigation")
        || element.classes().any(|class| EXCLUDED_CLASSES.contains(&class))
}

/// True if the element or any ancestor is excluded.
pub fn is_removed(element: ElementRef<'_>) -> bool {
    is_excluded(element.value()) || element.ancestors().filter_map(ElementRef::wrap).any(|a| is_excluded(a.value()))
}

/// Candidates tried per content selector before moving to the next one.
const MAX_CANDIDATES_PER_SELECTOR: usize = 16;

/// The content region chosen for a document.
pub struct Region<'a> {
    pub element: ElementRef<'a>,
    /// Matching selector, or `None` when falling back to the body.
    pub selector: Option<&'static str>,
    /// Text blocks of the region; empty only when the whole body has none.
    pub blocks: Vec<String>,
}

/// Pick the main-content region.
///
/// Candidates inside excluded chrome are skipped, mirroring removal-before-query.
/// A candidate without any text is passed over for the next one, ending with
/// the body.
pub fn select_region(document: &Html) -> Region<'_> {
    let body = document.select(&BODY).next().unwrap_or_else(|| document.root_element());

    let candidates = CONTENT
        .iter()
        .flat_map(|(src, selector)| {
            document
                .select(selector)
                .filter(|el| !is_removed(*el))
                .take(MAX_CANDIDATES_PER_SELECTOR)
                .map(move |el| (el, Some(*src)))
        })
        .chain(std::iter::once((body, None)));

    for (element, selector) in candidates {
        let blocks = text_blocks(element);
        if !blocks.is_empty() {
            return Region { element, selector, blocks };
        }
        tracing::debug!(selector = selector.unwrap_or("body"), "content region has no text");
    }

    Region { element: body, selector: None, blocks: Vec::new() }
}

/// Document title from `<title>`, else the first `<h1>`.
pub fn title(document: &Html) -> Option<String> {
    document
        .select(&TITLE)
        .chain(document.select(&H1))
        .map(|el| collapse_whitespace(&el.text().collect::<String>()))
        .find(|t| !t.is_empty())
}

/// Text blocks of a region, one per block-level element, whitespace collapsed.
///
/// Walks the tree iteratively, so nesting depth is bounded only by memory.
pub fn text_blocks(region: ElementRef<'_>) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut current = String::new();
    // Open excluded elements enclosing the current edge.
    let mut excluded = 0usize;

    for edge in region.traverse() {
        match edge {
            Edge::Open(node) => {
                if let Some(element) = node.value().as_element() {
                    if excluded > 0 || is_excluded(element) {
                        excluded += 1;
                    } else if BLOCK_TAGS.contains(&element.name()) {
                        flush(&mut current, &mut blocks);
                    }
                } else if excluded == 0
                    && let Some(text) = node.value().as_text()
                {
                    current.push_str(text);
                }
            }
            Edge::Close(node) => {
                if let Some(element) = node.value().as_element() {
                    if excluded > 0 {
                        excluded -= 1;
                    } else if BLOCK_TAGS.contains(&element.name()) {
                        flush(&mut current, &mut blocks);
                    }
                }
            }
        }
    }

    flush(&mut current, &mut blocks);
    blocks
}

fn flush(current: &mut String, blocks: &mut Vec<String>) {
    let collapsed = collapse_whitespace(current);
    if !collapsed.is_empty() {
        blocks.push(collapsed);
    }
    current.clear();
}

/// Collapse runs of whitespace into single spaces.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_prefers_article() {
        let html = Html::parse_document(
            "<html><body><main><p>main text</p></main><article><p>article text</p></article></body></html>",
        );
        let region = select_region(&html);
        assert_eq!(region.selector, Some("article"));
        assert_eq!(text_blocks(region.element), vec!["article text"]);
    }

    #[test]
    fn test_region_skips_candidates_inside_chrome() {
        let html = Html::parse_document(
            "<html><body><nav><article>menu teaser</article></nav><div class=\"content\"><p>real</p></div></body></html>",
        );
        let region = select_region(&html);
        assert_eq!(region.selector, Some(".content"));
    }

    #[test]
    fn test_region_falls_back_to_body() {
        let html = Html::parse_document("<html><body><div><p>just a body</p></div></body></html>");
        let region = select_region(&html);
        assert!(region.selector.is_none());
        assert_eq!(text_blocks(region.element), vec!["just a body"]);
    }

    #[test]
    fn test_region_skips_candidates_without_text() {
        let html = Html::parse_document(
            "<html><body><article><script>x()</script></article><main><p>main text</p></main></body></html>",
        );
        let region = select_region(&html);
        assert_eq!(region.selector, Some("main"));
        assert_eq!(region.blocks, vec!["main text"]);

        let html = Html::parse_document("<html><body><article> </article><p>loose text</p></body></html>");
        let region = select_region(&html);
        assert!(region.selector.is_none());
        assert_eq!(region.blocks, vec!["loose text"]);
    }

    #[test]
    fn test_blocks_survive_deep_nesting() {
        let depth = 20_000;
        let html = Html::parse_document(&format!(
            "<html><body><article>{}leaf{}<aside>{}hidden{}</aside></article></body></html>",
            "<div>".repeat(depth),
            "</div>".repeat(depth),
            "<span>".repeat(depth),
            "</span>".repeat(depth)
        ));
        let region = select_region(&html);
        assert_eq!(region.selector, Some("article"));
        assert_eq!(region.blocks, vec!["leaf"]);
    }

    #[test]
    fn test_blocks_drop_excluded_elements() {
        let html = Html::parse_document(
            r#"<html><body><article>
                <p>Kept <b>bold</b> words.</p>
                <script>var x = "never";</script>
                <aside>side note</aside>
                <div class="menu sticky">menu</div>
                <ul role="navigation"><li>Home</li></ul>
                <p>Second<br>line</p>
            </article></body></html>"#,
        );
        let region = select_region(&html);
        let blocks = text_blocks(region.element);
        assert_eq!(blocks, vec!["Kept bold words.", "Second", "line"]);
    }

    #[test]
    fn test_title_sources() {
        let html = Html::parse_document("<html><head><title> A  Title </title></head><body></body></html>");
        assert_eq!(title(&html).as_deref(), Some("A Title"));

        let html = Html::parse_document("<html><body><h1>Heading</h1></body></html>");
        assert_eq!(title(&html).as_deref(), Some("Heading"));
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  a \n\t b  c  "), "a b c");
    }
}
