//! Client code for magpie.
//!
//! This crate provides the proxy fetch pipeline, content extraction, the
//! article orchestrator and the redaction session driven by the server.

pub mod article;
pub mod extract;
pub mod fetch;
pub mod redact;
pub mod session;
pub mod sources;

pub use article::{Article, ArticleConfig, ArticleFetcher, ArticleSource, RequestToken};
pub use extract::{ExtractConfig, ExtractionResult, Extractor, Link, SelectorExtractor, extract_links, extract_readable};
pub use fetch::{FetchConfig, ProxyError, ProxyFetcher, ProxyResponse};
pub use redact::{RedactionSet, Token, TokenizedParagraph, WordId, render_blackout, render_poem, tokenize};
pub use session::{LoadedText, OpenOutcome, Rendering, Session, Snapshot, SpinOutcome};
pub use sources::{CuratedSource, FallbackText, SpinPick};
