//! The working text and its redactions.
//!
//! One [`Session`] exists per server process. Opening an article races with
//! any other open in flight; only the newest request may install its result.

use magpie_core::{AppConfig, CacheDb, Error};
use serde::Serialize;
use tokio::sync::RwLock;

use crate::article::{Article, ArticleFetcher};
use crate::fetch::canonicalize;
use crate::redact::{RedactionSet, TokenizedParagraph, WordId, contains_word, render_blackout, render_poem, tokenize};
use crate::sources::{FALLBACK_TEXTS, SpinPick, pick_fallback, pick_spin_target};

/// Text currently loaded for redaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LoadedText {
    Article(Article),
    /// A bundled passage shown because the requested article was unavailable.
    Fallback { title: String, paragraphs: Vec<String>, requested_url: String, cause: String },
}

impl LoadedText {
    fn paragraphs(&self) -> &[String] {
        match self {
            LoadedText::Article(article) => &article.paragraphs,
            LoadedText::Fallback { paragraphs, .. } => paragraphs,
        }
    }
}

/// Point-in-time view of the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    pub text: Option<LoadedText>,
    pub paragraphs: Vec<TokenizedParagraph>,
    pub redacted: Vec<WordId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "snapshot", rename_all = "snake_case")]
pub enum OpenOutcome {
    Loaded(Snapshot),
    Fallback(Snapshot),
    /// A newer request started before this one finished; nothing changed.
    Superseded,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpinOutcome {
    pub pick: SpinPick,
    pub outcome: OpenOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rendering {
    pub blackout: String,
    pub poem: String,
    pub redacted: usize,
}

#[derive(Debug, Default)]
struct SessionState {
    text: Option<LoadedText>,
    paragraphs: Vec<TokenizedParagraph>,
    redactions: RedactionSet,
    last_fallback: Option<usize>,
}

impl SessionState {
    fn install(&mut self, text: LoadedText) {
        self.paragraphs = tokenize(text.paragraphs());
        self.redactions.clear();
        self.text = Some(text);
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            text: self.text.clone(),
            paragraphs: self.paragraphs.clone(),
            redacted: self.redactions.ids().collect(),
        }
    }
}

pub struct Session {
    articles: ArticleFetcher,
    explore_discovered: bool,
    state: RwLock<SessionState>,
}

impl Session {
    pub fn new(articles: ArticleFetcher, explore_discovered: bool) -> Self {
        Self { articles, explore_discovered, state: RwLock::new(SessionState::default()) }
    }

    pub fn from_config(config: &AppConfig, db: CacheDb) -> Result<Self, Error> {
        Ok(Self::new(ArticleFetcher::from_config(config, db)?, config.explore_discovered))
    }

    pub fn articles(&self) -> &ArticleFetcher {
        &self.articles
    }

    /// Fetch `url` and make it the working text.
    ///
    /// An unavailable article is replaced by a fallback passage. Invalid URLs
    /// are rejected before taking a request token, so they neither touch the
    /// session nor supersede an open already in flight.
    pub async fn open(&self, url: &str) -> Result<OpenOutcome, Error> {
        let target = canonicalize(url).map_err(|e| Error::InvalidUrl(e.to_string()))?;

        let token = self.articles.begin_request();
        let result = self.articles.fetch_article(target.as_str()).await;

        let mut state = self.state.write().await;
        if !self.articles.is_current(token) {
            tracing::debug!(url, "discarding superseded article result");
            return Ok(OpenOutcome::Superseded);
        }

        match result {
            Ok(article) => {
                let visited = article.url.clone();
                let title = article.title.clone();
                let links: Vec<_> = article.links.iter().map(|l| (l.href.clone(), l.text.clone())).collect();

                state.install(LoadedText::Article(article));
                let snapshot = state.snapshot();
                drop(state);

                let cache = self.articles.cache();
                cache.record_visited(&visited, title.as_deref()).await;
                cache.record_discovered(&links).await;

                Ok(OpenOutcome::Loaded(snapshot))
            }
            Err(Error::ArticleUnavailable(cause)) => {
                let index = pick_fallback(&mut rand::thread_rng(), state.last_fallback);
                let fallback = FALLBACK_TEXTS[index];
                tracing::warn!(url, error = %cause, fallback = fallback.title, "article unavailable, using fallback text");

                state.last_fallback = Some(index);
                state.install(LoadedText::Fallback {
                    title: fallback.title.to_string(),
                    paragraphs: fallback.content.split("\n\n").map(str::to_string).collect(),
                    requested_url: url.to_string(),
                    cause: cause.to_string(),
                });
                Ok(OpenOutcome::Fallback(state.snapshot()))
            }
            Err(e) => Err(e),
        }
    }

    /// Open a randomly chosen article.
    pub async fn spin(&self) -> Result<SpinOutcome, Error> {
        let unvisited =
            if self.explore_discovered { self.articles.cache().unvisited_discovered().await } else { Vec::new() };

        let pick = pick_spin_target(&mut rand::thread_rng(), self.explore_discovered, &unvisited)
            .ok_or_else(|| Error::InvalidInput("no sources available".into()))?;
        tracing::info!(source = %pick.source, url = %pick.url, "spinning");

        let outcome = self.open(&pick.url).await?;
        Ok(SpinOutcome { pick, outcome })
    }

    /// Flip the redaction of one word. Returns true when it is now redacted.
    pub async fn toggle(&self, id: WordId) -> Result<bool, Error> {
        let mut state = self.state.write().await;
        if !contains_word(&state.paragraphs, id) {
            return Err(Error::InvalidInput(format!(
                "no word at paragraph {} index {}",
                id.paragraph, id.index
            )));
        }
        Ok(state.redactions.toggle(id))
    }

    /// Remove every redaction, returning how many there were.
    pub async fn clear_redactions(&self) -> usize {
        let mut state = self.state.write().await;
        let cleared = state.redactions.len();
        state.redactions.clear();
        cleared
    }

    pub async fn snapshot(&self) -> Snapshot {
        self.state.read().await.snapshot()
    }

    pub async fn render(&self) -> Rendering {
        let state = self.state.read().await;
        Rendering {
            blackout: render_blackout(&state.paragraphs, &state.redactions),
            poem: render_poem(&state.paragraphs, &state.redactions),
            redacted: state.redactions.len(),
        }
    }
}
