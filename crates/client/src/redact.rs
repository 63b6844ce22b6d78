//! Word tokens and blackout state.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static TOKEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\w']+|[.,!?;:]").expect("invalid regex"));

const BLOCK: char = '█';

/// Position of a word: paragraph number and word index within it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WordId {
    pub paragraph: usize,
    pub index: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Token {
    Word { id: WordId, text: String },
    Punct { text: String },
}

impl Token {
    pub fn text(&self) -> &str {
        match self {
            Token::Word { text, .. } | Token::Punct { text } => text,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TokenizedParagraph {
    pub tokens: Vec<Token>,
}

impl TokenizedParagraph {
    pub fn word_count(&self) -> usize {
        self.tokens.iter().filter(|t| matches!(t, Token::Word { .. })).count()
    }
}

/// Split paragraphs into word and punctuation tokens. Anything else is dropped.
pub fn tokenize<S: AsRef<str>>(paragraphs: &[S]) -> Vec<TokenizedParagraph> {
    paragraphs
        .iter()
        .enumerate()
        .map(|(paragraph, text)| {
            let mut index = 0;
            let tokens = TOKEN
                .find_iter(text.as_ref())
                .map(|m| {
                    let text = m.as_str().to_string();
                    if text.chars().all(|c| ".,!?;:".contains(c)) {
                        Token::Punct { text }
                    } else {
                        let id = WordId { paragraph, index };
                        index += 1;
                        Token::Word { id, text }
                    }
                })
                .collect();
            TokenizedParagraph { tokens }
        })
        .collect()
}

/// True if `id` names a word in `paragraphs`.
pub fn contains_word(paragraphs: &[TokenizedParagraph], id: WordId) -> bool {
    paragraphs.get(id.paragraph).is_some_and(|p| id.index < p.word_count())
}

/// Set of blacked-out words.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RedactionSet {
    ids: BTreeSet<WordId>,
}

impl RedactionSet {
    /// Flip `id`; returns true when the word is now redacted.
    pub fn toggle(&mut self, id: WordId) -> bool {
        if self.ids.remove(&id) {
            false
        } else {
            self.ids.insert(id);
            true
        }
    }

    pub fn is_redacted(&self, id: WordId) -> bool {
        self.ids.contains(&id)
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = WordId> + '_ {
        self.ids.iter().copied()
    }
}

/// Render every paragraph with redacted words replaced by blocks of equal length.
pub fn render_blackout(paragraphs: &[TokenizedParagraph], redactions: &RedactionSet) -> String {
    paragraphs
        .iter()
        .map(|p| {
            join_tokens(p.tokens.iter().map(|token| match token {
                Token::Word { id, text } if redactions.is_redacted(*id) => {
                    (false, BLOCK.to_string().repeat(text.chars().count()))
                }
                Token::Word { text, .. } => (false, text.clone()),
                Token::Punct { text } => (true, text.clone()),
            }))
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Render only the words left unredacted; the poem.
///
/// Punctuation survives when the word it follows does. Paragraphs that end
/// up empty are omitted.
pub fn render_poem(paragraphs: &[TokenizedParagraph], redactions: &RedactionSet) -> String {
    paragraphs
        .iter()
        .map(|p| {
            let mut keep_punct = false;
            let kept = p.tokens.iter().filter_map(|token| match token {
                Token::Word { id, text } => {
                    keep_punct = !redactions.is_redacted(*id);
                    keep_punct.then(|| (false, text.clone()))
                }
                Token::Punct { text } => keep_punct.then(|| (true, text.clone())),
            });
            join_tokens(kept)
        })
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Join `(is_punct, text)` pieces, attaching punctuation to what precedes it.
fn join_tokens(pieces: impl Iterator<Item = (bool, String)>) -> String {
    let mut out = String::new();
    for (is_punct, text) in pieces {
        if !out.is_empty() && !is_punct {
            out.push(' ');
        }
        out.push_str(&text);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(paragraph: usize, index: usize) -> WordId {
        WordId { paragraph, index }
    }

    #[test]
    fn test_tokenize_words_and_punctuation() {
        let paragraphs = tokenize(&["Don't stop, the night's young!", "— End."]);

        let texts: Vec<_> = paragraphs[0].tokens.iter().map(Token::text).collect();
        assert_eq!(texts, vec!["Don't", "stop", ",", "the", "night's", "young", "!"]);
        assert_eq!(paragraphs[0].word_count(), 5);
        assert_eq!(paragraphs[0].tokens[4], Token::Word { id: id(0, 3), text: "night's".into() });

        let texts: Vec<_> = paragraphs[1].tokens.iter().map(Token::text).collect();
        assert_eq!(texts, vec!["End", "."]);
        assert_eq!(paragraphs[1].tokens[0], Token::Word { id: id(1, 0), text: "End".into() });
    }

    #[test]
    fn test_tokenize_unicode_words() {
        let paragraphs = tokenize(&["Café naïve über"]);
        assert_eq!(paragraphs[0].word_count(), 3);
        assert_eq!(paragraphs[0].tokens[0].text(), "Café");
    }

    #[test]
    fn test_contains_word() {
        let paragraphs = tokenize(&["one two.", "three"]);
        assert!(contains_word(&paragraphs, id(0, 1)));
        assert!(!contains_word(&paragraphs, id(0, 2)));
        assert!(contains_word(&paragraphs, id(1, 0)));
        assert!(!contains_word(&paragraphs, id(2, 0)));
    }

    #[test]
    fn test_toggle_flips() {
        let mut set = RedactionSet::default();
        assert!(set.toggle(id(0, 1)));
        assert!(set.is_redacted(id(0, 1)));
        assert_eq!(set.len(), 1);

        assert!(!set.toggle(id(0, 1)));
        assert!(!set.is_redacted(id(0, 1)));
        assert!(set.is_empty());

        set.toggle(id(0, 0));
        set.toggle(id(1, 0));
        set.clear();
        assert_eq!(set.len(), 0);
    }

    #[test]
    fn test_render_blackout() {
        let paragraphs = tokenize(&["The cat sat, quietly.", "Hi"]);
        let mut set = RedactionSet::default();
        set.toggle(id(0, 1));
        set.toggle(id(1, 0));

        assert_eq!(render_blackout(&paragraphs, &set), "The ███ sat, quietly.\n\n██");
    }

    #[test]
    fn test_render_poem() {
        let paragraphs = tokenize(&["The cat sat, quietly.", "all gone", "kept"]);
        let mut set = RedactionSet::default();
        set.toggle(id(0, 0));
        set.toggle(id(0, 2));
        set.toggle(id(1, 0));
        set.toggle(id(1, 1));

        assert_eq!(render_poem(&paragraphs, &set), "cat quietly.\nkept");
    }

    #[test]
    fn test_render_without_redactions() {
        let paragraphs = tokenize(&["Hello, world!"]);
        let set = RedactionSet::default();
        assert_eq!(render_blackout(&paragraphs, &set), "Hello, world!");
        assert_eq!(render_poem(&paragraphs, &set), "Hello, world!");
    }
}
