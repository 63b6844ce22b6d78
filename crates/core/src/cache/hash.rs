//! Cache key generation.

use sha2::{Digest, Sha256};

/// Prefix shared by every article key.
pub const ARTICLE_KEY_PREFIX: &str = "article:";

/// Compute the storage key for an article URL.
///
/// Callers pass the canonical URL so that trivially different spellings of
/// the same address share an entry.
pub fn article_key(url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(url.as_bytes());
    format!("{ARTICLE_KEY_PREFIX}{}", hex::encode(hasher.finalize()))
}
