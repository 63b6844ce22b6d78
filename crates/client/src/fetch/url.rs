//! Target URL handling: canonical form for cache keys, encoded form for proxies.

use url::{ParseError, Url};

/// Error type for URL canonicalization failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UrlError {
    #[error("empty URL")]
    Empty,

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("URL has no host: {0}")]
    MissingHost(String),

    #[error("URL carries credentials: {0}")]
    Credentials(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

/// Canonicalize an article URL.
///
/// Whitespace is trimmed, a relative input (no scheme) gets `https://`, the
/// fragment is dropped and the query is kept as given. Only http(s) URLs
/// with a host and no credentials are accepted. The `url` crate already
/// lowercases hosts of special schemes.
pub fn canonicalize(input: &str) -> Result<Url, UrlError> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let mut parsed = match Url::parse(trimmed) {
        Ok(url) => url,
        Err(ParseError::RelativeUrlWithoutBase) => {
            Url::parse(&format!("https://{trimmed}")).map_err(|e| UrlError::InvalidUrl(e.to_string()))?
        }
        Err(e) => return Err(UrlError::InvalidUrl(e.to_string())),
    };

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlError::UnsupportedScheme(scheme.to_string())),
    }

    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(UrlError::MissingHost(trimmed.to_string()));
    }

    if !parsed.username().is_empty() || parsed.password().is_some() {
        return Err(UrlError::Credentials(trimmed.to_string()));
    }

    parsed.set_fragment(None);

    Ok(parsed)
}

/// Percent-encode a full URL so it can ride inside another URL's query.
pub fn encode_target(target: &Url) -> String {
    url::form_urlencoded::byte_serialize(target.as_str().as_bytes()).collect()
}
