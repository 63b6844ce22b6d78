//! A single attempt against one forwarding proxy.

use std::time::Duration;

use bytes::Bytes;
use magpie_core::{ProxyDescriptor, ResponseFormat};
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use super::url::encode_target;

/// Why one proxy attempt did not produce usable content.
///
/// These stay inside the fetcher; callers only ever see the aggregate.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProxyError {
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("status {0}")]
    Http(u16),

    #[error("undecodable response: {0}")]
    Decode(String),

    #[error("response too short ({0} chars)")]
    TooShort(usize),

    #[error("network error: {0}")]
    Transport(String),
}

/// JSON envelope used by wrapping proxies.
#[derive(Debug, Deserialize)]
struct Envelope {
    contents: Option<String>,
}

/// Unwrap a proxy body according to its declared format.
pub fn decode_body(format: ResponseFormat, body: &Bytes) -> Result<String, ProxyError> {
    match format {
        ResponseFormat::RawText => Ok(String::from_utf8_lossy(body).into_owned()),
        ResponseFormat::JsonWrapped => {
            let envelope: Envelope = serde_json::from_slice(body).map_err(|e| ProxyError::Decode(e.to_string()))?;
            envelope
                .contents
                .ok_or_else(|| ProxyError::Decode("envelope has no contents".into()))
        }
    }
}

/// Fetch `target` through `proxy`, applying the success predicate.
///
/// Succeeds only on HTTP 2xx with a decodable body longer than `min_chars`.
pub async fn attempt(
    http: &Client, proxy: &ProxyDescriptor, target: &Url, timeout: Duration, min_chars: usize,
) -> Result<String, ProxyError> {
    let endpoint = proxy.expand(&encode_target(target));

    let request = async {
        let response = http.get(&endpoint).send().await.map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProxyError::Http(status.as_u16()));
        }

        response.bytes().await.map_err(transport_error)
    };

    let bytes = tokio::time::timeout(timeout, request)
        .await
        .map_err(|_| ProxyError::Timeout(timeout))??;

    let body = decode_body(proxy.format, &bytes)?;
    let chars = body.chars().count();
    if chars <= min_chars {
        return Err(ProxyError::TooShort(chars));
    }

    Ok(body)
}

fn transport_error(err: reqwest::Error) -> ProxyError {
    ProxyError::Transport(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_raw() {
        let body = Bytes::from_static(b"<html>hi</html>");
        assert_eq!(decode_body(ResponseFormat::RawText, &body).unwrap(), "<html>hi</html>");
    }

    #[test]
    fn test_decode_json_envelope() {
        let body = Bytes::from_static(br#"{"contents":"<html>hi</html>","status":{"http_code":200}}"#);
        assert_eq!(decode_body(ResponseFormat::JsonWrapped, &body).unwrap(), "<html>hi</html>");
    }

    #[test]
    fn test_decode_json_failures() {
        let not_json = Bytes::from_static(b"<html>");
        assert!(matches!(decode_body(ResponseFormat::JsonWrapped, &not_json), Err(ProxyError::Decode(_))));

        let no_contents = Bytes::from_static(br#"{"status":"error"}"#);
        assert!(matches!(decode_body(ResponseFormat::JsonWrapped, &no_contents), Err(ProxyError::Decode(_))));
    }
}
