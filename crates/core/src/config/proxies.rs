//! Forwarding proxy descriptors.

use serde::{Deserialize, Serialize};

/// Placeholder replaced by the URL-encoded target address.
pub const URL_PLACEHOLDER: &str = "{url}";

/// How a proxy hands back the page body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseFormat {
    /// Body is the page itself.
    RawText,
    /// Body is a JSON envelope with the page under `contents`.
    JsonWrapped,
}

/// Strategy used to spread a fetch across proxies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchStrategy {
    /// All proxies at once, first qualifying response wins.
    #[default]
    Race,
    /// One proxy at a time in configured order.
    Sequential,
}

/// A third-party CORS forwarding endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyDescriptor {
    /// Short identifier used in logs and results.
    pub name: String,

    /// Endpoint template; `{url}` is replaced by the encoded target.
    pub endpoint: String,

    /// Response body shape.
    pub format: ResponseFormat,
}

impl ProxyDescriptor {
    pub fn new(name: impl Into<String>, endpoint: impl Into<String>, format: ResponseFormat) -> Self {
        Self { name: name.into(), endpoint: endpoint.into(), format }
    }

    /// Expand the endpoint template with an already-encoded target.
    pub fn expand(&self, encoded_target: &str) -> String {
        self.endpoint.replace(URL_PLACEHOLDER, encoded_target)
    }
}

/// The public proxies magpie ships with.
pub fn default_proxies() -> Vec<ProxyDescriptor> {
    vec![
        ProxyDescriptor::new("allorigins", "https://api.allorigins.win/get?url={url}", ResponseFormat::JsonWrapped),
        ProxyDescriptor::new("corsproxy", "https://corsproxy.io/?{url}", ResponseFormat::RawText),
    ]
}
