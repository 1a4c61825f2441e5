//! Client configuration.

use std::time::Duration;

/// Default API root.
pub const DEFAULT_BASE_URL: &str = "http://localhost/api";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default lifetime of cached responses.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(30);

/// Default session page size.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// REST client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// API root; request paths are appended to it.
    pub base_url: String,
    /// Per-request timeout, enforced by the transport.
    pub timeout: Duration,
    /// Lifetime of cached responses.
    pub cache_ttl: Duration,
    /// Page size used when none is given.
    pub page_size: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            timeout: DEFAULT_TIMEOUT,
            cache_ttl: DEFAULT_CACHE_TTL,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl ClientConfig {
    /// Default configuration for `base_url`.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into(), ..Self::default() }
    }
}
