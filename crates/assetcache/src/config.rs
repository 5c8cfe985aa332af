//! Loader configuration

use std::time::Duration;

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Settings for resolving and fetching assets
#[derive(Debug, Clone, PartialEq)]
pub struct LoaderConfig {
    /// Prefix joined textually with `<key>.svg` to build request URIs
    pub origin: String,

    /// Per-request timeout
    pub timeout: Duration,

    /// User-Agent header sent with every request
    pub user_agent: String,
}

impl LoaderConfig {
    /// Create a config for the given origin with default timeout and agent
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            ..Self::default()
        }
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the User-Agent header
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Build the request URI for an asset key.
    ///
    /// This is a plain concatenation; the key is neither escaped nor
    /// validated.
    pub fn uri(&self, asset_key: &str) -> String {
        format!("{}{}.svg", self.origin, asset_key)
    }
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            origin: "http://localhost/".to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: format!("assetcache/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}
