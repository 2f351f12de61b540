//! Session context for the Ooyala token exchange chain.

use std::time::Duration;

use tracing::debug;
use tryline_cache::TokenCache;
use tryline_core::{Config, Error, Result};

/// Default timeout for requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const USER_AGENT: &str = "tryline/0.1";

/// Context for one resolution chain: HTTP client, settings, and the
/// session-token cache. All exchange steps are methods on this type;
/// nothing lives in process-wide state.
pub struct OoyalaSession {
    pub(crate) http: reqwest::Client,
    pub(crate) config: Config,
    pub(crate) cache: TokenCache,
}

impl OoyalaSession {
    /// Create a session using the platform token cache location.
    pub fn new(config: Config) -> Result<Self> {
        let cache = TokenCache::new()?;
        Self::with_cache(config, cache)
    }

    /// Create a session with an explicit token cache.
    pub fn with_cache(config: Config, cache: TokenCache) -> Result<Self> {
        // Certificate validation stays off for all provider calls; the
        // source system shipped this way and the endpoints require it.
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(DEFAULT_TIMEOUT)
            .danger_accept_invalid_certs(true)
            .build()
            .map_err(|e| Error::Network(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            http,
            config,
            cache,
        })
    }

    /// The settings this session resolves with.
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// The session-token cache backing this session.
    pub const fn cache(&self) -> &TokenCache {
        &self.cache
    }

    /// GET a URL and return the body text, mapping non-2xx to an error.
    pub(crate) async fn get_text(&self, url: &str) -> Result<String> {
        debug!("Fetching URL: {url}");

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Http {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        response
            .text()
            .await
            .map_err(|e| Error::Network(format!("Failed to read response body: {e}")))
    }
}
