use std::time::Duration;
use url::Url;

use crate::{Error, Result};

pub const ENV_API_BASE_URL: &str = "NT_API_BASE_URL";
pub const ENV_API_TIMEOUT_SECS: &str = "NT_API_TIMEOUT_SECS";
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: Url,
    pub timeout: Duration,
    pub user_agent: String,
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self {
            base_url: parse_base_url(base_url)?,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: format!("nt/{}", env!("CARGO_PKG_VERSION")),
        })
    }

    /// Reads `NT_API_BASE_URL` and `NT_API_TIMEOUT_SECS`, falling back to the
    /// local development service.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the config from any variable source. Unset and blank values
    /// take the defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let base_url = get(ENV_API_BASE_URL).unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
        let mut config = Self::new(&base_url)?;
        if let Some(raw) = get(ENV_API_TIMEOUT_SECS) {
            config = config.with_timeout(parse_timeout(&raw)?);
        }
        Ok(config)
    }

    /// Replaces the base URL, keeping the other settings.
    pub fn with_base_url(mut self, base_url: &str) -> Result<Self> {
        self.base_url = parse_base_url(base_url)?;
        Ok(self)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Joins an endpoint path onto the base URL, keeping any path prefix the
    /// base URL carries (e.g. `https://host/api`).
    pub fn endpoint(&self, path: &str) -> Url {
        let mut url = self.base_url.clone();
        let joined = format!("{}/{}", url.path().trim_end_matches('/'), path.trim_start_matches('/'));
        url.set_path(&joined);
        url
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_API_BASE_URL).expect("default base URL is valid"),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: format!("nt/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

fn parse_timeout(raw: &str) -> Result<Duration> {
    raw.trim()
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|_| Error::Config(format!("{} must be a number of seconds, got '{}'", ENV_API_TIMEOUT_SECS, raw)))
}

fn parse_base_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim()).map_err(|e| Error::Config(format!("invalid API base URL '{}': {}", raw, e)))?;
    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(Error::Config(format!("API base URL must be http(s): {}", raw)));
    }
    Ok(url)
}
