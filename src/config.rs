use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Address the HTTP listener binds to
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Per-request timeout for upstream feeds in seconds; 0 disables it
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
    /// How often the browser page reloads the feed list, in seconds
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    /// Initial contents of the source registry
    #[serde(default = "default_sources")]
    pub sources: Vec<String>,
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_fetch_timeout_secs() -> u64 {
    30
}

fn default_poll_interval_secs() -> u64 {
    120
}

/// Longest page reload interval accepted, one day
const MAX_POLL_INTERVAL_SECS: u64 = 24 * 60 * 60;

pub fn default_sources() -> Vec<String> {
    vec![
        "https://news.ycombinator.com/rss".to_string(),
        "https://www.reddit.com/r/golang/.rss".to_string(),
    ]
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            poll_interval_secs: default_poll_interval_secs(),
            sources: default_sources(),
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Like [`Config::load`], but a missing file yields the built-in defaults.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Parse config from a TOML string (useful for testing)
    pub fn from_str(content: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    pub fn fetch_timeout(&self) -> Option<Duration> {
        match self.fetch_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    /// Page reload interval. Must be between one second and one day.
    pub fn poll_interval(&self) -> anyhow::Result<Duration> {
        match self.poll_interval_secs {
            secs @ 1..=MAX_POLL_INTERVAL_SECS => Ok(Duration::from_secs(secs)),
            secs => anyhow::bail!(
                "poll_interval_secs must be between 1 and {}, got {}",
                MAX_POLL_INTERVAL_SECS,
                secs
            ),
        }
    }
}
