use anyhow::{Context, Result};
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://localhost:5000";

/// Connection settings, read from the environment (and `.env`, once the
/// binary has loaded it).
///
/// | variable               | default                  |
/// |------------------------|--------------------------|
/// | `ATELIER_API_URL`      | `http://localhost:5000`  |
/// | `USER_AGENT`           | `atelier/{version}`      |
/// | `ATELIER_TIMEOUT_SECS` | none                     |
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub api_url: String,
    pub user_agent: String,
    pub timeout: Option<Duration>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            user_agent: format!("atelier/{}", env!("CARGO_PKG_VERSION")),
            timeout: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable lookup; empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(url) = var("ATELIER_API_URL") {
            config.api_url = url;
        }
        if let Some(agent) = var("USER_AGENT") {
            config.user_agent = agent;
        }
        if let Some(secs) = var("ATELIER_TIMEOUT_SECS") {
            let secs: u64 = secs
                .trim()
                .parse()
                .with_context(|| format!("ATELIER_TIMEOUT_SECS is not a whole number: {secs:?}"))?;
            config.timeout = Some(Duration::from_secs(secs));
        }

        Ok(config)
    }
}
