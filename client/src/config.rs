use std::fmt;
use std::time::Duration;

use reqwest::header::HeaderValue;
use reqwest::Url;

use crate::error::{Error, Result};

pub const URL_VAR: &str = "SUPABASE_URL";
pub const KEY_VAR: &str = "SUPABASE_KEY";

/// Where rows go, relative to the project URL.
pub const TABLE_PATH: &str = "rest/v1/phase1_benchmarks";

/// Everything needed to talk to the table.  Built once at startup and passed down; nothing here reads the
/// environment behind your back.
#[derive(Clone)]
pub struct Config {
    endpoint: Url,
    key: String,
    timeout: Option<Duration>,
}

impl Config {
    pub fn new(base_url: &str, key: &str) -> Result<Config> {
        if base_url.is_empty() || key.is_empty() {
            return Err(Error::MissingConfiguration);
        }

        // Catch bad keys here rather than as an opaque builder error at send time.
        HeaderValue::from_str(key)
            .map_err(|_| Error::Configuration("key contains characters not allowed in a header".into()))?;

        let joined = format!("{}/{}", base_url.trim_end_matches('/'), TABLE_PATH);
        let endpoint = Url::parse(&joined)
            .map_err(|e| Error::Configuration(format!("{} is not a usable URL: {}", URL_VAR, e)))?;

        Ok(Config {
            endpoint,
            key: key.to_string(),
            timeout: None,
        })
    }

    pub fn from_env() -> Result<Config> {
        Config::from_lookup(|name| std::env::var(name).ok())
    }

    /// Like [`Config::from_env`], but reads variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Config>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = lookup(URL_VAR).unwrap_or_default();
        let key = lookup(KEY_VAR).unwrap_or_default();
        Config::new(&url, &key)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Config {
        self.timeout = Some(timeout);
        self
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("endpoint", &self.endpoint.as_str())
            .field("key", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}
