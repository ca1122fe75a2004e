use std::env;
use std::fmt;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "https://api.eia.gov/v2/steo/data/";
pub const DEFAULT_PAGE_SIZE: u32 = 5000;
pub const DEFAULT_FREQUENCY: &str = "monthly";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),
    #[error("Invalid value for {name}: {value:?}")]
    InvalidValue { name: &'static str, value: String },
}

#[derive(Clone)]
pub struct Config {
    pub api_key: String,
    pub api_url: String,
    pub page_size: u32,
    pub frequency: String,
    pub request_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build the configuration from any variable source; `from_env` reads the
    /// process environment through this.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_key = lookup("STEO_API_KEY")
            .filter(|key| !key.trim().is_empty())
            .ok_or(ConfigError::MissingVar("STEO_API_KEY"))?;

        Ok(Config {
            api_key,
            api_url: lookup("STEO_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            page_size: parse_var(&lookup, "STEO_PAGE_SIZE", DEFAULT_PAGE_SIZE)?,
            frequency: lookup("STEO_FREQUENCY").unwrap_or_else(|| DEFAULT_FREQUENCY.to_string()),
            request_timeout_secs: parse_var(&lookup, "STEO_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?,
        })
    }

    /// Configuration pointing at `api_url` with every other setting at its default.
    pub fn with_api_url(api_key: impl Into<String>, api_url: impl Into<String>) -> Self {
        Config {
            api_key: api_key.into(),
            api_url: api_url.into(),
            page_size: DEFAULT_PAGE_SIZE,
            frequency: DEFAULT_FREQUENCY.to_string(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

// The key ends up in logs via `info!("{:?}", config)`; keep it out.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"<redacted>")
            .field("api_url", &self.api_url)
            .field("page_size", &self.page_size)
            .field("frequency", &self.frequency)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

fn parse_var<T: std::str::FromStr>(
    lookup: impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(name) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { name, value }),
        None => Ok(default),
    }
}
