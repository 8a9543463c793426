use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;
use tickerboard_market_data::manifest::DEFAULT_COINGECKO_URL;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} must be a number, got '{value}'")]
    InvalidNumber { name: &'static str, value: String },

    #[error("{name} must be greater than zero")]
    Zero { name: &'static str },
}

#[derive(Clone, Debug)]
pub struct Config {
    pub output_dir: PathBuf,
    pub stocks_batch_size: usize,
    pub indices_batch_size: usize,
    pub batch_pause: Duration,
    pub request_timeout: Duration,
    pub fallback_concurrency: usize,
    /// Symbols containing any of these never go to the secondary source
    pub secondary_exclude_markers: String,
    pub log_format: String,
    pub finnhub_api_key: Option<String>,
    pub coingecko_api_key: Option<String>,
    pub coingecko_api_url: String,
}

impl Config {
    /// Read configuration from the process environment, after loading `.env`.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        Ok(Self {
            output_dir: get("TB_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".")),
            stocks_batch_size: positive(&get, "TB_STOCKS_BATCH_SIZE", 50)?,
            indices_batch_size: positive(&get, "TB_INDICES_BATCH_SIZE", 10)?,
            batch_pause: Duration::from_millis(number(&get, "TB_BATCH_PAUSE_MS", 1000)?),
            request_timeout: Duration::from_millis(positive(&get, "TB_REQUEST_TIMEOUT_MS", 30_000)?),
            fallback_concurrency: positive(&get, "TB_FALLBACK_CONCURRENCY", 8)?,
            secondary_exclude_markers: get("TB_SECONDARY_EXCLUDE_MARKERS")
                .unwrap_or_else(|| "^,=,.".to_string()),
            log_format: get("TB_LOG_FORMAT").unwrap_or_else(|| "text".to_string()),
            finnhub_api_key: get("FINNHUB_API_KEY"),
            coingecko_api_key: get("COINGECKO_API_KEY"),
            coingecko_api_url: get("COINGECKO_API_URL")
                .unwrap_or_else(|| DEFAULT_COINGECKO_URL.to_string()),
        })
    }
}

fn number<T, F>(get: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match get(name) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidNumber { name, value }),
        None => Ok(default),
    }
}

fn positive<T, F>(get: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr + Default + PartialEq,
    F: Fn(&str) -> Option<String>,
{
    let value = number(get, name, default)?;
    if value == T::default() {
        return Err(ConfigError::Zero { name });
    }
    Ok(value)
}
