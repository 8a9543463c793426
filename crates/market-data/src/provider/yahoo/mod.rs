//! Yahoo Finance quote providers.
//!
//! - [`YahooQuoteProvider`]: bulk `/v7/finance/quote`, up to 50 symbols per call.
//!   Needs a cookie/crumb pair, cached process-wide.
//! - [`YahooChartProvider`]: one symbol per call through `yahoo_finance_api`.

mod chart;
mod models;

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use async_trait::async_trait;
use lazy_static::lazy_static;
use reqwest::{header, Client};
use tracing::{debug, warn};
use urlencoding::encode;

use crate::errors::MarketDataError;
use crate::models::{ProviderSymbol, RawQuote};
use crate::provider::{ProviderCapabilities, QuoteProvider, RateLimit};
use crate::resolver::SymbolConvention;

pub use chart::YahooChartProvider;
use models::YahooQuoteResponse;

const PROVIDER_ID: &str = "YAHOO";
const QUOTE_URL: &str = "https://query1.finance.yahoo.com/v7/finance/quote";
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Most symbols the v7 endpoint reliably answers in one call.
pub const MAX_BATCH_SIZE: usize = 50;

// ============================================================================
// Crumb/Cookie Authentication
// ============================================================================

/// Cached Yahoo authentication data
#[derive(Debug, Clone)]
struct CrumbData {
    cookie: String,
    crumb: String,
}

lazy_static! {
    /// Global cache for Yahoo authentication crumb
    static ref YAHOO_CRUMB: RwLock<Option<CrumbData>> = RwLock::default();
}

fn read_crumb() -> RwLockReadGuard<'static, Option<CrumbData>> {
    YAHOO_CRUMB.read().unwrap_or_else(|poisoned| {
        warn!("Yahoo crumb lock poisoned, recovering");
        poisoned.into_inner()
    })
}

fn write_crumb() -> RwLockWriteGuard<'static, Option<CrumbData>> {
    YAHOO_CRUMB.write().unwrap_or_else(|poisoned| {
        warn!("Yahoo crumb lock poisoned, recovering");
        poisoned.into_inner()
    })
}

fn provider_error(message: String) -> MarketDataError {
    MarketDataError::ProviderError {
        provider: PROVIDER_ID.to_string(),
        message,
    }
}

fn map_send_error(e: reqwest::Error) -> MarketDataError {
    if e.is_timeout() {
        MarketDataError::Timeout {
            provider: PROVIDER_ID.to_string(),
        }
    } else {
        provider_error(format!("Request failed: {}", e))
    }
}

// ============================================================================
// Bulk quote provider
// ============================================================================

/// Bulk quote source backed by Yahoo's v7 quote endpoint.
pub struct YahooQuoteProvider {
    client: Client,
}

impl YahooQuoteProvider {
    pub fn new() -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self { client }
    }

    /// Ensure we have a valid Yahoo authentication crumb.
    async fn ensure_crumb(&self) -> Result<CrumbData, MarketDataError> {
        let cached = read_crumb().clone();
        match cached {
            Some(crumb) => Ok(crumb),
            None => self.fetch_crumb().await,
        }
    }

    /// Fetch a new Yahoo authentication crumb.
    async fn fetch_crumb(&self) -> Result<CrumbData, MarketDataError> {
        // Step 1: Get cookie from fc.yahoo.com
        let response = self
            .client
            .get("https://fc.yahoo.com")
            .send()
            .await
            .map_err(|e| provider_error(format!("Failed to get cookie: {}", e)))?;

        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|h| h.to_str().ok())
            .and_then(|s| s.split_once(';').map(|(v, _)| v.to_string()))
            .ok_or_else(|| provider_error("Failed to parse Yahoo cookie".to_string()))?;

        // Step 2: Get crumb using cookie
        let crumb = self
            .client
            .get("https://query1.finance.yahoo.com/v1/test/getcrumb")
            .header(header::USER_AGENT, USER_AGENT)
            .header(header::COOKIE, &cookie)
            .send()
            .await
            .map_err(|e| provider_error(format!("Failed to get crumb: {}", e)))?
            .text()
            .await
            .map_err(|e| provider_error(format!("Failed to read crumb: {}", e)))?;

        let crumb_data = CrumbData { cookie, crumb };
        *write_crumb() = Some(crumb_data.clone());

        Ok(crumb_data)
    }

    /// Clear the cached crumb (used when authentication fails)
    fn clear_crumb(&self) {
        *write_crumb() = None;
    }
}

impl Default for YahooQuoteProvider {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a v7 quote body into raw quotes keyed by the symbol Yahoo echoed.
///
/// Entries without a market price are dropped. The reference is the session
/// open; when the open is missing or zero, the previous close.
fn parse_quote_response(body: &str) -> Result<HashMap<ProviderSymbol, RawQuote>, MarketDataError> {
    let data: YahooQuoteResponse = serde_json::from_str(body)
        .map_err(|e| provider_error(format!("Failed to parse quote response: {}", e)))?;

    if data.quote_response.result.is_empty() {
        if let Some(err) = data.quote_response.error {
            return Err(provider_error(format!(
                "{}: {}",
                err.code.unwrap_or_default(),
                err.description.unwrap_or_default()
            )));
        }
    }

    Ok(data
        .quote_response
        .result
        .into_iter()
        .filter_map(|item| {
            let price = item.regular_market_price?;
            let reference = item
                .regular_market_open
                .filter(|open| *open != 0.0)
                .or(item.regular_market_previous_close);
            Some((item.symbol, RawQuote::new(price, reference)))
        })
        .collect())
}

#[async_trait]
impl QuoteProvider for YahooQuoteProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn priority(&self) -> u8 {
        1
    }

    fn convention(&self) -> SymbolConvention {
        SymbolConvention::Yahoo
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities {
            supports_batch: true,
            supports_single: true,
            max_batch_size: MAX_BATCH_SIZE,
        }
    }

    fn rate_limit(&self) -> RateLimit {
        RateLimit {
            requests_per_minute: 2000,
            burst: 10,
            min_delay: Duration::from_millis(50),
        }
    }

    async fn fetch_batch(
        &self,
        symbols: &[ProviderSymbol],
    ) -> Result<HashMap<ProviderSymbol, RawQuote>, MarketDataError> {
        if symbols.is_empty() {
            return Ok(HashMap::new());
        }

        let crumb = self.ensure_crumb().await?;
        let url = format!(
            "{}?symbols={}&crumb={}",
            QUOTE_URL,
            encode(&symbols.join(",")),
            encode(&crumb.crumb)
        );

        debug!("Fetching {} quotes from Yahoo", symbols.len());

        let response = self
            .client
            .get(&url)
            .header(header::USER_AGENT, USER_AGENT)
            .header(header::COOKIE, &crumb.cookie)
            .send()
            .await
            .map_err(map_send_error)?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            self.clear_crumb();
            return Err(provider_error("Yahoo authentication expired".to_string()));
        }
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(MarketDataError::RateLimited {
                provider: PROVIDER_ID.to_string(),
            });
        }
        if !status.is_success() {
            return Err(provider_error(format!("HTTP {}", status)));
        }

        let body = response
            .text()
            .await
            .map_err(|e| provider_error(format!("Failed to read response: {}", e)))?;

        let quotes = parse_quote_response(&body)?;
        if quotes.len() < symbols.len() {
            debug!(
                "Yahoo returned {} of {} requested symbols",
                quotes.len(),
                symbols.len()
            );
        }
        Ok(quotes)
    }

    async fn fetch_one(&self, symbol: &str) -> Result<Option<RawQuote>, MarketDataError> {
        let mut quotes = self.fetch_batch(&[symbol.to_string()]).await?;
        Ok(quotes.remove(symbol))
    }
}
