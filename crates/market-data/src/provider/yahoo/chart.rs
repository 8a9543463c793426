//! Single-symbol fallback through the chart API.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;
use yahoo_finance_api as yahoo;

use crate::errors::MarketDataError;
use crate::models::RawQuote;
use crate::provider::{ProviderCapabilities, QuoteProvider, RateLimit};
use crate::resolver::SymbolConvention;

use super::PROVIDER_ID;

const CHART_PROVIDER_ID: &str = "YAHOO_CHART";

/// Quotes one symbol at a time from Yahoo's chart endpoint.
///
/// Slower than the bulk endpoint but independent of its crumb, and it
/// always carries the day's open alongside the close.
pub struct YahooChartProvider {
    connector: yahoo::YahooConnector,
}

impl YahooChartProvider {
    pub fn new() -> Result<Self, MarketDataError> {
        let connector =
            yahoo::YahooConnector::new().map_err(|e| MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: format!("Failed to initialize Yahoo connector: {}", e),
            })?;
        Ok(Self { connector })
    }
}

/// Latest daily bar: close is the price, open is the reference.
fn bar_to_raw_quote(close: f64, open: f64) -> RawQuote {
    RawQuote::new(close, Some(open))
}

#[async_trait]
impl QuoteProvider for YahooChartProvider {
    fn id(&self) -> &'static str {
        CHART_PROVIDER_ID
    }

    fn priority(&self) -> u8 {
        1
    }

    fn convention(&self) -> SymbolConvention {
        SymbolConvention::Yahoo
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities::single_only()
    }

    fn rate_limit(&self) -> RateLimit {
        RateLimit {
            requests_per_minute: 2000,
            burst: 10,
            min_delay: Duration::from_millis(50),
        }
    }

    async fn fetch_one(&self, symbol: &str) -> Result<Option<RawQuote>, MarketDataError> {
        debug!("Fetching chart quote for {} from Yahoo", symbol);

        let response = match self.connector.get_latest_quotes(symbol, "1d").await {
            Ok(response) => response,
            Err(yahoo::YahooError::NoQuotes | yahoo::YahooError::NoResult) => return Ok(None),
            Err(e) => {
                return Err(MarketDataError::ProviderError {
                    provider: CHART_PROVIDER_ID.to_string(),
                    message: e.to_string(),
                })
            }
        };

        match response.last_quote() {
            Ok(bar) => Ok(Some(bar_to_raw_quote(bar.close, bar.open))),
            Err(e) => {
                debug!("No chart bars for {}: {}", symbol, e);
                Ok(None)
            }
        }
    }
}
