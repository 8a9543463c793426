//! Finnhub quote provider.
//!
//! Secondary, independent source used when the Yahoo chain has nothing for a
//! symbol. Only the `/quote` endpoint is used.
//!
//! Finnhub free tier is limited to 60 API calls per minute.
//! API documentation: https://finnhub.io/docs/api

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::errors::MarketDataError;
use crate::models::RawQuote;
use crate::provider::{ProviderCapabilities, QuoteProvider, RateLimit};
use crate::resolver::SymbolConvention;

const BASE_URL: &str = "https://finnhub.io/api/v1";
const PROVIDER_ID: &str = "FINNHUB";

/// Response from /quote endpoint
#[derive(Debug, Deserialize)]
struct QuoteResponse {
    /// Current price
    c: Option<f64>,
    /// Open price of the day
    o: Option<f64>,
    /// Previous close
    pc: Option<f64>,
}

/// Error response from Finnhub
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: Option<String>,
}

/// Finnhub quote provider.
///
/// Without an API key the provider reports itself unavailable and is never
/// called.
pub struct FinnhubProvider {
    client: Client,
    api_key: Option<String>,
}

impl FinnhubProvider {
    pub fn new(api_key: Option<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());

        let api_key = api_key.filter(|k| !k.trim().is_empty());
        Self { client, api_key }
    }

    /// Make a GET request to the Finnhub API.
    async fn fetch(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<String, MarketDataError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| MarketDataError::SourceUnavailable {
                provider: PROVIDER_ID.to_string(),
            })?;

        let url = format!("{}{}", BASE_URL, endpoint);
        let request = self
            .client
            .get(&url)
            .header("X-Finnhub-Token", api_key)
            .query(params);

        debug!("Finnhub request: {} with {} params", endpoint, params.len());

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                MarketDataError::Timeout {
                    provider: PROVIDER_ID.to_string(),
                }
            } else {
                MarketDataError::ProviderError {
                    provider: PROVIDER_ID.to_string(),
                    message: format!("Request failed: {}", e),
                }
            }
        })?;

        let status = response.status();

        // 403 is what Finnhub answers once the quota is spent
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS
            || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(MarketDataError::RateLimited {
                provider: PROVIDER_ID.to_string(),
            });
        }

        // A rejected key will not get better during this run
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(MarketDataError::SourceUnavailable {
                provider: PROVIDER_ID.to_string(),
            });
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .ok()
                .and_then(|e| e.error)
                .unwrap_or_else(|| format!("HTTP {} - {}", status, body));
            return Err(MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message,
            });
        }

        response
            .text()
            .await
            .map_err(|e| MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: format!("Failed to read response: {}", e),
            })
    }
}

/// Parse a `/quote` body.
///
/// Finnhub answers unknown symbols with an all-zero quote rather than an
/// error, so `c == 0 && o == 0` is "not found".
fn parse_quote(body: &str) -> Result<Option<RawQuote>, MarketDataError> {
    let response: QuoteResponse =
        serde_json::from_str(body).map_err(|e| MarketDataError::ProviderError {
            provider: PROVIDER_ID.to_string(),
            message: format!("Failed to parse quote response: {}", e),
        })?;

    let Some(close) = response.c else {
        return Ok(None);
    };
    let open = response.o.unwrap_or(0.0);
    if close == 0.0 && open == 0.0 {
        return Ok(None);
    }

    let reference = response
        .pc
        .filter(|pc| *pc != 0.0)
        .or(response.o);

    Ok(Some(RawQuote::new(close, reference)))
}

#[async_trait]
impl QuoteProvider for FinnhubProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn priority(&self) -> u8 {
        20
    }

    fn convention(&self) -> SymbolConvention {
        SymbolConvention::Finnhub
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities::single_only()
    }

    fn rate_limit(&self) -> RateLimit {
        RateLimit {
            requests_per_minute: 60,
            burst: 5,
            min_delay: Duration::from_millis(1000),
        }
    }

    fn is_available(&self) -> bool {
        self.api_key.is_some()
    }

    async fn fetch_one(&self, symbol: &str) -> Result<Option<RawQuote>, MarketDataError> {
        let body = self.fetch("/quote", &[("symbol", symbol)]).await?;
        parse_quote(&body)
    }
}
