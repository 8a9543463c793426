//! CoinGecko market listing.
//!
//! One listing call yields both the crypto manifest and its price snapshot;
//! crypto prices do not go through the quote cascade.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{info, warn};

use super::ManifestProvider;
use crate::errors::MarketDataError;
use crate::models::{round_output, CryptoPrice, CryptoPriceFile, TickerMetadata, TickerRecord};

pub const DEFAULT_COINGECKO_URL: &str = "https://api.coingecko.com/api/v3";
const SOURCE_NAME: &str = "CoinGecko";

#[derive(Clone, Debug)]
pub struct CoinGeckoConfig {
    pub base_url: String,
    /// Demo API key, sent as `x-cg-demo-api-key`
    pub api_key: Option<String>,
    pub pages: u32,
    pub per_page: u32,
    pub page_pause: Duration,
    pub timeout: Duration,
}

impl Default for CoinGeckoConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_COINGECKO_URL.to_string(),
            api_key: None,
            pages: 2,
            per_page: 250,
            page_pause: Duration::from_secs(2),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Row of `/coins/markets`
#[derive(Debug, Deserialize)]
struct CoinMarket {
    id: String,
    symbol: String,
    name: String,
    image: Option<String>,
    current_price: Option<f64>,
    price_change_percentage_24h: Option<f64>,
    market_cap: Option<f64>,
    total_volume: Option<f64>,
}

/// Manifest and price snapshot from one listing run.
#[derive(Clone, Debug)]
pub struct CryptoListing {
    pub manifest: Vec<TickerRecord>,
    pub prices: CryptoPriceFile,
}

pub struct CoinGeckoClient {
    client: Client,
    config: CoinGeckoConfig,
}

impl CoinGeckoClient {
    pub fn new(config: CoinGeckoConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self { client, config }
    }

    fn page_url(&self, page: u32) -> String {
        format!(
            "{}/coins/markets?vs_currency=usd&order=market_cap_desc&per_page={}&page={}&sparkline=false",
            self.config.base_url.trim_end_matches('/'),
            self.config.per_page,
            page
        )
    }

    async fn fetch_page(&self, page: u32) -> Result<Vec<CoinMarket>, MarketDataError> {
        let mut request = self
            .client
            .get(self.page_url(page))
            .header(reqwest::header::ACCEPT, "application/json");
        if let Some(key) = &self.config.api_key {
            request = request.header("x-cg-demo-api-key", key);
        }

        let body = request
            .send()
            .await?
            .error_for_status()
            .map_err(|e| MarketDataError::ManifestError {
                source_name: SOURCE_NAME.to_string(),
                message: e.to_string(),
            })?
            .text()
            .await?;
        parse_markets(&body)
    }

    /// Fetch every configured page. A page that fails is logged and skipped.
    pub async fn fetch_listing(&self) -> CryptoListing {
        let mut coins = Vec::new();
        for page in 1..=self.config.pages {
            info!("CoinGecko page {}/{}", page, self.config.pages);
            match self.fetch_page(page).await {
                Ok(rows) => {
                    info!("CoinGecko page {}: {} coins", page, rows.len());
                    coins.extend(rows);
                }
                Err(e) => warn!("CoinGecko page {} failed: {}", page, e),
            }
            if page < self.config.pages && !self.config.page_pause.is_zero() {
                tokio::time::sleep(self.config.page_pause).await;
            }
        }
        build_listing(coins)
    }
}

fn parse_markets(body: &str) -> Result<Vec<CoinMarket>, MarketDataError> {
    serde_json::from_str(body).map_err(|e| MarketDataError::ManifestError {
        source_name: SOURCE_NAME.to_string(),
        message: format!("unexpected markets payload: {}", e),
    })
}

fn build_listing(coins: Vec<CoinMarket>) -> CryptoListing {
    let mut manifest = Vec::with_capacity(coins.len());
    let mut prices = Vec::with_capacity(coins.len());

    for coin in coins {
        let symbol = coin.symbol.to_uppercase();
        let change = coin
            .price_change_percentage_24h
            .and_then(|c| Decimal::try_from(c).ok())
            .map(round_output)
            .unwrap_or(Decimal::ZERO);

        prices.push(CryptoPrice {
            symbol: symbol.clone(),
            price: coin.current_price,
            change_24h_percent: change,
            market_cap: coin.market_cap.unwrap_or(0.0),
            volume_24h: coin.total_volume.unwrap_or(0.0),
        });
        manifest.push(TickerRecord::new(&symbol, coin.name).with_metadata(TickerMetadata {
            logo_url: coin.image,
            provider_ref: Some(coin.id),
        }));
    }

    CryptoListing {
        manifest,
        prices: CryptoPriceFile {
            last_updated_utc: Utc::now(),
            prices,
        },
    }
}

#[async_trait]
impl ManifestProvider for CoinGeckoClient {
    fn name(&self) -> &str {
        SOURCE_NAME
    }

    async fn load(&self) -> Result<Vec<TickerRecord>, MarketDataError> {
        Ok(self.fetch_listing().await.manifest)
    }
}
