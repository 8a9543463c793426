//! JSON shapes handed to the output sink.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::run_result::RunResult;
use super::ticker::TickerRecord;

/// One priced entry in a price file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PriceEntry {
    pub symbol: String,
    pub price: Decimal,
    pub change_percent: Decimal,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub logo_url: Option<String>,
}

/// Serialized form of a [`RunResult`].
///
/// `prices` and `failed_tickers` are jointly exhaustive and mutually
/// exclusive over the input symbol set.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PriceFile {
    pub last_updated_utc: DateTime<Utc>,
    pub prices: Vec<PriceEntry>,
    pub failed_tickers: Vec<String>,
}

impl PriceFile {
    /// Symbols split into (priced, failed).
    pub fn partition(&self) -> (BTreeSet<String>, BTreeSet<String>) {
        let priced = self.prices.iter().map(|p| p.symbol.clone()).collect();
        let failed = self.failed_tickers.iter().cloned().collect();
        (priced, failed)
    }

    pub fn len(&self) -> usize {
        self.prices.len() + self.failed_tickers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty() && self.failed_tickers.is_empty()
    }
}

impl From<&RunResult> for PriceFile {
    fn from(run: &RunResult) -> Self {
        Self {
            last_updated_utc: run.timestamp_utc,
            prices: run
                .priced
                .iter()
                .map(|q| PriceEntry {
                    symbol: q.symbol.to_string(),
                    price: q.price,
                    change_percent: q.change_percent,
                    logo_url: q.metadata.as_ref().and_then(|m| m.logo_url.clone()),
                })
                .collect(),
            failed_tickers: run.failed.iter().map(|f| f.symbol.to_string()).collect(),
        }
    }
}

/// Serialized manifest: the canonical symbol list for one asset class.
#[derive(Clone, Debug, Serialize)]
pub struct ManifestFile<'a> {
    pub last_updated_utc: DateTime<Utc>,
    pub tickers: &'a [TickerRecord],
}

impl<'a> ManifestFile<'a> {
    pub fn new(tickers: &'a [TickerRecord]) -> Self {
        Self {
            last_updated_utc: Utc::now(),
            tickers,
        }
    }
}

/// One coin in the crypto price file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CryptoPrice {
    pub symbol: String,
    pub price: Option<f64>,
    pub change_24h_percent: Decimal,
    pub market_cap: f64,
    pub volume_24h: f64,
}

/// Crypto snapshot taken straight from the market listing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CryptoPriceFile {
    pub last_updated_utc: DateTime<Utc>,
    pub prices: Vec<CryptoPrice>,
}
