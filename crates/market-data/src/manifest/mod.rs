//! Manifest providers: where the list of symbols to price comes from.
//!
//! A manifest is just an ordered `Vec<TickerRecord>`. Providers never
//! deduplicate; the pipeline treats every record independently.

mod coingecko;
mod composite;
mod static_lists;
mod wikipedia;

use async_trait::async_trait;

use crate::errors::MarketDataError;
use crate::models::TickerRecord;

pub use coingecko::{CoinGeckoClient, CoinGeckoConfig, CryptoListing, DEFAULT_COINGECKO_URL};
pub use composite::CompositeManifest;
pub use static_lists::{StaticManifest, INDICES_AND_COMMODITIES, PH_STOCKS};
pub use wikipedia::{parse_table, WikipediaTableManifest, WikipediaTableSpec};

/// A source of ticker records.
#[async_trait]
pub trait ManifestProvider: Send + Sync {
    /// Human-readable source name for logs.
    fn name(&self) -> &str;

    async fn load(&self) -> Result<Vec<TickerRecord>, MarketDataError>;
}
