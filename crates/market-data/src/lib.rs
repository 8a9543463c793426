//! Tickerboard Market Data Crate
//!
//! Resolves a best-effort current price and percent change for a list of
//! heterogeneous ticker symbols, cascading across independent quote sources
//! when one is incomplete, missing or erroring.
//!
//! # Architecture
//!
//! ```text
//! +------------------+
//! | ManifestProvider |  (Wikipedia, static lists, CoinGecko)
//! +------------------+
//!          |  Vec<TickerRecord>
//!          v
//! +-------------------+      +------------------+
//! | BatchOrchestrator | ---> |    normalize     |  (per-provider symbol spelling)
//! +-------------------+      +------------------+
//!          |  one bulk call per batch
//!          v
//! +-------------------+      +------------------+
//! | ResolutionCascade | ---> | ProviderRegistry |  (timeouts, rate limits,
//! +-------------------+      +------------------+   circuit breaker, validation)
//!          |  Resolution per symbol
//!          v
//! +-------------------+
//! |  enrichment::merge|  (manifest metadata onto results)
//! +-------------------+
//!          |
//!          v
//!      RunResult -> PriceFile
//! ```
//!
//! # Core Types
//!
//! - [`TickerRecord`] - One manifest entry
//! - [`RawQuote`] - Unvalidated adapter output
//! - [`QuoteResult`] / [`FailureRecord`] - Per-symbol outcome
//! - [`RunResult`] - Whole-run outcome; every input symbol appears exactly once
//! - [`PriceFile`] - Emitted JSON shape

pub mod cascade;
pub mod enrichment;
pub mod errors;
pub mod manifest;
pub mod models;
pub mod orchestrator;
pub mod provider;
pub mod registry;
pub mod resolver;

#[cfg(test)]
mod test_support;

pub use cascade::{Resolution, ResolutionCascade};
pub use enrichment::merge;
pub use errors::{MarketDataError, RetryClass};
pub use models::{
    CryptoPrice, CryptoPriceFile, FailureRecord, ManifestFile, PriceEntry, PriceFile, ProviderId,
    ProviderSymbol, QuoteResult, RawQuote, RunResult, Symbol, TickerMetadata, TickerRecord,
};
pub use orchestrator::{BatchOrchestrator, OrchestratorConfig};
pub use provider::{ProviderCapabilities, QuoteProvider, RateLimit};
pub use registry::{FetchOutcome, ProviderRegistry};
pub use resolver::{normalize, SymbolCompatibility, SymbolConvention};
