//! Market data models
//!
//! This module contains the core data types of the pipeline:
//! - `types` - Type aliases for common identifiers (ProviderId, Symbol, ProviderSymbol)
//! - `ticker` - Manifest records (TickerRecord, TickerMetadata)
//! - `quote` - Adapter output and resolved records (RawQuote, QuoteResult, FailureRecord)
//! - `run_result` - Aggregate result of one pipeline run (RunResult)
//! - `output` - JSON shapes written by the sink (PriceFile, ManifestFile, CryptoPriceFile)

mod output;
mod quote;
mod run_result;
mod ticker;
mod types;

pub use output::{CryptoPrice, CryptoPriceFile, ManifestFile, PriceEntry, PriceFile};
pub use quote::{percent_change, round_output, FailureRecord, QuoteResult, RawQuote, OUTPUT_DECIMALS};
pub use run_result::RunResult;
pub use ticker::{TickerMetadata, TickerRecord};
pub use types::{ProviderId, ProviderSymbol, Symbol};
