//! Symbol normalization.
//!
//! Turns canonical manifest symbols into the spelling each provider expects,
//! and decides which symbols a secondary source may be asked about.

mod compatibility;
mod exchange_suffixes;
mod normalizer;

pub use compatibility::SymbolCompatibility;
pub use exchange_suffixes::{
    has_exchange_suffix, split_yahoo_suffix, ExchangeSuffix,
    YAHOO_EXCHANGE_SUFFIXES,
};
pub use normalizer::{apply_exchange_suffix, normalize, zero_pad, SymbolConvention};
