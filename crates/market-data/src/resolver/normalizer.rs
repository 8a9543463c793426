//! Per-provider symbol rewriting.
//!
//! Manifests hand us symbols in whatever form their source used. Each quote
//! provider expects its own spelling, so every outbound symbol goes through
//! [`normalize`] with the provider's [`SymbolConvention`].

use super::exchange_suffixes::{has_exchange_suffix, split_yahoo_suffix};
use crate::models::ProviderSymbol;

/// Symbol spelling expected by a provider.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SymbolConvention {
    /// Yahoo Finance: `BRK-B`, `VOD.L`, `^GSPC`, `GC=F`
    Yahoo,
    /// Finnhub: `BRK.B`, exchange suffixes remapped where Finnhub lists the venue
    Finnhub,
}

/// Rewrite `symbol` into the spelling used by `convention`.
///
/// Pure and total: unknown shapes pass through unchanged.
///
/// ```
/// use tickerboard_market_data::resolver::{normalize, SymbolConvention};
///
/// assert_eq!(normalize("BRK.B", SymbolConvention::Yahoo), "BRK-B");
/// assert_eq!(normalize("BRK-B", SymbolConvention::Finnhub), "BRK.B");
/// assert_eq!(normalize("^GSPC", SymbolConvention::Yahoo), "^GSPC");
/// ```
pub fn normalize(symbol: &str, convention: SymbolConvention) -> ProviderSymbol {
    match convention {
        SymbolConvention::Yahoo => to_yahoo(symbol),
        SymbolConvention::Finnhub => to_finnhub(symbol),
    }
}

fn to_yahoo(symbol: &str) -> ProviderSymbol {
    // Indices, futures and FX pairs are already in Yahoo form
    if symbol.contains('^') || symbol.contains('=') {
        return symbol.to_string();
    }
    if has_exchange_suffix(symbol) {
        return symbol.to_string();
    }
    symbol.replace('.', "-")
}

fn to_finnhub(symbol: &str) -> ProviderSymbol {
    match split_yahoo_suffix(symbol) {
        Some((ticker, exchange)) => match exchange.finnhub {
            Some(suffix) => format!("{}{}", ticker.replace('-', "."), suffix),
            None => symbol.to_string(),
        },
        None => symbol.replace('-', "."),
    }
}

/// Append an exchange suffix to a bare ticker unless it already carries it.
///
/// The ticker is trimmed first; manifest cells often carry stray whitespace.
pub fn apply_exchange_suffix(ticker: &str, suffix: &str) -> String {
    let ticker = ticker.trim();
    if suffix.is_empty() || ticker.ends_with(suffix) {
        ticker.to_string()
    } else {
        format!("{}{}", ticker, suffix)
    }
}

/// Left-pad a numeric ticker with zeros (`5` -> `0005`).
pub fn zero_pad(ticker: &str, width: usize) -> String {
    format!("{:0>width$}", ticker.trim(), width = width)
}
