//! Quote provider trait definition.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::errors::MarketDataError;
use crate::models::{ProviderSymbol, RawQuote};
use crate::resolver::SymbolConvention;

use super::capabilities::{ProviderCapabilities, RateLimit};

/// A source of current quotes.
///
/// Providers receive symbols already normalized to their
/// [`SymbolConvention`]. They return unvalidated [`RawQuote`]s; price
/// validation and percent-change math happen in the cascade.
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use tickerboard_market_data::provider::{ProviderCapabilities, QuoteProvider, RateLimit};
///
/// struct MyProvider;
///
/// #[async_trait]
/// impl QuoteProvider for MyProvider {
///     fn id(&self) -> &'static str {
///         "MY_PROVIDER"
///     }
///
///     fn convention(&self) -> SymbolConvention {
///         SymbolConvention::Yahoo
///     }
///
///     fn capabilities(&self) -> ProviderCapabilities {
///         ProviderCapabilities::single_only()
///     }
///
///     fn rate_limit(&self) -> RateLimit {
///         RateLimit::default()
///     }
///
///     async fn fetch_one(&self, symbol: &str) -> Result<Option<RawQuote>, MarketDataError> {
///         // ...
///     }
/// }
/// ```
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Unique identifier for this provider.
    ///
    /// Used for logging, circuit breaker and rate limiter bookkeeping.
    fn id(&self) -> &'static str;

    /// Lower values are tried first. Default is 10.
    fn priority(&self) -> u8 {
        10
    }

    /// Symbol spelling this provider expects.
    fn convention(&self) -> SymbolConvention;

    fn capabilities(&self) -> ProviderCapabilities;

    fn rate_limit(&self) -> RateLimit;

    /// Whether the provider is configured well enough to be called at all.
    ///
    /// Must be deterministic for the lifetime of the provider (a missing
    /// API key stays missing).
    fn is_available(&self) -> bool {
        true
    }

    /// Quote many symbols with one request.
    ///
    /// Symbols the source does not know are simply absent from the map.
    /// Default implementation returns `NotSupported`.
    async fn fetch_batch(
        &self,
        symbols: &[ProviderSymbol],
    ) -> Result<HashMap<ProviderSymbol, RawQuote>, MarketDataError> {
        let _ = symbols;
        Err(MarketDataError::NotSupported {
            operation: "fetch_batch".to_string(),
            provider: self.id().to_string(),
        })
    }

    /// Quote a single symbol.
    ///
    /// An unknown symbol is `Ok(None)`, not an error.
    async fn fetch_one(&self, symbol: &str) -> Result<Option<RawQuote>, MarketDataError>;
}
