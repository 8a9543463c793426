//! Provider registry for quote fetching.
//!
//! The registry owns the three provider tiers and wraps every call with:
//! - symbol normalization for the provider's convention
//! - availability tracking (an unavailable provider is logged once per run)
//! - circuit breaking and rate limiting
//! - a per-call timeout
//! - raw quote validation
//!
//! Every single-symbol call is reduced to a [`FetchOutcome`]; errors never
//! escape, they end up in the symbol's [`FetchDiagnostics`].

use std::borrow::Cow;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use log::{debug, info, warn};

use super::{CircuitBreaker, FetchDiagnostics, QuoteValidator, RateLimiter, SkipReason};
use crate::errors::{MarketDataError, RetryClass};
use crate::models::{ProviderId, ProviderSymbol, RawQuote};
use crate::provider::QuoteProvider;
use crate::resolver::{normalize, SymbolCompatibility, SymbolConvention};

/// Default per-call timeout.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(30);

/// Result of asking one provider about one symbol.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FetchOutcome {
    /// A validated quote.
    Found(RawQuote),
    /// The provider answered without a usable quote, or the call failed.
    NotFound,
    /// The provider cannot be used this run.
    Unavailable,
}

/// A quote together with the provider that produced it.
#[derive(Clone, Debug, PartialEq)]
pub struct SourcedQuote {
    pub provider_id: ProviderId,
    pub quote: RawQuote,
}

pub struct ProviderRegistry {
    bulk: Arc<dyn QuoteProvider>,
    primary: Vec<Arc<dyn QuoteProvider>>,
    secondary: Vec<Arc<dyn QuoteProvider>>,
    compatibility: SymbolCompatibility,
    rate_limiter: RateLimiter,
    circuit_breaker: CircuitBreaker,
    validator: QuoteValidator,
    call_timeout: Duration,
    /// Providers already found unavailable during the current run.
    unavailable: Mutex<HashSet<&'static str>>,
}

impl ProviderRegistry {
    /// Create a registry from a bulk source and two fallback tiers.
    ///
    /// Fallbacks are ordered by `priority()` within their tier. Rate limits
    /// are configured from each provider's declared `rate_limit()`.
    pub fn new(
        bulk: Arc<dyn QuoteProvider>,
        mut primary: Vec<Arc<dyn QuoteProvider>>,
        mut secondary: Vec<Arc<dyn QuoteProvider>>,
    ) -> Self {
        primary.sort_by_key(|p| p.priority());
        secondary.sort_by_key(|p| p.priority());

        let rate_limiter = RateLimiter::new();
        for provider in std::iter::once(&bulk).chain(&primary).chain(&secondary) {
            rate_limiter.configure(provider.id(), &provider.rate_limit());
        }

        Self {
            bulk,
            primary,
            secondary,
            compatibility: SymbolCompatibility::default(),
            rate_limiter,
            circuit_breaker: CircuitBreaker::new(),
            validator: QuoteValidator::new(),
            call_timeout: DEFAULT_CALL_TIMEOUT,
            unavailable: Mutex::new(HashSet::new()),
        }
    }

    pub fn with_compatibility(mut self, compatibility: SymbolCompatibility) -> Self {
        self.compatibility = compatibility;
        self
    }

    pub fn with_call_timeout(mut self, call_timeout: Duration) -> Self {
        self.call_timeout = call_timeout;
        self
    }

    pub fn bulk_id(&self) -> &'static str {
        self.bulk.id()
    }

    pub fn bulk_convention(&self) -> SymbolConvention {
        self.bulk.convention()
    }

    /// Largest batch the bulk source accepts.
    pub fn bulk_max_batch_size(&self) -> usize {
        let caps = self.bulk.capabilities();
        if caps.supports_batch {
            caps.max_batch_size.max(1)
        } else {
            1
        }
    }

    pub fn validator(&self) -> &QuoteValidator {
        &self.validator
    }

    fn lock_unavailable(&self) -> MutexGuard<'_, HashSet<&'static str>> {
        self.unavailable.lock().unwrap_or_else(|poisoned| {
            warn!("Unavailable-provider set was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Forget which providers were unavailable. Call at the start of a run.
    pub fn begin_run(&self) {
        self.lock_unavailable().clear();
    }

    /// Mark a provider unavailable for the rest of the run.
    /// Logs only the first time per run.
    fn mark_unavailable(&self, provider_id: &'static str, why: &str) {
        if self.lock_unavailable().insert(provider_id) {
            warn!(
                "Provider '{}' unavailable ({}); skipping it for the rest of this run",
                provider_id, why
            );
        }
    }

    /// Whether the provider can be called at all this run.
    fn check_available(&self, provider: &dyn QuoteProvider) -> bool {
        let id = provider.id();
        if self.lock_unavailable().contains(id) {
            return false;
        }
        if !provider.is_available() {
            self.mark_unavailable(id, "not configured");
            return false;
        }
        true
    }

    fn record_call_error(&self, provider_id: &'static str, error: &MarketDataError) {
        match error.retry_class() {
            RetryClass::Unavailable => self.mark_unavailable(provider_id, &error.to_string()),
            RetryClass::FailoverWithPenalty => self.circuit_breaker.record_failure(provider_id),
            RetryClass::NextProvider | RetryClass::Abort => {}
        }
    }

    /// One bulk call for a batch of already-normalized symbols.
    ///
    /// Any failure (unavailable source, open circuit, error, timeout) yields
    /// an empty map so every symbol falls through to the fallbacks.
    pub async fn fetch_bulk(&self, symbols: &[ProviderSymbol]) -> HashMap<ProviderSymbol, RawQuote> {
        let provider = self.bulk.as_ref();
        let id = provider.id();

        if symbols.is_empty() || !self.check_available(provider) {
            return HashMap::new();
        }
        if !self.circuit_breaker.is_allowed(id) {
            debug!("Circuit open for bulk provider '{}', skipping batch", id);
            return HashMap::new();
        }

        self.rate_limiter.acquire(id).await;

        let result = match tokio::time::timeout(self.call_timeout, provider.fetch_batch(symbols)).await
        {
            Ok(result) => result,
            Err(_) => Err(MarketDataError::Timeout {
                provider: id.to_string(),
            }),
        };

        match result {
            Ok(quotes) => {
                self.circuit_breaker.record_success(id);
                info!(
                    "Bulk provider '{}' returned {}/{} symbols",
                    id,
                    quotes.len(),
                    symbols.len()
                );
                quotes
            }
            Err(e) => {
                warn!("Bulk fetch from '{}' failed: {}", id, e);
                self.record_call_error(id, &e);
                HashMap::new()
            }
        }
    }

    /// Ask one provider about one canonical symbol.
    pub async fn fetch_single(
        &self,
        provider: &dyn QuoteProvider,
        symbol: &str,
        diagnostics: &mut FetchDiagnostics,
    ) -> FetchOutcome {
        let id = provider.id();
        let provider_id: ProviderId = Cow::Borrowed(id);

        if !self.check_available(provider) {
            diagnostics.record_skip(provider_id, SkipReason::Unavailable);
            return FetchOutcome::Unavailable;
        }
        if !self.circuit_breaker.is_allowed(id) {
            diagnostics.record_skip(provider_id, SkipReason::CircuitBreakerOpen);
            return FetchOutcome::NotFound;
        }

        let provider_symbol = normalize(symbol, provider.convention());
        self.rate_limiter.acquire(id).await;

        debug!("Fetching {} as '{}' from '{}'", symbol, provider_symbol, id);

        let result =
            match tokio::time::timeout(self.call_timeout, provider.fetch_one(&provider_symbol)).await
            {
                Ok(result) => result,
                Err(_) => Err(MarketDataError::Timeout {
                    provider: id.to_string(),
                }),
            };

        match result {
            Ok(Some(quote)) => {
                self.circuit_breaker.record_success(id);
                match self.validator.validate(symbol, &quote) {
                    Ok(()) => {
                        diagnostics.record_success(provider_id);
                        FetchOutcome::Found(quote)
                    }
                    Err(e) => {
                        diagnostics.record_error(provider_id, e.to_string());
                        FetchOutcome::NotFound
                    }
                }
            }
            Ok(None) => {
                self.circuit_breaker.record_success(id);
                diagnostics.record_not_found(provider_id);
                FetchOutcome::NotFound
            }
            Err(e) => {
                debug!("'{}' failed for {}: {}", id, symbol, e);
                self.record_call_error(id, &e);
                diagnostics.record_error(provider_id, e.to_string());
                if e.retry_class() == RetryClass::Unavailable {
                    FetchOutcome::Unavailable
                } else {
                    FetchOutcome::NotFound
                }
            }
        }
    }

    /// Try the single-symbol fallbacks of the primary source family.
    /// First found quote wins.
    pub async fn fetch_primary(
        &self,
        symbol: &str,
        diagnostics: &mut FetchDiagnostics,
    ) -> Option<SourcedQuote> {
        for provider in &self.primary {
            if let FetchOutcome::Found(quote) =
                self.fetch_single(provider.as_ref(), symbol, diagnostics).await
            {
                return Some(SourcedQuote {
                    provider_id: Cow::Borrowed(provider.id()),
                    quote,
                });
            }
        }
        None
    }

    /// Try the independent secondary sources.
    ///
    /// A symbol the compatibility predicate rejects is never sent; the skip
    /// is recorded and does not count as a failed call.
    pub async fn fetch_secondary(
        &self,
        symbol: &str,
        diagnostics: &mut FetchDiagnostics,
    ) -> Option<SourcedQuote> {
        for provider in &self.secondary {
            if !self.compatibility.is_compatible(symbol) {
                diagnostics.record_skip(Cow::Borrowed(provider.id()), SkipReason::IncompatibleSymbol);
                continue;
            }
            if let FetchOutcome::Found(quote) =
                self.fetch_single(provider.as_ref(), symbol, diagnostics).await
            {
                return Some(SourcedQuote {
                    provider_id: Cow::Borrowed(provider.id()),
                    quote,
                });
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{ProviderCapabilities, RateLimit};
    use std::sync::atomic::{AtomicUsize, Ordering};

    enum Behavior {
        Quote(RawQuote),
        Missing,
        Fail(fn() -> MarketDataError),
        Hang,
    }

    struct MockProvider {
        id: &'static str,
        priority: u8,
        available: bool,
        behavior: Behavior,
        call_count: AtomicUsize,
        last_symbol: Mutex<Option<String>>,
    }

    impl MockProvider {
        fn new(id: &'static str, behavior: Behavior) -> Self {
            Self {
                id,
                priority: 10,
                available: true,
                behavior,
                call_count: AtomicUsize::new(0),
                last_symbol: Mutex::new(None),
            }
        }

        fn calls(&self) -> usize {
            self.call_count.load(Ordering::SeqCst)
        }
    }

    #[async_trait::async_trait]
    impl QuoteProvider for MockProvider {
        fn id(&self) -> &'static str {
            self.id
        }

        fn priority(&self) -> u8 {
            self.priority
        }

        fn convention(&self) -> SymbolConvention {
            SymbolConvention::Finnhub
        }

        fn capabilities(&self) -> ProviderCapabilities {
            ProviderCapabilities {
                supports_batch: true,
                supports_single: true,
                max_batch_size: 3,
            }
        }

        fn rate_limit(&self) -> RateLimit {
            RateLimit {
                requests_per_minute: 6000,
                burst: 100,
                min_delay: Duration::ZERO,
            }
        }

        fn is_available(&self) -> bool {
            self.available
        }

        async fn fetch_batch(
            &self,
            symbols: &[ProviderSymbol],
        ) -> Result<HashMap<ProviderSymbol, RawQuote>, MarketDataError> {
            self.call_count.fetch_add(1, Ordering::SeqCst);
            match &self.behavior {
                Behavior::Quote(q) => Ok(symbols.iter().map(|s| (s.clone(), *q)).collect()),
                Behavior::Missing => Ok(HashMap::new()),
                Behavior::Fail(make) => Err(make()),
                Behavior::Hang => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Ok(HashMap::new())
                }
            }
        }

        async fn fetch_one(&self, symbol: &str) -> Result<Option<RawQuote>, MarketDataError> {
            self.call_count.fetch_add(1, Ordering::SeqCst);
            *self.last_symbol.lock().unwrap() = Some(symbol.to_string());
            match &self.behavior {
                Behavior::Quote(q) => Ok(Some(*q)),
                Behavior::Missing => Ok(None),
                Behavior::Fail(make) => Err(make()),
                Behavior::Hang => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Ok(None)
                }
            }
        }
    }

    fn registry(
        bulk: Arc<MockProvider>,
        primary: Vec<Arc<MockProvider>>,
        secondary: Vec<Arc<MockProvider>>,
    ) -> ProviderRegistry {
        ProviderRegistry::new(
            bulk,
            primary.into_iter().map(|p| p as Arc<dyn QuoteProvider>).collect(),
            secondary.into_iter().map(|p| p as Arc<dyn QuoteProvider>).collect(),
        )
    }

    #[tokio::test]
    async fn test_fetch_single_found_normalizes_symbol() {
        let provider = Arc::new(MockProvider::new(
            "MOCK",
            Behavior::Quote(RawQuote::new(10.0, Some(8.0))),
        ));
        let reg = registry(provider.clone(), vec![], vec![]);
        let mut diag = FetchDiagnostics::new();

        let outcome = reg.fetch_single(provider.as_ref(), "BRK-B", &mut diag).await;

        assert_eq!(outcome, FetchOutcome::Found(RawQuote::new(10.0, Some(8.0))));
        assert_eq!(provider.last_symbol.lock().unwrap().as_deref(), Some("BRK.B"));
        assert!(diag.has_success());
    }

    #[tokio::test]
    async fn test_invalid_quote_is_not_found() {
        let provider = Arc::new(MockProvider::new(
            "MOCK",
            Behavior::Quote(RawQuote::new(0.0, Some(8.0))),
        ));
        let reg = registry(provider.clone(), vec![], vec![]);
        let mut diag = FetchDiagnostics::new();

        let outcome = reg.fetch_single(provider.as_ref(), "AAA", &mut diag).await;
        assert_eq!(outcome, FetchOutcome::NotFound);
        assert!(diag.summary().contains("MOCK: ERROR (Validation failed"));
    }

    #[tokio::test]
    async fn test_unavailable_provider_never_called() {
        let mut secondary = MockProvider::new("SECONDARY", Behavior::Quote(RawQuote::new(1.0, None)));
        secondary.available = false;
        let secondary = Arc::new(secondary);
        let bulk = Arc::new(MockProvider::new("BULK", Behavior::Missing));
        let reg = registry(bulk, vec![], vec![secondary.clone()]);

        for _ in 0..3 {
            let mut diag = FetchDiagnostics::new();
            assert!(reg.fetch_secondary("AAA", &mut diag).await.is_none());
            assert_eq!(diag.skip_reasons()[0].1, &SkipReason::Unavailable);
        }
        assert_eq!(secondary.calls(), 0);
    }

    #[tokio::test]
    async fn test_source_unavailable_error_sticks_until_next_run() {
        let secondary = Arc::new(MockProvider::new(
            "SECONDARY",
            Behavior::Fail(|| MarketDataError::SourceUnavailable {
                provider: "SECONDARY".to_string(),
            }),
        ));
        let bulk = Arc::new(MockProvider::new("BULK", Behavior::Missing));
        let reg = registry(bulk, vec![], vec![secondary.clone()]);

        let mut diag = FetchDiagnostics::new();
        reg.fetch_secondary("AAA", &mut diag).await;
        reg.fetch_secondary("BBB", &mut diag).await;
        assert_eq!(secondary.calls(), 1);

        reg.begin_run();
        reg.fetch_secondary("CCC", &mut diag).await;
        assert_eq!(secondary.calls(), 2);
    }

    #[tokio::test]
    async fn test_incompatible_symbol_skips_secondary() {
        let secondary = Arc::new(MockProvider::new(
            "SECONDARY",
            Behavior::Quote(RawQuote::new(1.0, None)),
        ));
        let bulk = Arc::new(MockProvider::new("BULK", Behavior::Missing));
        let reg = registry(bulk, vec![], vec![secondary.clone()]);

        let mut diag = FetchDiagnostics::new();
        assert!(reg.fetch_secondary("^GSPC", &mut diag).await.is_none());
        assert_eq!(secondary.calls(), 0);
        assert_eq!(diag.skip_reasons()[0].1, &SkipReason::IncompatibleSymbol);
        assert_eq!(diag.called().count(), 0);
    }

    #[tokio::test]
    async fn test_share_class_reaches_secondary_in_either_spelling() {
        let secondary = Arc::new(MockProvider::new(
            "SECONDARY",
            Behavior::Quote(RawQuote::new(400.0, Some(398.0))),
        ));
        let bulk = Arc::new(MockProvider::new("BULK", Behavior::Missing));
        let reg = registry(bulk, vec![], vec![secondary.clone()]);

        for symbol in ["BRK.B", "BRK-B"] {
            let mut diag = FetchDiagnostics::new();
            let found = reg.fetch_secondary(symbol, &mut diag).await;
            assert!(found.is_some(), "{} was not sent to the secondary", symbol);
            assert_eq!(provider_symbol(&secondary), Some("BRK.B".to_string()));
        }
        assert_eq!(secondary.calls(), 2);
    }

    fn provider_symbol(provider: &MockProvider) -> Option<String> {
        provider.last_symbol.lock().unwrap().clone()
    }

    #[tokio::test]
    async fn test_primary_tier_priority_order() {
        let mut low = MockProvider::new("LOW", Behavior::Quote(RawQuote::new(2.0, None)));
        low.priority = 20;
        let mut high = MockProvider::new("HIGH", Behavior::Missing);
        high.priority = 1;
        let (low, high) = (Arc::new(low), Arc::new(high));
        let bulk = Arc::new(MockProvider::new("BULK", Behavior::Missing));
        let reg = registry(bulk, vec![low.clone(), high.clone()], vec![]);

        let mut diag = FetchDiagnostics::new();
        let found = reg.fetch_primary("AAA", &mut diag).await.unwrap();

        assert_eq!(found.provider_id, "LOW");
        assert_eq!(diag.summary(), "HIGH: NOT FOUND -> LOW: SUCCESS");
    }

    #[tokio::test]
    async fn test_bulk_error_yields_empty_map() {
        let bulk = Arc::new(MockProvider::new(
            "BULK",
            Behavior::Fail(|| MarketDataError::ProviderError {
                provider: "BULK".to_string(),
                message: "boom".to_string(),
            }),
        ));
        let reg = registry(bulk.clone(), vec![], vec![]);

        let quotes = reg.fetch_bulk(&["AAA".to_string()]).await;
        assert!(quotes.is_empty());
        assert_eq!(bulk.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_bulk_timeout_yields_empty_map() {
        let bulk = Arc::new(MockProvider::new("BULK", Behavior::Hang));
        let reg = registry(bulk.clone(), vec![], vec![])
            .with_call_timeout(Duration::from_millis(50));

        let quotes = reg.fetch_bulk(&["AAA".to_string()]).await;
        assert!(quotes.is_empty());
        assert_eq!(reg.circuit_breaker.failure_count("BULK"), 1);
    }

    #[tokio::test]
    async fn test_rate_limited_penalizes_circuit() {
        let provider = Arc::new(MockProvider::new(
            "FLAKY",
            Behavior::Fail(|| MarketDataError::RateLimited {
                provider: "FLAKY".to_string(),
            }),
        ));
        let bulk = Arc::new(MockProvider::new("BULK", Behavior::Missing));
        let reg = registry(bulk, vec![provider.clone()], vec![]);

        for _ in 0..5 {
            let mut diag = FetchDiagnostics::new();
            reg.fetch_primary("AAA", &mut diag).await;
        }
        assert_eq!(provider.calls(), 5);

        // Circuit now open: provider is skipped without a call
        let mut diag = FetchDiagnostics::new();
        reg.fetch_primary("AAA", &mut diag).await;
        assert_eq!(provider.calls(), 5);
        assert_eq!(diag.skip_reasons()[0].1, &SkipReason::CircuitBreakerOpen);
    }

    #[test]
    fn test_bulk_max_batch_size() {
        let bulk = Arc::new(MockProvider::new("BULK", Behavior::Missing));
        let reg = registry(bulk, vec![], vec![]);
        assert_eq!(reg.bulk_max_batch_size(), 3);
    }
}
