//! Scripted providers shared by the unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::errors::MarketDataError;
use crate::models::{ProviderSymbol, RawQuote};
use crate::provider::{ProviderCapabilities, QuoteProvider, RateLimit};
use crate::registry::ProviderRegistry;
use crate::resolver::SymbolConvention;

/// Provider answering from a fixed symbol -> quote table.
pub struct ScriptedProvider {
    pub id: &'static str,
    pub quotes: HashMap<String, RawQuote>,
    pub fail_batch: bool,
    pub max_batch_size: usize,
    pub batch_calls: AtomicUsize,
    pub single_calls: AtomicUsize,
    pub batches_seen: Mutex<Vec<Vec<String>>>,
}

impl ScriptedProvider {
    pub fn new(id: &'static str, quotes: &[(&str, RawQuote)]) -> Self {
        Self {
            id,
            quotes: quotes.iter().map(|(s, q)| (s.to_string(), *q)).collect(),
            fail_batch: false,
            max_batch_size: 50,
            batch_calls: AtomicUsize::new(0),
            single_calls: AtomicUsize::new(0),
            batches_seen: Mutex::new(Vec::new()),
        }
    }

    pub fn single_calls(&self) -> usize {
        self.single_calls.load(Ordering::SeqCst)
    }

    pub fn batch_calls(&self) -> usize {
        self.batch_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl QuoteProvider for ScriptedProvider {
    fn id(&self) -> &'static str {
        self.id
    }

    fn convention(&self) -> SymbolConvention {
        SymbolConvention::Yahoo
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities {
            supports_batch: true,
            supports_single: true,
            max_batch_size: self.max_batch_size,
        }
    }

    fn rate_limit(&self) -> RateLimit {
        RateLimit {
            requests_per_minute: 60_000,
            burst: 1000,
            min_delay: std::time::Duration::ZERO,
        }
    }

    async fn fetch_batch(
        &self,
        symbols: &[ProviderSymbol],
    ) -> Result<HashMap<ProviderSymbol, RawQuote>, MarketDataError> {
        self.batch_calls.fetch_add(1, Ordering::SeqCst);
        self.batches_seen.lock().unwrap().push(symbols.to_vec());
        if self.fail_batch {
            return Err(MarketDataError::ProviderError {
                provider: self.id.to_string(),
                message: "bulk endpoint down".to_string(),
            });
        }
        Ok(symbols
            .iter()
            .filter_map(|s| self.quotes.get(s).map(|q| (s.clone(), *q)))
            .collect())
    }

    async fn fetch_one(&self, symbol: &str) -> Result<Option<RawQuote>, MarketDataError> {
        self.single_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.quotes.get(symbol).copied())
    }
}

pub fn registry(
    bulk: &Arc<ScriptedProvider>,
    primary: &Arc<ScriptedProvider>,
    secondary: &Arc<ScriptedProvider>,
) -> ProviderRegistry {
    ProviderRegistry::new(
        bulk.clone(),
        vec![primary.clone() as Arc<dyn QuoteProvider>],
        vec![secondary.clone() as Arc<dyn QuoteProvider>],
    )
}
