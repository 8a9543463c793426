//! Shared mock providers for the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tickerboard_market_data::{
    MarketDataError, OrchestratorConfig, ProviderCapabilities, ProviderSymbol, QuoteProvider,
    RateLimit, RawQuote, SymbolConvention, TickerRecord,
};

/// Provider answering from a fixed table and recording every symbol asked.
pub struct MockProvider {
    id: &'static str,
    convention: SymbolConvention,
    quotes: HashMap<String, RawQuote>,
    fail: bool,
    available: bool,
    max_batch_size: usize,
    single_calls: Mutex<Vec<String>>,
    batch_calls: Mutex<Vec<Vec<String>>>,
}

impl MockProvider {
    pub fn new(id: &'static str) -> Self {
        Self {
            id,
            convention: SymbolConvention::Yahoo,
            quotes: HashMap::new(),
            fail: false,
            available: true,
            max_batch_size: 50,
            single_calls: Mutex::new(Vec::new()),
            batch_calls: Mutex::new(Vec::new()),
        }
    }

    pub fn quote(mut self, symbol: &str, price: f64, reference: Option<f64>) -> Self {
        self.quotes
            .insert(symbol.to_string(), RawQuote::new(price, reference));
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    pub fn unavailable(mut self) -> Self {
        self.available = false;
        self
    }

    pub fn convention(mut self, convention: SymbolConvention) -> Self {
        self.convention = convention;
        self
    }

    pub fn max_batch_size(mut self, size: usize) -> Self {
        self.max_batch_size = size;
        self
    }

    pub fn build(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn single_calls(&self) -> Vec<String> {
        self.single_calls.lock().unwrap().clone()
    }

    pub fn batch_calls(&self) -> Vec<Vec<String>> {
        self.batch_calls.lock().unwrap().clone()
    }

    fn error(&self) -> MarketDataError {
        MarketDataError::ProviderError {
            provider: self.id.to_string(),
            message: "scripted failure".to_string(),
        }
    }
}

#[async_trait]
impl QuoteProvider for MockProvider {
    fn id(&self) -> &'static str {
        self.id
    }

    fn convention(&self) -> SymbolConvention {
        self.convention
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
            burst: 1_000,
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
        self.batch_calls.lock().unwrap().push(symbols.to_vec());
        if self.fail {
            return Err(self.error());
        }
        Ok(symbols
            .iter()
            .filter_map(|s| self.quotes.get(s).map(|q| (s.clone(), *q)))
            .collect())
    }

    async fn fetch_one(&self, symbol: &str) -> Result<Option<RawQuote>, MarketDataError> {
        self.single_calls.lock().unwrap().push(symbol.to_string());
        if self.fail {
            return Err(self.error());
        }
        Ok(self.quotes.get(symbol).copied())
    }
}

pub fn as_dyn(provider: &Arc<MockProvider>) -> Arc<dyn QuoteProvider> {
    provider.clone()
}

pub fn no_pause() -> OrchestratorConfig {
    OrchestratorConfig {
        batch_pause: Duration::ZERO,
        ..Default::default()
    }
}

pub fn records(symbols: &[&str]) -> Vec<TickerRecord> {
    symbols
        .iter()
        .map(|s| TickerRecord::new(s, format!("{} Inc.", s)))
        .collect()
}
