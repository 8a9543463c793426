//! Batch orchestration over a whole manifest.
//!
//! Symbols are cut into contiguous batches. Each batch gets one bulk call,
//! then every symbol runs through the [`ResolutionCascade`] with bounded
//! concurrency. Batches run strictly one after another with a pause in
//! between, and results keep input order.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures::stream::{self, StreamExt};
use tracing::{debug, info, warn};

use crate::cascade::{Resolution, ResolutionCascade};
use crate::errors::MarketDataError;
use crate::models::{ProviderSymbol, RunResult, TickerRecord};
use crate::registry::ProviderRegistry;
use crate::resolver::normalize;

/// Failed symbols are listed individually only when there are fewer than this.
const FAILED_LISTING_THRESHOLD: usize = 20;
const FAILED_LISTING_LIMIT: usize = 10;

#[derive(Clone, Debug)]
pub struct OrchestratorConfig {
    /// Pause between consecutive batches (not after the last one).
    pub batch_pause: Duration,
    /// Upper bound on any single provider call.
    pub call_timeout: Duration,
    /// Fallback calls in flight per batch.
    pub fallback_concurrency: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            batch_pause: Duration::from_secs(1),
            call_timeout: Duration::from_secs(30),
            fallback_concurrency: 8,
        }
    }
}

impl OrchestratorConfig {
    pub fn validate(&self) -> Result<(), MarketDataError> {
        if self.fallback_concurrency == 0 {
            return Err(MarketDataError::Configuration(
                "fallback_concurrency must be at least 1".to_string(),
            ));
        }
        if self.call_timeout.is_zero() {
            return Err(MarketDataError::Configuration(
                "call_timeout must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

pub struct BatchOrchestrator {
    cascade: ResolutionCascade,
    config: OrchestratorConfig,
}

impl BatchOrchestrator {
    /// The registry's call timeout is replaced by `config.call_timeout`.
    pub fn new(registry: ProviderRegistry, config: OrchestratorConfig) -> Self {
        let registry = registry.with_call_timeout(config.call_timeout);
        Self {
            cascade: ResolutionCascade::new(Arc::new(registry)),
            config,
        }
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Resolve every record into exactly one priced or failed entry.
    ///
    /// Only configuration problems are errors; anything that goes wrong for
    /// an individual symbol ends up in `RunResult::failed`.
    pub async fn resolve_all(
        &self,
        records: &[TickerRecord],
        batch_size: usize,
    ) -> Result<RunResult, MarketDataError> {
        if batch_size == 0 {
            return Err(MarketDataError::Configuration(
                "batch_size must be at least 1".to_string(),
            ));
        }
        self.config.validate()?;

        if records.is_empty() {
            return Ok(RunResult::empty());
        }

        let registry = self.cascade.registry();
        registry.begin_run();

        let effective = batch_size.min(registry.bulk_max_batch_size());
        if effective < batch_size {
            debug!(
                "Batch size {} capped to {} by '{}'",
                batch_size,
                effective,
                registry.bulk_id()
            );
        }

        let total_batches = records.len().div_ceil(effective);
        let mut priced = Vec::with_capacity(records.len());
        let mut failed = Vec::new();

        for (index, batch) in records.chunks(effective).enumerate() {
            info!(
                "Processing batch {}/{} ({} symbols)",
                index + 1,
                total_batches,
                batch.len()
            );

            let resolutions = self.resolve_batch(batch).await;

            let before = (priced.len(), failed.len());
            for resolution in resolutions {
                match resolution {
                    Resolution::Resolved(result) => priced.push(result),
                    Resolution::Failed(failure) => failed.push(failure),
                }
            }
            debug!(
                "Batch {}/{}: {} priced, {} failed",
                index + 1,
                total_batches,
                priced.len() - before.0,
                failed.len() - before.1
            );

            if index + 1 < total_batches && !self.config.batch_pause.is_zero() {
                tokio::time::sleep(self.config.batch_pause).await;
            }
        }

        info!(
            "Resolved {} symbols: {} priced, {} failed",
            records.len(),
            priced.len(),
            failed.len()
        );
        if !failed.is_empty() && failed.len() < FAILED_LISTING_THRESHOLD {
            let listed: Vec<&str> = failed
                .iter()
                .take(FAILED_LISTING_LIMIT)
                .map(|f| f.symbol.as_ref())
                .collect();
            warn!("Failed tickers: {}", listed.join(", "));
        }

        Ok(RunResult::new(Utc::now(), priced, failed))
    }

    async fn resolve_batch(&self, batch: &[TickerRecord]) -> Vec<Resolution> {
        let registry = self.cascade.registry();
        let convention = registry.bulk_convention();

        let provider_symbols: Vec<ProviderSymbol> = batch
            .iter()
            .map(|record| normalize(&record.symbol, convention))
            .collect();

        let hits = registry.fetch_bulk(&provider_symbols).await;

        stream::iter(batch.iter().zip(&provider_symbols))
            .map(|(record, provider_symbol)| {
                let hit = hits.get(provider_symbol).copied();
                self.cascade.resolve(record, hit)
            })
            .buffered(self.config.fallback_concurrency)
            .collect()
            .await
    }
}
