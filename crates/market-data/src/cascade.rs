//! Per-symbol resolution cascade.
//!
//! Given the bulk call's answer for one symbol (if any), decide the final
//! outcome:
//!
//! 1. **Batch hit**: a valid batch price with a usable reference resolves
//!    immediately; no fallback is called.
//! 2. **Primary fallback**: single-symbol calls to the primary source family.
//! 3. **Secondary fallback**: independent sources, only for compatible symbols.
//! 4. **Exhausted**: a valid batch price without reference resolves at 0%
//!    change; otherwise the symbol fails with the attempt summary.

use std::borrow::Cow;
use std::sync::Arc;

use tracing::debug;

use crate::models::{FailureRecord, ProviderId, QuoteResult, RawQuote, TickerRecord};
use crate::registry::{FetchDiagnostics, ProviderRegistry, SourcedQuote};

/// Final outcome for one symbol.
#[derive(Clone, Debug, PartialEq)]
pub enum Resolution {
    Resolved(QuoteResult),
    Failed(FailureRecord),
}

pub struct ResolutionCascade {
    registry: Arc<ProviderRegistry>,
}

impl ResolutionCascade {
    pub fn new(registry: Arc<ProviderRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    pub async fn resolve(&self, record: &TickerRecord, batch_hit: Option<RawQuote>) -> Resolution {
        let symbol = record.symbol.as_ref();
        let bulk_id: ProviderId = Cow::Borrowed(self.registry.bulk_id());
        let mut diagnostics = FetchDiagnostics::new();

        // Step 1: batch hit
        let mut pending: Option<RawQuote> = None;
        match batch_hit {
            Some(hit) => match self.registry.validator().validate(symbol, &hit) {
                Ok(()) if hit.usable_reference().is_some() => {
                    return self.accept(record, &hit, bulk_id, &mut diagnostics);
                }
                Ok(()) => {
                    debug!("{}: batch price without reference, trying fallbacks", symbol);
                    diagnostics.record_error(bulk_id.clone(), "no reference price".to_string());
                    pending = Some(hit);
                }
                Err(e) => diagnostics.record_error(bulk_id.clone(), e.to_string()),
            },
            None => diagnostics.record_not_found(bulk_id.clone()),
        }

        // Step 2: primary fallback
        if let Some(found) = self.registry.fetch_primary(symbol, &mut diagnostics).await {
            return self.accept_sourced(record, found, &mut diagnostics);
        }

        // Step 3: secondary fallback
        if let Some(found) = self.registry.fetch_secondary(symbol, &mut diagnostics).await {
            return self.accept_sourced(record, found, &mut diagnostics);
        }

        // Step 4: exhausted
        if let Some(hit) = pending {
            debug!("{}: falling back to batch price with zero change", symbol);
            let flat = RawQuote::new(hit.price, None);
            return self.accept(record, &flat, bulk_id, &mut diagnostics);
        }

        debug!("{}: exhausted ({})", symbol, diagnostics.summary());
        Resolution::Failed(FailureRecord::new(
            record.symbol.clone(),
            Some(diagnostics.summary()),
        ))
    }

    fn accept_sourced(
        &self,
        record: &TickerRecord,
        found: SourcedQuote,
        diagnostics: &mut FetchDiagnostics,
    ) -> Resolution {
        self.accept(record, &found.quote, found.provider_id, diagnostics)
    }

    fn accept(
        &self,
        record: &TickerRecord,
        quote: &RawQuote,
        source: ProviderId,
        diagnostics: &mut FetchDiagnostics,
    ) -> Resolution {
        match QuoteResult::from_raw(record.symbol.clone(), quote, source.clone()) {
            Some(result) => Resolution::Resolved(result),
            None => {
                diagnostics.record_error(source, format!("unrepresentable price {}", quote.price));
                Resolution::Failed(FailureRecord::new(
                    record.symbol.clone(),
                    Some(diagnostics.summary()),
                ))
            }
        }
    }
}
