//! Per-symbol attempt tracking.
//!
//! Every provider the cascade considers for a symbol leaves one entry here.
//! The summary ends up in `FailureRecord.error` when the symbol is exhausted.

use std::fmt;

use crate::models::ProviderId;

/// Why a provider was not called for a symbol.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SkipReason {
    /// The symbol contains a marker the secondary source cannot serve.
    IncompatibleSymbol,

    /// The provider reported itself unavailable this run.
    Unavailable,

    /// Circuit breaker is open for this provider.
    CircuitBreakerOpen,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IncompatibleSymbol => f.write_str("incompatible symbol"),
            Self::Unavailable => f.write_str("unavailable"),
            Self::CircuitBreakerOpen => f.write_str("circuit open"),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum AttemptOutcome {
    Success,
    NotFound,
    Skipped(SkipReason),
    Error(String),
}

#[derive(Clone, Debug)]
pub struct ProviderAttempt {
    pub provider_id: ProviderId,
    pub outcome: AttemptOutcome,
}

#[derive(Clone, Debug, Default)]
pub struct FetchDiagnostics {
    pub attempts: Vec<ProviderAttempt>,
}

impl FetchDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, provider_id: ProviderId, outcome: AttemptOutcome) {
        self.attempts.push(ProviderAttempt {
            provider_id,
            outcome,
        });
    }

    pub fn record_skip(&mut self, provider_id: ProviderId, reason: SkipReason) {
        self.push(provider_id, AttemptOutcome::Skipped(reason));
    }

    pub fn record_error(&mut self, provider_id: ProviderId, error: String) {
        self.push(provider_id, AttemptOutcome::Error(error));
    }

    pub fn record_not_found(&mut self, provider_id: ProviderId) {
        self.push(provider_id, AttemptOutcome::NotFound);
    }

    pub fn record_success(&mut self, provider_id: ProviderId) {
        self.push(provider_id, AttemptOutcome::Success);
    }

    /// `"YAHOO: NOT FOUND -> FINNHUB: SKIPPED (incompatible symbol)"`
    pub fn summary(&self) -> String {
        self.attempts
            .iter()
            .map(|a| match &a.outcome {
                AttemptOutcome::Success => format!("{}: SUCCESS", a.provider_id),
                AttemptOutcome::NotFound => format!("{}: NOT FOUND", a.provider_id),
                AttemptOutcome::Skipped(reason) => {
                    format!("{}: SKIPPED ({})", a.provider_id, reason)
                }
                AttemptOutcome::Error(err) => format!("{}: ERROR ({})", a.provider_id, err),
            })
            .collect::<Vec<_>>()
            .join(" -> ")
    }

    pub fn has_success(&self) -> bool {
        self.attempts
            .iter()
            .any(|a| a.outcome == AttemptOutcome::Success)
    }

    /// Providers that were actually called (skips excluded).
    pub fn called(&self) -> impl Iterator<Item = &ProviderId> {
        self.attempts
            .iter()
            .filter(|a| !matches!(a.outcome, AttemptOutcome::Skipped(_)))
            .map(|a| &a.provider_id)
    }

    pub fn skip_reasons(&self) -> Vec<(&ProviderId, &SkipReason)> {
        self.attempts
            .iter()
            .filter_map(|a| match &a.outcome {
                AttemptOutcome::Skipped(reason) => Some((&a.provider_id, reason)),
                _ => None,
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.attempts.is_empty()
    }
}
