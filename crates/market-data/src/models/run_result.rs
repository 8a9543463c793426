use chrono::{DateTime, Utc};

use super::quote::{FailureRecord, QuoteResult};
use super::types::Symbol;

/// Outcome of one pipeline invocation.
///
/// Every input symbol lands in exactly one of `priced` or `failed`.
#[derive(Clone, Debug, PartialEq)]
pub struct RunResult {
    pub timestamp_utc: DateTime<Utc>,
    pub priced: Vec<QuoteResult>,
    pub failed: Vec<FailureRecord>,
}

impl RunResult {
    /// An empty result stamped with the current time.
    pub fn empty() -> Self {
        Self::new(Utc::now(), Vec::new(), Vec::new())
    }

    pub fn new(
        timestamp_utc: DateTime<Utc>,
        priced: Vec<QuoteResult>,
        failed: Vec<FailureRecord>,
    ) -> Self {
        Self {
            timestamp_utc,
            priced,
            failed,
        }
    }

    /// Total number of symbols covered.
    pub fn len(&self) -> usize {
        self.priced.len() + self.failed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.priced.is_empty() && self.failed.is_empty()
    }

    pub fn priced_symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.priced.iter().map(|q| &q.symbol)
    }

    pub fn failed_symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.failed.iter().map(|f| &f.symbol)
    }
}
