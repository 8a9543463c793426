//! Carry manifest metadata onto pipeline results.

use std::collections::HashMap;

use crate::models::{RunResult, TickerMetadata, TickerRecord};

/// Copy each record's metadata onto the result entry with the same symbol.
///
/// Lookup is by exact symbol. Entries without a matching record (or whose
/// record has no metadata) are left as they are. For duplicate symbols the
/// first record wins.
pub fn merge(mut result: RunResult, records: &[TickerRecord]) -> RunResult {
    let mut by_symbol: HashMap<&str, &TickerMetadata> = HashMap::with_capacity(records.len());
    for record in records {
        if let Some(metadata) = &record.metadata {
            by_symbol.entry(record.symbol.as_ref()).or_insert(metadata);
        }
    }

    if by_symbol.is_empty() {
        return result;
    }

    for quote in &mut result.priced {
        if let Some(metadata) = by_symbol.get(quote.symbol.as_ref()) {
            quote.metadata = Some((*metadata).clone());
        }
    }
    for failure in &mut result.failed {
        if let Some(metadata) = by_symbol.get(failure.symbol.as_ref()) {
            failure.metadata = Some((*metadata).clone());
        }
    }

    result
}
