use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use super::ticker::TickerMetadata;
use super::types::{ProviderId, Symbol};

/// Decimal places kept in every emitted number.
pub const OUTPUT_DECIMALS: u32 = 2;

/// Unvalidated price snapshot as returned by an adapter.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RawQuote {
    /// Last trade / close
    pub price: f64,

    /// Session open or previous close, whichever the source supplies
    pub reference_price: Option<f64>,
}

impl RawQuote {
    pub fn new(price: f64, reference_price: Option<f64>) -> Self {
        Self {
            price,
            reference_price,
        }
    }

    /// Reference price usable as a change denominator.
    ///
    /// Zero, negative and non-finite references are treated as absent.
    pub fn usable_reference(&self) -> Option<f64> {
        self.reference_price
            .filter(|r| r.is_finite() && *r > 0.0)
    }
}

/// A resolved price record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuoteResult {
    pub symbol: Symbol,

    /// Price rounded to two decimals
    pub price: Decimal,

    /// `(price - reference) / reference * 100`, rounded to two decimals
    pub change_percent: Decimal,

    /// Adapter that produced the winning quote
    pub source: ProviderId,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub metadata: Option<TickerMetadata>,
}

impl QuoteResult {
    /// Build a result from a raw quote.
    ///
    /// Change is computed from the unrounded inputs; both outputs are rounded
    /// here and nowhere earlier. Returns `None` if the price is not finite,
    /// or if it would be emitted as zero or less.
    pub fn from_raw(symbol: Symbol, raw: &RawQuote, source: ProviderId) -> Option<Self> {
        if !raw.price.is_finite() {
            return None;
        }
        let price = Decimal::try_from(raw.price).ok()?;
        if round_output(price) <= Decimal::ZERO {
            return None;
        }

        let change_percent = raw
            .usable_reference()
            .and_then(|r| Decimal::try_from(r).ok())
            .and_then(|reference| percent_change(price, reference))
            .unwrap_or(Decimal::ZERO);

        Some(Self {
            symbol,
            price: round_output(price),
            change_percent: round_output(change_percent),
            source,
            metadata: None,
        })
    }
}

/// Percent change from `reference` to `price`.
///
/// Returns `None` for a zero reference or on arithmetic overflow.
pub fn percent_change(price: Decimal, reference: Decimal) -> Option<Decimal> {
    if reference.is_zero() {
        return None;
    }
    price
        .checked_sub(reference)?
        .checked_div(reference)?
        .checked_mul(Decimal::ONE_HUNDRED)
}

/// Round to the output precision, half away from zero.
pub fn round_output(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(OUTPUT_DECIMALS, RoundingStrategy::MidpointAwayFromZero)
}

/// A symbol for which every applicable adapter was exhausted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FailureRecord {
    pub symbol: Symbol,

    /// Summary of the attempts that were made
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub metadata: Option<TickerMetadata>,
}

impl FailureRecord {
    pub fn new(symbol: Symbol, error: Option<String>) -> Self {
        Self {
            symbol,
            error,
            metadata: None,
        }
    }
}
