//! Provider-specific exchange suffixes.
//!
//! Yahoo identifies the listing venue with a dot suffix (`VOD.L`, `7203.T`).
//! Other providers use their own suffix for the same venue, or none at all.
//! Anything after a dot that is not in this table is treated as part of the
//! ticker itself (share classes like `BRK.B`).

/// One exchange and the suffix each provider uses for it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExchangeSuffix {
    /// Suffix used by Yahoo Finance, including the dot
    pub yahoo: &'static str,
    /// Suffix used by Finnhub, if Finnhub lists the venue
    pub finnhub: Option<&'static str>,
}

/// Known exchange suffixes, keyed by the Yahoo form.
pub const YAHOO_EXCHANGE_SUFFIXES: &[ExchangeSuffix] = &[
    ExchangeSuffix { yahoo: ".L", finnhub: Some(".L") },
    ExchangeSuffix { yahoo: ".DE", finnhub: Some(".DE") },
    ExchangeSuffix { yahoo: ".F", finnhub: Some(".F") },
    ExchangeSuffix { yahoo: ".PA", finnhub: Some(".PA") },
    ExchangeSuffix { yahoo: ".AS", finnhub: Some(".AS") },
    ExchangeSuffix { yahoo: ".BR", finnhub: Some(".BR") },
    ExchangeSuffix { yahoo: ".MI", finnhub: Some(".MI") },
    ExchangeSuffix { yahoo: ".MC", finnhub: Some(".MC") },
    ExchangeSuffix { yahoo: ".SW", finnhub: Some(".SW") },
    ExchangeSuffix { yahoo: ".ST", finnhub: Some(".ST") },
    ExchangeSuffix { yahoo: ".OL", finnhub: Some(".OL") },
    ExchangeSuffix { yahoo: ".CO", finnhub: Some(".CO") },
    ExchangeSuffix { yahoo: ".HE", finnhub: Some(".HE") },
    ExchangeSuffix { yahoo: ".TO", finnhub: Some(".TO") },
    ExchangeSuffix { yahoo: ".V", finnhub: Some(".V") },
    ExchangeSuffix { yahoo: ".T", finnhub: Some(".T") },
    ExchangeSuffix { yahoo: ".HK", finnhub: Some(".HK") },
    ExchangeSuffix { yahoo: ".AX", finnhub: Some(".AX") },
    ExchangeSuffix { yahoo: ".NZ", finnhub: Some(".NZ") },
    ExchangeSuffix { yahoo: ".SI", finnhub: Some(".SI") },
    ExchangeSuffix { yahoo: ".KS", finnhub: Some(".KS") },
    ExchangeSuffix { yahoo: ".SS", finnhub: Some(".SS") },
    ExchangeSuffix { yahoo: ".SZ", finnhub: Some(".SZ") },
    ExchangeSuffix { yahoo: ".BO", finnhub: Some(".BO") },
    ExchangeSuffix { yahoo: ".NS", finnhub: Some(".NS") },
    ExchangeSuffix { yahoo: ".SA", finnhub: Some(".SA") },
    ExchangeSuffix { yahoo: ".MX", finnhub: Some(".MX") },
    ExchangeSuffix { yahoo: ".JO", finnhub: Some(".JO") },
    ExchangeSuffix { yahoo: ".PS", finnhub: None },
    ExchangeSuffix { yahoo: ".JK", finnhub: Some(".JK") },
    ExchangeSuffix { yahoo: ".BK", finnhub: Some(".BK") },
    ExchangeSuffix { yahoo: ".KL", finnhub: Some(".KL") },
    ExchangeSuffix { yahoo: ".TW", finnhub: Some(".TW") },
];

/// Split a Yahoo symbol into `(ticker, exchange)` if it carries a known suffix.
pub fn split_yahoo_suffix(symbol: &str) -> Option<(&str, &'static ExchangeSuffix)> {
    let dot = symbol.rfind('.')?;
    let (ticker, suffix) = symbol.split_at(dot);
    if ticker.is_empty() {
        return None;
    }
    YAHOO_EXCHANGE_SUFFIXES
        .iter()
        .find(|e| e.yahoo.eq_ignore_ascii_case(suffix))
        .map(|e| (ticker, e))
}

/// Whether the symbol ends with a known Yahoo exchange suffix.
pub fn has_exchange_suffix(symbol: &str) -> bool {
    split_yahoo_suffix(symbol).is_some()
}
