//! Yahoo Finance API response models.
//!
//! Only the fields the `/v7/finance/quote` endpoint returns that we actually
//! read are modelled. Unlike quoteSummary, v7 returns bare numbers.

use serde::Deserialize;

/// Main response wrapper for the v7 quote API
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YahooQuoteResponse {
    pub quote_response: YahooQuoteResponseBody,
}

#[derive(Debug, Deserialize)]
pub struct YahooQuoteResponseBody {
    #[serde(default)]
    pub result: Vec<YahooQuoteItem>,
    pub error: Option<YahooApiError>,
}

/// One symbol in a v7 quote response
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YahooQuoteItem {
    pub symbol: String,
    pub regular_market_price: Option<f64>,
    pub regular_market_open: Option<f64>,
    pub regular_market_previous_close: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct YahooApiError {
    pub code: Option<String>,
    pub description: Option<String>,
}
