use serde::{Deserialize, Serialize};

use super::types::Symbol;

/// Auxiliary per-symbol data carried from the manifest into results.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickerMetadata {
    /// Supplemental image reference (e.g. a coin logo)
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub logo_url: Option<String>,

    /// Identifier the manifest source uses for this asset (e.g. a CoinGecko id)
    #[serde(rename = "id", skip_serializing_if = "Option::is_none", default)]
    pub provider_ref: Option<String>,
}

impl TickerMetadata {
    pub fn is_empty(&self) -> bool {
        self.logo_url.is_none() && self.provider_ref.is_none()
    }
}

/// One tradable asset as produced by a manifest provider.
///
/// Immutable once handed to the pipeline.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickerRecord {
    pub symbol: Symbol,

    #[serde(rename = "name")]
    pub display_name: String,

    #[serde(flatten)]
    pub metadata: Option<TickerMetadata>,
}

impl TickerRecord {
    /// Create a record without metadata.
    pub fn new(symbol: impl AsRef<str>, display_name: impl Into<String>) -> Self {
        Self {
            symbol: Symbol::from(symbol.as_ref()),
            display_name: display_name.into(),
            metadata: None,
        }
    }

    /// Attach metadata, dropping it if every field is empty.
    pub fn with_metadata(mut self, metadata: TickerMetadata) -> Self {
        self.metadata = if metadata.is_empty() {
            None
        } else {
            Some(metadata)
        };
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_serializes_flat() {
        let record = TickerRecord::new("BTC", "Bitcoin").with_metadata(TickerMetadata {
            logo_url: Some("https://example.com/btc.png".to_string()),
            provider_ref: Some("bitcoin".to_string()),
        });

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["symbol"], "BTC");
        assert_eq!(json["name"], "Bitcoin");
        assert_eq!(json["logo_url"], "https://example.com/btc.png");
        assert_eq!(json["id"], "bitcoin");
    }

    #[test]
    fn test_record_without_metadata_omits_fields() {
        let record = TickerRecord::new("SM.PS", "SM Investments Corporation");
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(
            json,
            r#"{"symbol":"SM.PS","name":"SM Investments Corporation"}"#
        );
    }

    #[test]
    fn test_empty_metadata_is_dropped() {
        let record = TickerRecord::new("AAPL", "Apple").with_metadata(TickerMetadata::default());
        assert!(record.metadata.is_none());
    }
}
