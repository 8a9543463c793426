use async_trait::async_trait;
use tracing::{info, warn};

use super::ManifestProvider;
use crate::errors::MarketDataError;
use crate::models::TickerRecord;

/// Concatenates several manifests in order.
///
/// A source that fails is logged and skipped; the rest still load.
pub struct CompositeManifest {
    name: String,
    sources: Vec<Box<dyn ManifestProvider>>,
}

impl CompositeManifest {
    pub fn new(name: impl Into<String>, sources: Vec<Box<dyn ManifestProvider>>) -> Self {
        Self {
            name: name.into(),
            sources,
        }
    }

    pub fn push(&mut self, source: Box<dyn ManifestProvider>) {
        self.sources.push(source);
    }
}

#[async_trait]
impl ManifestProvider for CompositeManifest {
    fn name(&self) -> &str {
        &self.name
    }

    async fn load(&self) -> Result<Vec<TickerRecord>, MarketDataError> {
        let mut records = Vec::new();
        for source in &self.sources {
            match source.load().await {
                Ok(loaded) => {
                    info!("{}: added {} tickers", source.name(), loaded.len());
                    records.extend(loaded);
                }
                Err(e) => warn!("{}: skipped ({})", source.name(), e),
            }
        }
        info!("{}: {} tickers total", self.name, records.len());
        Ok(records)
    }
}
