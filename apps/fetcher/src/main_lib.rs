use std::path::Path;
use std::sync::Arc;

use tickerboard_market_data::manifest::{
    CoinGeckoClient, CoinGeckoConfig, CompositeManifest, ManifestProvider, StaticManifest,
    WikipediaTableManifest, WikipediaTableSpec,
};
use tickerboard_market_data::provider::finnhub::FinnhubProvider;
use tickerboard_market_data::provider::yahoo::{YahooChartProvider, YahooQuoteProvider};
use tickerboard_market_data::{
    merge, BatchOrchestrator, ManifestFile, OrchestratorConfig, PriceFile, ProviderRegistry,
    QuoteProvider, SymbolCompatibility, TickerRecord,
};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cli::Stage;
use crate::config::Config;
use crate::sink::save_json;

const CRYPTO_MANIFEST: &str = "crypto_manifest.json";
const CRYPTO_PRICES: &str = "crypto_prices.json";
const STOCKS_MANIFEST: &str = "stocks_manifest.json";
const STOCKS_PRICES: &str = "stocks_prices.json";
const INDICES_MANIFEST: &str = "indices_commodities_manifest.json";
const INDICES_PRICES: &str = "indices_commodities_prices.json";

pub fn init_tracing(log_format: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

/// Wire the bulk, primary and secondary quote sources.
pub fn build_orchestrator(config: &Config) -> anyhow::Result<BatchOrchestrator> {
    let bulk: Arc<dyn QuoteProvider> = Arc::new(YahooQuoteProvider::new());
    let primary: Vec<Arc<dyn QuoteProvider>> = vec![Arc::new(YahooChartProvider::new()?)];
    let secondary: Vec<Arc<dyn QuoteProvider>> =
        vec![Arc::new(FinnhubProvider::new(config.finnhub_api_key.clone()))];

    if config.finnhub_api_key.is_none() {
        tracing::warn!("FINNHUB_API_KEY not set, secondary quote source disabled");
    }

    let registry = ProviderRegistry::new(bulk, primary, secondary).with_compatibility(
        SymbolCompatibility::from_csv(&config.secondary_exclude_markers),
    );
    let orchestrator_config = OrchestratorConfig {
        batch_pause: config.batch_pause,
        call_timeout: config.request_timeout,
        fallback_concurrency: config.fallback_concurrency,
    };
    orchestrator_config.validate()?;

    Ok(BatchOrchestrator::new(registry, orchestrator_config))
}

/// Run the requested stages in order: crypto, stocks, indices.
pub async fn run(config: &Config, stages: &[Stage]) -> anyhow::Result<()> {
    std::fs::create_dir_all(&config.output_dir)?;
    let out = config.output_dir.as_path();

    if stages.contains(&Stage::Crypto) {
        run_crypto(config, out).await?;
    }

    if !stages.contains(&Stage::Stocks) && !stages.contains(&Stage::Indices) {
        return Ok(());
    }
    let orchestrator = build_orchestrator(config)?;

    if stages.contains(&Stage::Stocks) {
        let manifest = stocks_manifest();
        let records = manifest.load().await?;
        resolve_and_save(
            &orchestrator,
            &records,
            config.stocks_batch_size,
            &out.join(STOCKS_MANIFEST),
            &out.join(STOCKS_PRICES),
        )
        .await?;
    }

    if stages.contains(&Stage::Indices) {
        let records = StaticManifest::indices_and_commodities().records();
        resolve_and_save(
            &orchestrator,
            &records,
            config.indices_batch_size,
            &out.join(INDICES_MANIFEST),
            &out.join(INDICES_PRICES),
        )
        .await?;
    }

    tracing::info!("Fetch complete, files written to {}", out.display());
    Ok(())
}

async fn run_crypto(config: &Config, out: &Path) -> anyhow::Result<()> {
    tracing::info!("Fetching crypto listing...");
    let client = CoinGeckoClient::new(CoinGeckoConfig {
        base_url: config.coingecko_api_url.clone(),
        api_key: config.coingecko_api_key.clone(),
        ..Default::default()
    });
    let listing = client.fetch_listing().await;

    save_json(
        &out.join(CRYPTO_MANIFEST),
        &ManifestFile::new(&listing.manifest),
        listing.manifest.len(),
    )?;
    save_json(
        &out.join(CRYPTO_PRICES),
        &listing.prices,
        listing.prices.prices.len(),
    )?;
    Ok(())
}

/// Global exchanges from Wikipedia followed by the Philippine list.
fn stocks_manifest() -> CompositeManifest {
    let mut sources: Vec<Box<dyn ManifestProvider>> = WikipediaTableSpec::global_presets()
        .into_iter()
        .map(|spec| Box::new(WikipediaTableManifest::new(spec)) as Box<dyn ManifestProvider>)
        .collect();
    sources.push(Box::new(StaticManifest::ph_stocks()));
    CompositeManifest::new("stocks", sources)
}

async fn resolve_and_save(
    orchestrator: &BatchOrchestrator,
    records: &[TickerRecord],
    batch_size: usize,
    manifest_path: &Path,
    prices_path: &Path,
) -> anyhow::Result<()> {
    save_json(manifest_path, &ManifestFile::new(records), records.len())?;

    let result = orchestrator.resolve_all(records, batch_size).await?;
    let file = PriceFile::from(&merge(result, records));
    save_json(prices_path, &file, file.prices.len())?;
    Ok(())
}
