use anyhow::Context;
use fundtrace::cache::CacheStore;
use fundtrace::config::{CacheBackend, Config};
use fundtrace::{
    CachedGateway, CsvTraceSink, DataSource, Endpoints, HeaderLabels, HttpDataSource,
    JsonFileCacheStore, Orchestrator, ResponseCache, SqliteCacheStore, Tracer,
};
use std::sync::Arc;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into()),
        )
        .init();

    // Load configuration
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = run(config).await {
        eprintln!("Fatal: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(config: Config) -> anyhow::Result<()> {
    if config.starting_wallets.is_empty() {
        tracing::warn!("No starting wallets configured; set TRACE_STARTING_WALLETS");
    }

    let store: Arc<dyn CacheStore> = match config.cache_backend {
        CacheBackend::Json => Arc::new(
            JsonFileCacheStore::open(&config.cache_path)
                .await
                .with_context(|| format!("opening cache {}", config.cache_path))?,
        ),
        CacheBackend::Sqlite => Arc::new(
            SqliteCacheStore::open(&config.cache_path)
                .await
                .with_context(|| format!("opening cache {}", config.cache_path))?,
        ),
    };

    let labels = HeaderLabels {
        native_symbol: config.native_symbol.clone(),
        reference_currency: config.reference_currency.to_uppercase(),
    };
    let mut sink = CsvTraceSink::create(&config.output_path, &labels)
        .with_context(|| format!("creating output {}", config.output_path))?;

    let source: Arc<dyn DataSource> = Arc::new(HttpDataSource::default());
    let endpoints = Endpoints::new(
        config.blockchain_api_url.clone(),
        config.price_api_url.clone(),
        config.price_coin_id.clone(),
    );
    let gateway = CachedGateway::new(
        source,
        ResponseCache::new(store),
        endpoints,
        &config.reference_currency,
    );

    let tracer = Tracer::new(Arc::new(gateway), config.trace_options());
    let orchestrator = Orchestrator::new(tracer);

    let summary = orchestrator
        .run(&config.starting_wallets, &config.terminating_wallets, &mut sink)
        .await;

    tracing::info!(
        "Wrote {} trace records to {}",
        summary.records_emitted(),
        config.output_path
    );
    Ok(())
}
