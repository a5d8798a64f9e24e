mod source;
mod sync;

use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use drivesync_core::app_config::AppConfig;
use drivesync_inventory::{EngineConfig, InventoryClient, MatchEngine};
use drivesync_match::{cosine_similarity, tokenize, vectorize};
use drivesync_recon::HistoryStore;

use crate::source::DumpFileSource;

#[derive(Debug, Parser)]
#[command(name = "drivesync")]
#[command(about = "Sync scraped drive orders into a Grocy-compatible inventory")]
struct Cli {
    /// Order-history document path (overrides DRIVESYNC_HISTORY_PATH).
    #[arg(long, global = true)]
    history: Option<PathBuf>,

    /// Scraped-orders dump path (overrides DRIVESYNC_ORDERS_DUMP_PATH).
    #[arg(long, global = true)]
    input: Option<PathBuf>,

    /// Minutes between passes (overrides DRIVESYNC_SYNC_INTERVAL_MINS).
    #[arg(long, global = true)]
    interval_mins: Option<u64>,

    /// Actually call the stock-add endpoint for accepted matches.
    #[arg(long, global = true)]
    live_stock_update: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run sync passes on a fixed interval until interrupted.
    Run,
    /// Run a single sync pass and exit; pass failures set the exit code.
    Once,
    /// Score a name against the live catalog and print the closest products.
    MatchName { query: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    // load_app_config loads .env itself before reading the environment.
    let mut config = drivesync_core::load_app_config()?;
    if let Some(history) = cli.history {
        config.history_path = history;
    }
    if let Some(input) = cli.input {
        config.orders_dump_path = input;
    }
    if let Some(interval_mins) = cli.interval_mins {
        config.sync_interval_mins = interval_mins;
    }
    if cli.live_stock_update {
        config.live_stock_update = true;
    }

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    match cli.command {
        Commands::Run => run_loop(&config).await,
        Commands::Once => run_once(&config).await,
        Commands::MatchName { query } => match_name(&config, &query).await,
    }
}

fn build_engine(config: &AppConfig) -> anyhow::Result<MatchEngine> {
    let client = build_client(config)?;
    let engine_config = EngineConfig {
        similarity_threshold: config.similarity_threshold,
        warning_similarity_threshold: config.warning_similarity_threshold,
        live_stock_update: config.live_stock_update,
        catalog_cache_capacity: config.catalog_cache_capacity,
        catalog_cache_ttl: Duration::from_secs(config.catalog_cache_ttl_secs),
        locations_cache_capacity: config.locations_cache_capacity,
        locations_cache_ttl: Duration::from_secs(config.locations_cache_ttl_secs),
    };
    Ok(MatchEngine::new(client, engine_config))
}

fn build_client(config: &AppConfig) -> anyhow::Result<InventoryClient> {
    Ok(InventoryClient::new(
        &config.inventory_api_base,
        &config.inventory_api_key,
        config.request_timeout_secs,
        &config.user_agent,
    )?)
}

async fn run_once(config: &AppConfig) -> anyhow::Result<()> {
    let source = DumpFileSource::load(&config.orders_dump_path)?;
    let store = HistoryStore::new(config.history_path.clone());
    let engine = build_engine(config)?;

    let summary = sync::run_sync_pass(&source, &store, &engine).await?;
    log_summary(&summary);
    Ok(())
}

/// Scheduled mode: one failed pass is logged and the loop keeps going.
async fn run_loop(config: &AppConfig) -> anyhow::Result<()> {
    let store = HistoryStore::new(config.history_path.clone());
    let engine = build_engine(config)?;
    let interval = Duration::from_secs(config.sync_interval_mins * 60);

    tracing::info!(
        interval_mins = config.sync_interval_mins,
        live_stock_update = config.live_stock_update,
        "starting sync loop"
    );

    loop {
        // Reload the dump each pass; the scraping job rewrites it between runs.
        match DumpFileSource::load(&config.orders_dump_path) {
            Ok(source) => match sync::run_sync_pass(&source, &store, &engine).await {
                Ok(summary) => log_summary(&summary),
                Err(e) => tracing::error!(error = %e, "sync pass failed"),
            },
            Err(e) => tracing::error!(error = %e, "failed to load scrape dump"),
        }

        tokio::select! {
            () = tokio::time::sleep(interval) => {}
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("received shutdown signal, stopping sync loop");
                return Ok(());
            }
        }
    }
}

fn log_summary(summary: &sync::PassSummary) {
    tracing::info!(
        scraped_rows = summary.scraped_rows,
        extracted_orders = summary.extracted_orders,
        needs_detail = summary.needs_detail,
        matched_orders = summary.matched_orders,
        saved = summary.saved,
        "sync pass complete"
    );
}

/// Operator utility: ranks the live catalog against `query` with the same
/// vocabulary and scoring the match engine uses, and prints the top ten.
async fn match_name(config: &AppConfig, query: &str) -> anyhow::Result<()> {
    let client = build_client(config)?;
    let catalog = client.fetch_catalog().await?;
    if catalog.is_empty() {
        println!("catalog is empty; nothing to match against");
        return Ok(());
    }

    let mut vocabulary: Vec<String> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    for product in &catalog {
        for token in tokenize(&product.name) {
            if seen.insert(token.clone()) {
                vocabulary.push(token);
            }
        }
    }

    let query_vector = vectorize(query, &vocabulary);
    let mut scored: Vec<(f64, &drivesync_inventory::CatalogProduct)> = catalog
        .iter()
        .map(|product| {
            let candidate_vector = vectorize(&product.name, &vocabulary);
            (
                cosine_similarity(&query_vector, &candidate_vector) * 100.0,
                product,
            )
        })
        .collect();
    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

    println!("closest catalog products for {query:?}:");
    for (similarity_pct, product) in scored.into_iter().take(10) {
        println!("  {similarity_pct:6.2}%  [{}] {}", product.id, product.name);
    }
    Ok(())
}
