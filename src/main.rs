mod config;
mod error;
mod models;
mod pipeline;
mod scrapers;
mod storage;

use anyhow::Context;
use config::Config;
use pipeline::Harvester;
use scrapers::RealtyCatalog;
use storage::PageStore;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("🏠 Realty Harvest - secondary-market apartments");
    info!("================================================");

    let config = Config::load_or_default();
    config.validate().context("Invalid configuration")?;

    let catalog = RealtyCatalog::new(config.catalog.clone(), &config.http);
    let store = PageStore::new(&config.storage.state_dir);
    let harvester = Harvester::new(
        catalog,
        store,
        config.catalog.expected_page_size,
        &config.storage.output_file,
    );

    let summary = harvester
        .run()
        .await
        .context("Harvest aborted")?;

    info!(
        "✅ {} pages: {} crawled ({} listings), {} already stored, {} failed",
        summary.total_pages, summary.stored, summary.records, summary.skipped, summary.failed
    );
    info!(
        "💾 Saved {} listings to {}",
        summary.output_records,
        config.storage.output_file.display()
    );

    Ok(())
}
