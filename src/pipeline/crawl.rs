//! Page-by-page crawl with resume.

use std::path::PathBuf;
use std::time::Instant;

use chrono::Utc;
use tracing::{error, info};

use crate::error::Result;
use crate::models::{ListingRecord, PageManifest};
use crate::pipeline::normalize::normalize;
use crate::scrapers::catalog::{count_pages, listing_urls};
use crate::scrapers::listing::extract_listing;
use crate::scrapers::CatalogSource;
use crate::storage::PageStore;

/// What happened to one catalog page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageOutcome {
    /// Already stored by an earlier run
    Skipped,
    /// Fetched and stored; `complete` when every listing produced a record
    Stored {
        listings: usize,
        records: usize,
        complete: bool,
    },
    /// Index page could not be fetched or read; nothing stored, retried next run
    Failed,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct HarvestSummary {
    pub total_pages: u32,
    pub skipped: u32,
    pub stored: u32,
    pub failed: u32,
    pub records: usize,
    pub output_records: usize,
}

/// Drives enumeration, per-page crawling and the final merge.
pub struct Harvester<S: CatalogSource> {
    source: S,
    store: PageStore,
    expected_page_size: usize,
    output: PathBuf,
}

impl<S: CatalogSource> Harvester<S> {
    pub fn new(
        source: S,
        store: PageStore,
        expected_page_size: usize,
        output: impl Into<PathBuf>,
    ) -> Self {
        Self {
            source,
            store,
            expected_page_size,
            output: output.into(),
        }
    }

    /// Number of catalog pages. Failing here ends the run.
    pub async fn total_pages(&self) -> Result<u32> {
        let first = self.source.index_page(1).await?;
        count_pages(&first)
    }

    pub async fn run(&self) -> Result<HarvestSummary> {
        info!("Harvesting {}", self.source.source_name());

        let total_pages = self.total_pages().await?;
        let mut summary = HarvestSummary {
            total_pages,
            ..HarvestSummary::default()
        };

        for page in 1..=total_pages {
            match self.crawl_page(page).await? {
                PageOutcome::Skipped => summary.skipped += 1,
                PageOutcome::Stored { records, .. } => {
                    summary.stored += 1;
                    summary.records += records;
                }
                PageOutcome::Failed => summary.failed += 1,
            }
        }

        summary.output_records = normalize(&self.store, total_pages, &self.output).await?;
        Ok(summary)
    }

    /// Crawl one page unless it is already complete.
    ///
    /// Only storage errors propagate; fetch and extraction failures are logged.
    pub async fn crawl_page(&self, page: u32) -> Result<PageOutcome> {
        if self.store.has_complete(page, self.expected_page_size).await {
            info!("Page {} already stored, skipping", page);
            return Ok(PageOutcome::Skipped);
        }

        let started = Instant::now();

        let index = match self.source.index_page(page).await {
            Ok(html) => html,
            Err(e) => {
                error!("Could not fetch index page {}: {}", page, e);
                return Ok(PageOutcome::Failed);
            }
        };
        let urls = match listing_urls(&index) {
            Ok(urls) => urls,
            Err(e) => {
                error!("Index page {} has no listings, keeping stored batch: {}", page, e);
                return Ok(PageOutcome::Failed);
            }
        };

        let bodies = self.source.listing_pages(&urls).await;
        let records = extract_batch(&bodies);

        self.store.save(page, &records).await?;

        let complete = !urls.is_empty() && records.len() == urls.len();
        if complete {
            self.store
                .mark_complete(&PageManifest {
                    page,
                    listings: urls.len(),
                    records: records.len(),
                    completed_at: Utc::now(),
                })
                .await?;
        }

        info!(
            "Page {} was parsed: {}/{} listings recorded, time taken: {:.2?}",
            page,
            records.len(),
            urls.len(),
            started.elapsed()
        );

        Ok(PageOutcome::Stored {
            listings: urls.len(),
            records: records.len(),
            complete,
        })
    }
}

/// Extract every fetched listing. Missing bodies and non-listings yield no record.
fn extract_batch(bodies: &[Option<String>]) -> Vec<ListingRecord> {
    bodies
        .iter()
        .flatten()
        .filter_map(|body| extract_listing(body))
        .collect()
}
