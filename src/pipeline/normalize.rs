//! Merge every page batch into the final collection.

use std::collections::HashSet;
use std::path::Path;

use tracing::{info, warn};

use crate::error::Result;
use crate::models::ListingRecord;
use crate::storage::{self, PageStore};

/// Keep listings with a photo gallery, in page then listing order.
pub fn retain_with_photos(batches: Vec<Vec<ListingRecord>>) -> Vec<ListingRecord> {
    batches
        .into_iter()
        .flatten()
        .filter(ListingRecord::has_photos)
        .collect()
}

/// Ids that occur more than once. Nothing is dropped for it.
fn repeated_ids(records: &[ListingRecord]) -> usize {
    let mut seen = HashSet::new();
    records
        .iter()
        .filter_map(|r| r.id)
        .filter(|id| !seen.insert(*id))
        .count()
}

/// Read pages `1..=total_pages`, filter, and write the output file.
pub async fn normalize(store: &PageStore, total_pages: u32, output: &Path) -> Result<usize> {
    let mut batches = Vec::with_capacity(total_pages as usize);
    for page in 1..=total_pages {
        match store.load(page).await {
            Ok(batch) => batches.push(batch),
            Err(e) => warn!("Leaving out unreadable batch for page {}: {}", page, e),
        }
    }

    let records = retain_with_photos(batches);

    let repeats = repeated_ids(&records);
    if repeats > 0 {
        warn!(
            "{} listings share an id with an earlier one; the catalog probably shifted between runs",
            repeats
        );
    }

    storage::save_output(output, &records).await?;
    info!("Found {} listings, saved to {}", records.len(), output.display());

    Ok(records.len())
}
