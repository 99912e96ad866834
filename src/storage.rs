//! Per-page batch files and the final output.
//!
//! ```text
//! {state_dir}/
//! ├── 1_page.json         # records extracted from catalog page 1
//! ├── 1_page.done.json    # written once every listing of page 1 was recorded
//! └── ...
//! ```

use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};
use tokio::io::AsyncWriteExt;
use tracing::warn;

use crate::error::{CrawlError, Result};
use crate::models::{ListingRecord, PageManifest};

/// Resume state: one batch per catalog page.
#[derive(Debug, Clone)]
pub struct PageStore {
    root_dir: PathBuf,
}

impl PageStore {
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    fn batch_path(&self, page: u32) -> PathBuf {
        self.root_dir.join(format!("{}_page.json", page))
    }

    fn manifest_path(&self, page: u32) -> PathBuf {
        self.root_dir.join(format!("{}_page.done.json", page))
    }

    /// Whether `page` can be skipped.
    ///
    /// A completion marker settles it as long as its batch is still there.
    /// Batches written without one count as complete when they hold exactly
    /// `expected_size` records.
    pub async fn has_complete(&self, page: u32, expected_size: usize) -> bool {
        match read_json::<PageManifest>(&self.manifest_path(page)).await {
            Ok(Some(manifest)) if manifest.page == page => {
                if tokio::fs::metadata(self.batch_path(page)).await.is_ok() {
                    return true;
                }
                warn!("Page {} has a completion marker but no batch", page);
            }
            Ok(_) => {}
            Err(e) => warn!("Ignoring unreadable marker for page {}: {}", page, e),
        }

        match read_json::<Vec<ListingRecord>>(&self.batch_path(page)).await {
            Ok(Some(batch)) => batch.len() == expected_size,
            Ok(None) => false,
            Err(e) => {
                warn!("Ignoring unreadable batch for page {}: {}", page, e);
                false
            }
        }
    }

    /// Stored batch for `page`; empty when the page was never saved.
    pub async fn load(&self, page: u32) -> Result<Vec<ListingRecord>> {
        match read_json(&self.batch_path(page)).await? {
            Some(batch) => Ok(batch),
            None => {
                warn!("No batch stored for page {}", page);
                Ok(Vec::new())
            }
        }
    }

    /// Replace whatever was stored for `page`. A stale completion marker is removed.
    pub async fn save(&self, page: u32, batch: &[ListingRecord]) -> Result<()> {
        remove_if_exists(&self.manifest_path(page)).await?;
        write_json(&self.batch_path(page), batch).await
    }

    pub async fn mark_complete(&self, manifest: &PageManifest) -> Result<()> {
        write_json(&self.manifest_path(manifest.page), manifest).await
    }
}

/// Write the merged collection.
pub async fn save_output(path: &Path, records: &[ListingRecord]) -> Result<()> {
    write_json(path, records).await
}

async fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    Ok(())
}

/// Write to a temp file then rename, so a crash never leaves half a batch.
async fn write_bytes(path: &Path, bytes: &[u8]) -> Result<()> {
    ensure_parent(path).await?;

    let tmp = path.with_extension("tmp");
    let mut file = tokio::fs::File::create(&tmp).await?;
    file.write_all(bytes).await?;
    file.flush().await?;
    drop(file);

    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}

async fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(value)?;
    write_bytes(path, &bytes).await
}

async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(CrawlError::Io(e)),
    }
}

async fn remove_if_exists(path: &Path) -> Result<()> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(CrawlError::Io(e)),
    }
}
