use crate::error::Result;
use async_trait::async_trait;

/// Where catalog and listing pages come from.
///
/// The HTTP implementation talks to the live site; tests swap in fakes.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Raw HTML of one catalog index page (1-based)
    async fn index_page(&self, page: u32) -> Result<String>;

    /// Fetch every listing of one catalog page at once.
    ///
    /// The result lines up with `urls`; a failed fetch is `None` in its slot
    /// and never fails the batch.
    async fn listing_pages(&self, urls: &[String]) -> Vec<Option<String>>;

    /// Get the name of the catalog source
    fn source_name(&self) -> &'static str;
}
