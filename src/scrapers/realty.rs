use crate::config::HttpConfig;
use crate::error::{CrawlError, Result};
use crate::scrapers::dns::CachingResolver;
use crate::scrapers::identity::Identities;
use crate::scrapers::traits::CatalogSource;
use crate::scrapers::types::CatalogQuery;
use async_trait::async_trait;
use futures::future::join_all;
use reqwest::header::HeaderMap;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};

/// Live catalog over HTTP.
///
/// A client session is opened per batch and dropped once the whole batch has
/// resolved; only the DNS cache outlives it.
pub struct RealtyCatalog {
    query: CatalogQuery,
    identities: Identities,
    resolver: Arc<CachingResolver>,
    accept_invalid_certs: bool,
}

impl RealtyCatalog {
    pub fn new(query: CatalogQuery, http: &HttpConfig) -> Self {
        Self {
            query,
            identities: Identities::new(&http.user_agents),
            resolver: Arc::new(CachingResolver::new(Duration::from_secs(http.dns_ttl_secs))),
            accept_invalid_certs: http.accept_invalid_certs,
        }
    }

    /// Open a client session sharing the DNS cache.
    fn session(&self) -> Result<Client> {
        let client = Client::builder()
            .danger_accept_invalid_certs(self.accept_invalid_certs)
            .dns_resolver(Arc::clone(&self.resolver))
            .build()?;
        Ok(client)
    }
}

/// One request with its own identity headers. Any failure is returned to the caller.
async fn fetch(client: &Client, url: &str, headers: HeaderMap) -> Result<String> {
    let response = client.get(url).headers(headers).send().await?;

    let status = response.status();
    if !status.is_success() {
        return Err(CrawlError::status(url, status));
    }

    Ok(response.text().await?)
}

/// Like [`fetch`] but a failure only costs this URL.
async fn fetch_listing(client: &Client, url: &str, headers: HeaderMap) -> Option<String> {
    match fetch(client, url, headers).await {
        Ok(body) => Some(body),
        Err(e) => {
            warn!("Failed to fetch listing {}: {}", url, e);
            None
        }
    }
}

#[async_trait]
impl CatalogSource for RealtyCatalog {
    async fn index_page(&self, page: u32) -> Result<String> {
        let url = self.query.page_url(page);
        debug!("Fetching index page {}: {}", page, url);

        let client = self.session()?;
        fetch(&client, &url, self.identities.headers()).await
    }

    async fn listing_pages(&self, urls: &[String]) -> Vec<Option<String>> {
        let client = match self.session() {
            Ok(client) => client,
            Err(e) => {
                error!("Could not open HTTP session for {} listings: {}", urls.len(), e);
                return vec![None; urls.len()];
            }
        };

        let requests = urls
            .iter()
            .map(|url| fetch_listing(&client, url, self.identities.headers()));
        let bodies = join_all(requests).await;

        let fetched = bodies.iter().filter(|b| b.is_some()).count();
        debug!("Batch resolved: {}/{} listings fetched", fetched, urls.len());

        bodies
    }

    fn source_name(&self) -> &'static str {
        "russianrealty"
    }
}
