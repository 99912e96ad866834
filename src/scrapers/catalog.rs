//! Catalog index pages: how many there are and which listings each one links.

use scraper::Html;
use tracing::{debug, info};

use crate::error::{CrawlError, Result};
use crate::scrapers::{absolute_url, css};

/// Total number of catalog pages, read from the pagination control of the
/// first index page. The largest page number shown wins.
pub fn count_pages(html: &str) -> Result<u32> {
    let document = Html::parse_document(html);
    let links = css(".max.left");

    let mut seen = 0usize;
    let total = document
        .select(&links)
        .inspect(|_| seen += 1)
        .filter_map(|el| el.text().collect::<String>().trim().parse::<u32>().ok())
        .max();

    match total {
        Some(total) if total > 0 => {
            info!("Found {} catalog pages", total);
            Ok(total)
        }
        _ if seen == 0 => Err(CrawlError::Pagination(
            "no pagination control on the first index page".to_string(),
        )),
        _ => Err(CrawlError::Pagination(format!(
            "{} pagination entries, none numeric",
            seen
        ))),
    }
}

/// Listing URLs on one index page, in the order the page shows them.
///
/// Fails when the page has no listing container at all, which is what
/// captcha and maintenance pages look like.
pub fn listing_urls(html: &str) -> Result<Vec<String>> {
    let document = Html::parse_document(html);
    let container = css("#catalog_list");
    let rows = css(".hproduct");
    let anchor = css("a[href]");

    let Some(list) = document.select(&container).next() else {
        let title = document
            .select(&css("title"))
            .next()
            .map(|t| t.text().collect::<String>())
            .unwrap_or_default();
        return Err(CrawlError::NoCatalog(format!("title {:?}", title.trim())));
    };

    let urls: Vec<String> = list
        .select(&rows)
        .filter_map(|row| row.select(&anchor).next())
        .filter_map(|a| a.value().attr("href"))
        .map(absolute_url)
        .collect();

    debug!("Discovered {} listing links", urls.len());
    Ok(urls)
}
