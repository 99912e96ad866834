pub mod catalog;
pub mod dns;
pub mod identity;
pub mod listing;
pub mod realty;
pub mod traits;
pub mod types;

pub use realty::RealtyCatalog;
pub use traits::CatalogSource;

use scraper::{ElementRef, Selector};

/// Build a selector from a fixed CSS string.
pub(crate) fn css(selector: &str) -> Selector {
    Selector::parse(selector).unwrap_or_else(|e| panic!("invalid selector {selector:?}: {e:?}"))
}

/// The site links with protocol-relative `//host/path` references.
pub(crate) fn absolute_url(href: &str) -> String {
    let href = href.trim();
    if href.starts_with("//") {
        format!("https:{}", href)
    } else {
        href.to_string()
    }
}

pub(crate) fn text_of(element: ElementRef<'_>) -> String {
    element.text().collect::<String>()
}
