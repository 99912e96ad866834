//! Error types shared by the harvester.

use thiserror::Error;

/// Result type alias for harvest operations.
pub type Result<T> = std::result::Result<T, CrawlError>;

#[derive(Error, Debug)]
pub enum CrawlError {
    /// Network or decode failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("{url} returned status {status}")]
    Status { url: String, status: u16 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Pagination control missing or unreadable; nothing can be crawled
    #[error("pagination not found: {0}")]
    Pagination(String),

    /// Index page without the listing container (captcha, maintenance)
    #[error("no catalog listing: {0}")]
    NoCatalog(String),

    /// Fetched document is not a listing page
    #[error("not a listing page: {0}")]
    NotAListing(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl CrawlError {
    pub fn status(url: impl Into<String>, status: reqwest::StatusCode) -> Self {
        Self::Status {
            url: url.into(),
            status: status.as_u16(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}
