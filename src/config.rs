//! Harvester configuration.
//!
//! Read from `realty-harvest.toml` when present; every field has a default so
//! a bare run needs no file at all.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{CrawlError, Result};
use crate::scrapers::types::CatalogQuery;

pub const DEFAULT_CONFIG_FILE: &str = "realty-harvest.toml";
pub const CONFIG_ENV_VAR: &str = "REALTY_HARVEST_CONFIG";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub catalog: CatalogQuery,

    #[serde(default)]
    pub http: HttpConfig,

    #[serde(default)]
    pub storage: StorageConfig,
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load from `REALTY_HARVEST_CONFIG` or the default file, falling back to
    /// defaults when the file is missing or broken.
    pub fn load_or_default() -> Self {
        let path = std::env::var(CONFIG_ENV_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE));

        if !path.exists() {
            debug!("No config at {}, using defaults", path.display());
            return Self::default();
        }

        Self::load(&path).unwrap_or_else(|e| {
            warn!("Config load failed from {}: {}. Using defaults.", path.display(), e);
            Self::default()
        })
    }

    pub fn validate(&self) -> Result<()> {
        if self.catalog.root_url.trim().is_empty() {
            return Err(CrawlError::config("catalog.root_url is empty"));
        }
        if self.catalog.expected_page_size == 0 {
            return Err(CrawlError::config("catalog.expected_page_size must be > 0"));
        }
        if self.http.user_agents.iter().all(|ua| ua.trim().is_empty()) {
            return Err(CrawlError::config("http.user_agents has no usable entry"));
        }
        Ok(())
    }
}

/// Transport settings for listing and index fetches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// How long resolved host addresses are reused
    #[serde(default = "defaults::dns_ttl")]
    pub dns_ttl_secs: u64,

    /// The catalog serves a certificate that does not validate
    #[serde(default = "defaults::accept_invalid_certs")]
    pub accept_invalid_certs: bool,

    /// Pool a random User-Agent is drawn from for every request
    #[serde(default = "defaults::user_agents")]
    pub user_agents: Vec<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            dns_ttl_secs: defaults::dns_ttl(),
            accept_invalid_certs: defaults::accept_invalid_certs(),
            user_agents: defaults::user_agents(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding one batch file per catalog page
    #[serde(default = "defaults::state_dir")]
    pub state_dir: PathBuf,

    /// Final merged collection
    #[serde(default = "defaults::output_file")]
    pub output_file: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            state_dir: defaults::state_dir(),
            output_file: defaults::output_file(),
        }
    }
}

mod defaults {
    use std::path::PathBuf;

    pub fn dns_ttl() -> u64 {
        300
    }
    pub fn accept_invalid_certs() -> bool {
        true
    }
    pub fn user_agents() -> Vec<String> {
        [
            "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36",
            "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
            "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.5 Safari/605.1.15",
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:126.0) Gecko/20100101 Firefox/126.0",
            "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/118.0.0.0 YaBrowser/23.11.0.0 Safari/537.36",
        ]
        .into_iter()
        .map(String::from)
        .collect()
    }
    pub fn state_dir() -> PathBuf {
        PathBuf::from("json")
    }
    pub fn output_file() -> PathBuf {
        PathBuf::from("result.json")
    }
}
