//! Harvest pipeline.
//!
//! - `crawl`: enumerate catalog pages and crawl each one not yet stored
//! - `normalize`: merge stored batches into the final output

pub mod crawl;
pub mod normalize;

pub use crawl::Harvester;
