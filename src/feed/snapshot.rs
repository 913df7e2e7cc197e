//! Listings from a saved, browser-rendered copy of the search page.
//!
//! Useful when the live page needs JavaScript: render it elsewhere, save the
//! HTML, and point `--html` at the file.

use super::naukri::{parse_listing_page, PageSelectors};
use super::types::{RawListing, SearchQuery};
use super::ListingFeed;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::PathBuf;

pub struct SnapshotFeed {
    path: PathBuf,
    selectors: PageSelectors,
}

impl SnapshotFeed {
    pub fn new(path: impl Into<PathBuf>, selectors: PageSelectors) -> Self {
        Self { path: path.into(), selectors }
    }
}

#[async_trait]
impl ListingFeed for SnapshotFeed {
    async fn fetch_listings(&mut self, query: &SearchQuery) -> Result<Vec<RawListing>> {
        let html = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read HTML snapshot: {}", self.path.display()))?;
        // Relative links resolve against the configured search URL
        Ok(parse_listing_page(&html, &query.url, &self.selectors))
    }
}
