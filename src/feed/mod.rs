pub mod naukri;
pub mod snapshot;
pub mod types;

use anyhow::Result;
use async_trait::async_trait;
use types::{RawListing, SearchQuery};

#[async_trait]
pub trait ListingFeed: Send + Sync {
    /// Fetch every listing currently shown for `query`, in page order.
    async fn fetch_listings(&mut self, query: &SearchQuery) -> Result<Vec<RawListing>>;
}
