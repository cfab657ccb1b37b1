use crate::scrapers::types::SearchParams;
use anyhow::Result;
use async_trait::async_trait;

/// Common trait for all marketplace fetchers
/// This allows easy addition of new marketplaces (Quikr, Cars24, etc) in the future
#[async_trait]
pub trait MarketplaceScraper: Send + Sync {
    /// Fetch the raw search results page for the given parameters
    async fn search(&self, params: &SearchParams) -> Result<String>;

    /// Registry id of the marketplace this scraper talks to
    fn marketplace(&self) -> &'static str;
}
