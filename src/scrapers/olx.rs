use crate::scrapers::traits::MarketplaceScraper;
use crate::scrapers::types::SearchParams;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

const OLX_SEARCH_BASE: &str = "https://www.olx.in";

/// OLX serves different markup, or rejects the request outright, for
/// unrecognized clients, so a realistic desktop user-agent is required.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Fetcher for olx.in search result pages
pub struct OlxScraper {
    client: Client,
    search_base: String,
}

impl OlxScraper {
    /// Create a new OLX scraper pointed at olx.in
    pub fn new() -> Result<Self> {
        Self::with_base(OLX_SEARCH_BASE)
    }

    /// Create a scraper with a custom search base
    pub fn with_base(search_base: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            search_base: search_base.to_string(),
        })
    }

    /// Search URL: the location is substituted verbatim, the query is
    /// percent-encoded.
    fn search_url(&self, params: &SearchParams) -> String {
        format!(
            "{}/{}/q-{}",
            self.search_base,
            params.location,
            urlencoding::encode(&params.query)
        )
    }
}

#[async_trait]
impl MarketplaceScraper for OlxScraper {
    async fn search(&self, params: &SearchParams) -> Result<String> {
        let url = self.search_url(params);
        debug!("Fetching URL: {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("Failed to fetch OLX search page")?;

        if !response.status().is_success() {
            warn!("OLX returned status: {}", response.status());
            anyhow::bail!("Failed to fetch OLX search page: {}", response.status());
        }

        let html = response.text().await.context("Failed to read response body")?;

        debug!("Downloaded {} bytes of HTML", html.len());

        Ok(html)
    }

    fn marketplace(&self) -> &'static str {
        "olx"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrapers::types::DEFAULT_LOCATION;

    #[test]
    fn search_url_percent_encodes_the_query() {
        let scraper = OlxScraper::new().unwrap();
        let params = SearchParams::new("maruti swift", Some("kochi".to_string()));
        assert_eq!(
            scraper.search_url(&params),
            "https://www.olx.in/kochi/q-maruti%20swift"
        );
    }

    #[test]
    fn omitted_location_falls_back_to_the_default() {
        let scraper = OlxScraper::new().unwrap();
        let params = SearchParams::new("swift", None);
        assert_eq!(params.location, DEFAULT_LOCATION);
        assert_eq!(
            scraper.search_url(&params),
            "https://www.olx.in/kothamangalam/q-swift"
        );
    }

    #[test]
    fn location_is_substituted_verbatim() {
        let scraper = OlxScraper::new().unwrap();
        let params = SearchParams::new("i20", Some("kochi-ernakulam".to_string()));
        assert_eq!(
            scraper.search_url(&params),
            "https://www.olx.in/kochi-ernakulam/q-i20"
        );
    }

    #[test]
    fn reports_its_marketplace_id() {
        let scraper = OlxScraper::new().unwrap();
        assert_eq!(scraper.marketplace(), "olx");
    }
}
