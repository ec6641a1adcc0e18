use crate::http_client::FetchError;
use crate::models::{ListingDetails, PropertyType};
use async_trait::async_trait;

/// One listing site: knows its URL scheme and how to turn a page into listings
#[async_trait]
pub trait PageScraper: Send + Sync {
    /// Returns the name of the scraper/website
    fn name(&self) -> &str;

    /// URL of results page `page` (1-based) for a city and property type
    fn page_url(&self, city: &str, property_type: PropertyType, page: u32) -> String;

    /// Fetches one results page and extracts its listings.
    /// Row-level extraction failures are absorbed; only page-level failures are returned.
    async fn scrape_page(&self, url: &str) -> Result<Vec<ListingDetails>, FetchError>;
}
