use crate::config::Config;
use crate::extractor::ListingExtractor;
use crate::http_client::{FetchError, PageFetcher};
use crate::models::{ListingDetails, PropertyType};
use crate::scraper_trait::PageScraper;
use anyhow::Result;
use async_trait::async_trait;
use chrono::Local;

pub struct AruodasScraper {
    fetcher: PageFetcher,
    extractor: ListingExtractor,
    base_url: String,
}

impl AruodasScraper {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self::with_parts(
            PageFetcher::new(config)?,
            ListingExtractor::new()?,
            &config.base_url,
        ))
    }

    pub fn with_parts(fetcher: PageFetcher, extractor: ListingExtractor, base_url: &str) -> Self {
        Self {
            fetcher,
            extractor,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// First results page for a city, e.g. `https://www.aruodas.lt/butai/vilnius/`
    pub fn build_search_url(&self, city: &str, property_type: PropertyType) -> String {
        format!(
            "{}/{}/{}/",
            self.base_url,
            property_type.url_segment(),
            urlencoding::encode(&city.to_lowercase())
        )
    }

    pub async fn fetch_html(&self, url: &str) -> Result<String, FetchError> {
        self.fetcher.fetch_html(url).await
    }

    /// Extract listings from a page, stamped with today's local date
    pub fn extract(&self, html: &str) -> Vec<ListingDetails> {
        self.extractor.extract(html, Local::now().date_naive())
    }
}

#[async_trait]
impl PageScraper for AruodasScraper {
    fn name(&self) -> &str {
        "Aruodas"
    }

    fn page_url(&self, city: &str, property_type: PropertyType, page: u32) -> String {
        let base_url = self.build_search_url(city, property_type);
        if page <= 1 {
            base_url
        } else {
            format!("{}puslapis/{}/", base_url, page)
        }
    }

    async fn scrape_page(&self, url: &str) -> Result<Vec<ListingDetails>, FetchError> {
        let html = self.fetch_html(url).await?;
        Ok(self.extract(&html))
    }
}
