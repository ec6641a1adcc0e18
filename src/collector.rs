use crate::config::RunPlan;
use crate::models::Listing;
use crate::pacing::Pacer;
use crate::scraper_trait::PageScraper;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CollectionStats {
    pub pages_requested: usize,
    pub pages_failed: usize,
}

#[derive(Debug)]
pub struct Collection {
    pub listings: Vec<Listing>,
    pub stats: CollectionStats,
}

/// Walks every city × property type × page of a [`RunPlan`], one request at a time
pub struct Collector<'a> {
    scraper: &'a dyn PageScraper,
    pacer: &'a dyn Pacer,
}

impl<'a> Collector<'a> {
    pub fn new(scraper: &'a dyn PageScraper, pacer: &'a dyn Pacer) -> Self {
        Self { scraper, pacer }
    }

    /// Collect all pages of the plan. A failed page counts as zero listings;
    /// the pacer runs after every page whether it succeeded or not.
    pub async fn collect(&self, plan: &RunPlan) -> Collection {
        let mut listings = Vec::new();
        let mut stats = CollectionStats::default();

        tracing::info!("Collecting {} pages from {}", plan.page_count(), self.scraper.name());

        for city in &plan.cities {
            tracing::info!("Scraping city: {}", city);

            for &property_type in &plan.property_types {
                tracing::info!("  Property type: {} ({})", property_type, property_type.url_segment());

                for page in 1..=plan.pages {
                    let url = self.scraper.page_url(city, property_type, page);
                    tracing::info!("    Page {}: {}", page, url);
                    stats.pages_requested += 1;

                    let page_listings = match self.scraper.scrape_page(&url).await {
                        Ok(page_listings) => page_listings,
                        Err(e) => {
                            tracing::warn!("    Skipping page: {}", e);
                            stats.pages_failed += 1;
                            Vec::new()
                        }
                    };

                    tracing::info!("    Collected {} listings", page_listings.len());
                    listings.extend(
                        page_listings
                            .into_iter()
                            .map(|details| Listing::new(details, city, property_type)),
                    );

                    self.pacer.pause().await;
                }
            }
        }

        tracing::info!(
            "Collection finished: {} listings from {} pages ({} failed)",
            listings.len(),
            stats.pages_requested,
            stats.pages_failed
        );

        Collection { listings, stats }
    }
}
