use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::models::ListingDetails;

/// Title used when a row has no title node at all
pub const UNSPECIFIED_TITLE: &str = "Nenurodyta";

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| anyhow!("Invalid selector '{}': {:?}", css, e))
}

/// Pulls listing rows out of an aruodas.lt search results page.
///
/// Selectors and patterns are compiled once and reused for every page.
pub struct ListingExtractor {
    row: Selector,
    title: Selector,
    price: Selector,
    details: Selector,
    link: Selector,
    image: Selector,
    address: Selector,
    area_pattern: Regex,
    rooms_pattern: Regex,
}

impl ListingExtractor {
    pub fn new() -> Result<Self> {
        Ok(Self {
            row: selector(".list-row")?,
            title: selector(".list-line-1")?,
            price: selector(".list-price-main")?,
            details: selector(".list-line-2")?,
            link: selector("a.item-url")?,
            image: selector("img")?,
            address: selector(".list-address")?,
            area_pattern: Regex::new(r"([0-9]+(?:[.,][0-9]+)?)\s*m²").context("Invalid area pattern")?,
            rooms_pattern: Regex::new(r"([0-9]+)\s*kamb").context("Invalid rooms pattern")?,
        })
    }

    /// Extract every listing row of `html`. A row that fails is logged and
    /// dropped; the remaining rows are still returned.
    pub fn extract(&self, html: &str, listed_date: NaiveDate) -> Vec<ListingDetails> {
        let document = Html::parse_document(html);
        let mut listings = Vec::new();
        let mut skipped = 0;

        for (index, row) in document.select(&self.row).enumerate() {
            tracing::trace!("Processing listing #{}", index + 1);

            match self.extract_row(row, listed_date) {
                Ok(listing) => listings.push(listing),
                Err(e) => {
                    tracing::warn!("Failed to process listing #{}: {:#}", index + 1, e);
                    skipped += 1;
                }
            }
        }

        if listings.is_empty() && skipped == 0 {
            tracing::debug!("No listing rows found. Page structure may have changed.");
        } else {
            tracing::debug!("Extracted {} listings ({} skipped)", listings.len(), skipped);
        }

        listings
    }

    fn extract_row(&self, row: ElementRef<'_>, listed_date: NaiveDate) -> Result<ListingDetails> {
        let title = select_text(row, &self.title).unwrap_or_else(|| UNSPECIFIED_TITLE.to_string());

        let price_text = select_text(row, &self.price).unwrap_or_else(|| "0".to_string());
        let price = parse_price(&price_text)?;

        let details = select_text(row, &self.details).unwrap_or_default();
        let area = self.parse_area(&details)?;
        let rooms = self.parse_rooms(&details)?;

        let url = select_attr(row, &self.link, "href").unwrap_or_default();
        let image = select_attr(row, &self.image, "src").filter(|src| !src.is_empty());

        let address = select_text(row, &self.address).unwrap_or_default();
        let (district, street) = split_address(&address);

        Ok(ListingDetails {
            title,
            price,
            area,
            url,
            district,
            street,
            listed_date,
            rooms,
            images: image.map(|src| vec![src]),
        })
    }

    /// Area in m² from a details line such as "3 kamb. 55,5 m²"; 0 when absent
    pub fn parse_area(&self, details: &str) -> Result<f64> {
        let Some(caps) = self.area_pattern.captures(details) else {
            return Ok(0.0);
        };

        let raw = caps[1].replace(',', ".");
        raw.parse::<f64>()
            .with_context(|| format!("Unparseable area '{}'", &caps[1]))
    }

    /// Room count from a details line such as "3 kamb. 55,5 m²"
    pub fn parse_rooms(&self, details: &str) -> Result<Option<u32>> {
        let Some(caps) = self.rooms_pattern.captures(details) else {
            return Ok(None);
        };

        caps[1]
            .parse::<u32>()
            .map(Some)
            .with_context(|| format!("Unparseable room count '{}'", &caps[1]))
    }
}

fn select_text(element: ElementRef<'_>, selector: &Selector) -> Option<String> {
    element
        .select(selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
}

fn select_attr(element: ElementRef<'_>, selector: &Selector, attr: &str) -> Option<String> {
    element
        .select(selector)
        .next()
        .and_then(|el| el.value().attr(attr))
        .map(|value| value.to_string())
}

/// Price from text like "450 000 €": every non-digit is dropped, no digits means 0
pub fn parse_price(price_text: &str) -> Result<u64> {
    let digits: String = price_text.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return Ok(0);
    }

    digits
        .parse::<u64>()
        .with_context(|| format!("Price '{}' is out of range", price_text))
}

/// Split "Senamiestis, Pilies g. 10" into district and street.
/// A missing street segment yields an empty street.
pub fn split_address(address: &str) -> (String, String) {
    if address.is_empty() {
        return (String::new(), String::new());
    }

    let mut parts = address.split(',').map(str::trim);
    let district = parts.next().unwrap_or_default().to_string();
    let street = parts.next().unwrap_or_default().to_string();
    (district, street)
}
