use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::config::ConfigError;

/// Property categories supported by the site, each mapped to a search path segment
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    Flat,
    House,
    Land,
    Commercial,
    Cottage,
}

impl PropertyType {
    pub const ALL: [PropertyType; 5] = [
        PropertyType::Flat,
        PropertyType::House,
        PropertyType::Land,
        PropertyType::Commercial,
        PropertyType::Cottage,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyType::Flat => "flat",
            PropertyType::House => "house",
            PropertyType::Land => "land",
            PropertyType::Commercial => "commercial",
            PropertyType::Cottage => "cottage",
        }
    }

    /// Path segment used by aruodas.lt search pages
    pub fn url_segment(&self) -> &'static str {
        match self {
            PropertyType::Flat => "butai",
            PropertyType::House => "namai",
            PropertyType::Land => "sklypai",
            PropertyType::Commercial => "komercines-patalpos",
            PropertyType::Cottage => "sodyba",
        }
    }

    /// Comma-separated list of every supported code, for error messages
    pub fn supported_list() -> String {
        Self::ALL
            .iter()
            .map(|t| t.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PropertyType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ConfigError::UnsupportedPropertyType {
                token: s.to_string(),
                supported: Self::supported_list(),
            })
    }
}

/// Fields extracted from a single listing row.
///
/// Carries no city or property type: those belong to the page being
/// collected and are attached by the collector when it builds a [`Listing`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ListingDetails {
    pub title: String,
    pub price: u64,
    pub area: f64, // m²
    pub url: String,
    pub district: String,
    pub street: String,
    pub listed_date: NaiveDate, // day of collection, not of publication
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rooms: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    #[serde(flatten)]
    pub details: ListingDetails,
    pub city: String,
    pub property_type: PropertyType,
}

impl Listing {
    pub fn new(details: ListingDetails, city: &str, property_type: PropertyType) -> Self {
        Self {
            details,
            city: city.to_string(),
            property_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_details() -> ListingDetails {
        ListingDetails {
            title: "Vilnius, Senamiestis, Pilies g.".to_string(),
            price: 450000,
            area: 55.5,
            url: "https://www.aruodas.lt/butai-vilniuje-1-1".to_string(),
            district: "Senamiestis".to_string(),
            street: "Pilies g. 10".to_string(),
            listed_date: NaiveDate::from_ymd_opt(2026, 10, 16).unwrap(),
            rooms: None,
            images: None,
        }
    }

    #[test]
    fn test_property_type_url_segments() {
        assert_eq!(PropertyType::Flat.url_segment(), "butai");
        assert_eq!(PropertyType::House.url_segment(), "namai");
        assert_eq!(PropertyType::Land.url_segment(), "sklypai");
        assert_eq!(PropertyType::Commercial.url_segment(), "komercines-patalpos");
        assert_eq!(PropertyType::Cottage.url_segment(), "sodyba");
    }

    #[test]
    fn test_property_type_from_str() {
        assert_eq!("flat".parse::<PropertyType>().unwrap(), PropertyType::Flat);
        assert_eq!("cottage".parse::<PropertyType>().unwrap(), PropertyType::Cottage);
    }

    #[test]
    fn test_property_type_from_str_is_case_sensitive() {
        assert!("Flat".parse::<PropertyType>().is_err());
    }

    #[test]
    fn test_property_type_unknown_lists_supported() {
        let err = "castle".parse::<PropertyType>().unwrap_err();
        let message = err.to_string();
        assert!(message.contains("castle"));
        assert!(message.contains("flat, house, land, commercial, cottage"));
    }

    #[test]
    fn test_listing_omits_absent_optional_fields() {
        let listing = Listing::new(sample_details(), "Vilnius", PropertyType::Flat);
        let value = serde_json::to_value(&listing).unwrap();
        let object = value.as_object().unwrap();

        assert!(!object.contains_key("rooms"));
        assert!(!object.contains_key("images"));
        assert_eq!(object["listedDate"], "2026-10-16");
        assert_eq!(object["propertyType"], "flat");
        assert_eq!(object["city"], "Vilnius");
    }

    #[test]
    fn test_listing_includes_present_optional_fields() {
        let mut details = sample_details();
        details.rooms = Some(3);
        details.images = Some(vec!["https://img.aruodas.lt/a.jpg".to_string()]);

        let listing = Listing::new(details, "Kaunas", PropertyType::House);
        let value = serde_json::to_value(&listing).unwrap();

        assert_eq!(value["rooms"], 3);
        assert_eq!(value["images"][0], "https://img.aruodas.lt/a.jpg");
        assert_eq!(value["propertyType"], "house");
    }

    #[test]
    fn test_listing_keys_are_camel_case_and_flat() {
        let listing = Listing::new(sample_details(), "Vilnius", PropertyType::Land);
        let json = serde_json::to_string(&listing).unwrap();

        assert!(json.starts_with("{\"title\":"));
        assert!(json.contains("\"listedDate\""));
        assert!(!json.contains("\"details\""));
        assert!(!json.contains("listed_date"));
    }
}
