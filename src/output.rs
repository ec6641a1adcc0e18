use crate::models::Listing;
use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Write all listings to `path` as one pretty-printed JSON array, creating
/// missing parent directories first. Non-ASCII text is written as-is.
pub fn write_listings(path: &Path, listings: &[Listing]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create output directory {}", parent.display()))?;
        }
    }

    let file = File::create(path)
        .with_context(|| format!("Failed to create output file {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    serde_json::to_writer_pretty(&mut writer, listings)
        .with_context(|| format!("Failed to write listings to {}", path.display()))?;
    writer.flush()
        .with_context(|| format!("Failed to flush {}", path.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ListingDetails, PropertyType};
    use chrono::NaiveDate;

    fn listing(title: &str) -> Listing {
        Listing::new(
            ListingDetails {
                title: title.to_string(),
                price: 120000,
                area: 61.0,
                url: String::new(),
                district: "Šilainiai".to_string(),
                street: String::new(),
                listed_date: NaiveDate::from_ymd_opt(2026, 10, 16).unwrap(),
                rooms: None,
                images: None,
            },
            "Kaunas",
            PropertyType::Flat,
        )
    }

    #[test]
    fn test_write_empty_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");

        write_listings(&path, &[]).unwrap();

        let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value, serde_json::json!([]));
    }

    #[test]
    fn test_creates_missing_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results").join("2026").join("out.json");

        write_listings(&path, &[listing("Butas")]).unwrap();

        assert!(path.exists());
    }

    #[test]
    fn test_output_is_pretty_utf8_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");

        write_listings(&path, &[listing("Butas Šilainiuose"), listing("Butas Šilainiuose")]).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("Šilainiuose"), "non-ASCII text must not be escaped");
        assert!(content.contains("\n  {\n    \"title\""), "two-space indentation expected");

        let value: Vec<serde_json::Value> = serde_json::from_str(&content).unwrap();
        assert_eq!(value.len(), 2);
        assert_eq!(value[0]["district"], "Šilainiai");
        assert_eq!(value[0]["propertyType"], "flat");
    }

    #[test]
    fn test_round_trip_listing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        let original = vec![listing("Namas")];

        write_listings(&path, &original).unwrap();

        let restored: Vec<Listing> = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(restored, original);
    }

    #[test]
    fn test_unwritable_path_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, "x").unwrap();

        let result = write_listings(&blocker.join("out.json"), &[]);
        assert!(result.is_err());
    }
}
