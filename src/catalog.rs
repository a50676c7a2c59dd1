//! Catalog loading
//!
//! The catalog is an external JSON reference file with top-level `images` and
//! `categories` keys. It is read once and held in memory as two lookups keyed by
//! image file name.

use serde::Deserialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::types::ImageRecord;

/// On-disk layout of the catalog file.
#[derive(Debug, Deserialize)]
struct CatalogFile {
    images: Vec<ImageRecord>,
    categories: Vec<serde_json::Value>,
}

/// In-memory catalog: file name to image id, file name to full record, plus the
/// category list passed through unchanged.
#[derive(Debug)]
pub struct Catalog {
    ids: HashMap<String, u32>,
    records: HashMap<String, ImageRecord>,
    categories: Vec<serde_json::Value>,
}

impl Catalog {
    /// Load the catalog from a JSON file.
    ///
    /// A missing or malformed file is a hard error; there is no retry or fallback.
    pub fn load(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let file = File::open(path).map_err(|e| {
            std::io::Error::new(
                e.kind(),
                format!("failed to open catalog {}: {}", path.display(), e),
            )
        })?;
        let parsed: CatalogFile = serde_json::from_reader(BufReader::new(file))?;

        let mut ids = HashMap::with_capacity(parsed.images.len());
        let mut records = HashMap::with_capacity(parsed.images.len());
        for record in parsed.images {
            ids.insert(record.file_name.clone(), record.id);
            records.insert(record.file_name.clone(), record);
        }

        Ok(Self {
            ids,
            records,
            categories: parsed.categories,
        })
    }

    /// Look up the numeric image id for a file name.
    pub fn image_id(&self, file_name: &str) -> Option<u32> {
        self.ids.get(file_name).copied()
    }

    /// Look up the full image record for a file name.
    pub fn image_record(&self, file_name: &str) -> Option<&ImageRecord> {
        self.records.get(file_name)
    }

    /// The category definitions, untouched.
    pub fn categories(&self) -> &[serde_json::Value] {
        &self.categories
    }

    /// Number of images in the catalog.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
