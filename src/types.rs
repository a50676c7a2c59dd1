use serde::{Deserialize, Serialize};

/// One image record from the catalog.
///
/// Only `file_name` and `id` are interpreted; every other field is carried through
/// to the output unchanged via the flattened map.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageRecord {
    pub file_name: String,
    pub id: u32,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// One instance annotation in the output dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Annotation {
    pub id: u32,
    pub image_id: u32,
    /// One flat `x1,y1,x2,y2,...` coordinate sequence per disjoint outer contour.
    pub segmentation: Vec<Vec<u32>>,
    /// `[x, y, width, height]` in pixels.
    pub bbox: [f64; 4],
    pub category_id: u32,
    pub iscrowd: u32,
    /// Pixel count of the instance mask.
    pub area: u64,
}

/// The complete output dataset.
///
/// Field order fixes the JSON key order: categories, images, annotations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dataset {
    /// Category definitions copied verbatim from the catalog, never interpreted.
    pub categories: Vec<serde_json::Value>,
    /// Records for the images actually referenced, deduplicated, first-seen order.
    pub images: Vec<ImageRecord>,
    pub annotations: Vec<Annotation>,
}
