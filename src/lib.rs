//! Instance label-map to COCO dataset converter
//!
//! This library converts a directory of per-image instance-segmentation label maps
//! (two-channel rasters encoding category id and instance id per pixel) into a single
//! COCO-style JSON dataset with one polygon annotation per labeled instance.

pub mod catalog;
pub mod config;
pub mod convert;
pub mod polygon;
pub mod rle;
pub mod types;

// Re-export commonly used types and functions
pub use catalog::Catalog;
pub use config::Args;
pub use convert::{convert_dataset, ConversionSummary};
pub use polygon::mask_to_polygons;
pub use types::{Annotation, Dataset, ImageRecord};
