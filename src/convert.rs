//! Conversion driver
//!
//! Walks the label-map directory in sorted order, derives one annotation per
//! labeled instance, and writes the assembled dataset in a single pass.

use glob::glob;
use image::{GrayImage, Luma, RgbImage};
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use std::collections::{BTreeSet, HashSet};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use crate::catalog::Catalog;
use crate::config::Args;
use crate::polygon::mask_to_polygons;
use crate::rle;
use crate::types::{Annotation, Dataset, ImageRecord};

/// How often the progress message is refreshed, in files.
const PROGRESS_LOG_INTERVAL: usize = 50;

/// Counts reported after a completed conversion run.
#[derive(Debug, Clone, Copy)]
pub struct ConversionSummary {
    pub files_processed: usize,
    pub annotations_written: usize,
}

/// Mutable state of one conversion run: the growing output lists, the image
/// dedup set, and the monotonic annotation id counter.
struct ConversionContext {
    images: Vec<ImageRecord>,
    seen_files: HashSet<String>,
    annotations: Vec<Annotation>,
    next_annotation_id: u32,
}

impl ConversionContext {
    fn new() -> Self {
        Self {
            images: Vec::new(),
            seen_files: HashSet::new(),
            annotations: Vec::new(),
            next_annotation_id: 0,
        }
    }

    /// Record an image the first time it is seen, preserving encounter order.
    fn record_image(&mut self, record: &ImageRecord) {
        if self.seen_files.insert(record.file_name.clone()) {
            self.images.push(record.clone());
        }
    }

    /// Append an annotation, assigning it the next monotonic id.
    fn push_annotation(
        &mut self,
        image_id: u32,
        segmentation: Vec<Vec<u32>>,
        bbox: [f64; 4],
        category_id: u32,
        area: u64,
    ) {
        let id = self.next_annotation_id;
        self.next_annotation_id += 1;
        self.annotations.push(Annotation {
            id,
            image_id,
            segmentation,
            bbox,
            category_id,
            iscrowd: 0,
            area,
        });
    }
}

/// Run the full conversion: load the catalog, process every label map in the
/// annotation directory, and write the output dataset once at the end.
pub fn convert_dataset(args: &Args) -> Result<ConversionSummary, Box<dyn std::error::Error>> {
    let catalog = Catalog::load(Path::new(&args.catalog))?;
    info!("Loaded catalog with {} images", catalog.len());

    let files = collect_label_maps(Path::new(&args.ann_dir))?;
    let pb = create_progress_bar(files.len() as u64);

    let mut context = ConversionContext::new();
    for (index, path) in files.iter().enumerate() {
        if index % PROGRESS_LOG_INTERVAL == 0 {
            pb.set_message(format!("{} files processed", index));
        }
        convert_label_map(path, &catalog, &mut context)?;
        pb.inc(1);
    }
    pb.finish_with_message(format!("{} files processed", files.len()));

    info!(
        "#files: {}, #instances: {}",
        files.len(),
        context.annotations.len()
    );

    let summary = ConversionSummary {
        files_processed: files.len(),
        annotations_written: context.annotations.len(),
    };

    let dataset = Dataset {
        categories: catalog.categories().to_vec(),
        images: context.images,
        annotations: context.annotations,
    };
    write_dataset(&dataset, Path::new(&args.output_json))?;

    Ok(summary)
}

/// Enumerate the label-map PNG files, sorted by path for determinism.
fn collect_label_maps(ann_dir: &Path) -> Result<Vec<PathBuf>, Box<dyn std::error::Error>> {
    let pattern = ann_dir.join("*.png");
    let pattern = pattern.to_str().ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("annotation directory path is not valid UTF-8: {:?}", ann_dir),
        )
    })?;

    let mut files: Vec<PathBuf> = glob(pattern)?.filter_map(|entry| entry.ok()).collect();
    files.sort();
    Ok(files)
}

/// Process one label-map file, appending its instances to the context.
fn convert_label_map(
    path: &Path,
    catalog: &Catalog,
    context: &mut ConversionContext,
) -> Result<(), Box<dyn std::error::Error>> {
    let file_name = source_image_name(path)?;
    let image_id = catalog.image_id(&file_name).ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("image {} is not present in the catalog", file_name),
        )
    })?;
    let record = catalog.image_record(&file_name).ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("image {} is not present in the catalog", file_name),
        )
    })?;

    // The image counts as referenced before any instance is inspected: an image
    // whose instances are all degenerate still appears in the output list.
    context.record_image(record);

    let label_map = image::open(path)?.to_rgb8();

    for instance_id in distinct_instance_ids(&label_map) {
        let (mask, category_id) = isolate_instance(&label_map, instance_id);

        let Some(segmentation) = mask_to_polygons(&mask) else {
            warn!(
                "no valid polygon for instance {} in {}",
                instance_id,
                path.display()
            );
            continue;
        };

        let encoded = rle::encode(&mask);
        let bbox = rle::to_bbox(&encoded);
        let area = mask.pixels().filter(|p| p[0] != 0).count() as u64;

        context.push_annotation(image_id, segmentation, bbox, category_id as u32, area);
    }

    Ok(())
}

/// Derive the original image file name from a label-map path (`<stem>.png` -> `<stem>.jpg`).
fn source_image_name(path: &Path) -> Result<String, Box<dyn std::error::Error>> {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("invalid label-map file name: {:?}", path),
            )
        })?;
    Ok(format!("{}.jpg", stem))
}

/// Distinct nonzero values of the instance-id channel, ascending.
fn distinct_instance_ids(label_map: &RgbImage) -> BTreeSet<u8> {
    label_map
        .pixels()
        .map(|p| p[1])
        .filter(|&v| v != 0)
        .collect()
}

/// Build the binary mask for one instance and sample its category id from the
/// first masked pixel in row-major order. The category channel is trusted to be
/// uniform across the instance region.
fn isolate_instance(label_map: &RgbImage, instance_id: u8) -> (GrayImage, u8) {
    let (width, height) = label_map.dimensions();
    let mut mask = GrayImage::new(width, height);
    let mut category_id = 0u8;
    let mut sampled = false;

    for y in 0..height {
        for x in 0..width {
            let pixel = label_map.get_pixel(x, y);
            if pixel[1] == instance_id {
                mask.put_pixel(x, y, Luma([255u8]));
                if !sampled {
                    category_id = pixel[0];
                    sampled = true;
                }
            }
        }
    }

    (mask, category_id)
}

/// Serialize the dataset to the output path in one write.
fn write_dataset(dataset: &Dataset, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let file = File::create(path).map_err(|e| {
        std::io::Error::new(
            e.kind(),
            format!("failed to create output file {}: {}", path.display(), e),
        )
    })?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, dataset)?;
    info!("Wrote {}", path.display());
    Ok(())
}

fn create_progress_bar(len: u64) -> ProgressBar {
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-"),
    );
    pb
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_image_name_replaces_extension() {
        let name = source_image_name(Path::new("/data/ADE_val_00000001.png")).unwrap();
        assert_eq!(name, "ADE_val_00000001.jpg");
    }

    #[test]
    fn distinct_ids_are_ascending_and_skip_background() {
        let mut label_map = RgbImage::new(4, 1);
        label_map.put_pixel(0, 0, image::Rgb([5, 2, 0]));
        label_map.put_pixel(1, 0, image::Rgb([5, 0, 0]));
        label_map.put_pixel(2, 0, image::Rgb([7, 9, 0]));
        label_map.put_pixel(3, 0, image::Rgb([7, 2, 0]));

        let ids: Vec<u8> = distinct_instance_ids(&label_map).into_iter().collect();
        assert_eq!(ids, vec![2, 9]);
    }

    #[test]
    fn isolate_instance_builds_mask_and_samples_category() {
        let mut label_map = RgbImage::new(3, 2);
        label_map.put_pixel(1, 0, image::Rgb([5, 1, 0]));
        label_map.put_pixel(2, 1, image::Rgb([5, 1, 0]));
        label_map.put_pixel(0, 1, image::Rgb([9, 2, 0]));

        let (mask, category_id) = isolate_instance(&label_map, 1);
        assert_eq!(category_id, 5);
        assert_eq!(mask.get_pixel(1, 0)[0], 255);
        assert_eq!(mask.get_pixel(2, 1)[0], 255);
        assert_eq!(mask.get_pixel(0, 1)[0], 0);
        assert_eq!(mask.pixels().filter(|p| p[0] != 0).count(), 2);
    }

    #[test]
    fn context_assigns_monotonic_ids_only_for_emitted_annotations() {
        let mut context = ConversionContext::new();
        context.push_annotation(3, vec![vec![0, 0, 1, 0, 1, 1]], [0.0, 0.0, 2.0, 2.0], 5, 4);
        context.push_annotation(3, vec![vec![0, 0, 2, 0, 2, 2]], [0.0, 0.0, 3.0, 3.0], 7, 9);

        assert_eq!(context.annotations[0].id, 0);
        assert_eq!(context.annotations[1].id, 1);
        assert_eq!(context.annotations[0].iscrowd, 0);
        assert_eq!(context.annotations[1].iscrowd, 0);
    }

    #[test]
    fn context_deduplicates_images_in_first_seen_order() {
        let record = |name: &str, id: u32| ImageRecord {
            file_name: name.to_string(),
            id,
            extra: serde_json::Map::new(),
        };

        let mut context = ConversionContext::new();
        context.record_image(&record("a.jpg", 1));
        context.record_image(&record("b.jpg", 2));
        context.record_image(&record("a.jpg", 1));

        let names: Vec<&str> = context
            .images
            .iter()
            .map(|r| r.file_name.as_str())
            .collect();
        assert_eq!(names, vec!["a.jpg", "b.jpg"]);
    }
}
