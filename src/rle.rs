//! Column-major run-length encoding of binary masks.
//!
//! The layout matches the COCO mask convention: pixels are scanned in Fortran
//! order (down each column, columns left to right) and `counts` alternates runs
//! of background and foreground, starting with background. The encoding is used
//! only as an intermediate to derive bounding boxes; it is never serialized.

use image::GrayImage;

/// A run-length-encoded binary mask.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rle {
    pub height: u32,
    pub width: u32,
    /// Alternating background/foreground run lengths, background first.
    pub counts: Vec<u32>,
}

/// Encode a mask, treating any nonzero pixel as foreground.
pub fn encode(mask: &GrayImage) -> Rle {
    let (width, height) = mask.dimensions();
    let mut counts = Vec::new();
    let mut in_foreground = false;
    let mut run = 0u32;

    for x in 0..width {
        for y in 0..height {
            let foreground = mask.get_pixel(x, y)[0] != 0;
            if foreground == in_foreground {
                run += 1;
            } else {
                counts.push(run);
                run = 1;
                in_foreground = foreground;
            }
        }
    }
    counts.push(run);

    Rle {
        height,
        width,
        counts,
    }
}

/// Decode back to a mask with foreground pixels set to 255.
pub fn decode(rle: &Rle) -> GrayImage {
    let mut mask = GrayImage::new(rle.width, rle.height);
    let height = rle.height as usize;
    let mut offset = 0usize;
    let mut foreground = false;

    for &run in &rle.counts {
        if foreground {
            for idx in offset..offset + run as usize {
                let (x, y) = ((idx / height) as u32, (idx % height) as u32);
                mask.put_pixel(x, y, image::Luma([255u8]));
            }
        }
        offset += run as usize;
        foreground = !foreground;
    }
    mask
}

/// Foreground pixel count.
pub fn area(rle: &Rle) -> u64 {
    rle.counts
        .iter()
        .skip(1)
        .step_by(2)
        .map(|&run| run as u64)
        .sum()
}

/// Bounding box `[x, y, width, height]` of the foreground region.
///
/// A mask with no foreground pixels yields an all-zero box.
pub fn to_bbox(rle: &Rle) -> [f64; 4] {
    let height = rle.height as usize;
    if height == 0 || rle.width == 0 {
        return [0.0, 0.0, 0.0, 0.0];
    }

    let mut min_x = usize::MAX;
    let mut max_x = 0usize;
    let mut min_y = usize::MAX;
    let mut max_y = 0usize;
    let mut offset = 0usize;
    let mut foreground = false;
    let mut seen = false;

    for &run in &rle.counts {
        let run = run as usize;
        if foreground && run > 0 {
            seen = true;
            let start = offset;
            let end = offset + run - 1;
            let (x_start, y_start) = (start / height, start % height);
            let (x_end, y_end) = (end / height, end % height);

            min_x = min_x.min(x_start);
            max_x = max_x.max(x_end);
            if x_start == x_end {
                min_y = min_y.min(y_start);
                max_y = max_y.max(y_end);
            } else {
                // A run crossing a column boundary covers full columns in between
                min_y = 0;
                max_y = height - 1;
            }
        }
        offset += run;
        foreground = !foreground;
    }

    if !seen {
        return [0.0, 0.0, 0.0, 0.0];
    }

    [
        min_x as f64,
        min_y as f64,
        (max_x - min_x + 1) as f64,
        (max_y - min_y + 1) as f64,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn mask_from_rows(rows: &[&[u8]]) -> GrayImage {
        let height = rows.len() as u32;
        let width = rows[0].len() as u32;
        let mut mask = GrayImage::new(width, height);
        for (y, row) in rows.iter().enumerate() {
            for (x, &v) in row.iter().enumerate() {
                if v != 0 {
                    mask.put_pixel(x as u32, y as u32, Luma([255u8]));
                }
            }
        }
        mask
    }

    #[test]
    fn encode_empty_mask() {
        let mask = GrayImage::new(4, 3);
        let rle = encode(&mask);
        assert_eq!(rle.counts, vec![12]);
        assert_eq!(area(&rle), 0);
        assert_eq!(to_bbox(&rle), [0.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn encode_full_mask() {
        let mask = mask_from_rows(&[&[1, 1], &[1, 1]]);
        let rle = encode(&mask);
        assert_eq!(rle.counts, vec![0, 4]);
        assert_eq!(area(&rle), 4);
        assert_eq!(to_bbox(&rle), [0.0, 0.0, 2.0, 2.0]);
    }

    #[test]
    fn roundtrip_preserves_mask() {
        let mask = mask_from_rows(&[
            &[0, 1, 0, 1],
            &[0, 1, 0, 0],
            &[0, 1, 1, 0],
        ]);
        let rle = encode(&mask);
        assert_eq!(decode(&rle), mask);
    }

    #[test]
    fn area_counts_foreground_pixels() {
        let mask = mask_from_rows(&[
            &[0, 1, 0, 1],
            &[0, 1, 0, 0],
            &[0, 1, 1, 0],
        ]);
        assert_eq!(area(&encode(&mask)), 5);
    }

    #[test]
    fn bbox_of_interior_rectangle() {
        let mask = mask_from_rows(&[
            &[0, 0, 0, 0, 0],
            &[0, 1, 1, 1, 0],
            &[0, 1, 1, 1, 0],
            &[0, 0, 0, 0, 0],
        ]);
        assert_eq!(to_bbox(&encode(&mask)), [1.0, 1.0, 3.0, 2.0]);
    }

    #[test]
    fn bbox_of_column_spanning_run() {
        // Two full adjacent columns form a single run crossing the column boundary
        let mask = mask_from_rows(&[
            &[0, 1, 1, 0],
            &[0, 1, 1, 0],
            &[0, 1, 1, 0],
        ]);
        assert_eq!(to_bbox(&encode(&mask)), [1.0, 0.0, 2.0, 3.0]);
    }

    #[test]
    fn bbox_of_single_pixel() {
        let mask = mask_from_rows(&[
            &[0, 0, 0],
            &[0, 0, 1],
            &[0, 0, 0],
        ]);
        assert_eq!(to_bbox(&encode(&mask)), [2.0, 1.0, 1.0, 1.0]);
    }
}
