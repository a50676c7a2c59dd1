//! Outer-boundary polygon extraction from a single-instance mask.

use image::GrayImage;
use imageproc::contours::find_contours;

/// Minimum flat coordinate count for a usable polygon (3 points).
const MIN_POLYGON_LEN: usize = 6;

/// Trace the outer boundaries of the nonzero region of `mask` and return them as
/// flat `x1,y1,x2,y2,...` coordinate sequences.
///
/// Contours that have a parent in the contour hierarchy are interior boundaries
/// (holes) and are discarded, as are degenerate traces with fewer than 3 points.
/// Returns `None` when every contour was discarded; the caller is expected to skip
/// the instance entirely in that case.
pub fn mask_to_polygons(mask: &GrayImage) -> Option<Vec<Vec<u32>>> {
    let contours = find_contours::<i32>(mask);

    let polygons: Vec<Vec<u32>> = contours
        .iter()
        .filter(|contour| contour.parent.is_none())
        .map(|contour| {
            contour
                .points
                .iter()
                .flat_map(|p| [p.x as u32, p.y as u32])
                .collect::<Vec<u32>>()
        })
        .filter(|polygon| polygon.len() >= MIN_POLYGON_LEN)
        .collect();

    if polygons.is_empty() {
        None
    } else {
        Some(polygons)
    }
}
