// Free-position search.
//
// Raster-scans candidate top-left corners row by row (y outer, x inner) and returns
// the first one whose footprint overlaps nothing already placed. The scan order is
// fixed, so the same inputs always produce the same slot.
//
// Cost is O((width/step) * (height/step)) candidate tests, each pruned through a
// spatial grid built once per call.

use super::spatial_grid::SpatialGrid;
use super::{Plane, Point, Rect, Size, SnapConfig, BOUNDS_EPSILON};

/// Number of grid steps that fit in `span`, counting the zero position.
fn steps_in(span: f64, step: f64) -> Option<u64> {
    if span < -BOUNDS_EPSILON {
        return None;
    }
    Some((span.max(0.0) / step + BOUNDS_EPSILON).floor() as u64 + 1)
}

/// Find the top-left-most free slot for `footprint`.
///
/// Candidates advance by `step` and each is snapped to the `snap` grid (when
/// enabled) before testing, so results are grid-aligned even when the step is not
/// a multiple of the resolution. Returns `None` when the plane has no room; that
/// is a normal outcome, not an error.
pub fn find_free_position(
    plane: &Plane,
    placed: &[Rect],
    footprint: Size,
    step: f64,
    snap: &SnapConfig,
    tolerance: f64,
) -> Option<Point> {
    if !(step > 0.0 && step.is_finite()) || !footprint.is_positive() {
        return None;
    }

    let max = plane.max_origin(footprint);
    let rows = steps_in(max.y, step)?;
    let cols = steps_in(max.x, step)?;

    let cell = footprint.width.max(footprint.height).max(step);
    let grid = SpatialGrid::from_rects(cell, placed.iter().copied());

    for row in 0..rows {
        for col in 0..cols {
            let raw = Point { x: col as f64 * step, y: row as f64 * step };
            let snapped = snap.apply_on_plane(raw, footprint, plane, false);
            let at = Point { x: snapped.x.min(max.x), y: snapped.y.min(max.y) };
            if !grid.overlaps_any(&Rect::at(at, footprint), tolerance) {
                return Some(at);
            }
        }
    }
    None
}
