// Axis-aligned overlap detection.
//
// Shared by the free-position search and by drag validation. The tolerance lets
// two rectangles that touch after snapping (or are off by float noise) count as
// adjacent rather than overlapping.

use super::Rect;

/// Whether `a` and `b` share area, ignoring contact closer than `tolerance`.
///
/// The rectangles are separated iff one lies entirely to the left of, or
/// entirely above, the other once the tolerance is added to the far edge.
pub fn overlaps(a: &Rect, b: &Rect, tolerance: f64) -> bool {
    let separated = a.right() <= b.x + tolerance
        || b.right() <= a.x + tolerance
        || a.bottom() <= b.y + tolerance
        || b.bottom() <= a.y + tolerance;
    !separated
}

/// Indices of `others` that overlap `rect`.
pub fn overlapping<'a, I>(rect: &Rect, others: I, tolerance: f64) -> Vec<usize>
where
    I: IntoIterator<Item = &'a Rect>,
{
    others
        .into_iter()
        .enumerate()
        .filter(|(_, other)| overlaps(rect, other, tolerance))
        .map(|(i, _)| i)
        .collect()
}
