// Spatial hash grid for overlap candidate pruning.
//
// The free-position scan tests thousands of candidates against the same set of
// placed footprints. Bucketing those footprints by cell keeps each test close to
// O(1) instead of O(n).

use std::collections::{HashMap, HashSet};

use super::overlap::overlaps;
use super::Rect;

/// A spatial hash grid over float rectangles.
#[derive(Debug, Clone)]
pub struct SpatialGrid {
    cell_size: f64,
    rects: Vec<Rect>,
    /// Map from cell coordinates to indices into `rects`.
    cells: HashMap<(i64, i64), Vec<usize>>,
}

impl SpatialGrid {
    /// Cell size should be roughly the size of the largest expected item.
    pub fn new(cell_size: f64) -> Self {
        let cell_size = if cell_size > 0.0 && cell_size.is_finite() { cell_size } else { 1.0 };
        Self { cell_size, rects: Vec::new(), cells: HashMap::new() }
    }

    pub fn from_rects<I: IntoIterator<Item = Rect>>(cell_size: f64, rects: I) -> Self {
        let mut grid = Self::new(cell_size);
        for rect in rects {
            grid.insert(rect);
        }
        grid
    }

    /// Cells touched by a rectangle, edges inclusive so the result is a superset.
    fn cell_range(&self, rect: &Rect) -> impl Iterator<Item = (i64, i64)> {
        let min_x = (rect.x / self.cell_size).floor() as i64;
        let max_x = (rect.right() / self.cell_size).floor() as i64;
        let min_y = (rect.y / self.cell_size).floor() as i64;
        let max_y = (rect.bottom() / self.cell_size).floor() as i64;
        (min_x..=max_x).flat_map(move |cx| (min_y..=max_y).map(move |cy| (cx, cy)))
    }

    pub fn insert(&mut self, rect: Rect) {
        let idx = self.rects.len();
        self.rects.push(rect);
        let cells: Vec<_> = self.cell_range(&rect).collect();
        for cell in cells {
            self.cells.entry(cell).or_default().push(idx);
        }
    }

    /// Rectangles sharing a cell with `rect`. May include false positives.
    pub fn query(&self, rect: &Rect) -> Vec<Rect> {
        let mut seen = HashSet::new();
        let mut result = Vec::new();
        for cell in self.cell_range(rect) {
            if let Some(indices) = self.cells.get(&cell) {
                for &i in indices {
                    if seen.insert(i) {
                        result.push(self.rects[i]);
                    }
                }
            }
        }
        result
    }

    /// Exact tolerant overlap test against everything in the grid.
    pub fn overlaps_any(&self, rect: &Rect, tolerance: f64) -> bool {
        self.query(rect).iter().any(|candidate| overlaps(rect, candidate, tolerance))
    }

    #[allow(dead_code)]
    pub fn len(&self) -> usize {
        self.rects.len()
    }
}
