// Bounded-plane geometry for the land planner.
//
// Coordinates are abstract distance units with the origin at the top-left of the
// plane, x growing rightward and y growing downward. Rectangles are addressed by
// their top-left corner.
//
// Submodules:
// - overlap: AABB intersection with a floating-point tolerance
// - spatial_grid: hash grid used to prune overlap candidates
// - snap: grid quantization
// - free_space: deterministic raster scan for an unoccupied slot
// - spacing: minimum-distance rules for point entities inside a bed

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub mod free_space;
pub mod overlap;
pub mod snap;
pub mod spacing;
mod spatial_grid;

pub use free_space::find_free_position;
pub use overlap::{overlapping, overlaps};
pub use snap::{snap, snap_point, SnapConfig};
pub use spacing::{cell_centers, first_violation, is_valid_position, snap_to_cell_center, PointEntity, SpacingViolation};

/// Slack for bounds comparisons after float arithmetic.
pub(crate) const BOUNDS_EPSILON: f64 = 1e-9;

#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn is_positive(&self) -> bool {
        self.width > 0.0 && self.height > 0.0 && self.width.is_finite() && self.height.is_finite()
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub fn at(origin: Point, size: Size) -> Self {
        Self { x: origin.x, y: origin.y, width: size.width, height: size.height }
    }

    pub fn right(&self) -> f64 { self.x + self.width }
    pub fn bottom(&self) -> f64 { self.y + self.height }

    /// Tolerant overlap test, see [`overlap::overlaps`].
    pub fn overlaps(&self, other: &Rect, tolerance: f64) -> bool {
        overlap::overlaps(self, other, tolerance)
    }

    /// Intersection of two rectangles, or `None` when they do not share area.
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = self.right().min(other.right());
        let y1 = self.bottom().min(other.bottom());
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some(Rect { x: x0, y: y0, width: x1 - x0, height: y1 - y0 })
    }
}

/// The bounded region ("land") items are placed on.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plane {
    pub width: f64,
    pub height: f64,
}

impl Plane {
    pub fn new(width: f64, height: f64) -> Result<Self, ConfigError> {
        if !(width > 0.0 && width.is_finite()) {
            return Err(ConfigError::new("plane.width", width));
        }
        if !(height > 0.0 && height.is_finite()) {
            return Err(ConfigError::new("plane.height", height));
        }
        Ok(Self { width, height })
    }

    pub fn bounds(&self) -> Rect {
        Rect { x: 0.0, y: 0.0, width: self.width, height: self.height }
    }

    /// Whether the footprint lies fully inside `[0, width] x [0, height]`.
    pub fn contains(&self, rect: &Rect) -> bool {
        rect.x >= -BOUNDS_EPSILON
            && rect.y >= -BOUNDS_EPSILON
            && rect.right() <= self.width + BOUNDS_EPSILON
            && rect.bottom() <= self.height + BOUNDS_EPSILON
    }

    /// Largest origin coordinates a footprint of `size` may take.
    /// Negative when the footprint does not fit on that axis.
    pub fn max_origin(&self, size: Size) -> Point {
        Point { x: self.width - size.width, y: self.height - size.height }
    }

    /// Clamp an origin so the footprint never leaves the plane.
    pub fn clamp_origin(&self, origin: Point, size: Size) -> Point {
        let max = self.max_origin(size);
        Point {
            x: origin.x.min(max.x).max(0.0),
            y: origin.y.min(max.y).max(0.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Slack absorbing snapping error so edge-to-edge items are not flagged.
    pub overlap_tolerance: f64,
    pub snap: SnapConfig,
    /// Scan increment for free-position search. `None` uses the snap resolution.
    pub search_step: Option<f64>,
    /// Interactive surface scale.
    pub pixels_per_unit: f64,
    /// How many spacing units (inches) make one plane unit (foot).
    pub spacing_units_per_plane_unit: f64,
    /// Cell size of the planting grid inside a bed.
    pub bed_cell_size: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            overlap_tolerance: 0.01,
            snap: SnapConfig::default(),
            search_step: None,
            pixels_per_unit: 40.0,
            spacing_units_per_plane_unit: 12.0,
            bed_cell_size: 0.5,
        }
    }
}

impl LayoutConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.overlap_tolerance >= 0.0 && self.overlap_tolerance.is_finite()) {
            return Err(ConfigError::new("overlap_tolerance", self.overlap_tolerance));
        }
        self.snap.validate()?;
        if let Some(step) = self.search_step {
            if !(step > 0.0 && step.is_finite()) {
                return Err(ConfigError::new("search_step", step));
            }
        }
        for (field, value) in [
            ("pixels_per_unit", self.pixels_per_unit),
            ("spacing_units_per_plane_unit", self.spacing_units_per_plane_unit),
            ("bed_cell_size", self.bed_cell_size),
        ] {
            if !(value > 0.0 && value.is_finite()) {
                return Err(ConfigError::new(field, value));
            }
        }
        Ok(())
    }

    /// Step used by the free-position scan; equal to the snap resolution unless overridden.
    pub fn effective_search_step(&self) -> f64 {
        self.search_step.unwrap_or(self.snap.resolution)
    }

    /// Parse a JSON config; an empty string yields the defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        if json.trim().is_empty() {
            return Ok(Self::default());
        }
        let cfg: LayoutConfig =
            serde_json::from_str(json).map_err(|e| ConfigError::malformed(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }
}
