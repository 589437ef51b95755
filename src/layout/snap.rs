//! Grid snapping.
//!
//! Coordinates are quantized per axis to a configurable resolution. Snapping is a
//! commit-time concern: drops and automatic placements snap, intermediate drag
//! frames do not have to.

use serde::{Deserialize, Serialize};

use super::{Plane, Point, Size, BOUNDS_EPSILON};
use crate::error::ConfigError;

/// Round `value` to the nearest multiple of `resolution`.
pub fn snap(value: f64, resolution: f64) -> f64 {
    (value / resolution).round() * resolution
}

pub fn snap_point(point: Point, resolution: f64) -> Point {
    Point { x: snap(point.x, resolution), y: snap(point.y, resolution) }
}

/// Snap within `[0, max]`, stepping back onto the grid when rounding overshoots.
///
/// Keeps snapped footprints inside the plane when the maximum origin is not itself
/// a grid multiple.
fn snap_bounded(value: f64, resolution: f64, max: f64) -> f64 {
    let mut snapped = snap(value, resolution);
    if snapped > max + BOUNDS_EPSILON {
        snapped = (max / resolution + BOUNDS_EPSILON).floor() * resolution;
    }
    if snapped < 0.0 {
        snapped = 0.0;
    }
    snapped
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapConfig {
    pub resolution: f64,
    pub enabled: bool,
}

impl Default for SnapConfig {
    fn default() -> Self {
        Self { resolution: 0.1, enabled: true }
    }
}

impl SnapConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.resolution > 0.0 && self.resolution.is_finite()) {
            return Err(ConfigError::new("snap.resolution", self.resolution));
        }
        Ok(())
    }

    /// Whether a commit snaps, given the momentary override (e.g. a held modifier).
    pub fn is_active(&self, override_active: bool) -> bool {
        self.enabled && !override_active
    }

    /// Snap an origin, or pass it through when snapping is off or overridden.
    pub fn apply(&self, point: Point, override_active: bool) -> Point {
        if self.is_active(override_active) {
            snap_point(point, self.resolution)
        } else {
            point
        }
    }

    /// Like [`SnapConfig::apply`] but the footprint of `size` stays on the plane.
    pub fn apply_on_plane(&self, point: Point, size: Size, plane: &Plane, override_active: bool) -> Point {
        if !self.is_active(override_active) {
            return point;
        }
        let max = plane.max_origin(size);
        Point {
            x: snap_bounded(point.x, self.resolution, max.x),
            y: snap_bounded(point.y, self.resolution, max.y),
        }
    }
}
