//! Coordinate and unit model.
//!
//! The plane is measured in abstract distance units. Interactive surfaces work in
//! pixels, and plant spacing is declared in a finer unit (inches against a plane
//! in feet), so both need converting before any geometry runs.

use serde::{Deserialize, Serialize};

use crate::layout::{Point, Rect};

/// Pixel/unit scale of an interactive surface.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scale {
    pub pixels_per_unit: f64,
}

impl Scale {
    pub fn new(pixels_per_unit: f64) -> Self {
        Self { pixels_per_unit }
    }

    pub fn to_units(&self, px: f64) -> f64 {
        px / self.pixels_per_unit
    }

    pub fn to_pixels(&self, units: f64) -> f64 {
        units * self.pixels_per_unit
    }

    pub fn point_to_units(&self, p: Point) -> Point {
        Point { x: self.to_units(p.x), y: self.to_units(p.y) }
    }

    pub fn rect_to_pixels(&self, r: &Rect) -> Rect {
        Rect {
            x: self.to_pixels(r.x),
            y: self.to_pixels(r.y),
            width: self.to_pixels(r.width),
            height: self.to_pixels(r.height),
        }
    }
}

/// Conversion from declared spacing units to plane units.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpacingScale {
    /// Spacing units per plane unit, e.g. 12 inches per foot.
    pub units_per_plane_unit: f64,
}

impl Default for SpacingScale {
    fn default() -> Self {
        Self { units_per_plane_unit: 12.0 }
    }
}

impl SpacingScale {
    pub fn new(units_per_plane_unit: f64) -> Self {
        Self { units_per_plane_unit }
    }

    pub fn to_plane(&self, spacing: f64) -> f64 {
        spacing / self.units_per_plane_unit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_round_trip() {
        let scale = Scale::new(40.0);
        assert_eq!(scale.to_units(200.0), 5.0);
        assert_eq!(scale.to_pixels(2.5), 100.0);
        assert_eq!(scale.point_to_units(Point::new(80.0, 20.0)), Point::new(2.0, 0.5));
        assert_eq!(
            scale.rect_to_pixels(&Rect::new(1.0, 2.0, 0.5, 0.25)),
            Rect::new(40.0, 80.0, 20.0, 10.0)
        );
    }

    #[test]
    fn test_inches_to_feet() {
        let spacing = SpacingScale::default();
        assert_eq!(spacing.to_plane(18.0), 1.5);
        assert_eq!(SpacingScale::new(100.0).to_plane(30.0), 0.3);
    }
}
