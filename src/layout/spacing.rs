// Point-spacing rules for plants inside a bed.
//
// Point entities have no footprint. They are constrained only by pairwise
// distance: against each neighbour the required separation is the larger of the
// two declared spacings. Accepted points sit on fixed cell centers so the set of
// legal positions is finite and distances between them are quantized.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::Point;
use crate::model::ItemId;
use crate::units::SpacingScale;

/// Slack so a distance that equals the requirement up to float noise still passes.
const SPACING_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointEntity {
    pub id: ItemId,
    pub name: String,
    pub x: f64,
    pub y: f64,
    /// Declared spacing in spacing units (inches), not plane units.
    #[serde(default)]
    pub spacing_requirement: Option<f64>,
}

impl PointEntity {
    pub fn position(&self) -> Point {
        Point { x: self.x, y: self.y }
    }
}

/// Why a candidate point was refused. User-correctable, never an error.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpacingViolation {
    pub conflicting_id: ItemId,
    pub conflicting_name: String,
    pub distance: f64,
    pub required: f64,
}

impl fmt::Display for SpacingViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "too close to {} ({:.2} apart, needs {:.2})",
            self.conflicting_name, self.distance, self.required
        )
    }
}

/// First neighbour the candidate would crowd, in `existing` order.
///
/// A candidate without its own spacing is never refused.
pub fn first_violation<'a, I>(
    candidate: Point,
    existing: I,
    candidate_spacing: Option<f64>,
    scale: SpacingScale,
) -> Option<SpacingViolation>
where
    I: IntoIterator<Item = &'a PointEntity>,
{
    let own = scale.to_plane(candidate_spacing?);
    existing.into_iter().find_map(|other| {
        let theirs = other.spacing_requirement.map(|s| scale.to_plane(s)).unwrap_or(0.0);
        let required = own.max(theirs);
        let distance = candidate.distance(&other.position());
        if distance + SPACING_EPSILON < required {
            Some(SpacingViolation {
                conflicting_id: other.id.clone(),
                conflicting_name: other.name.clone(),
                distance,
                required,
            })
        } else {
            None
        }
    })
}

pub fn is_valid_position(
    candidate: Point,
    existing: &[PointEntity],
    candidate_spacing: Option<f64>,
    scale: SpacingScale,
) -> bool {
    first_violation(candidate, existing, candidate_spacing, scale).is_none()
}

/// Center of the `cell_size` grid cell containing `point`.
pub fn snap_to_cell_center(point: Point, cell_size: f64) -> Point {
    let center = |v: f64| (v / cell_size).floor() * cell_size + cell_size / 2.0;
    Point { x: center(point.x), y: center(point.y) }
}

/// Every cell center of a `width` x `height` region, row-major.
pub fn cell_centers(width: f64, height: f64, cell_size: f64) -> Vec<Point> {
    let cols = (width / cell_size + SPACING_EPSILON).floor() as u64;
    let rows = (height / cell_size + SPACING_EPSILON).floor() as u64;
    let mut out = Vec::new();
    for row in 0..rows {
        for col in 0..cols {
            out.push(Point {
                x: col as f64 * cell_size + cell_size / 2.0,
                y: row as f64 * cell_size + cell_size / 2.0,
            });
        }
    }
    out
}
