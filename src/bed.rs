//! Planting inside a garden bed.
//!
//! Plants are point entities. A requested spot is first snapped to the center of
//! its planting cell, then checked against the bed edges and the spacing of every
//! other plant. Refusals are ordinary outcomes the user can correct.

use std::fmt;

use log::{debug, info};
use serde::Serialize;

use crate::error::ConfigError;
use crate::layout::{
    cell_centers, first_violation, snap_to_cell_center, LayoutConfig, Point, PointEntity, SpacingViolation,
    BOUNDS_EPSILON,
};
use crate::model::{ItemId, Placeable};
use crate::units::SpacingScale;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum PlantRejection {
    TooClose(SpacingViolation),
    OutsideBed { x: f64, y: f64 },
}

impl fmt::Display for PlantRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlantRejection::TooClose(v) => fmt::Display::fmt(v, f),
            PlantRejection::OutsideBed { x, y } => write!(f, "({x}, {y}) is outside the bed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PlantOutcome {
    Accepted { x: f64, y: f64 },
    Rejected { rejection: PlantRejection },
}

impl PlantOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, PlantOutcome::Accepted { .. })
    }
}

/// Upper bound on planting cells, so enumerating a bed stays interactive.
const MAX_BED_CELLS: f64 = 1_000_000.0;

#[derive(Debug, Clone)]
pub struct Bed {
    pub id: ItemId,
    pub width: f64,
    pub height: f64,
    cell_size: f64,
    spacing: SpacingScale,
    plants: Vec<PointEntity>,
}

impl Bed {
    pub fn new(
        id: impl Into<ItemId>,
        width: f64,
        height: f64,
        cell_size: f64,
        spacing: SpacingScale,
    ) -> Result<Self, ConfigError> {
        for (field, value) in [
            ("bed.width", width),
            ("bed.height", height),
            ("bed.cell_size", cell_size),
            ("bed.spacing_units_per_plane_unit", spacing.units_per_plane_unit),
        ] {
            if !(value > 0.0 && value.is_finite()) {
                return Err(ConfigError::new(field, value));
            }
        }
        if (width / cell_size).ceil() * (height / cell_size).ceil() > MAX_BED_CELLS {
            return Err(ConfigError::new("bed.cell_size", cell_size));
        }
        Ok(Self { id: id.into(), width, height, cell_size, spacing, plants: Vec::new() })
    }

    /// A bed covering a garden's footprint, using the configured cell size and units.
    pub fn for_garden(garden: &Placeable, config: &LayoutConfig) -> Result<Self, ConfigError> {
        Self::new(
            garden.id.clone(),
            garden.footprint.width,
            garden.footprint.height,
            config.bed_cell_size,
            SpacingScale::new(config.spacing_units_per_plane_unit),
        )
    }

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    pub fn plants(&self) -> &[PointEntity] {
        &self.plants
    }

    /// Restore a previously stored plant without re-validating it.
    pub fn load(&mut self, plant: PointEntity) {
        self.plants.retain(|p| p.id != plant.id);
        self.plants.push(plant);
    }

    fn cell_fits(&self, center: Point) -> bool {
        let half = self.cell_size / 2.0;
        center.x - half >= -BOUNDS_EPSILON
            && center.y - half >= -BOUNDS_EPSILON
            && center.x + half <= self.width + BOUNDS_EPSILON
            && center.y + half <= self.height + BOUNDS_EPSILON
    }

    fn check(&self, id: &ItemId, center: Point, spacing: Option<f64>) -> Option<PlantRejection> {
        if !self.cell_fits(center) {
            return Some(PlantRejection::OutsideBed { x: center.x, y: center.y });
        }
        let others = self.plants.iter().filter(|p| &p.id != id);
        first_violation(center, others, spacing, self.spacing).map(PlantRejection::TooClose)
    }

    /// Plant (or move) `id` at the cell containing `raw`.
    ///
    /// On rejection nothing changes.
    pub fn try_plant(
        &mut self,
        id: impl Into<ItemId>,
        name: impl Into<String>,
        raw: Point,
        spacing: Option<f64>,
    ) -> PlantOutcome {
        let id = id.into();
        let center = snap_to_cell_center(raw, self.cell_size);
        if let Some(rejection) = self.check(&id, center, spacing) {
            info!("event=plant_rejected module=bed bed={} plant={} reason={}", self.id, id, rejection);
            return PlantOutcome::Rejected { rejection };
        }

        let plant = PointEntity { id: id.clone(), name: name.into(), x: center.x, y: center.y, spacing_requirement: spacing };
        match self.plants.iter_mut().find(|p| p.id == id) {
            Some(existing) => *existing = plant,
            None => self.plants.push(plant),
        }
        debug!("event=plant_accepted module=bed bed={} plant={} at=({}, {})", self.id, id, center.x, center.y);
        PlantOutcome::Accepted { x: center.x, y: center.y }
    }

    pub fn remove_plant(&mut self, id: &ItemId) -> Option<PointEntity> {
        let idx = self.plants.iter().position(|p| &p.id == id)?;
        Some(self.plants.remove(idx))
    }

    /// Every cell center in the bed.
    pub fn legal_positions(&self) -> Vec<Point> {
        cell_centers(self.width, self.height, self.cell_size)
    }

    /// Cell centers where a new plant with `spacing` would currently be accepted.
    pub fn open_positions(&self, spacing: Option<f64>) -> Vec<Point> {
        self.legal_positions()
            .into_iter()
            .filter(|&p| first_violation(p, &self.plants, spacing, self.spacing).is_none())
            .collect()
    }
}
