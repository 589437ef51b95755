//! Shadow and sun-exposure overlay.
//!
//! Shadow geometry and exposure classes are computed elsewhere. This module only
//! fits that data onto the current land: shadows are clipped to the plane and each
//! placed item is paired with its classification.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::land::Land;
use crate::layout::Rect;
use crate::model::ItemId;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SunExposure {
    #[serde(rename = "Full Sun")]
    FullSun,
    #[serde(rename = "Partial Sun")]
    PartialSun,
    #[serde(rename = "Shade")]
    Shade,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonalShadows {
    pub season: String,
    pub rects: Vec<Rect>,
}

pub trait ShadowProvider {
    fn seasonal_shadows(&self) -> Vec<SeasonalShadows>;
    fn exposure(&self, item: &ItemId) -> Option<SunExposure>;
}

/// Precomputed provider payload, as delivered to the browser.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShadowReport {
    #[serde(default)]
    pub seasons: Vec<SeasonalShadows>,
    #[serde(default)]
    pub exposures: HashMap<ItemId, SunExposure>,
}

impl ShadowProvider for ShadowReport {
    fn seasonal_shadows(&self) -> Vec<SeasonalShadows> {
        self.seasons.clone()
    }

    fn exposure(&self, item: &ItemId) -> Option<SunExposure> {
        self.exposures.get(item).copied()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemExposure {
    pub id: ItemId,
    pub bounds: Rect,
    pub exposure: Option<SunExposure>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExposureOverlay {
    pub shadows: Vec<SeasonalShadows>,
    pub items: Vec<ItemExposure>,
}

pub fn exposure_overlay(land: &Land, provider: &impl ShadowProvider) -> ExposureOverlay {
    let plane = land.plane().bounds();
    let shadows = provider
        .seasonal_shadows()
        .into_iter()
        .map(|season| SeasonalShadows {
            rects: season.rects.iter().filter_map(|r| r.intersection(&plane)).collect(),
            season: season.season,
        })
        .collect();
    let items = land
        .placed()
        .filter_map(|item| {
            Some(ItemExposure {
                id: item.id.clone(),
                bounds: item.bounds()?,
                exposure: provider.exposure(&item.id),
            })
        })
        .collect();
    ExposureOverlay { shadows, items }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{LayoutConfig, Plane, Point, Size};
    use crate::model::{EntityKind, Placeable};

    #[test]
    fn test_exposure_labels() {
        let json = serde_json::to_string(&[SunExposure::FullSun, SunExposure::PartialSun, SunExposure::Shade]).unwrap();
        assert_eq!(json, r#"["Full Sun","Partial Sun","Shade"]"#);
    }

    #[test]
    fn test_overlay_clips_shadows_and_tags_items() {
        let mut land = Land::new("land", Plane::new(10.0, 8.0).unwrap(), LayoutConfig::default()).unwrap();
        let mut placed = Placeable::new("g", EntityKind::Garden, "G", Size::new(2.0, 2.0));
        placed.position = Some(Point::new(1.0, 1.0));
        land.add(placed).unwrap();
        land.add(Placeable::new("pool", EntityKind::Tree, "T", Size::new(1.0, 1.0))).unwrap();

        let report: ShadowReport = serde_json::from_str(
            r#"{
                "seasons": [{"season": "winter", "rects": [
                    {"x": 8.0, "y": -2.0, "width": 4.0, "height": 4.0},
                    {"x": 20.0, "y": 20.0, "width": 1.0, "height": 1.0}
                ]}],
                "exposures": {"g": "Partial Sun"}
            }"#,
        )
        .unwrap();

        let overlay = exposure_overlay(&land, &report);
        assert_eq!(overlay.shadows[0].rects, vec![Rect::new(8.0, 0.0, 2.0, 2.0)]);
        assert_eq!(overlay.items.len(), 1);
        assert_eq!(overlay.items[0].exposure, Some(SunExposure::PartialSun));
        assert_eq!(overlay.items[0].bounds, Rect::new(1.0, 1.0, 2.0, 2.0));
    }
}
