//! Output types for frontend consumption.
//!
//! These structs are serialized to JSON and handed to the browser, which renders
//! the land from them.

use serde::Serialize;

use crate::drag::DragPhase;
use crate::error::{ConfigError, PlacementError};
use crate::land::Land;
use crate::layout::{Plane, Point, Rect};
use crate::model::{EntityKind, ItemId};

/// A placeable entity ready for display
#[derive(Debug, Clone, Serialize)]
pub struct ItemView {
    pub id: ItemId,
    pub kind: EntityKind,
    pub name: String,
    /// Authoritative (or optimistically committed) bounds, in plane units.
    /// Absent for items in the available pool.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounds: Option<Rect>,
    /// Bounds to draw right now: the live drag candidate while dragging.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_bounds: Option<Rect>,
    /// `display_bounds` scaled to pixels.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pixel_bounds: Option<Rect>,
    pub phase: DragPhase,
}

/// Error information for the frontend
#[derive(Debug, Clone, Serialize)]
pub struct ErrorInfo {
    pub code: String,
    pub message: String,
    pub retryable: bool,
}

impl From<&PlacementError> for ErrorInfo {
    fn from(e: &PlacementError) -> Self {
        Self { code: e.code().to_string(), message: e.to_string(), retryable: e.is_retryable() }
    }
}

impl From<&ConfigError> for ErrorInfo {
    fn from(e: &ConfigError) -> Self {
        Self { code: e.code().to_string(), message: e.to_string(), retryable: false }
    }
}

/// The combined land state sent to the frontend
#[derive(Debug, Clone, Serialize)]
pub struct LandView {
    pub plane_id: String,
    pub plane: Plane,
    pub pixels_per_unit: f64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub placed: Vec<ItemView>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub available: Vec<ItemView>,
}

impl LandView {
    pub fn from_land(land: &Land) -> Self {
        let scale = land.scale();
        let (placed, available): (Vec<ItemView>, Vec<ItemView>) = land
            .items()
            .iter()
            .map(|item| {
                let bounds = item.bounds();
                let display_bounds = match land.drag_session(&item.id) {
                    Some(session) => Some(Rect::at(session.current, item.footprint)),
                    None => bounds,
                };
                ItemView {
                    id: item.id.clone(),
                    kind: item.kind,
                    name: item.name.clone(),
                    bounds,
                    display_bounds,
                    pixel_bounds: display_bounds.map(|r| scale.rect_to_pixels(&r)),
                    phase: land.phase(&item.id),
                }
            })
            .partition(|view| view.bounds.is_some());
        Self {
            plane_id: land.plane_id().to_string(),
            plane: *land.plane(),
            pixels_per_unit: scale.pixels_per_unit,
            placed,
            available,
        }
    }
}

/// Result of a pointer move, for redrawing the dragged item.
#[derive(Debug, Clone, Serialize)]
pub struct DragFrame {
    pub item: ItemId,
    pub candidate: Point,
    /// Items the candidate overlaps; drops are still allowed.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub overlapping: Vec<ItemId>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{LayoutConfig, Size};
    use crate::model::Placeable;

    #[test]
    fn test_view_splits_placed_and_available() {
        let mut land = Land::new("land", Plane::new(10.0, 8.0).unwrap(), LayoutConfig::default()).unwrap();
        let mut a = Placeable::new("a", EntityKind::Garden, "A", Size::new(2.0, 2.0));
        a.position = Some(Point::new(1.0, 0.0));
        land.add(a).unwrap();
        land.add(Placeable::new("b", EntityKind::Tree, "B", Size::new(1.0, 1.0))).unwrap();
        land.pointer_down(&ItemId::from("a"), Point::new(1.0, 0.0)).unwrap();
        land.pointer_move(&ItemId::from("a"), Point::new(3.0, 2.0)).unwrap();

        let view = LandView::from_land(&land);
        assert_eq!(view.placed.len(), 1);
        assert_eq!(view.available.len(), 1);
        let a = &view.placed[0];
        assert_eq!(a.bounds, Some(Rect::new(1.0, 0.0, 2.0, 2.0)));
        assert_eq!(a.display_bounds, Some(Rect::new(3.0, 2.0, 2.0, 2.0)));
        assert_eq!(a.pixel_bounds, Some(Rect::new(120.0, 80.0, 80.0, 80.0)));
        assert_eq!(a.phase, DragPhase::Dragging);

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["placed"][0]["phase"], "dragging");
        assert!(json["available"][0].get("bounds").is_none());
    }

    #[test]
    fn test_error_info_from_placement_error() {
        let info = ErrorInfo::from(&PlacementError::NoSpaceAvailable(ItemId::from("x")));
        assert_eq!(info.code, "no_space_available");
        assert!(!info.retryable);
    }
}
