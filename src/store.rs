//! Collaborator boundaries.
//!
//! The planner never talks to the network itself. Saving and clearing placements,
//! and looking up species footprints, go through these traits so the host (the
//! browser, or a test) decides how they happen.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::layout::Size;
use crate::model::ItemId;

/// Payload of one placement save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacementUpdate {
    pub plane_id: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub snap_to_grid: bool,
}

/// What the store echoes back after a successful save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub item_id: ItemId,
    pub plane_id: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Placement {
    pub fn from_update(item_id: &ItemId, update: &PlacementUpdate) -> Self {
        Self {
            item_id: item_id.clone(),
            plane_id: update.plane_id.clone(),
            x: update.x,
            y: update.y,
            width: update.width,
            height: update.height,
        }
    }
}

pub trait PlacementStore {
    fn update_placement(&mut self, item: &ItemId, update: &PlacementUpdate) -> Result<Placement, StoreError>;
    fn clear_placement(&mut self, item: &ItemId) -> Result<(), StoreError>;
}

/// Default footprints for new trees, keyed by species.
pub trait SpeciesCatalog {
    fn default_footprint(&self, species: &str) -> Option<Size>;
}

/// Species catalog backed by a plain map, e.g. one shipped to the browser as JSON.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StaticCatalog(pub HashMap<String, Size>);

impl SpeciesCatalog for StaticCatalog {
    fn default_footprint(&self, species: &str) -> Option<Size> {
        self.0.get(species).copied()
    }
}

#[cfg(test)]
pub(crate) use memory::MemoryStore;


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_catalog_from_json() {
        let catalog: StaticCatalog =
            serde_json::from_str(r#"{"apple": {"width": 4.0, "height": 4.0}}"#).unwrap();
        assert_eq!(catalog.default_footprint("apple"), Some(Size::new(4.0, 4.0)));
        assert_eq!(catalog.default_footprint("pear"), None);
    }

    #[test]
    fn test_memory_store_records_and_fails() {
        let update = PlacementUpdate { plane_id: "land".into(), x: 1.0, y: 2.0, width: 2.0, height: 2.0, snap_to_grid: true };
        let mut ok = MemoryStore::default();
        let placement = ok.update_placement(&ItemId::from("a"), &update).unwrap();
        assert_eq!(placement.x, 1.0);
        assert_eq!(ok.calls(), 1);

        let mut bad = MemoryStore::failing("offline");
        assert!(bad.clear_placement(&ItemId::from("a")).is_err());
        assert_eq!(bad.clears.len(), 1);
    }
}
