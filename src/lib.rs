//! Spatial layout engine for a garden planner.
//!
//! Places rectangular gardens, trees and structures on a bounded plane without
//! overlap, repositions them by pointer drag with grid snapping and rollback on
//! failed saves, and keeps individually placed plants apart inside a bed.
//!
//! Persistence, species data and shadow geometry are supplied by the host through
//! the traits in [`store`] and [`exposure`].

pub mod bed;
pub mod drag;
pub mod error;
pub mod exposure;
pub mod land;
pub mod layout;
pub mod model;
pub mod output;
pub mod store;
pub mod units;
mod wasm;

pub use bed::{Bed, PlantOutcome, PlantRejection};
pub use drag::{commit_position, CommitRequest, DragController, DragPhase, DragSession};
pub use error::{ConfigError, PlacementError, StoreError};
pub use exposure::{exposure_overlay, ShadowProvider, SunExposure};
pub use land::Land;
pub use layout::{LayoutConfig, Plane, Point, Rect, Size, SnapConfig};
pub use model::{EntityKind, ItemId, Placeable};
pub use store::{Placement, PlacementStore, PlacementUpdate, SpeciesCatalog};
pub use units::{Scale, SpacingScale};
pub use wasm::{BedPlanner, LandPlanner};
