//! Error types for the planner.
//!
//! Nothing here is fatal. Every error leaves the land in its last consistent state
//! and carries a stable `code()` for the frontend.

use std::fmt;

use crate::layout::Rect;
use crate::model::ItemId;

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A numeric setting that must be positive and finite was not.
    InvalidValue { field: &'static str, value: f64 },
    Malformed(String),
}

impl ConfigError {
    pub fn new(field: &'static str, value: f64) -> Self {
        ConfigError::InvalidValue { field, value }
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        ConfigError::Malformed(msg.into())
    }

    pub fn code(&self) -> &'static str {
        match self {
            ConfigError::InvalidValue { .. } => "invalid_config",
            ConfigError::Malformed(_) => "malformed_config",
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidValue { field, value } => {
                write!(f, "`{field}` must be positive and finite, got {value}")
            }
            ConfigError::Malformed(msg) => write!(f, "malformed config: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Failure reported by a persistence collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreError {
    pub message: String,
}

impl StoreError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "persistence failed: {}", self.message)
    }
}

impl std::error::Error for StoreError {}

#[derive(Debug, Clone, PartialEq)]
pub enum PlacementError {
    UnknownItem(ItemId),
    DuplicateItem(ItemId),
    NotPlaced(ItemId),
    AlreadyPlaced(ItemId),
    OutOfBounds { item: ItemId, bounds: Rect },
    NoSpaceAvailable(ItemId),
    DragInProgress(ItemId),
    CommitInFlight(ItemId),
    NoActiveDrag(ItemId),
    NothingPending(ItemId),
    UnknownSpecies(String),
    InvalidFootprint(ItemId),
    Persistence { item: ItemId, source: StoreError },
}

impl PlacementError {
    pub fn code(&self) -> &'static str {
        match self {
            PlacementError::UnknownItem(_) => "unknown_item",
            PlacementError::DuplicateItem(_) => "duplicate_item",
            PlacementError::NotPlaced(_) => "not_placed",
            PlacementError::AlreadyPlaced(_) => "already_placed",
            PlacementError::OutOfBounds { .. } => "out_of_bounds",
            PlacementError::NoSpaceAvailable(_) => "no_space_available",
            PlacementError::DragInProgress(_) => "drag_in_progress",
            PlacementError::CommitInFlight(_) => "commit_in_flight",
            PlacementError::NoActiveDrag(_) => "no_active_drag",
            PlacementError::NothingPending(_) => "nothing_pending",
            PlacementError::UnknownSpecies(_) => "unknown_species",
            PlacementError::InvalidFootprint(_) => "invalid_footprint",
            PlacementError::Persistence { .. } => "persistence_failed",
        }
    }

    /// Whether retrying the same action may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, PlacementError::Persistence { .. } | PlacementError::CommitInFlight(_))
    }
}

impl fmt::Display for PlacementError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlacementError::UnknownItem(id) => write!(f, "no item with id `{id}`"),
            PlacementError::DuplicateItem(id) => write!(f, "item `{id}` already exists"),
            PlacementError::NotPlaced(id) => write!(f, "item `{id}` is not on the plane"),
            PlacementError::AlreadyPlaced(id) => write!(f, "item `{id}` is already on the plane"),
            PlacementError::OutOfBounds { item, bounds } => write!(
                f,
                "item `{item}` at ({}, {}) size {}x{} leaves the plane",
                bounds.x, bounds.y, bounds.width, bounds.height
            ),
            PlacementError::NoSpaceAvailable(id) => write!(f, "no free space for item `{id}`"),
            PlacementError::DragInProgress(id) => write!(f, "item `{id}` is already being dragged"),
            PlacementError::CommitInFlight(id) => {
                write!(f, "item `{id}` has a save in flight; try again once it completes")
            }
            PlacementError::NoActiveDrag(id) => write!(f, "item `{id}` is not being dragged"),
            PlacementError::NothingPending(id) => write!(f, "item `{id}` has no pending save"),
            PlacementError::UnknownSpecies(species) => write!(f, "unknown species `{species}`"),
            PlacementError::InvalidFootprint(id) => {
                write!(f, "item `{id}` needs a positive, finite footprint")
            }
            PlacementError::Persistence { item, source } => write!(f, "item `{item}`: {source}"),
        }
    }
}

impl std::error::Error for PlacementError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PlacementError::Persistence { source, .. } => Some(source),
            _ => None,
        }
    }
}
