//! Placeable entities on the land.
//!
//! Gardens, trees and structures differ only in what they are called; geometry
//! code sees every one of them as an id with a footprint and an optional position.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::layout::{Point, Rect, Size};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub String);

impl ItemId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ItemId {
    fn from(s: &str) -> Self {
        ItemId(s.to_string())
    }
}

impl From<String> for ItemId {
    fn from(s: String) -> Self {
        ItemId(s)
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Garden,
    Tree,
    Structure,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Garden => "garden",
            EntityKind::Tree => "tree",
            EntityKind::Structure => "structure",
        }
    }
}

/// A rectangular entity that can sit on the plane.
///
/// `position == None` means the entity is in the available pool and is not
/// subject to any plane invariant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Placeable {
    pub id: ItemId,
    pub kind: EntityKind,
    pub name: String,
    pub footprint: Size,
    #[serde(default)]
    pub position: Option<Point>,
}

impl Placeable {
    pub fn new(id: impl Into<ItemId>, kind: EntityKind, name: impl Into<String>, footprint: Size) -> Self {
        Self { id: id.into(), kind, name: name.into(), footprint, position: None }
    }

    pub fn is_placed(&self) -> bool {
        self.position.is_some()
    }

    /// Footprint on the plane, if placed.
    pub fn bounds(&self) -> Option<Rect> {
        self.position.map(|p| Rect::at(p, self.footprint))
    }
}
