//! Drag/placement controller.
//!
//! Per item the controller runs `Idle -> Dragging -> Committing -> Idle`, with
//! `cancel` returning a dragging item straight to `Idle`.
//!
//! - Dragging only tracks a clamped, unsnapped candidate. Nothing is persisted and
//!   no overlap check runs, so an item may pass over others freely.
//! - Release computes the committed position (snapped unless disabled or
//!   overridden), applies it optimistically and hands back a [`CommitRequest`].
//! - The host runs the save and reports back through [`DragController::resolve`].
//!   Failure restores the snapshot taken before the optimistic write.
//!
//! Drops are not rejected for overlapping other items. Only automatic placement
//! avoids overlap.

use std::collections::HashMap;

use log::{debug, info, warn};
use serde::Serialize;

use crate::error::{PlacementError, StoreError};
use crate::layout::{Plane, Point, Size, SnapConfig};
use crate::model::{ItemId, Placeable};
use crate::store::PlacementUpdate;

/// An in-progress pointer drag of one placed item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DragSession {
    pub item: ItemId,
    /// Pointer position relative to the item origin at pickup.
    pub offset: Point,
    /// Position before the drag started, restored on cancel.
    pub origin: Point,
    pub size: Size,
    /// Latest clamped, unsnapped candidate origin.
    pub current: Point,
}

impl DragSession {
    pub fn begin(item: &Placeable, pointer: Point) -> Result<Self, PlacementError> {
        let origin = item.position.ok_or_else(|| PlacementError::NotPlaced(item.id.clone()))?;
        Ok(Self {
            item: item.id.clone(),
            offset: Point { x: pointer.x - origin.x, y: pointer.y - origin.y },
            origin,
            size: item.footprint,
            current: origin,
        })
    }

    /// Candidate origin for a pointer position, clamped onto the plane.
    pub fn candidate(&self, pointer: Point, plane: &Plane) -> Point {
        let raw = Point { x: pointer.x - self.offset.x, y: pointer.y - self.offset.y };
        plane.clamp_origin(raw, self.size)
    }

    pub fn track(&mut self, pointer: Point, plane: &Plane) -> Point {
        self.current = self.candidate(pointer, plane);
        self.current
    }
}

/// Position a drag commits to when released at `pointer`.
pub fn commit_position(
    session: &DragSession,
    pointer: Point,
    plane: &Plane,
    snap: &SnapConfig,
    override_active: bool,
) -> Point {
    let candidate = session.candidate(pointer, plane);
    snap.apply_on_plane(candidate, session.size, plane, override_active)
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DragPhase {
    Idle,
    Dragging,
    Committing,
}

/// A save the host must perform, then report through `resolve`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum CommitRequest {
    Update { item: ItemId, update: PlacementUpdate },
    Clear { item: ItemId },
}

impl CommitRequest {
    pub fn item(&self) -> &ItemId {
        match self {
            CommitRequest::Update { item, .. } | CommitRequest::Clear { item } => item,
        }
    }
}

/// Optimistic write awaiting the store.
#[derive(Debug, Clone)]
struct PendingCommit {
    snapshot: Placeable,
    request: CommitRequest,
}

#[derive(Debug, Default)]
pub struct DragController {
    sessions: HashMap<ItemId, DragSession>,
    in_flight: HashMap<ItemId, PendingCommit>,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self, id: &ItemId) -> DragPhase {
        if self.in_flight.contains_key(id) {
            DragPhase::Committing
        } else if self.sessions.contains_key(id) {
            DragPhase::Dragging
        } else {
            DragPhase::Idle
        }
    }

    pub fn session(&self, id: &ItemId) -> Option<&DragSession> {
        self.sessions.get(id)
    }

    pub fn pending_request(&self, id: &ItemId) -> Option<&CommitRequest> {
        self.in_flight.get(id).map(|p| &p.request)
    }

    pub fn pointer_down(&mut self, item: &Placeable, pointer: Point) -> Result<&DragSession, PlacementError> {
        match self.phase(&item.id) {
            DragPhase::Committing => return Err(PlacementError::CommitInFlight(item.id.clone())),
            DragPhase::Dragging => return Err(PlacementError::DragInProgress(item.id.clone())),
            DragPhase::Idle => {}
        }
        let session = DragSession::begin(item, pointer)?;
        debug!(
            "event=drag_start module=drag item={} origin=({}, {})",
            item.id, session.origin.x, session.origin.y
        );
        Ok(&*self.sessions.entry(item.id.clone()).or_insert(session))
    }

    pub fn pointer_move(&mut self, id: &ItemId, pointer: Point, plane: &Plane) -> Result<Point, PlacementError> {
        let session = self
            .sessions
            .get_mut(id)
            .ok_or_else(|| PlacementError::NoActiveDrag(id.clone()))?;
        Ok(session.track(pointer, plane))
    }

    /// End the drag and apply the committed position optimistically.
    pub fn release(
        &mut self,
        item: &mut Placeable,
        pointer: Point,
        plane: &Plane,
        plane_id: &str,
        snap: &SnapConfig,
        override_active: bool,
    ) -> Result<CommitRequest, PlacementError> {
        let session = self
            .sessions
            .remove(&item.id)
            .ok_or_else(|| PlacementError::NoActiveDrag(item.id.clone()))?;
        let committed = commit_position(&session, pointer, plane, snap, override_active);
        let update = PlacementUpdate {
            plane_id: plane_id.to_string(),
            x: committed.x,
            y: committed.y,
            width: item.footprint.width,
            height: item.footprint.height,
            snap_to_grid: snap.is_active(override_active),
        };
        debug!(
            "event=drag_release module=drag item={} committed=({}, {}) snapped={}",
            item.id, committed.x, committed.y, update.snap_to_grid
        );
        let request = CommitRequest::Update { item: item.id.clone(), update };
        self.stage(item, Some(committed), request.clone())?;
        Ok(request)
    }

    /// Abort a drag without persisting anything.
    pub fn cancel(&mut self, item: &mut Placeable) -> Result<(), PlacementError> {
        let session = self
            .sessions
            .remove(&item.id)
            .ok_or_else(|| PlacementError::NoActiveDrag(item.id.clone()))?;
        item.position = Some(session.origin);
        info!("event=drag_cancel module=drag item={}", item.id);
        Ok(())
    }

    /// Snapshot `item`, write `position` into it and hold `request` until resolved.
    ///
    /// Used by drag release as well as automatic placement and removal.
    pub fn stage(
        &mut self,
        item: &mut Placeable,
        position: Option<Point>,
        request: CommitRequest,
    ) -> Result<(), PlacementError> {
        if self.in_flight.contains_key(&item.id) {
            return Err(PlacementError::CommitInFlight(item.id.clone()));
        }
        let snapshot = item.clone();
        item.position = position;
        self.in_flight.insert(item.id.clone(), PendingCommit { snapshot, request });
        Ok(())
    }

    /// Finish a staged save. On failure the item is restored from its snapshot.
    pub fn resolve(&mut self, item: &mut Placeable, outcome: Result<(), StoreError>) -> Result<(), PlacementError> {
        let pending = self
            .in_flight
            .remove(&item.id)
            .ok_or_else(|| PlacementError::NothingPending(item.id.clone()))?;
        match outcome {
            Ok(()) => {
                info!("event=commit_ok module=drag item={}", item.id);
                Ok(())
            }
            Err(source) => {
                *item = pending.snapshot;
                warn!("event=commit_rollback module=drag item={} reason={}", item.id, source.message);
                Err(PlacementError::Persistence { item: item.id.clone(), source })
            }
        }
    }
}
