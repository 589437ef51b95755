//! The land: every placeable entity plus the plane they sit on.
//!
//! Items are kept in insertion order so searches and views are deterministic.
//! All position changes flow through the drag controller's snapshot/stage/resolve
//! discipline, whether they come from a drag, an automatic placement or a removal.
//!
//! Each mutating action comes in two shapes:
//! - `begin_*` applies the change optimistically and returns the [`CommitRequest`]
//!   the host must persist, to be finished with [`Land::resolve`];
//! - a synchronous wrapper that drives a [`PlacementStore`] directly.

use log::{debug, info};

use crate::drag::{CommitRequest, DragController, DragPhase, DragSession};
use crate::error::{ConfigError, PlacementError, StoreError};
use crate::layout::{find_free_position, overlapping, LayoutConfig, Plane, Point, Rect};
use crate::model::{EntityKind, ItemId, Placeable};
use crate::store::{PlacementStore, PlacementUpdate, SpeciesCatalog};
use crate::units::{Scale, SpacingScale};

#[derive(Debug)]
pub struct Land {
    plane_id: String,
    plane: Plane,
    config: LayoutConfig,
    items: Vec<Placeable>,
    drags: DragController,
}

impl Land {
    pub fn new(plane_id: impl Into<String>, plane: Plane, config: LayoutConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            plane_id: plane_id.into(),
            plane,
            config,
            items: Vec::new(),
            drags: DragController::new(),
        })
    }

    pub fn plane_id(&self) -> &str {
        &self.plane_id
    }

    pub fn plane(&self) -> &Plane {
        &self.plane
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn scale(&self) -> Scale {
        Scale::new(self.config.pixels_per_unit)
    }

    pub fn spacing_scale(&self) -> SpacingScale {
        SpacingScale::new(self.config.spacing_units_per_plane_unit)
    }

    pub fn items(&self) -> &[Placeable] {
        &self.items
    }

    pub fn item(&self, id: &ItemId) -> Option<&Placeable> {
        self.items.iter().find(|i| &i.id == id)
    }

    pub fn placed(&self) -> impl Iterator<Item = &Placeable> {
        self.items.iter().filter(|i| i.is_placed())
    }

    /// Items waiting outside the plane.
    pub fn available(&self) -> impl Iterator<Item = &Placeable> {
        self.items.iter().filter(|i| !i.is_placed())
    }

    pub fn phase(&self, id: &ItemId) -> DragPhase {
        self.drags.phase(id)
    }

    pub fn drag_session(&self, id: &ItemId) -> Option<&DragSession> {
        self.drags.session(id)
    }

    pub fn pending_request(&self, id: &ItemId) -> Option<&CommitRequest> {
        self.drags.pending_request(id)
    }

    fn index_of(&self, id: &ItemId) -> Result<usize, PlacementError> {
        self.items
            .iter()
            .position(|i| &i.id == id)
            .ok_or_else(|| PlacementError::UnknownItem(id.clone()))
    }

    fn ensure_idle(&self, id: &ItemId) -> Result<(), PlacementError> {
        match self.drags.phase(id) {
            DragPhase::Idle => Ok(()),
            DragPhase::Dragging => Err(PlacementError::DragInProgress(id.clone())),
            DragPhase::Committing => Err(PlacementError::CommitInFlight(id.clone())),
        }
    }

    /// Register an entity. A supplied position is kept if it lies on the plane.
    pub fn add(&mut self, item: Placeable) -> Result<(), PlacementError> {
        if self.item(&item.id).is_some() {
            return Err(PlacementError::DuplicateItem(item.id));
        }
        if !item.footprint.is_positive() {
            return Err(PlacementError::InvalidFootprint(item.id));
        }
        if let Some(bounds) = item.bounds() {
            if !self.plane.contains(&bounds) {
                return Err(PlacementError::OutOfBounds { item: item.id, bounds });
            }
        }
        debug!("event=item_added module=land item={} kind={}", item.id, item.kind.as_str());
        self.items.push(item);
        Ok(())
    }

    /// Register a tree whose footprint comes from the species catalog.
    pub fn add_tree(
        &mut self,
        id: impl Into<ItemId>,
        name: impl Into<String>,
        species: &str,
        catalog: &impl SpeciesCatalog,
    ) -> Result<(), PlacementError> {
        let footprint = catalog
            .default_footprint(species)
            .ok_or_else(|| PlacementError::UnknownSpecies(species.to_string()))?;
        self.add(Placeable::new(id, EntityKind::Tree, name, footprint))
    }

    /// Footprints of every placed item except `exclude`.
    fn occupied(&self, exclude: &ItemId) -> Vec<Rect> {
        self.items
            .iter()
            .filter(|i| &i.id != exclude)
            .filter_map(|i| i.bounds())
            .collect()
    }

    /// First free slot for an item, without placing it.
    pub fn find_slot(&self, id: &ItemId) -> Result<Point, PlacementError> {
        let item = &self.items[self.index_of(id)?];
        let found = find_free_position(
            &self.plane,
            &self.occupied(id),
            item.footprint,
            self.config.effective_search_step(),
            &self.config.snap,
            self.config.overlap_tolerance,
        );
        match found {
            Some(p) => {
                debug!("event=free_slot module=land item={} at=({}, {})", id, p.x, p.y);
                Ok(p)
            }
            None => {
                info!("event=no_space module=land item={}", id);
                Err(PlacementError::NoSpaceAvailable(id.clone()))
            }
        }
    }

    /// Items whose footprints the given item currently overlaps.
    ///
    /// During a drag the live candidate is used, so the frontend can flag the drop
    /// spot. This is feedback only; drops are not blocked.
    pub fn overlapping(&self, id: &ItemId) -> Result<Vec<ItemId>, PlacementError> {
        let item = &self.items[self.index_of(id)?];
        let bounds = match self.drags.session(id) {
            Some(session) => Rect::at(session.current, item.footprint),
            None => item.bounds().ok_or_else(|| PlacementError::NotPlaced(id.clone()))?,
        };
        let (ids, rects): (Vec<&ItemId>, Vec<Rect>) = self
            .items
            .iter()
            .filter(|other| &other.id != id)
            .filter_map(|other| Some((&other.id, other.bounds()?)))
            .unzip();
        Ok(overlapping(&bounds, &rects, self.config.overlap_tolerance)
            .into_iter()
            .map(|i| ids[i].clone())
            .collect())
    }

    fn update_request(&self, item: &Placeable, at: Point, snapped: bool) -> CommitRequest {
        CommitRequest::Update {
            item: item.id.clone(),
            update: PlacementUpdate {
                plane_id: self.plane_id.clone(),
                x: at.x,
                y: at.y,
                width: item.footprint.width,
                height: item.footprint.height,
                snap_to_grid: snapped,
            },
        }
    }

    /// Move a pooled item onto the first free slot, optimistically.
    pub fn begin_auto_place(&mut self, id: &ItemId) -> Result<CommitRequest, PlacementError> {
        let idx = self.index_of(id)?;
        self.ensure_idle(id)?;
        if self.items[idx].is_placed() {
            return Err(PlacementError::AlreadyPlaced(id.clone()));
        }
        let slot = self.find_slot(id)?;
        let request = self.update_request(&self.items[idx], slot, self.config.snap.enabled);
        self.drags.stage(&mut self.items[idx], Some(slot), request.clone())?;
        Ok(request)
    }

    /// Put an item at an explicit position (snapped per config), optimistically.
    ///
    /// Positions leaving the plane are refused without touching anything.
    pub fn begin_place_at(&mut self, id: &ItemId, position: Point) -> Result<CommitRequest, PlacementError> {
        let idx = self.index_of(id)?;
        self.ensure_idle(id)?;
        let at = self.config.snap.apply(position, false);
        let bounds = Rect::at(at, self.items[idx].footprint);
        if !self.plane.contains(&bounds) {
            return Err(PlacementError::OutOfBounds { item: id.clone(), bounds });
        }
        let request = self.update_request(&self.items[idx], at, self.config.snap.enabled);
        self.drags.stage(&mut self.items[idx], Some(at), request.clone())?;
        Ok(request)
    }

    /// Return a placed item to the pool, optimistically. An active drag is cancelled first.
    pub fn begin_remove(&mut self, id: &ItemId) -> Result<CommitRequest, PlacementError> {
        let idx = self.index_of(id)?;
        match self.drags.phase(id) {
            DragPhase::Committing => return Err(PlacementError::CommitInFlight(id.clone())),
            DragPhase::Dragging => self.drags.cancel(&mut self.items[idx])?,
            DragPhase::Idle => {}
        }
        if !self.items[idx].is_placed() {
            return Err(PlacementError::NotPlaced(id.clone()));
        }
        let request = CommitRequest::Clear { item: id.clone() };
        self.drags.stage(&mut self.items[idx], None, request.clone())?;
        Ok(request)
    }

    pub fn pointer_down(&mut self, id: &ItemId, pointer: Point) -> Result<(), PlacementError> {
        let idx = self.index_of(id)?;
        self.drags.pointer_down(&self.items[idx], pointer)?;
        Ok(())
    }

    /// Track the pointer; returns the clamped candidate origin for display.
    pub fn pointer_move(&mut self, id: &ItemId, pointer: Point) -> Result<Point, PlacementError> {
        self.index_of(id)?;
        self.drags.pointer_move(id, pointer, &self.plane)
    }

    /// Release a drag. `override_active` is the momentary snap override (held modifier).
    pub fn pointer_up(&mut self, id: &ItemId, pointer: Point, override_active: bool) -> Result<CommitRequest, PlacementError> {
        let idx = self.index_of(id)?;
        self.drags.release(
            &mut self.items[idx],
            pointer,
            &self.plane,
            &self.plane_id,
            &self.config.snap,
            override_active,
        )
    }

    pub fn cancel_drag(&mut self, id: &ItemId) -> Result<(), PlacementError> {
        let idx = self.index_of(id)?;
        self.drags.cancel(&mut self.items[idx])
    }

    /// Report the outcome of a persisted request. Failure rolls the item back.
    pub fn resolve(&mut self, id: &ItemId, outcome: Result<(), StoreError>) -> Result<(), PlacementError> {
        let idx = self.index_of(id)?;
        self.drags.resolve(&mut self.items[idx], outcome)
    }

    fn persist(&mut self, request: CommitRequest, store: &mut impl PlacementStore) -> Result<(), PlacementError> {
        let outcome = match &request {
            CommitRequest::Update { item, update } => store.update_placement(item, update).map(|_| ()),
            CommitRequest::Clear { item } => store.clear_placement(item),
        };
        self.resolve(request.item(), outcome)
    }

    fn position_of(&self, id: &ItemId) -> Result<Point, PlacementError> {
        self.item(id)
            .and_then(|i| i.position)
            .ok_or_else(|| PlacementError::NotPlaced(id.clone()))
    }

    pub fn auto_place(&mut self, id: &ItemId, store: &mut impl PlacementStore) -> Result<Point, PlacementError> {
        let request = self.begin_auto_place(id)?;
        self.persist(request, store)?;
        self.position_of(id)
    }

    pub fn place_at(&mut self, id: &ItemId, position: Point, store: &mut impl PlacementStore) -> Result<Point, PlacementError> {
        let request = self.begin_place_at(id, position)?;
        self.persist(request, store)?;
        self.position_of(id)
    }

    pub fn remove(&mut self, id: &ItemId, store: &mut impl PlacementStore) -> Result<(), PlacementError> {
        let request = self.begin_remove(id)?;
        self.persist(request, store)
    }

    /// Release and persist a drag in one step.
    pub fn commit_drag(
        &mut self,
        id: &ItemId,
        pointer: Point,
        override_active: bool,
        store: &mut impl PlacementStore,
    ) -> Result<Point, PlacementError> {
        let request = self.pointer_up(id, pointer, override_active)?;
        self.persist(request, store)?;
        self.position_of(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Size;
    use crate::store::{MemoryStore, StaticCatalog};

    fn land(w: f64, h: f64) -> Land {
        Land::new("land-1", Plane::new(w, h).unwrap(), LayoutConfig::default()).unwrap()
    }

    fn garden(id: &str, w: f64, h: f64) -> Placeable {
        Placeable::new(id, EntityKind::Garden, id.to_uppercase(), Size::new(w, h))
    }

    fn id(s: &str) -> ItemId {
        ItemId::from(s)
    }

    #[test]
    fn test_scenario_place_place_drag() {
        let mut land = land(10.0, 8.0);
        let mut store = MemoryStore::default();
        land.add(garden("a", 2.0, 2.0)).unwrap();
        land.add(garden("b", 2.0, 2.0)).unwrap();

        assert_eq!(land.auto_place(&id("a"), &mut store).unwrap(), Point::new(0.0, 0.0));
        let b = land.auto_place(&id("b"), &mut store).unwrap();
        assert!((b.x - 2.0).abs() < 1e-9 && b.y == 0.0, "{b:?}");

        land.pointer_down(&id("a"), Point::new(1.0, 1.0)).unwrap();
        land.pointer_move(&id("a"), Point::new(4.0, 4.0)).unwrap();
        let dropped = land.commit_drag(&id("a"), Point::new(6.03, 5.98), false, &mut store).unwrap();
        assert_eq!(dropped, Point::new(5.0, 5.0));
        assert_eq!(store.updates.len(), 3);
        assert_eq!(store.updates[2].1.x, 5.0);
        assert_eq!(land.phase(&id("a")), DragPhase::Idle);
    }

    #[test]
    fn test_auto_place_snaps_to_grid_with_coarser_step() {
        let config = LayoutConfig { search_step: Some(0.25), ..LayoutConfig::default() };
        let mut land = Land::new("land-1", Plane::new(10.0, 8.0).unwrap(), config).unwrap();
        let mut store = MemoryStore::default();
        let mut blocker = garden("post", 0.2, 1.0);
        blocker.position = Some(Point::new(0.0, 0.0));
        land.add(blocker).unwrap();
        land.add(garden("a", 1.0, 1.0)).unwrap();

        let at = land.auto_place(&id("a"), &mut store).unwrap();
        assert!((at.x - 0.3).abs() < 1e-9 && at.y == 0.0, "{at:?}");
        assert_eq!(crate::layout::snap(at.x, 0.1), at.x);
        assert!(store.updates[0].1.snap_to_grid);
    }

    #[test]
    fn test_auto_place_reports_disabled_snapping() {
        let mut config = LayoutConfig::default();
        config.snap.enabled = false;
        let mut land = Land::new("land-1", Plane::new(10.0, 8.0).unwrap(), config).unwrap();
        let mut store = MemoryStore::default();
        land.add(garden("a", 2.0, 2.0)).unwrap();

        land.auto_place(&id("a"), &mut store).unwrap();
        assert_eq!(store.updates.len(), 1);
        assert!(!store.updates[0].1.snap_to_grid);
    }

    #[test]
    fn test_failed_drag_commit_restores_pre_drag_position() {
        let mut land = land(10.0, 8.0);
        land.add(garden("a", 2.0, 2.0)).unwrap();
        land.auto_place(&id("a"), &mut MemoryStore::default()).unwrap();
        let before = land.item(&id("a")).unwrap().clone();

        land.pointer_down(&id("a"), Point::new(0.5, 0.5)).unwrap();
        let mut failing = MemoryStore::failing("offline");
        let err = land.commit_drag(&id("a"), Point::new(7.0, 7.0), false, &mut failing).unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(failing.updates.len(), 1);
        assert_eq!(land.item(&id("a")).unwrap(), &before);
    }

    #[test]
    fn test_cancel_makes_no_store_call() {
        let mut land = land(10.0, 8.0);
        let mut store = MemoryStore::default();
        land.add(garden("a", 2.0, 2.0)).unwrap();
        land.auto_place(&id("a"), &mut store).unwrap();
        let calls = store.calls();

        land.pointer_down(&id("a"), Point::new(0.5, 0.5)).unwrap();
        land.pointer_move(&id("a"), Point::new(5.0, 5.0)).unwrap();
        land.cancel_drag(&id("a")).unwrap();
        assert_eq!(store.calls(), calls);
        assert_eq!(land.item(&id("a")).unwrap().position, Some(Point::new(0.0, 0.0)));
    }

    #[test]
    fn test_drop_onto_another_item_is_allowed() {
        let mut land = land(10.0, 8.0);
        let mut store = MemoryStore::default();
        land.add(garden("a", 2.0, 2.0)).unwrap();
        land.add(garden("b", 2.0, 2.0)).unwrap();
        land.auto_place(&id("a"), &mut store).unwrap();
        land.auto_place(&id("b"), &mut store).unwrap();

        land.pointer_down(&id("b"), Point::new(2.0, 0.0)).unwrap();
        land.pointer_move(&id("b"), Point::new(1.0, 0.0)).unwrap();
        assert_eq!(land.overlapping(&id("b")).unwrap(), vec![id("a")]);
        let pos = land.commit_drag(&id("b"), Point::new(1.0, 0.0), false, &mut store).unwrap();
        assert_eq!(pos, Point::new(1.0, 0.0));
        assert_eq!(land.overlapping(&id("a")).unwrap(), vec![id("b")]);
    }

    #[test]
    fn test_no_space_leaves_item_in_pool() {
        let mut land = land(4.0, 4.0);
        let mut store = MemoryStore::default();
        land.add(garden("big", 4.0, 4.0)).unwrap();
        land.add(garden("small", 1.0, 1.0)).unwrap();
        land.auto_place(&id("big"), &mut store).unwrap();

        let err = land.auto_place(&id("small"), &mut store).unwrap_err();
        assert_eq!(err, PlacementError::NoSpaceAvailable(id("small")));
        assert_eq!(store.updates.len(), 1);
        assert!(!land.item(&id("small")).unwrap().is_placed());
    }

    #[test]
    fn test_failed_auto_place_returns_to_pool() {
        let mut land = land(4.0, 4.0);
        land.add(garden("a", 1.0, 1.0)).unwrap();
        let err = land.auto_place(&id("a"), &mut MemoryStore::failing("nope")).unwrap_err();
        assert_eq!(err.code(), "persistence_failed");
        assert_eq!(land.available().count(), 1);
    }

    #[test]
    fn test_remove_and_failed_remove() {
        let mut land = land(10.0, 8.0);
        let mut store = MemoryStore::default();
        land.add(garden("a", 2.0, 2.0)).unwrap();
        land.auto_place(&id("a"), &mut store).unwrap();

        let err = land.remove(&id("a"), &mut MemoryStore::failing("down")).unwrap_err();
        assert_eq!(err.code(), "persistence_failed");
        assert_eq!(land.item(&id("a")).unwrap().position, Some(Point::new(0.0, 0.0)));

        land.remove(&id("a"), &mut store).unwrap();
        assert_eq!(store.clears, vec![id("a")]);
        assert_eq!(land.placed().count(), 0);
        assert_eq!(land.available().count(), 1);
        assert!(matches!(land.remove(&id("a"), &mut store), Err(PlacementError::NotPlaced(_))));
    }

    #[test]
    fn test_remove_cancels_active_drag() {
        let mut land = land(10.0, 8.0);
        let mut store = MemoryStore::default();
        land.add(garden("a", 2.0, 2.0)).unwrap();
        land.auto_place(&id("a"), &mut store).unwrap();
        land.pointer_down(&id("a"), Point::new(0.0, 0.0)).unwrap();
        land.remove(&id("a"), &mut store).unwrap();
        assert_eq!(land.phase(&id("a")), DragPhase::Idle);
        assert!(!land.item(&id("a")).unwrap().is_placed());
    }

    #[test]
    fn test_two_phase_blocks_new_drag_while_in_flight() {
        let mut land = land(10.0, 8.0);
        land.add(garden("a", 2.0, 2.0)).unwrap();
        let req = land.begin_auto_place(&id("a")).unwrap();
        assert_eq!(req.item(), &id("a"));
        assert_eq!(land.phase(&id("a")), DragPhase::Committing);
        assert!(matches!(
            land.pointer_down(&id("a"), Point::new(0.0, 0.0)),
            Err(PlacementError::CommitInFlight(_))
        ));
        land.resolve(&id("a"), Ok(())).unwrap();
        land.pointer_down(&id("a"), Point::new(0.0, 0.0)).unwrap();
    }

    #[test]
    fn test_place_at_validates_bounds_without_mutation() {
        let mut land = land(10.0, 8.0);
        let mut store = MemoryStore::default();
        land.add(garden("a", 2.0, 2.0)).unwrap();
        let err = land.place_at(&id("a"), Point::new(9.0, 0.0), &mut store).unwrap_err();
        assert_eq!(err.code(), "out_of_bounds");
        assert_eq!(store.calls(), 0);
        assert!(!land.item(&id("a")).unwrap().is_placed());

        let at = land.place_at(&id("a"), Point::new(3.04, 1.96), &mut store).unwrap();
        assert_eq!(at, Point::new(3.0, 2.0));
    }

    #[test]
    fn test_add_validation() {
        let mut land = land(10.0, 8.0);
        land.add(garden("a", 2.0, 2.0)).unwrap();
        assert!(matches!(land.add(garden("a", 1.0, 1.0)), Err(PlacementError::DuplicateItem(_))));
        assert!(matches!(land.add(garden("z", 0.0, 1.0)), Err(PlacementError::InvalidFootprint(_))));

        let mut outside = garden("o", 2.0, 2.0);
        outside.position = Some(Point::new(9.0, 0.0));
        assert!(matches!(land.add(outside), Err(PlacementError::OutOfBounds { .. })));
    }

    #[test]
    fn test_add_tree_uses_species_footprint() {
        let mut land = land(10.0, 8.0);
        let mut catalog = StaticCatalog::default();
        catalog.0.insert("apple".into(), Size::new(3.0, 3.0));

        land.add_tree("t1", "Apple", "apple", &catalog).unwrap();
        assert_eq!(land.item(&id("t1")).unwrap().footprint, Size::new(3.0, 3.0));
        assert_eq!(land.item(&id("t1")).unwrap().kind, EntityKind::Tree);
        assert!(matches!(
            land.add_tree("t2", "Fig", "fig", &catalog),
            Err(PlacementError::UnknownSpecies(_))
        ));
    }

    #[test]
    fn test_mixed_kinds_share_free_search() {
        let mut land = land(4.0, 4.0);
        let mut store = MemoryStore::default();
        land.add(Placeable::new("shed", EntityKind::Structure, "Shed", Size::new(2.0, 4.0))).unwrap();
        land.add(Placeable::new("oak", EntityKind::Tree, "Oak", Size::new(2.0, 2.0))).unwrap();
        land.auto_place(&id("shed"), &mut store).unwrap();
        let oak = land.auto_place(&id("oak"), &mut store).unwrap();
        assert!((oak.x - 2.0).abs() < 1e-9 && oak.y == 0.0);
    }
}
