//! WASM bindings for the plotline-core library.
//!
//! Everything exposed to JavaScript via wasm-bindgen is defined here. Calls take
//! and return JSON strings; failures come back as `{"error": {...}}` and are
//! logged to the browser console.

use serde::Serialize;
use serde_json::to_string;
use wasm_bindgen::prelude::*;

use crate::bed::Bed;
use crate::error::{PlacementError, StoreError};
use crate::exposure::{exposure_overlay, ShadowReport};
use crate::land::Land;
use crate::layout::{self, LayoutConfig, Plane, Point, PointEntity, Rect, Size, SnapConfig};
use crate::model::{ItemId, Placeable};
use crate::output::{DragFrame, ErrorInfo, LandView};
use crate::store::StaticCatalog;
use crate::units::SpacingScale;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = console, js_name = log)]
    pub fn console_log(s: &str);

    #[wasm_bindgen(js_namespace = console, js_name = error)]
    pub fn console_error(s: &str);
}

/// Routes `log` records to the browser console.
#[cfg(target_arch = "wasm32")]
mod console {
    use log::{Level, LevelFilter, Metadata, Record};

    struct ConsoleLogger;

    impl log::Log for ConsoleLogger {
        fn enabled(&self, metadata: &Metadata) -> bool {
            metadata.level() <= Level::Info
        }

        fn log(&self, record: &Record) {
            if !self.enabled(record.metadata()) {
                return;
            }
            let line = format!("[{}] {}", record.level(), record.args());
            if record.level() <= Level::Warn {
                super::console_error(&line);
            } else {
                super::console_log(&line);
            }
        }

        fn flush(&self) {}
    }

    static LOGGER: ConsoleLogger = ConsoleLogger;

    pub fn init() {
        static ONCE: std::sync::Once = std::sync::Once::new();
        ONCE.call_once(|| {
            if log::set_logger(&LOGGER).is_ok() {
                log::set_max_level(LevelFilter::Info);
            }
        });
    }
}

/// Install the console logger once. Native builds keep whatever logger the host set.
fn init_console_logging() {
    #[cfg(target_arch = "wasm32")]
    console::init();
}

#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorInfo,
}

fn error_json(error: ErrorInfo) -> String {
    log::warn!("event=request_failed module=wasm code={} message={}", error.code, error.message);
    to_string(&ErrorResponse { error })
        .unwrap_or_else(|_| "{\"error\": {\"code\": \"internal\"}}".to_string())
}

fn malformed(what: &str, e: serde_json::Error) -> String {
    error_json(ErrorInfo {
        code: "malformed_input".to_string(),
        message: format!("invalid {what}: {e}"),
        retryable: false,
    })
}

fn respond<T: Serialize>(result: Result<T, PlacementError>) -> String {
    match result {
        Ok(value) => to_string(&value).unwrap_or_else(|e| {
            error_json(ErrorInfo { code: "internal".to_string(), message: e.to_string(), retryable: false })
        }),
        Err(e) => error_json(ErrorInfo::from(&e)),
    }
}

/// Interactive land surface. Pointer coordinates are in pixels.
#[wasm_bindgen]
pub struct LandPlanner {
    land: Land,
}

#[wasm_bindgen]
impl LandPlanner {
    /// `config_json` may be empty for defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(plane_id: &str, width: f64, height: f64, config_json: &str) -> Result<LandPlanner, JsValue> {
        init_console_logging();
        let built = LayoutConfig::from_json(config_json)
            .and_then(|cfg| Land::new(plane_id, Plane::new(width, height)?, cfg));
        match built {
            Ok(land) => Ok(LandPlanner { land }),
            Err(e) => Err(JsValue::from_str(&error_json(ErrorInfo::from(&e)))),
        }
    }

    fn pointer(&self, x_px: f64, y_px: f64) -> Point {
        self.land.scale().point_to_units(Point::new(x_px, y_px))
    }

    fn view_of(&self) -> LandView {
        LandView::from_land(&self.land)
    }

    /// Register an item from JSON (`Placeable`). Returns the land view.
    #[wasm_bindgen(js_name = addItem)]
    pub fn add_item(&mut self, item_json: &str) -> String {
        let item: Placeable = match serde_json::from_str(item_json) {
            Ok(item) => item,
            Err(e) => return malformed("item", e),
        };
        let result = self.land.add(item).map(|()| self.view_of());
        respond(result)
    }

    /// Register a tree sized from a species catalog (JSON map of species to size).
    #[wasm_bindgen(js_name = addTree)]
    pub fn add_tree(&mut self, id: &str, name: &str, species: &str, catalog_json: &str) -> String {
        let catalog: StaticCatalog = match serde_json::from_str(catalog_json) {
            Ok(c) => c,
            Err(e) => return malformed("species catalog", e),
        };
        let result = self.land.add_tree(id, name, species, &catalog).map(|()| self.view_of());
        respond(result)
    }

    /// Returns the commit request to persist, then call `resolveCommit`.
    #[wasm_bindgen(js_name = autoPlace)]
    pub fn auto_place(&mut self, id: &str) -> String {
        respond(self.land.begin_auto_place(&ItemId::from(id)))
    }

    /// Place at a plane-unit position. Returns the commit request.
    #[wasm_bindgen(js_name = placeAt)]
    pub fn place_at(&mut self, id: &str, x: f64, y: f64) -> String {
        respond(self.land.begin_place_at(&ItemId::from(id), Point::new(x, y)))
    }

    /// Return an item to the pool. Returns the clear request.
    #[wasm_bindgen(js_name = removeItem)]
    pub fn remove_item(&mut self, id: &str) -> String {
        respond(self.land.begin_remove(&ItemId::from(id)))
    }

    #[wasm_bindgen(js_name = pointerDown)]
    pub fn pointer_down(&mut self, id: &str, x_px: f64, y_px: f64) -> String {
        let pointer = self.pointer(x_px, y_px);
        let result = self.land.pointer_down(&ItemId::from(id), pointer).map(|()| self.view_of());
        respond(result)
    }

    #[wasm_bindgen(js_name = pointerMove)]
    pub fn pointer_move(&mut self, id: &str, x_px: f64, y_px: f64) -> String {
        let item = ItemId::from(id);
        let pointer = self.pointer(x_px, y_px);
        let result = self.land.pointer_move(&item, pointer).and_then(|candidate| {
            Ok(DragFrame { overlapping: self.land.overlapping(&item)?, item: item.clone(), candidate })
        });
        respond(result)
    }

    /// `modifier` is the momentary snap override. Returns the commit request.
    #[wasm_bindgen(js_name = pointerUp)]
    pub fn pointer_up(&mut self, id: &str, x_px: f64, y_px: f64, modifier: bool) -> String {
        let pointer = self.pointer(x_px, y_px);
        respond(self.land.pointer_up(&ItemId::from(id), pointer, modifier))
    }

    #[wasm_bindgen(js_name = cancelDrag)]
    pub fn cancel_drag(&mut self, id: &str) -> String {
        let result = self.land.cancel_drag(&ItemId::from(id)).map(|()| self.view_of());
        respond(result)
    }

    /// Report the outcome of a persisted request. A failure rolls the item back.
    #[wasm_bindgen(js_name = resolveCommit)]
    pub fn resolve_commit(&mut self, id: &str, ok: bool, message: &str) -> String {
        let outcome = if ok { Ok(()) } else { Err(StoreError::new(message)) };
        let result = self.land.resolve(&ItemId::from(id), outcome).map(|()| self.view_of());
        respond(result)
    }

    pub fn view(&self) -> String {
        respond(Ok(self.view_of()))
    }

    /// Overlay precomputed shadow data (JSON `ShadowReport`) on the land.
    #[wasm_bindgen(js_name = exposureOverlay)]
    pub fn exposure_overlay(&self, report_json: &str) -> String {
        match serde_json::from_str::<ShadowReport>(report_json) {
            Ok(report) => respond(Ok(exposure_overlay(&self.land, &report))),
            Err(e) => malformed("shadow report", e),
        }
    }

    /// Planting surface for a garden on this land.
    #[wasm_bindgen(js_name = bedFor)]
    pub fn bed_for(&self, garden_id: &str) -> Result<BedPlanner, JsValue> {
        let id = ItemId::from(garden_id);
        let Some(garden) = self.land.item(&id) else {
            return Err(JsValue::from_str(&error_json(ErrorInfo::from(&PlacementError::UnknownItem(id)))));
        };
        Bed::for_garden(garden, self.land.config())
            .map(|bed| BedPlanner { bed })
            .map_err(|e| JsValue::from_str(&error_json(ErrorInfo::from(&e))))
    }
}

/// Planting grid of one garden bed. Coordinates are plane units relative to the bed.
#[wasm_bindgen]
pub struct BedPlanner {
    bed: Bed,
}

#[wasm_bindgen]
impl BedPlanner {
    #[wasm_bindgen(constructor)]
    pub fn new(id: &str, width: f64, height: f64, cell_size: f64, spacing_units_per_plane_unit: f64) -> Result<BedPlanner, JsValue> {
        init_console_logging();
        Bed::new(id, width, height, cell_size, SpacingScale::new(spacing_units_per_plane_unit))
            .map(|bed| BedPlanner { bed })
            .map_err(|e| JsValue::from_str(&error_json(ErrorInfo::from(&e))))
    }

    /// Accepts or refuses; refusals are not errors and carry the reason.
    #[wasm_bindgen(js_name = tryPlant)]
    pub fn try_plant(&mut self, id: &str, name: &str, x: f64, y: f64, spacing: Option<f64>) -> String {
        respond(Ok(self.bed.try_plant(id, name, Point::new(x, y), spacing)))
    }

    #[wasm_bindgen(js_name = removePlant)]
    pub fn remove_plant(&mut self, id: &str) -> bool {
        self.bed.remove_plant(&ItemId::from(id)).is_some()
    }

    pub fn plants(&self) -> String {
        respond(Ok(self.bed.plants()))
    }

    /// Rehydrate plants saved earlier (`[PointEntity]`); returns the full plant list.
    #[wasm_bindgen(js_name = loadPlants)]
    pub fn load_plants(&mut self, plants_json: &str) -> String {
        let plants: Vec<PointEntity> = match serde_json::from_str(plants_json) {
            Ok(p) => p,
            Err(e) => return malformed("plants", e),
        };
        for plant in plants {
            self.bed.load(plant);
        }
        respond(Ok(self.bed.plants()))
    }

    #[wasm_bindgen(js_name = openPositions)]
    pub fn open_positions(&self, spacing: Option<f64>) -> String {
        respond(Ok(self.bed.open_positions(spacing)))
    }
}

/// Stateless free-position search over JSON inputs (`Plane`, `[Rect]`).
///
/// Candidates snap to `resolution`; a non-positive resolution searches unsnapped.
#[wasm_bindgen]
pub fn find_free_position_json(
    plane_json: &str,
    placed_json: &str,
    width: f64,
    height: f64,
    step: f64,
    resolution: f64,
    tolerance: f64,
) -> String {
    let plane: Plane = match serde_json::from_str(plane_json) {
        Ok(p) => p,
        Err(e) => return malformed("plane", e),
    };
    let placed: Vec<Rect> = match serde_json::from_str(placed_json) {
        Ok(p) => p,
        Err(e) => return malformed("placed items", e),
    };
    let snap = SnapConfig { resolution, enabled: resolution > 0.0 && resolution.is_finite() };
    let found = layout::find_free_position(&plane, &placed, Size::new(width, height), step, &snap, tolerance);
    to_string(&found).unwrap_or_else(|_| "null".to_string())
}

#[wasm_bindgen]
pub fn snap_value(value: f64, resolution: f64) -> f64 {
    layout::snap(value, resolution)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn planner() -> LandPlanner {
        LandPlanner::new("land", 10.0, 8.0, "").ok().unwrap()
    }

    #[test]
    fn test_find_free_position_json() {
        let out = find_free_position_json(
            r#"{"width": 4.0, "height": 4.0}"#,
            r#"[{"x": 0.0, "y": 0.0, "width": 2.0, "height": 2.0}]"#,
            2.0,
            2.0,
            1.0,
            1.0,
            0.01,
        );
        assert_eq!(out, r#"{"x":2.0,"y":0.0}"#);
    }

    #[test]
    fn test_find_free_position_json_reports_no_space() {
        let out = find_free_position_json(r#"{"width": 1.0, "height": 1.0}"#, "[]", 2.0, 2.0, 1.0, 1.0, 0.01);
        assert_eq!(out, "null");
    }

    #[test]
    fn test_malformed_input_is_an_error_payload() {
        let out = find_free_position_json("nope", "[]", 1.0, 1.0, 1.0, 1.0, 0.01);
        let json: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(json["error"]["code"], "malformed_input");
    }

    #[test]
    fn test_planner_round_trip_in_pixels() {
        let mut planner = planner();
        planner.add_item(r#"{"id": "a", "kind": "garden", "name": "A", "footprint": {"width": 2.0, "height": 2.0}}"#);

        let req: serde_json::Value = serde_json::from_str(&planner.auto_place("a")).unwrap();
        assert_eq!(req["op"], "update");
        assert_eq!(req["update"]["snap_to_grid"], true);
        planner.resolve_commit("a", true, "");

        // 40 px per unit: pick up at (40, 40), drop at (241.2, 239.2) -> origin (5.03, 4.98).
        planner.pointer_down("a", 40.0, 40.0);
        let frame: serde_json::Value = serde_json::from_str(&planner.pointer_move("a", 120.0, 120.0)).unwrap();
        assert_eq!(frame["candidate"]["x"], 2.0);
        let req: serde_json::Value = serde_json::from_str(&planner.pointer_up("a", 241.2, 239.2, false)).unwrap();
        assert_eq!(req["update"]["x"], 5.0);
        assert_eq!(req["update"]["y"], 5.0);

        let view: serde_json::Value = serde_json::from_str(&planner.resolve_commit("a", false, "offline")).unwrap();
        assert_eq!(view["error"]["code"], "persistence_failed");
        let view: serde_json::Value = serde_json::from_str(&planner.view()).unwrap();
        assert_eq!(view["placed"][0]["bounds"]["x"], 0.0);
    }

    #[test]
    fn test_bed_planner_reports_rejections() {
        let mut planner = planner();
        planner.add_item(r#"{"id": "g", "kind": "garden", "name": "G", "footprint": {"width": 4.0, "height": 2.0}}"#);
        let mut bed = planner.bed_for("g").ok().unwrap();
        let ok: serde_json::Value = serde_json::from_str(&bed.try_plant("p1", "Tomato", 0.1, 0.1, Some(24.0))).unwrap();
        assert_eq!(ok["status"], "accepted");
        let no: serde_json::Value = serde_json::from_str(&bed.try_plant("p2", "Basil", 1.1, 0.1, Some(6.0))).unwrap();
        assert_eq!(no["status"], "rejected");
        assert_eq!(no["rejection"]["reason"], "too_close");
        assert!(bed.remove_plant("p1"));
    }

    #[test]
    fn test_bed_planner_loads_saved_plants() {
        let mut bed = BedPlanner::new("bed", 4.0, 2.0, 0.5, 12.0).ok().unwrap();
        let out = bed.load_plants(r#"[{"id": "p1", "name": "Tomato", "x": 0.25, "y": 0.25, "spacing_requirement": 24.0}]"#);
        let plants: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(plants[0]["id"], "p1");
        let no: serde_json::Value = serde_json::from_str(&bed.try_plant("p2", "Basil", 0.8, 0.3, Some(6.0))).unwrap();
        assert_eq!(no["status"], "rejected");

        let bad: serde_json::Value = serde_json::from_str(&bed.load_plants("{")).unwrap();
        assert_eq!(bad["error"]["code"], "malformed_input");
    }

    #[test]
    fn test_snap_value() {
        assert_eq!(snap_value(5.03, 0.1), 5.0);
    }
}
