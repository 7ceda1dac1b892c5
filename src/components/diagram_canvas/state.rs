//! Canvas state: the imported document, pan/zoom, markers and flash fades.
//!
//! Nothing here touches the DOM, so every interaction the component and the
//! viewer perform can be exercised directly.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::rc::Rc;

use crate::diff::ChangeKind;
use crate::model::{Bounds, Geometry, ParsedDocument, Point};
use crate::preview::{ViewerError, Viewport};

pub const MIN_ZOOM: f64 = 0.1;
pub const MAX_ZOOM: f64 = 10.0;

/// Margin kept around the diagram when fitting, in screen pixels.
const FIT_PADDING: f64 = 20.0;

/// Tracks an in-progress canvas pan operation.
#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
}

/// Time (seconds) a flash stays at full intensity before fading.
const FLASH_HOLD: f64 = 0.6;

/// Per-element flash intensity with a hold then an exponential fade-out.
#[derive(Clone, Debug, Default)]
pub struct FlashState {
	intensity: HashMap<String, f64>,
	hold_timer: HashMap<String, f64>,
}

impl FlashState {
	pub fn start(&mut self, id: &str) {
		self.intensity.insert(id.to_string(), 1.0);
		self.hold_timer.insert(id.to_string(), FLASH_HOLD);
	}

	/// Advances the fade by `dt` seconds.
	///
	/// value *= e^(-speed * dt), so the ring slows as it vanishes.
	pub fn tick(&mut self, dt: f64) {
		const FADE_OUT_SPEED: f64 = 4.0;
		let decay = (-FADE_OUT_SPEED * dt).exp();

		self.hold_timer.retain(|_, timer| {
			*timer -= dt;
			*timer > 0.0
		});
		self.intensity.retain(|id, intensity| {
			if !self.hold_timer.contains_key(id) {
				*intensity *= decay;
			}
			*intensity > 0.005
		});
	}

	pub fn intensity(&self, id: &str) -> f64 {
		self.intensity.get(id).copied().unwrap_or(0.0)
	}

	pub fn is_active(&self) -> bool {
		!self.intensity.is_empty()
	}

	pub fn clear(&mut self) {
		self.intensity.clear();
		self.hold_timer.clear();
	}

	pub fn ids(&self) -> impl Iterator<Item = &str> {
		self.intensity.keys().map(String::as_str)
	}
}

/// Everything the renderer draws from, mutated by the viewer and by input.
#[derive(Debug, Default)]
pub struct CanvasState {
	document: Option<Rc<ParsedDocument>>,
	markers: BTreeMap<String, BTreeSet<ChangeKind>>,
	pub transform: Viewport,
	pub pan: PanState,
	pub flash: FlashState,
	pub width: f64,
	pub height: f64,
	needs_fit: bool,
	dirty: bool,
}

impl CanvasState {
	/// Replaces the document and fits it, once the canvas has a size.
	pub fn import(&mut self, document: Rc<ParsedDocument>) {
		self.document = Some(document);
		self.markers.clear();
		self.flash.clear();
		self.needs_fit = true;
		self.fit();
	}

	pub fn clear(&mut self) {
		self.document = None;
		self.markers.clear();
		self.flash.clear();
		self.pan = PanState::default();
		self.dirty = true;
	}

	pub fn document(&self) -> Option<&ParsedDocument> {
		self.document.as_deref()
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
		if self.needs_fit {
			self.fit();
		}
		self.dirty = true;
	}

	/// Scales and centers the whole diagram into the canvas.
	///
	/// Deferred until the canvas has a size; a document with no placed
	/// elements keeps the identity transform.
	pub fn fit(&mut self) {
		if self.width <= 0.0 || self.height <= 0.0 {
			return;
		}
		self.needs_fit = false;
		let Some(extent) = self.document.as_ref().and_then(|doc| doc.extent()) else {
			return;
		};
		let fit = |available: f64, size: f64| {
			if size > 0.0 {
				(available - 2.0 * FIT_PADDING).max(1.0) / size
			} else {
				MAX_ZOOM
			}
		};
		let zoom = fit(self.width, extent.width)
			.min(fit(self.height, extent.height))
			.clamp(MIN_ZOOM, MAX_ZOOM);
		self.transform.zoom = zoom;
		self.center_on(extent);
	}

	/// Puts the center of `bounds` in the middle of the canvas at the current zoom.
	pub fn center_on(&mut self, bounds: Bounds) {
		let center = bounds.center();
		let k = self.transform.zoom;
		self.transform.x = self.width / 2.0 - center.x * k;
		self.transform.y = self.height / 2.0 - center.y * k;
		self.dirty = true;
	}

	pub fn set_transform(&mut self, viewport: Viewport) {
		self.transform = Viewport {
			zoom: viewport.zoom.clamp(MIN_ZOOM, MAX_ZOOM),
			..viewport
		};
		self.dirty = true;
	}

	/// Zooms by `factor` keeping the screen point (`sx`, `sy`) fixed.
	pub fn zoom_at(&mut self, sx: f64, sy: f64, factor: f64) {
		let t = &mut self.transform;
		let new_k = (t.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
		let ratio = new_k / t.zoom;
		t.x = sx - (sx - t.x) * ratio;
		t.y = sy - (sy - t.y) * ratio;
		t.zoom = new_k;
		self.dirty = true;
	}

	pub fn start_pan(&mut self, sx: f64, sy: f64) {
		self.pan = PanState {
			active: true,
			start_x: sx,
			start_y: sy,
			transform_start_x: self.transform.x,
			transform_start_y: self.transform.y,
		};
	}

	/// Moves the view with the pointer. Returns whether a pan is in progress.
	pub fn pan_to(&mut self, sx: f64, sy: f64) -> bool {
		if !self.pan.active {
			return false;
		}
		self.transform.x = self.pan.transform_start_x + (sx - self.pan.start_x);
		self.transform.y = self.pan.transform_start_y + (sy - self.pan.start_y);
		self.dirty = true;
		true
	}

	pub fn end_pan(&mut self) {
		self.pan.active = false;
	}

	pub fn screen_to_diagram(&self, sx: f64, sy: f64) -> Point {
		Point {
			x: (sx - self.transform.x) / self.transform.zoom,
			y: (sy - self.transform.y) / self.transform.zoom,
		}
	}

	/// The element under a screen point: an edge within `slop` diagram
	/// units first, else the smallest shape containing the point.
	pub fn element_at(&self, sx: f64, sy: f64, slop: f64) -> Option<&str> {
		let doc = self.document.as_ref()?;
		let p = self.screen_to_diagram(sx, sy);
		let mut best_shape: Option<(&str, f64)> = None;
		for element in doc.elements() {
			match &element.geometry {
				Some(Geometry::Edge(points)) => {
					let near = points
						.windows(2)
						.any(|w| segment_distance(p, w[0], w[1]) <= slop);
					if near {
						return Some(&element.id);
					}
				}
				Some(Geometry::Shape(bounds)) if bounds.contains(p) => {
					let area = bounds.width * bounds.height;
					if best_shape.is_none_or(|(_, best)| area < best) {
						best_shape = Some((&element.id, area));
					}
				}
				_ => {}
			}
		}
		best_shape.map(|(id, _)| id)
	}

	fn known(&self, id: &str) -> Result<(), ViewerError> {
		let doc = self.document.as_ref().ok_or(ViewerError::NoDiagram)?;
		if doc.contains(id) {
			Ok(())
		} else {
			Err(ViewerError::UnknownElement(id.to_string()))
		}
	}

	pub fn add_marker(&mut self, id: &str, kind: ChangeKind) -> Result<(), ViewerError> {
		self.known(id)?;
		if self.markers.entry(id.to_string()).or_default().insert(kind) {
			self.dirty = true;
		}
		Ok(())
	}

	pub fn remove_marker(&mut self, id: &str, kind: ChangeKind) -> Result<(), ViewerError> {
		self.known(id)?;
		if let Some(kinds) = self.markers.get_mut(id) {
			if kinds.remove(&kind) {
				self.dirty = true;
			}
			if kinds.is_empty() {
				self.markers.remove(id);
			}
		}
		Ok(())
	}

	/// Id of the element `id` is drawn on.
	fn anchor_id<'a>(&'a self, id: &'a str) -> Option<&'a str> {
		let doc = self.document.as_ref()?;
		doc.anchor(id).map(|el| el.id.as_str())
	}

	/// Categories drawn on `id`, strongest first. Includes the markers of
	/// unplaced descendants anchored to it.
	pub fn markers_of(&self, id: &str) -> Vec<ChangeKind> {
		let kinds: BTreeSet<ChangeKind> = self
			.markers
			.iter()
			.filter(|(marked, _)| marked.as_str() == id || self.anchor_id(marked) == Some(id))
			.flat_map(|(_, kinds)| kinds.iter().copied())
			.collect();
		let mut kinds: Vec<ChangeKind> = kinds.into_iter().collect();
		kinds.sort_by_key(|k| k.precedence());
		kinds
	}

	pub fn flash(&mut self, id: &str) {
		let target = self.anchor_id(id).unwrap_or(id).to_string();
		self.flash.start(&target);
		self.dirty = true;
	}

	pub fn tick(&mut self, dt: f64) {
		if self.flash.is_active() {
			self.flash.tick(dt);
			self.dirty = true;
		}
	}

	/// Whether a frame must be drawn; resets the flag.
	pub fn take_dirty(&mut self) -> bool {
		std::mem::take(&mut self.dirty)
	}
}

fn segment_distance(p: Point, a: Point, b: Point) -> f64 {
	let (dx, dy) = (b.x - a.x, b.y - a.y);
	let len_sq = dx * dx + dy * dy;
	let t = if len_sq > 0.0 {
		(((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0)
	} else {
		0.0
	};
	let (cx, cy) = (a.x + t * dx, a.y + t * dy);
	((p.x - cx).powi(2) + (p.y - cy).powi(2)).sqrt()
}

#[cfg(test)]
mod tests {
	use indexmap::IndexMap;

	use super::*;
	use crate::model::DiagramElement;
	use crate::notation::Notation;

	fn shape(id: &str, x: f64, y: f64, width: f64, height: f64) -> DiagramElement {
		let mut el = DiagramElement::new(id, "bpmn:Task");
		el.geometry = Some(Geometry::Shape(Bounds { x, y, width, height }));
		el
	}

	fn document() -> Rc<ParsedDocument> {
		let mut elements = IndexMap::new();
		let mut edge = DiagramElement::new("Flow", "bpmn:SequenceFlow");
		edge.geometry = Some(Geometry::Edge(vec![
			Point { x: 100.0, y: 40.0 },
			Point { x: 200.0, y: 40.0 },
		]));
		for el in [
			DiagramElement::new("D", "bpmn:Definitions"),
			shape("Lane", 0.0, 0.0, 400.0, 200.0),
			shape("Task", 10.0, 10.0, 80.0, 60.0),
			edge,
		] {
			elements.insert(el.id.clone(), el);
		}
		Rc::new(ParsedDocument::new(Notation::Bpmn, "D".into(), elements))
	}

	#[test]
	fn test_fit_waits_for_size() {
		let mut state = CanvasState::default();
		state.import(document());
		assert_eq!(state.transform, Viewport::default());

		state.resize(440.0, 300.0);
		// 400 wide extent in 400 usable pixels.
		assert!((state.transform.zoom - 1.0).abs() < 1e-9);
		assert_eq!(state.screen_to_diagram(220.0, 150.0), Point { x: 200.0, y: 100.0 });
	}

	#[test]
	fn test_zoom_keeps_cursor_point_and_clamps() {
		let mut state = CanvasState::default();
		state.resize(400.0, 300.0);
		let before = state.screen_to_diagram(120.0, 80.0);
		state.zoom_at(120.0, 80.0, 1.1);
		let after = state.screen_to_diagram(120.0, 80.0);
		assert!((before.x - after.x).abs() < 1e-9 && (before.y - after.y).abs() < 1e-9);

		for _ in 0..100 {
			state.zoom_at(0.0, 0.0, 0.5);
		}
		assert_eq!(state.transform.zoom, MIN_ZOOM);
	}

	#[test]
	fn test_pan_only_while_active() {
		let mut state = CanvasState::default();
		assert!(!state.pan_to(10.0, 10.0));
		state.start_pan(10.0, 10.0);
		assert!(state.pan_to(30.0, 5.0));
		assert_eq!((state.transform.x, state.transform.y), (20.0, -5.0));
		state.end_pan();
		assert!(!state.pan_to(50.0, 50.0));
	}

	#[test]
	fn test_element_at() {
		let mut state = CanvasState::default();
		state.import(document());
		assert_eq!(state.element_at(20.0, 20.0, 2.0), Some("Task"));
		assert_eq!(state.element_at(300.0, 150.0, 2.0), Some("Lane"));
		assert_eq!(state.element_at(150.0, 41.0, 2.0), Some("Flow"));
		assert_eq!(state.element_at(500.0, 500.0, 2.0), None);
	}

	#[test]
	fn test_markers() {
		let mut state = CanvasState::default();
		assert_eq!(
			state.add_marker("Task", ChangeKind::Added),
			Err(ViewerError::NoDiagram)
		);
		state.import(document());
		state.add_marker("Task", ChangeKind::LayoutChanged).unwrap();
		state.add_marker("Task", ChangeKind::Changed).unwrap();
		state.add_marker("Task", ChangeKind::Changed).unwrap();
		assert_eq!(
			state.markers_of("Task"),
			[ChangeKind::Changed, ChangeKind::LayoutChanged]
		);
		assert!(matches!(
			state.add_marker("Ghost", ChangeKind::Added),
			Err(ViewerError::UnknownElement(_))
		));

		state.remove_marker("Task", ChangeKind::Changed).unwrap();
		state.remove_marker("Task", ChangeKind::Removed).unwrap();
		assert_eq!(state.markers_of("Task"), [ChangeKind::LayoutChanged]);
	}

	#[test]
	fn test_flash_holds_then_fades() {
		let mut flash = FlashState::default();
		flash.start("Task");
		flash.tick(0.3);
		assert_eq!(flash.intensity("Task"), 1.0);
		flash.tick(0.4);
		flash.tick(0.1);
		let fading = flash.intensity("Task");
		assert!(fading < 1.0 && fading > 0.0);
		for _ in 0..200 {
			flash.tick(0.016);
		}
		assert!(!flash.is_active());
	}
}
