//! Recording viewer used by the preview tests.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeSet, HashMap};
use std::rc::Rc;

use super::viewer::{DiagramViewer, ViewerError, Viewport, ViewportListener};
use crate::diff::ChangeKind;
use crate::model::{Bounds, ParsedDocument};

#[derive(Default)]
pub(crate) struct MockViewer {
	pub bounds: RefCell<HashMap<String, Bounds>>,
	pub markers: RefCell<BTreeSet<(String, ChangeKind)>>,
	pub viewport: Cell<Viewport>,
	pub listeners: RefCell<Vec<ViewportListener>>,
	/// Programmatic `set_viewport` calls.
	pub set_calls: Cell<usize>,
	pub centered: RefCell<Vec<Bounds>>,
	pub flashed: RefCell<Vec<String>>,
	pub destroyed: Cell<bool>,
}

impl MockViewer {
	pub fn with_elements(ids: &[&str]) -> Rc<Self> {
		let viewer = Self::default();
		for (i, id) in ids.iter().enumerate() {
			viewer.bounds.borrow_mut().insert(
				id.to_string(),
				Bounds {
					x: i as f64 * 150.0,
					y: 0.0,
					width: 100.0,
					height: 80.0,
				},
			);
		}
		Rc::new(viewer)
	}

	/// A pan coming from the user, not from a sibling viewer.
	pub fn user_pan(&self, viewport: Viewport) {
		self.viewport.set(viewport);
		self.emit(viewport);
	}

	fn emit(&self, viewport: Viewport) {
		for listener in self.listeners.borrow().iter() {
			listener(viewport);
		}
	}

	pub fn marked(&self, kind: ChangeKind) -> Vec<String> {
		self.markers
			.borrow()
			.iter()
			.filter(|(_, k)| *k == kind)
			.map(|(id, _)| id.clone())
			.collect()
	}
}

impl DiagramViewer for MockViewer {
	fn import(&self, document: Rc<ParsedDocument>) -> Result<(), ViewerError> {
		let mut bounds = self.bounds.borrow_mut();
		for element in document.elements() {
			if let Some(b) = document.bounds_of(&element.id) {
				bounds.insert(element.id.clone(), b);
			}
		}
		Ok(())
	}

	fn viewport(&self) -> Viewport {
		self.viewport.get()
	}

	fn set_viewport(&self, viewport: Viewport) {
		self.set_calls.set(self.set_calls.get() + 1);
		self.viewport.set(viewport);
		self.emit(viewport);
	}

	fn on_viewport_change(&self, listener: ViewportListener) {
		self.listeners.borrow_mut().push(listener);
	}

	fn add_marker(&self, id: &str, kind: ChangeKind) -> Result<(), ViewerError> {
		if !self.bounds.borrow().contains_key(id) {
			return Err(ViewerError::UnknownElement(id.to_string()));
		}
		self.markers.borrow_mut().insert((id.to_string(), kind));
		Ok(())
	}

	fn remove_marker(&self, id: &str, kind: ChangeKind) -> Result<(), ViewerError> {
		self.markers.borrow_mut().remove(&(id.to_string(), kind));
		Ok(())
	}

	fn element_bounds(&self, id: &str) -> Option<Bounds> {
		self.bounds.borrow().get(id).copied()
	}

	fn center_on(&self, bounds: Bounds) {
		self.centered.borrow_mut().push(bounds);
	}

	fn flash(&self, id: &str) {
		self.flashed.borrow_mut().push(id.to_string());
	}

	fn destroy(&self) {
		self.listeners.borrow_mut().clear();
		self.destroyed.set(true);
	}
}
