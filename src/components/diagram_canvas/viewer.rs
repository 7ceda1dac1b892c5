//! [`DiagramViewer`] backed by a [`CanvasState`].

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use log::debug;

use super::state::CanvasState;
use crate::diff::ChangeKind;
use crate::model::{Bounds, ParsedDocument};
use crate::preview::viewer::ViewportListener;
use crate::preview::{DiagramViewer, ViewerError, Viewport};

/// Shared between the pipeline (through [`DiagramViewer`]) and the canvas
/// component, which draws the state and feeds user pan/zoom back in.
#[derive(Default)]
pub struct CanvasViewer {
	state: RefCell<CanvasState>,
	listeners: RefCell<Vec<ViewportListener>>,
	destroyed: Cell<bool>,
}

impl CanvasViewer {
	pub fn new() -> Rc<Self> {
		Rc::new(Self::default())
	}

	pub fn is_destroyed(&self) -> bool {
		self.destroyed.get()
	}

	/// Runs `f` on the state, then notifies listeners if the viewport moved.
	///
	/// The borrow is released before listeners run, since they call into
	/// the sibling viewer which may call back here.
	pub fn update<R>(&self, f: impl FnOnce(&mut CanvasState) -> R) -> R {
		let (result, before, after) = {
			let mut state = self.state.borrow_mut();
			let before = state.transform;
			let result = f(&mut state);
			(result, before, state.transform)
		};
		if before != after {
			self.notify(after);
		}
		result
	}

	/// Runs `f` on the state without notifying anyone.
	pub fn with_state<R>(&self, f: impl FnOnce(&CanvasState) -> R) -> R {
		f(&self.state.borrow())
	}

	fn notify(&self, viewport: Viewport) {
		for listener in self.listeners.borrow().iter() {
			listener(viewport);
		}
	}
}

impl DiagramViewer for CanvasViewer {
	fn import(&self, document: Rc<ParsedDocument>) -> Result<(), ViewerError> {
		if self.is_destroyed() {
			return Err(ViewerError::Destroyed);
		}
		debug!("importing {} elements", document.len());
		self.update(|state| state.import(document));
		Ok(())
	}

	fn viewport(&self) -> Viewport {
		self.state.borrow().transform
	}

	fn set_viewport(&self, viewport: Viewport) {
		if self.is_destroyed() {
			return;
		}
		self.state.borrow_mut().set_transform(viewport);
		let applied = self.viewport();
		self.notify(applied);
	}

	fn on_viewport_change(&self, listener: ViewportListener) {
		self.listeners.borrow_mut().push(listener);
	}

	fn add_marker(&self, id: &str, kind: ChangeKind) -> Result<(), ViewerError> {
		self.state.borrow_mut().add_marker(id, kind)
	}

	fn remove_marker(&self, id: &str, kind: ChangeKind) -> Result<(), ViewerError> {
		self.state.borrow_mut().remove_marker(id, kind)
	}

	fn element_bounds(&self, id: &str) -> Option<Bounds> {
		self.state.borrow().document()?.placed_bounds(id)
	}

	fn center_on(&self, bounds: Bounds) {
		self.update(|state| state.center_on(bounds));
	}

	fn flash(&self, id: &str) {
		self.state.borrow_mut().flash(id);
	}

	fn destroy(&self) {
		if self.destroyed.replace(true) {
			return;
		}
		self.listeners.borrow_mut().clear();
		self.state.borrow_mut().clear();
	}
}
