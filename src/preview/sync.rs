//! Two-way viewport mirroring between the before and after viewers.

use std::cell::Cell;
use std::rc::{Rc, Weak};

use super::viewer::DiagramViewer;

/// Keeps two viewers' pan/zoom locked together.
///
/// A single shared `changing` flag is raised while one viewer's change is
/// forwarded to the other, so the echo from the receiving viewer is dropped
/// instead of bouncing back.
pub struct ViewportSync {
	changing: Rc<Cell<bool>>,
}

impl ViewportSync {
	pub fn link(a: &Rc<dyn DiagramViewer>, b: &Rc<dyn DiagramViewer>) -> Self {
		let changing = Rc::new(Cell::new(false));
		forward(a, Rc::downgrade(b), changing.clone());
		forward(b, Rc::downgrade(a), changing.clone());
		Self { changing }
	}

	/// True only while a change is being forwarded.
	pub fn is_propagating(&self) -> bool {
		self.changing.get()
	}
}

fn forward(from: &Rc<dyn DiagramViewer>, to: Weak<dyn DiagramViewer>, changing: Rc<Cell<bool>>) {
	from.on_viewport_change(Box::new(move |viewport| {
		if changing.get() {
			return;
		}
		let Some(to) = to.upgrade() else {
			return;
		};
		changing.set(true);
		to.set_viewport(viewport);
		changing.set(false);
	}));
}
