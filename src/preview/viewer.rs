//! The contract the preview pipeline needs from a diagram viewer.

use std::rc::Rc;

use thiserror::Error;

use crate::diff::ChangeKind;
use crate::model::{Bounds, ParsedDocument};

/// Pan/zoom state: a diagram point `p` is drawn at `p * zoom + (x, y)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
	pub x: f64,
	pub y: f64,
	pub zoom: f64,
}

impl Default for Viewport {
	fn default() -> Self {
		Self {
			x: 0.0,
			y: 0.0,
			zoom: 1.0,
		}
	}
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum ViewerError {
	#[error("no diagram imported")]
	NoDiagram,

	#[error("element {0} is not on the canvas")]
	UnknownElement(String),

	#[error("viewer has been destroyed")]
	Destroyed,
}

pub type ViewportListener = Box<dyn Fn(Viewport)>;

/// A rendered diagram with marker and viewport control.
///
/// Methods take `&self`; implementations keep their state behind interior
/// mutability since listeners call back into sibling viewers.
pub trait DiagramViewer {
	fn import(&self, document: Rc<ParsedDocument>) -> Result<(), ViewerError>;

	fn viewport(&self) -> Viewport;

	/// Moves the viewport. Listeners are notified, as for user pan/zoom.
	fn set_viewport(&self, viewport: Viewport);

	fn on_viewport_change(&self, listener: ViewportListener);

	/// Marks `id`; marking an already marked element is a no-op.
	fn add_marker(&self, id: &str, kind: ChangeKind) -> Result<(), ViewerError>;

	/// Unmarks `id`; removing an absent marker is a no-op.
	fn remove_marker(&self, id: &str, kind: ChangeKind) -> Result<(), ViewerError>;

	fn element_bounds(&self, id: &str) -> Option<Bounds>;

	fn center_on(&self, bounds: Bounds);

	/// Briefly highlights `id`.
	fn flash(&self, id: &str);

	/// Drops the document, listeners and any render loop.
	fn destroy(&self);
}
