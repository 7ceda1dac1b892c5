//! Diff markers on the before/after viewers, one toggleable layer per category.

use log::debug;
use serde::{Deserialize, Serialize};

use super::viewer::DiagramViewer;
use crate::diff::{ChangeKind, DiffResult};

/// Which overlay layers are shown. Session-only, never persisted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerVisibility {
	pub added: bool,
	pub removed: bool,
	pub attributes_changed: bool,
	pub layout_changed: bool,
}

impl Default for LayerVisibility {
	fn default() -> Self {
		Self {
			added: true,
			removed: true,
			attributes_changed: true,
			layout_changed: false,
		}
	}
}

impl LayerVisibility {
	pub fn is_visible(&self, kind: ChangeKind) -> bool {
		match kind {
			ChangeKind::Added => self.added,
			ChangeKind::Removed => self.removed,
			ChangeKind::Changed => self.attributes_changed,
			ChangeKind::LayoutChanged => self.layout_changed,
		}
	}

	pub fn set(&mut self, kind: ChangeKind, visible: bool) {
		match kind {
			ChangeKind::Added => self.added = visible,
			ChangeKind::Removed => self.removed = visible,
			ChangeKind::Changed => self.attributes_changed = visible,
			ChangeKind::LayoutChanged => self.layout_changed = visible,
		}
	}

	pub fn toggle(&mut self, kind: ChangeKind) {
		self.set(kind, !self.is_visible(kind));
	}
}

/// One of the two viewers of a dual view.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
	Before,
	After,
}

/// Viewers a category is drawn on. Removed elements only exist before,
/// added ones only after; the rest share ids across both.
pub fn sides(kind: ChangeKind) -> &'static [Side] {
	match kind {
		ChangeKind::Removed => &[Side::Before],
		ChangeKind::Added => &[Side::After],
		ChangeKind::Changed | ChangeKind::LayoutChanged => &[Side::Before, Side::After],
	}
}

/// Shows or hides one layer. Marker API failures are logged and skipped.
pub fn apply_layer<V: DiagramViewer + ?Sized>(
	before: &V,
	after: &V,
	diff: &DiffResult,
	kind: ChangeKind,
	visible: bool,
) {
	for side in sides(kind) {
		let viewer = match side {
			Side::Before => before,
			Side::After => after,
		};
		for id in diff.ids(kind) {
			let result = if visible {
				viewer.add_marker(id, kind)
			} else {
				viewer.remove_marker(id, kind)
			};
			if let Err(e) = result {
				debug!("{} marker on {id} ({side:?}): {e}", kind.label());
			}
		}
	}
}

/// Brings every layer in line with `visibility`.
pub fn apply_layers<V: DiagramViewer + ?Sized>(
	before: &V,
	after: &V,
	diff: &DiffResult,
	visibility: LayerVisibility,
) {
	for kind in ChangeKind::ALL {
		apply_layer(before, after, diff, kind, visibility.is_visible(kind));
	}
}

/// Centers both viewers on `id` and flashes it.
pub fn reveal<V: DiagramViewer + ?Sized>(before: &V, after: &V, id: &str) {
	let Some(bounds) = after.element_bounds(id).or_else(|| before.element_bounds(id)) else {
		debug!("{id} is on neither canvas");
		return;
	};
	for viewer in [before, after] {
		viewer.center_on(bounds);
		viewer.flash(id);
	}
}
