//! Flattens native differ output into one [`DiffResult`] with disjoint id sets.

use indexmap::IndexMap;
use log::debug;

use super::{ChangeKind, ChangedElement, DiffResult, ElementRef, RawDiff};

/// Maps a notation-specific diff into the common [`DiffResult`].
///
/// Nested `model` references are flattened into the changed record. An id
/// reported in more than one category is kept only in the category with the
/// best [`ChangeKind::precedence`].
pub fn normalize(raw: RawDiff) -> DiffResult {
	let mut out = DiffResult::default();
	match raw {
		RawDiff::Bpmn(diff) => {
			for (_, change) in diff.changed {
				insert_changed(&mut out, change.model, change.attrs);
			}
			insert_all(&mut out, ChangeKind::Added, diff.added.into_values());
			insert_all(&mut out, ChangeKind::Removed, diff.removed.into_values());
			insert_all(
				&mut out,
				ChangeKind::LayoutChanged,
				diff.layout_changed.into_values(),
			);
		}
		RawDiff::Dmn(diff) => {
			for change in diff.changed {
				insert_changed(&mut out, change.model, change.attrs);
			}
			insert_all(&mut out, ChangeKind::Added, diff.added);
			insert_all(&mut out, ChangeKind::Removed, diff.removed);
		}
	}
	out
}

fn insert_changed(
	out: &mut DiffResult,
	model: ElementRef,
	attrs: IndexMap<String, super::AttributeChange>,
) {
	let ElementRef { id, name, kind } = model;
	out.changed.insert(
		id.clone(),
		ChangedElement {
			id,
			name,
			kind,
			attrs,
		},
	);
}

/// Inserts in precedence order; callers go from best to worst category.
fn insert_all(
	out: &mut DiffResult,
	kind: ChangeKind,
	elements: impl IntoIterator<Item = ElementRef>,
) {
	for element in elements {
		if let Some(existing) = out.kind_of(&element.id) {
			debug!(
				"{} reported as both {} and {}, keeping {}",
				element.id,
				existing.label(),
				kind.label(),
				existing.label()
			);
			continue;
		}
		let target = match kind {
			ChangeKind::Added => &mut out.added,
			ChangeKind::Removed => &mut out.removed,
			ChangeKind::LayoutChanged => &mut out.layout_changed,
			// Changed records carry attributes and go through `insert_changed`.
			ChangeKind::Changed => continue,
		};
		target.insert(element.id.clone(), element);
	}
}
