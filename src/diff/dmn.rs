//! DMN differ: id matching over the decision model, whitespace-insensitive.
//!
//! Decision logic is compared by value only; diagram placement is not tracked,
//! so a DMN diff never reports layout changes.

use indexmap::IndexMap;
use log::debug;

use super::{AttributeChange, ElementRef, compare_attrs};
use crate::error::{Error, Result};
use crate::model::{AttrValue, ParsedDocument};
use crate::notation::Notation;

/// A changed element: the after-side model plus per-attribute old/new pairs.
#[derive(Clone, Debug, PartialEq)]
pub struct DmnChange {
	pub model: ElementRef,
	pub attrs: IndexMap<String, AttributeChange>,
}

/// Native DMN diff output: three lists in document order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DmnDiff {
	pub added: Vec<ElementRef>,
	pub removed: Vec<ElementRef>,
	pub changed: Vec<DmnChange>,
}

/// Compares two DMN documents.
pub fn diff(before: &ParsedDocument, after: &ParsedDocument) -> Result<DmnDiff> {
	if before.notation != Notation::Dmn || after.notation != Notation::Dmn {
		return Err(Error::DiffComputation(format!(
			"DMN differ called with {} and {} documents",
			before.notation, after.notation
		)));
	}

	let removed = before
		.elements()
		.filter(|el| !after.contains(&el.id))
		.map(ElementRef::from)
		.collect();

	let mut added = Vec::new();
	let mut changed = Vec::new();
	for new in after.elements() {
		match before.get(&new.id) {
			None => added.push(ElementRef::from(new)),
			Some(old) => {
				let attrs = compare_attrs(old, new, AttrValue::eq_normalized);
				if !attrs.is_empty() {
					changed.push(DmnChange {
						model: new.into(),
						attrs,
					});
				}
			}
		}
	}

	let out = DmnDiff {
		added,
		removed,
		changed,
	};
	debug!(
		"dmn diff: {} added, {} removed, {} changed",
		out.added.len(),
		out.removed.len(),
		out.changed.len()
	);
	Ok(out)
}
