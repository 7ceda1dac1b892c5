//! BPMN differ: id matching with layout tracking.

use indexmap::IndexMap;
use log::debug;

use super::{AttributeChange, ElementRef, compare_attrs};
use crate::error::{Error, Result};
use crate::model::ParsedDocument;
use crate::notation::Notation;

/// Geometry deltas up to this many diagram units are not a layout change.
pub const LAYOUT_TOLERANCE: f64 = 0.5;

/// A changed element: the after-side model plus per-attribute old/new pairs.
#[derive(Clone, Debug, PartialEq)]
pub struct BpmnChange {
	pub model: ElementRef,
	pub attrs: IndexMap<String, AttributeChange>,
}

/// Native BPMN diff output, four maps keyed by element id.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BpmnDiff {
	pub added: IndexMap<String, ElementRef>,
	pub removed: IndexMap<String, ElementRef>,
	pub changed: IndexMap<String, BpmnChange>,
	pub layout_changed: IndexMap<String, ElementRef>,
}

/// Compares two BPMN documents.
pub fn diff(before: &ParsedDocument, after: &ParsedDocument) -> Result<BpmnDiff> {
	if before.notation != Notation::Bpmn || after.notation != Notation::Bpmn {
		return Err(Error::DiffComputation(format!(
			"BPMN differ called with {} and {} documents",
			before.notation, after.notation
		)));
	}

	let mut out = BpmnDiff::default();
	for old in before.elements() {
		if !after.contains(&old.id) {
			out.removed.insert(old.id.clone(), old.into());
		}
	}

	for new in after.elements() {
		let Some(old) = before.get(&new.id) else {
			out.added.insert(new.id.clone(), new.into());
			continue;
		};

		let attrs = compare_attrs(old, new, |a, b| a == b);
		if !attrs.is_empty() {
			out.changed.insert(
				new.id.clone(),
				BpmnChange {
					model: new.into(),
					attrs,
				},
			);
			continue;
		}

		let moved = match (&old.geometry, &new.geometry) {
			(Some(a), Some(b)) => !a.approx_eq(b, LAYOUT_TOLERANCE),
			(None, None) => false,
			_ => true,
		};
		if moved {
			out.layout_changed.insert(new.id.clone(), new.into());
		}
	}

	debug!(
		"bpmn diff: {} added, {} removed, {} changed, {} layout changed",
		out.added.len(),
		out.removed.len(),
		out.changed.len(),
		out.layout_changed.len()
	);
	Ok(out)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn doc(body: &str, shapes: &str) -> ParsedDocument {
		let xml = format!(
			r#"<bpmn:definitions xmlns:bpmn="http://www.omg.org/spec/BPMN/20100524/MODEL"
    xmlns:bpmndi="http://www.omg.org/spec/BPMN/20100524/DI"
    xmlns:dc="http://www.omg.org/spec/DD/20100524/DC" id="D">
  <bpmn:process id="P">{body}</bpmn:process>
  <bpmndi:BPMNDiagram id="Diagram"><bpmndi:BPMNPlane id="Plane" bpmnElement="P">{shapes}</bpmndi:BPMNPlane></bpmndi:BPMNDiagram>
</bpmn:definitions>"#
		);
		Notation::Bpmn.parse(&xml).unwrap()
	}

	fn shape(id: &str, x: f64) -> String {
		format!(
			r#"<bpmndi:BPMNShape id="{id}_di" bpmnElement="{id}"><dc:Bounds x="{x}" y="0" width="100" height="80" /></bpmndi:BPMNShape>"#
		)
	}

	#[test]
	fn test_added_and_removed() {
		let before = doc(r#"<bpmn:task id="A" name="A" />"#, &shape("A", 0.0));
		let after = doc(r#"<bpmn:task id="B" name="B" />"#, &shape("B", 0.0));
		let out = diff(&before, &after).unwrap();
		assert_eq!(out.added.keys().collect::<Vec<_>>(), ["B"]);
		assert_eq!(out.removed.keys().collect::<Vec<_>>(), ["A"]);
		assert!(out.changed.is_empty());
	}

	#[test]
	fn test_rename_is_change_not_layout() {
		let before = doc(r#"<bpmn:task id="A" name="Old" />"#, &shape("A", 0.0));
		let after = doc(r#"<bpmn:task id="A" name="New" />"#, &shape("A", 250.0));
		let out = diff(&before, &after).unwrap();
		assert_eq!(out.changed.len(), 1);
		assert!(out.layout_changed.is_empty());
		let change = &out.changed["A"];
		assert_eq!(change.model.name.as_deref(), Some("New"));
		assert!(change.attrs.contains_key("name"));
	}

	#[test]
	fn test_move_is_layout_change() {
		let before = doc(r#"<bpmn:task id="A" name="A" />"#, &shape("A", 0.0));
		let after = doc(r#"<bpmn:task id="A" name="A" />"#, &shape("A", 40.0));
		let out = diff(&before, &after).unwrap();
		assert!(out.changed.is_empty());
		assert_eq!(out.layout_changed.keys().collect::<Vec<_>>(), ["A"]);

		let nudged = doc(r#"<bpmn:task id="A" name="A" />"#, &shape("A", 0.25));
		assert!(diff(&before, &nudged).unwrap().layout_changed.is_empty());
	}

	#[test]
	fn test_rejects_other_notation() {
		let before = doc("", "");
		let dmn = Notation::Dmn
			.parse(r#"<definitions xmlns="https://www.omg.org/spec/DMN/20191111/MODEL/" id="X" />"#)
			.unwrap();
		assert!(matches!(diff(&before, &dmn), Err(Error::DiffComputation(_))));
	}
}
