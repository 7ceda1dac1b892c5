//! Structural diffs between two versions of a diagram.
//!
//! Each notation has its own differ with its own native output shape
//! ([`bpmn::BpmnDiff`], [`dmn::DmnDiff`]); [`normalize`] maps either one
//! into the common [`DiffResult`] consumed by the overlay and the change list.

pub mod bpmn;
pub mod changes;
pub mod dmn;
mod normalize;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::model::{AttrValue, DiagramElement};

pub use normalize::normalize;

/// Pseudo-attribute reported when an element's type changes under the same id.
pub const TYPE_ATTR: &str = "$type";

/// One of the four diff categories, also used as an overlay layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChangeKind {
	Added,
	Removed,
	Changed,
	LayoutChanged,
}

impl ChangeKind {
	pub const ALL: [ChangeKind; 4] = [
		ChangeKind::Added,
		ChangeKind::Removed,
		ChangeKind::Changed,
		ChangeKind::LayoutChanged,
	];

	/// Label shown in the change list.
	pub fn label(self) -> &'static str {
		match self {
			ChangeKind::Added => "added",
			ChangeKind::Removed => "removed",
			ChangeKind::Changed => "changed",
			ChangeKind::LayoutChanged => "layout changed",
		}
	}

	/// Badge glyph drawn next to a marked element.
	pub fn glyph(self) -> &'static str {
		match self {
			ChangeKind::Added => "+",
			ChangeKind::Removed => "\u{2212}",
			ChangeKind::Changed => "\u{270E}",
			ChangeKind::LayoutChanged => "\u{2192}",
		}
	}

	/// Highlight class applied to marked elements.
	pub fn marker_class(self) -> &'static str {
		match self {
			ChangeKind::Added => "diff-added",
			ChangeKind::Removed => "diff-removed",
			ChangeKind::Changed => "diff-changed",
			ChangeKind::LayoutChanged => "diff-layout-changed",
		}
	}

	/// Rank used when one id shows up in several categories; lower wins.
	pub fn precedence(self) -> u8 {
		match self {
			ChangeKind::Changed => 0,
			ChangeKind::Added => 1,
			ChangeKind::Removed => 2,
			ChangeKind::LayoutChanged => 3,
		}
	}
}

/// Flat reference to an element: id, name and type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ElementRef {
	pub id: String,
	pub name: Option<String>,
	#[serde(rename = "type")]
	pub kind: String,
}

impl From<&DiagramElement> for ElementRef {
	fn from(element: &DiagramElement) -> Self {
		Self {
			id: element.id.clone(),
			name: element.name.clone(),
			kind: element.kind.clone(),
		}
	}
}

/// Old and new value of one attribute. A missing side means the attribute
/// was absent in that version.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeChange {
	pub old_value: Option<AttrValue>,
	pub new_value: Option<AttrValue>,
}

/// An element present in both versions with at least one differing attribute.
///
/// `id`, `name` and `type` describe the after-side element.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChangedElement {
	pub id: String,
	pub name: Option<String>,
	#[serde(rename = "type")]
	pub kind: String,
	pub attrs: IndexMap<String, AttributeChange>,
}

impl ChangedElement {
	pub fn element(&self) -> ElementRef {
		ElementRef {
			id: self.id.clone(),
			name: self.name.clone(),
			kind: self.kind.clone(),
		}
	}
}

/// Normalized diff: four id-keyed maps with pairwise disjoint key sets.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffResult {
	pub added: IndexMap<String, ElementRef>,
	pub removed: IndexMap<String, ElementRef>,
	pub changed: IndexMap<String, ChangedElement>,
	pub layout_changed: IndexMap<String, ElementRef>,
}

impl DiffResult {
	/// True when the two versions are structurally and positionally identical.
	pub fn is_empty(&self) -> bool {
		self.added.is_empty()
			&& self.removed.is_empty()
			&& self.changed.is_empty()
			&& self.layout_changed.is_empty()
	}

	pub fn len(&self) -> usize {
		self.added.len() + self.removed.len() + self.changed.len() + self.layout_changed.len()
	}

	/// Ids in the given category, in insertion order.
	pub fn ids(&self, kind: ChangeKind) -> Vec<&str> {
		match kind {
			ChangeKind::Added => self.added.keys().map(String::as_str).collect(),
			ChangeKind::Removed => self.removed.keys().map(String::as_str).collect(),
			ChangeKind::Changed => self.changed.keys().map(String::as_str).collect(),
			ChangeKind::LayoutChanged => self.layout_changed.keys().map(String::as_str).collect(),
		}
	}

	pub fn kind_of(&self, id: &str) -> Option<ChangeKind> {
		ChangeKind::ALL.into_iter().find(|kind| self.contains(*kind, id))
	}

	pub fn contains(&self, kind: ChangeKind, id: &str) -> bool {
		match kind {
			ChangeKind::Added => self.added.contains_key(id),
			ChangeKind::Removed => self.removed.contains_key(id),
			ChangeKind::Changed => self.changed.contains_key(id),
			ChangeKind::LayoutChanged => self.layout_changed.contains_key(id),
		}
	}

	/// Checks that no id appears in more than one category.
	pub fn is_disjoint(&self) -> bool {
		ChangeKind::ALL.iter().enumerate().all(|(i, a)| {
			ChangeKind::ALL[i + 1..]
				.iter()
				.all(|b| self.ids(*a).iter().all(|id| !self.contains(*b, id)))
		})
	}
}

/// A differ's output in its notation's native shape.
#[derive(Clone, Debug, PartialEq)]
pub enum RawDiff {
	Bpmn(bpmn::BpmnDiff),
	Dmn(dmn::DmnDiff),
}

/// Attribute-level comparison shared by both differs.
///
/// Type and name are compared alongside the attribute bag, reported as
/// [`TYPE_ATTR`] and `name`.
pub(crate) fn compare_attrs(
	before: &DiagramElement,
	after: &DiagramElement,
	eq: impl Fn(&AttrValue, &AttrValue) -> bool,
) -> IndexMap<String, AttributeChange> {
	let mut changes = IndexMap::new();
	if before.kind != after.kind {
		changes.insert(
			TYPE_ATTR.to_string(),
			AttributeChange {
				old_value: Some(before.kind.as_str().into()),
				new_value: Some(after.kind.as_str().into()),
			},
		);
	}

	let name = |el: &DiagramElement| el.name.as_deref().map(AttrValue::from);
	let (old_name, new_name) = (name(before), name(after));
	let same_name = match (&old_name, &new_name) {
		(Some(a), Some(b)) => eq(a, b),
		(None, None) => true,
		_ => false,
	};
	if !same_name {
		changes.insert(
			"name".to_string(),
			AttributeChange {
				old_value: old_name,
				new_value: new_name,
			},
		);
	}

	for (key, old) in &before.attrs {
		match after.attrs.get(key) {
			Some(new) if eq(old, new) => {}
			new => {
				changes.insert(
					key.clone(),
					AttributeChange {
						old_value: Some(old.clone()),
						new_value: new.cloned(),
					},
				);
			}
		}
	}
	for (key, new) in &after.attrs {
		if !before.attrs.contains_key(key) {
			changes.insert(
				key.clone(),
				AttributeChange {
					old_value: None,
					new_value: Some(new.clone()),
				},
			);
		}
	}
	changes
}

#[cfg(test)]
mod tests {
	use super::*;

	fn element_ref(id: &str) -> ElementRef {
		ElementRef {
			id: id.into(),
			name: None,
			kind: "bpmn:Task".into(),
		}
	}

	#[test]
	fn test_compare_attrs_reports_name_type_and_bag() {
		let mut before = DiagramElement::new("Task_1", "bpmn:Task");
		before.name = Some("Check".into());
		before.attrs.insert("camunda:assignee".into(), "alice".into());
		before.attrs.insert("documentation".into(), "old".into());

		let mut after = DiagramElement::new("Task_1", "bpmn:UserTask");
		after.name = Some("Check order".into());
		after.attrs.insert("camunda:assignee".into(), "alice".into());
		after.attrs.insert("camunda:dueDate".into(), "P1D".into());

		let changes = compare_attrs(&before, &after, |a, b| a == b);
		let keys: Vec<&str> = changes.keys().map(String::as_str).collect();
		assert_eq!(keys, ["$type", "name", "documentation", "camunda:dueDate"]);
		assert_eq!(changes["documentation"].new_value, None);
		assert_eq!(changes["camunda:dueDate"].old_value, None);
	}

	#[test]
	fn test_kind_of_and_disjointness() {
		let mut diff = DiffResult::default();
		diff.added.insert("A".into(), element_ref("A"));
		diff.layout_changed.insert("L".into(), element_ref("L"));
		assert!(diff.is_disjoint());
		assert_eq!(diff.kind_of("L"), Some(ChangeKind::LayoutChanged));
		assert_eq!(diff.kind_of("missing"), None);

		diff.removed.insert("A".into(), element_ref("A"));
		assert!(!diff.is_disjoint());
	}

	#[test]
	fn test_serialized_shape_uses_camel_case_keys() {
		let mut diff = DiffResult::default();
		diff.layout_changed.insert("Flow_1".into(), element_ref("Flow_1"));
		let json = serde_json::to_value(&diff).unwrap();
		assert_eq!(json["layoutChanged"]["Flow_1"]["type"], "bpmn:Task");
	}
}
