//! Typed element graph for one version of a diagram file.
//!
//! A [`ParsedDocument`] is produced once per fetch and parse cycle and is never
//! mutated afterwards; viewers and differs only ever borrow it.

mod parse;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::notation::Notation;

pub use parse::parse_document;

/// A notation-specific attribute value: scalar text, a list, or a nested object.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
	Text(String),
	List(Vec<AttrValue>),
	Object(IndexMap<String, AttrValue>),
}

impl AttrValue {
	/// Human-readable form used by the change list.
	///
	/// Objects show their `text` member, falling back to `body`.
	pub fn display_text(&self) -> String {
		match self {
			AttrValue::Text(text) => text.clone(),
			AttrValue::List(items) => items
				.iter()
				.map(AttrValue::display_text)
				.collect::<Vec<_>>()
				.join(", "),
			AttrValue::Object(fields) => fields
				.get("text")
				.or_else(|| fields.get("body"))
				.map(AttrValue::display_text)
				.unwrap_or_default(),
		}
	}

	/// Structural equality that ignores whitespace differences in text.
	pub fn eq_normalized(&self, other: &AttrValue) -> bool {
		match (self, other) {
			(AttrValue::Text(a), AttrValue::Text(b)) => {
				a.split_whitespace().eq(b.split_whitespace())
			}
			(AttrValue::List(a), AttrValue::List(b)) => {
				a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.eq_normalized(y))
			}
			(AttrValue::Object(a), AttrValue::Object(b)) => {
				a.len() == b.len()
					&& a.iter().all(|(key, value)| {
						b.get(key).is_some_and(|other| value.eq_normalized(other))
					})
			}
			_ => false,
		}
	}
}

impl From<&str> for AttrValue {
	fn from(value: &str) -> Self {
		AttrValue::Text(value.to_string())
	}
}

/// A point in diagram coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
	pub x: f64,
	pub y: f64,
}

/// Axis-aligned rectangle in diagram coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
	pub x: f64,
	pub y: f64,
	pub width: f64,
	pub height: f64,
}

impl Bounds {
	pub fn center(&self) -> Point {
		Point {
			x: self.x + self.width / 2.0,
			y: self.y + self.height / 2.0,
		}
	}

	pub fn contains(&self, p: Point) -> bool {
		p.x >= self.x && p.x <= self.x + self.width && p.y >= self.y && p.y <= self.y + self.height
	}

	/// Smallest rectangle covering both.
	pub fn union(&self, other: &Bounds) -> Bounds {
		let x = self.x.min(other.x);
		let y = self.y.min(other.y);
		let right = (self.x + self.width).max(other.x + other.width);
		let bottom = (self.y + self.height).max(other.y + other.height);
		Bounds {
			x,
			y,
			width: right - x,
			height: bottom - y,
		}
	}

	fn from_points(points: &[Point]) -> Option<Bounds> {
		let first = points.first()?;
		let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
		for p in &points[1..] {
			min_x = min_x.min(p.x);
			min_y = min_y.min(p.y);
			max_x = max_x.max(p.x);
			max_y = max_y.max(p.y);
		}
		Some(Bounds {
			x: min_x,
			y: min_y,
			width: max_x - min_x,
			height: max_y - min_y,
		})
	}
}

/// Geometric placement taken from the diagram interchange section.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Geometry {
	Shape(Bounds),
	Edge(Vec<Point>),
}

impl Geometry {
	pub fn bounds(&self) -> Option<Bounds> {
		match self {
			Geometry::Shape(bounds) => Some(*bounds),
			Geometry::Edge(points) => Bounds::from_points(points),
		}
	}

	/// Equality within `tolerance` diagram units per coordinate.
	pub fn approx_eq(&self, other: &Geometry, tolerance: f64) -> bool {
		let close = |a: f64, b: f64| (a - b).abs() <= tolerance;
		match (self, other) {
			(Geometry::Shape(a), Geometry::Shape(b)) => {
				close(a.x, b.x) && close(a.y, b.y) && close(a.width, b.width) && close(a.height, b.height)
			}
			(Geometry::Edge(a), Geometry::Edge(b)) => {
				a.len() == b.len() && a.iter().zip(b).all(|(p, q)| close(p.x, q.x) && close(p.y, q.y))
			}
			_ => false,
		}
	}
}

/// One node or edge in a process or decision model.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DiagramElement {
	/// Unique within its document.
	pub id: String,
	pub name: Option<String>,
	/// Schema-qualified type, e.g. `bpmn:Task` or `dmn:Decision`.
	#[serde(rename = "type")]
	pub kind: String,
	/// Id of the nearest enclosing element that has an id.
	pub parent: Option<String>,
	pub attrs: IndexMap<String, AttrValue>,
	pub geometry: Option<Geometry>,
}

impl DiagramElement {
	pub fn new(id: impl Into<String>, kind: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			name: None,
			kind: kind.into(),
			parent: None,
			attrs: IndexMap::new(),
			geometry: None,
		}
	}

	/// Local part of the type, e.g. `Task` for `bpmn:Task`.
	pub fn local_kind(&self) -> &str {
		self.kind.rsplit(':').next().unwrap_or(&self.kind)
	}

	/// Label shown to users: the name when present, otherwise the id.
	pub fn label(&self) -> &str {
		self.name.as_deref().unwrap_or(&self.id)
	}
}

/// The full element graph of one version of one file.
#[derive(Clone, Debug, PartialEq)]
pub struct ParsedDocument {
	pub notation: Notation,
	root_id: String,
	elements: IndexMap<String, DiagramElement>,
}

impl ParsedDocument {
	/// Builds a document; `root_id` must name one of `elements`.
	pub(crate) fn new(
		notation: Notation,
		root_id: String,
		elements: IndexMap<String, DiagramElement>,
	) -> Self {
		Self {
			notation,
			root_id,
			elements,
		}
	}

	/// The `definitions` element.
	pub fn root(&self) -> &DiagramElement {
		&self.elements[&self.root_id]
	}

	pub fn get(&self, id: &str) -> Option<&DiagramElement> {
		self.elements.get(id)
	}

	pub fn contains(&self, id: &str) -> bool {
		self.elements.contains_key(id)
	}

	/// Elements in document order.
	pub fn elements(&self) -> impl Iterator<Item = &DiagramElement> {
		self.elements.values()
	}

	pub fn len(&self) -> usize {
		self.elements.len()
	}

	pub fn is_empty(&self) -> bool {
		self.elements.is_empty()
	}

	pub fn bounds_of(&self, id: &str) -> Option<Bounds> {
		self.get(id)?.geometry.as_ref()?.bounds()
	}

	/// The element itself if it is placed, else its nearest placed ancestor.
	///
	/// DMN rules, entries and expressions have no diagram interchange of
	/// their own; they are shown on the decision that owns them.
	pub fn anchor(&self, id: &str) -> Option<&DiagramElement> {
		let mut element = self.get(id)?;
		while element.geometry.is_none() {
			element = self.get(element.parent.as_deref()?)?;
		}
		Some(element)
	}

	/// Bounds of [`ParsedDocument::anchor`].
	pub fn placed_bounds(&self, id: &str) -> Option<Bounds> {
		self.anchor(id)?.geometry.as_ref()?.bounds()
	}

	/// Bounding box of every placed element, used for fit-to-viewport.
	pub fn extent(&self) -> Option<Bounds> {
		self.elements
			.values()
			.filter_map(|el| el.geometry.as_ref()?.bounds())
			.reduce(|acc, b| acc.union(&b))
	}
}
