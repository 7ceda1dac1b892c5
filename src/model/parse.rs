//! XML to [`ParsedDocument`] conversion for both notations.
//!
//! The model section becomes one [`DiagramElement`] per identified element;
//! id-less children are folded into the owning element's attributes. The
//! diagram interchange section only contributes geometry.

use indexmap::IndexMap;
use indexmap::map::Entry;
use log::{debug, warn};
use roxmltree::{Document, Node};

use super::{AttrValue, Bounds, DiagramElement, Geometry, ParsedDocument, Point};
use crate::error::{Error, Result};
use crate::notation::Notation;

const BPMN_MODEL_NS: &str = "http://www.omg.org/spec/BPMN/20100524/MODEL";

/// Element references that only mirror flow `sourceRef`/`targetRef`.
const SKIPPED_CHILDREN: &[&str] = &["incoming", "outgoing"];

/// Tag and attribute names that differ between the two interchange schemas.
struct Schema {
	prefix: &'static str,
	diagram_tag: &'static str,
	shape_tag: &'static str,
	edge_tag: &'static str,
	ref_attr: &'static str,
}

fn schema(notation: Notation) -> Schema {
	match notation {
		Notation::Bpmn => Schema {
			prefix: "bpmn",
			diagram_tag: "BPMNDiagram",
			shape_tag: "BPMNShape",
			edge_tag: "BPMNEdge",
			ref_attr: "bpmnElement",
		},
		Notation::Dmn => Schema {
			prefix: "dmn",
			diagram_tag: "DMNDI",
			shape_tag: "DMNShape",
			edge_tag: "DMNEdge",
			ref_attr: "dmnElementRef",
		},
	}
}

fn is_model_namespace(notation: Notation, ns: Option<&str>) -> bool {
	let Some(ns) = ns else {
		return false;
	};
	match notation {
		Notation::Bpmn => ns == BPMN_MODEL_NS,
		// 1.1 uses `.../20151101/dmn.xsd`, 1.2 onwards `.../<date>/MODEL/`.
		Notation::Dmn => {
			ns.contains("omg.org/spec/DMN/")
				&& (ns.trim_end_matches('/').ends_with("MODEL") || ns.ends_with("dmn.xsd"))
		}
	}
}

/// Parses `xml` as a document of the given notation.
pub fn parse_document(notation: Notation, xml: &str) -> Result<ParsedDocument> {
	let doc = Document::parse(xml).map_err(|e| Error::Parse {
		notation,
		message: e.to_string(),
	})?;
	let root = doc.root_element();
	if root.tag_name().name() != "definitions"
		|| !is_model_namespace(notation, root.tag_name().namespace())
	{
		return Err(Error::Parse {
			notation,
			message: format!(
				"expected {notation} definitions, found <{}>",
				root.tag_name().name()
			),
		});
	}

	let mut builder = Builder {
		notation,
		schema: schema(notation),
		elements: IndexMap::new(),
	};
	let root_id = root.attribute("id").unwrap_or("definitions").to_string();
	builder.register(root, &root_id, None);
	builder.walk(root, &root_id);
	builder.read_geometry(&doc);

	debug!(
		"parsed {notation} document {root_id} with {} elements",
		builder.elements.len()
	);
	Ok(ParsedDocument::new(notation, root_id, builder.elements))
}

struct Builder {
	notation: Notation,
	schema: Schema,
	elements: IndexMap<String, DiagramElement>,
}

impl Builder {
	fn is_model(&self, node: Node) -> bool {
		is_model_namespace(self.notation, node.tag_name().namespace())
	}

	fn is_identified(&self, node: Node) -> bool {
		self.is_model(node) && node.attribute("id").is_some()
	}

	/// Adds `node` as an element. False when its id is already taken.
	fn register(&mut self, node: Node, id: &str, parent: Option<&str>) -> bool {
		let local = node.tag_name().name();
		let mut kind = String::with_capacity(self.schema.prefix.len() + local.len() + 1);
		kind.push_str(self.schema.prefix);
		kind.push(':');
		let mut chars = local.chars();
		if let Some(first) = chars.next() {
			kind.extend(first.to_uppercase());
			kind.push_str(chars.as_str());
		}

		let mut element = DiagramElement::new(id, kind);
		element.name = node.attribute("name").map(str::to_string);
		element.parent = parent.map(str::to_string);
		for attr in node.attributes() {
			if attr.namespace().is_none() && matches!(attr.name(), "id" | "name") {
				continue;
			}
			element
				.attrs
				.insert(self.key(node, attr.namespace(), attr.name()), attr.value().into());
		}

		match self.elements.entry(id.to_string()) {
			Entry::Occupied(_) => {
				warn!("duplicate id {id} in {} document, keeping the first", self.notation);
				false
			}
			Entry::Vacant(slot) => {
				slot.insert(element);
				true
			}
		}
	}

	/// Registers `node`, then walks it as the owner of its children. A
	/// rejected duplicate folds nothing; its identified descendants go to `owner`.
	fn enter(&mut self, node: Node, owner: &str) {
		let id = node.attribute("id").unwrap_or_default().to_string();
		if self.register(node, &id, Some(owner)) {
			self.walk(node, &id);
		} else {
			self.discover(node, owner);
		}
	}

	/// Registers identified descendants of `node` and folds the rest into `owner`.
	fn walk(&mut self, node: Node, owner: &str) {
		for child in node.children().filter(Node::is_element) {
			let local = child.tag_name().name();
			if local == self.schema.diagram_tag {
				continue;
			}
			if self.is_identified(child) {
				self.enter(child, owner);
				continue;
			}
			if self.is_model(child) && SKIPPED_CHILDREN.contains(&local) {
				continue;
			}
			let key = self.key(child, child.tag_name().namespace(), local);
			let value = self.fold(child);
			if let Some(element) = self.elements.get_mut(owner) {
				push_attr(&mut element.attrs, key, value);
			}
			self.discover(child, owner);
		}
	}

	/// Finds identified elements nested inside a folded subtree.
	fn discover(&mut self, node: Node, owner: &str) {
		for child in node.children().filter(Node::is_element) {
			if self.is_identified(child) {
				self.enter(child, owner);
			} else {
				self.discover(child, owner);
			}
		}
	}

	/// Attribute key: local name for the model namespace, `prefix:local` otherwise.
	fn key(&self, node: Node, ns: Option<&str>, local: &str) -> String {
		match ns {
			Some(uri) if !is_model_namespace(self.notation, Some(uri)) => match node.lookup_prefix(uri) {
				Some(prefix) => format!("{prefix}:{local}"),
				None => local.to_string(),
			},
			_ => local.to_string(),
		}
	}

	fn fold(&self, node: Node) -> AttrValue {
		let text: String = node
			.children()
			.filter(Node::is_text)
			.filter_map(|t| t.text())
			.collect::<String>()
			.trim()
			.to_string();
		let children: Vec<Node> = node
			.children()
			.filter(|c| c.is_element() && !self.is_identified(*c))
			.collect();

		if node.attributes().next().is_none() && children.is_empty() {
			return AttrValue::Text(text);
		}

		let mut fields = IndexMap::new();
		for attr in node.attributes() {
			fields.insert(self.key(node, attr.namespace(), attr.name()), attr.value().into());
		}
		for child in children {
			let key = self.key(child, child.tag_name().namespace(), child.tag_name().name());
			push_attr(&mut fields, key, self.fold(child));
		}
		if !text.is_empty() {
			fields.insert("text".to_string(), AttrValue::Text(text));
		}
		AttrValue::Object(fields)
	}

	fn read_geometry(&mut self, doc: &Document) {
		for node in doc.descendants().filter(Node::is_element) {
			let local = node.tag_name().name();
			let geometry = if local == self.schema.shape_tag {
				node.children()
					.find(|c| c.tag_name().name() == "Bounds")
					.and_then(read_bounds)
					.map(Geometry::Shape)
			} else if local == self.schema.edge_tag {
				let points: Vec<Point> = node
					.children()
					.filter(|c| c.tag_name().name() == "waypoint")
					.filter_map(|w| Some(Point { x: number(w, "x")?, y: number(w, "y")? }))
					.collect();
				Some(Geometry::Edge(points))
			} else {
				continue;
			};

			let Some(reference) = node.attribute(self.schema.ref_attr) else {
				continue;
			};
			// DMN references may be `#id` or `prefix:id` for imported models.
			let reference = reference.trim_start_matches('#');
			let reference = reference.rsplit(':').next().unwrap_or(reference);
			if let Some(element) = self.elements.get_mut(reference) {
				if element.geometry.is_none() {
					element.geometry = geometry;
				}
			}
		}
	}
}

fn push_attr(map: &mut IndexMap<String, AttrValue>, key: String, value: AttrValue) {
	match map.entry(key) {
		Entry::Vacant(slot) => {
			slot.insert(value);
		}
		Entry::Occupied(mut slot) => match slot.get_mut() {
			AttrValue::List(items) => items.push(value),
			existing => {
				let first = std::mem::replace(existing, AttrValue::List(Vec::new()));
				*existing = AttrValue::List(vec![first, value]);
			}
		},
	}
}

fn number(node: Node, attr: &str) -> Option<f64> {
	node.attribute(attr)?.trim().parse().ok()
}

fn read_bounds(node: Node) -> Option<Bounds> {
	Some(Bounds {
		x: number(node, "x")?,
		y: number(node, "y")?,
		width: number(node, "width")?,
		height: number(node, "height")?,
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	const BPMN: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<bpmn:definitions xmlns:bpmn="http://www.omg.org/spec/BPMN/20100524/MODEL"
    xmlns:bpmndi="http://www.omg.org/spec/BPMN/20100524/DI"
    xmlns:dc="http://www.omg.org/spec/DD/20100524/DC"
    xmlns:di="http://www.omg.org/spec/DD/20100524/DI"
    xmlns:camunda="http://camunda.org/schema/1.0/bpmn"
    id="Definitions_1">
  <bpmn:process id="Process_1" isExecutable="true">
    <bpmn:startEvent id="Start_1" name="Order received">
      <bpmn:outgoing>Flow_1</bpmn:outgoing>
    </bpmn:startEvent>
    <bpmn:task id="Task_1" name="Check order" camunda:asyncBefore="true">
      <bpmn:documentation>Verify stock</bpmn:documentation>
      <bpmn:incoming>Flow_1</bpmn:incoming>
    </bpmn:task>
    <bpmn:sequenceFlow id="Flow_1" sourceRef="Start_1" targetRef="Task_1" />
  </bpmn:process>
  <bpmndi:BPMNDiagram id="Diagram_1">
    <bpmndi:BPMNPlane id="Plane_1" bpmnElement="Process_1">
      <bpmndi:BPMNShape id="Start_1_di" bpmnElement="Start_1">
        <dc:Bounds x="100" y="100" width="36" height="36" />
      </bpmndi:BPMNShape>
      <bpmndi:BPMNShape id="Task_1_di" bpmnElement="Task_1">
        <dc:Bounds x="200" y="78" width="100" height="80" />
      </bpmndi:BPMNShape>
      <bpmndi:BPMNEdge id="Flow_1_di" bpmnElement="Flow_1">
        <di:waypoint x="136" y="118" />
        <di:waypoint x="200" y="118" />
      </bpmndi:BPMNEdge>
    </bpmndi:BPMNPlane>
  </bpmndi:BPMNDiagram>
</bpmn:definitions>"#;

	#[test]
	fn test_parse_bpmn_elements_and_types() {
		let doc = parse_document(Notation::Bpmn, BPMN).unwrap();
		assert_eq!(doc.root().id, "Definitions_1");
		assert_eq!(doc.root().kind, "bpmn:Definitions");

		let task = doc.get("Task_1").unwrap();
		assert_eq!(task.kind, "bpmn:Task");
		assert_eq!(task.name.as_deref(), Some("Check order"));
		assert_eq!(task.parent.as_deref(), Some("Process_1"));
		assert_eq!(task.attrs.get("documentation"), Some(&AttrValue::from("Verify stock")));
		assert_eq!(task.attrs.get("camunda:asyncBefore"), Some(&AttrValue::from("true")));
		assert!(!task.attrs.contains_key("incoming"));
		assert!(!task.attrs.contains_key("name"));

		// Interchange elements are not model elements.
		assert!(!doc.contains("Diagram_1"));
		assert!(!doc.contains("Start_1_di"));
	}

	#[test]
	fn test_parse_bpmn_geometry() {
		let doc = parse_document(Notation::Bpmn, BPMN).unwrap();
		assert_eq!(
			doc.get("Task_1").unwrap().geometry,
			Some(Geometry::Shape(Bounds { x: 200.0, y: 78.0, width: 100.0, height: 80.0 }))
		);
		assert_eq!(
			doc.get("Flow_1").unwrap().geometry,
			Some(Geometry::Edge(vec![Point { x: 136.0, y: 118.0 }, Point { x: 200.0, y: 118.0 }]))
		);
		let extent = doc.extent().unwrap();
		assert_eq!(extent.x, 100.0);
		assert_eq!(extent.x + extent.width, 300.0);
	}

	#[test]
	fn test_parse_dmn_with_decision_table() {
		let xml = r#"<definitions xmlns="https://www.omg.org/spec/DMN/20191111/MODEL/"
    xmlns:dmndi="https://www.omg.org/spec/DMN/20191111/DMNDI/"
    xmlns:dc="http://www.omg.org/spec/DMN/20180521/DC/"
    id="dish" name="Dish">
  <decision id="Decision_1" name="Dish">
    <decisionTable id="Table_1" hitPolicy="UNIQUE">
      <input id="Input_1" label="Season">
        <inputExpression id="InputExpression_1" typeRef="string">
          <text>season</text>
        </inputExpression>
      </input>
      <output id="Output_1" name="dish" typeRef="string" />
      <rule id="Rule_1">
        <inputEntry id="Entry_1"><text>"Fall"</text></inputEntry>
        <outputEntry id="Entry_2"><text>"Spareribs"</text></outputEntry>
      </rule>
    </decisionTable>
  </decision>
  <dmndi:DMNDI>
    <dmndi:DMNDiagram id="DMNDiagram_1">
      <dmndi:DMNShape id="DMNShape_1" dmnElementRef="Decision_1">
        <dc:Bounds height="80" width="180" x="150" y="80" />
      </dmndi:DMNShape>
    </dmndi:DMNDiagram>
  </dmndi:DMNDI>
</definitions>"#;
		let doc = parse_document(Notation::Dmn, xml).unwrap();
		assert_eq!(doc.get("Decision_1").unwrap().kind, "dmn:Decision");
		assert_eq!(doc.get("Table_1").unwrap().kind, "dmn:DecisionTable");
		assert_eq!(doc.get("Table_1").unwrap().parent.as_deref(), Some("Decision_1"));
		assert_eq!(
			doc.get("Entry_1").unwrap().attrs.get("text"),
			Some(&AttrValue::from("\"Fall\""))
		);
		assert_eq!(doc.bounds_of("Decision_1").unwrap().width, 180.0);
		assert!(!doc.contains("DMNDiagram_1"));
	}

	#[test]
	fn test_malformed_markup_is_parse_error() {
		let err = parse_document(Notation::Bpmn, "<bpmn:definitions").unwrap_err();
		assert!(matches!(err, Error::Parse { notation: Notation::Bpmn, .. }));
	}

	#[test]
	fn test_wrong_notation_is_parse_error() {
		let err = parse_document(Notation::Dmn, BPMN).unwrap_err();
		assert!(matches!(err, Error::Parse { notation: Notation::Dmn, .. }));
	}

	#[test]
	fn test_duplicate_id_keeps_first_without_its_children() {
		let xml = r#"<bpmn:definitions xmlns:bpmn="http://www.omg.org/spec/BPMN/20100524/MODEL" id="D">
  <bpmn:process id="P">
    <bpmn:task id="Task_1" name="First">
      <bpmn:documentation>kept</bpmn:documentation>
    </bpmn:task>
    <bpmn:subProcess id="Task_1" name="Second">
      <bpmn:documentation>dropped</bpmn:documentation>
      <bpmn:task id="Inner" />
    </bpmn:subProcess>
  </bpmn:process>
</bpmn:definitions>"#;
		let doc = parse_document(Notation::Bpmn, xml).unwrap();
		let task = doc.get("Task_1").unwrap();
		assert_eq!(task.name.as_deref(), Some("First"));
		assert_eq!(task.kind, "bpmn:Task");
		assert_eq!(task.attrs.get("documentation"), Some(&AttrValue::from("kept")));
		assert_eq!(doc.get("Inner").unwrap().parent.as_deref(), Some("P"));
	}

	#[test]
	fn test_repeated_children_become_list() {
		let xml = r#"<bpmn:definitions xmlns:bpmn="http://www.omg.org/spec/BPMN/20100524/MODEL" id="D">
  <bpmn:process id="P">
    <bpmn:extensionElements>
      <bpmn:documentation>one</bpmn:documentation>
      <bpmn:documentation>two</bpmn:documentation>
    </bpmn:extensionElements>
  </bpmn:process>
</bpmn:definitions>"#;
		let doc = parse_document(Notation::Bpmn, xml).unwrap();
		let Some(AttrValue::Object(ext)) = doc.get("P").unwrap().attrs.get("extensionElements") else {
			panic!("extension elements should fold into an object");
		};
		assert_eq!(
			ext.get("documentation"),
			Some(&AttrValue::List(vec![AttrValue::from("one"), AttrValue::from("two")]))
		);
	}
}
