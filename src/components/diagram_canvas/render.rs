//! Canvas rendering for diagrams.
//!
//! Rendering uses multiple passes for correct z-ordering:
//! 1. Background (screen space)
//! 2. Shapes, containers before their content (diagram space)
//! 3. Edges with arrowheads
//! 4. Marker outlines and badges, then flash rings, then labels

use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::scale::{ScaleConfig, ScaledValues};
use super::state::CanvasState;
use super::theme::DiagramTheme;
use crate::model::{Bounds, DiagramElement, Geometry, Point};

fn smooth_step(t: f64) -> f64 {
	t * t * (3.0 - 2.0 * t)
}

/// How an element's shape is outlined.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShapeKind {
	Event,
	Gateway,
	/// Tasks, sub-processes, decisions: rounded rectangle.
	Activity,
	/// Pools, lanes, groups: square corners, label along the left side.
	Container,
	/// Input data: fully rounded ends.
	Pill,
	Annotation,
	Plain,
}

/// Picks the outline for an element from the local part of its type.
pub fn shape_kind(element: &DiagramElement) -> ShapeKind {
	let local = element.local_kind();
	if local.ends_with("Event") {
		ShapeKind::Event
	} else if local.ends_with("Gateway") {
		ShapeKind::Gateway
	} else if local.ends_with("Task")
		|| local.ends_with("SubProcess")
		|| matches!(
			local,
			"CallActivity" | "Transaction" | "Decision" | "BusinessKnowledgeModel"
		) {
		ShapeKind::Activity
	} else if matches!(local, "Participant" | "Lane" | "Group") {
		ShapeKind::Container
	} else if local == "InputData" {
		ShapeKind::Pill
	} else if local == "TextAnnotation" {
		ShapeKind::Annotation
	} else {
		ShapeKind::Plain
	}
}

/// Whether an edge is drawn dashed rather than solid.
fn is_dashed(element: &DiagramElement) -> bool {
	let local = element.local_kind();
	matches!(
		local,
		"Association" | "DataInputAssociation" | "DataOutputAssociation" | "MessageFlow"
	) || (local.ends_with("Requirement") && local != "InformationRequirement")
}

/// Renders the complete diagram to the canvas.
pub fn render(
	state: &CanvasState,
	ctx: &CanvasRenderingContext2d,
	config: &ScaleConfig,
	theme: &DiagramTheme,
) {
	ctx.set_fill_style_str(&theme.background.to_css());
	ctx.fill_rect(0.0, 0.0, state.width, state.height);

	let Some(doc) = state.document() else {
		return;
	};
	let scale = ScaledValues::new(config, state.transform.zoom);

	ctx.save();
	let _ = ctx.translate(state.transform.x, state.transform.y);
	let _ = ctx.scale(state.transform.zoom, state.transform.zoom);

	// Pass 1: containers, so their content lands on top
	for element in doc.elements() {
		if let Some(Geometry::Shape(bounds)) = &element.geometry {
			if shape_kind(element) == ShapeKind::Container {
				draw_shape(ctx, element, *bounds, &scale, theme);
			}
		}
	}

	// Pass 2: every other shape
	for element in doc.elements() {
		if let Some(Geometry::Shape(bounds)) = &element.geometry {
			if shape_kind(element) != ShapeKind::Container {
				draw_shape(ctx, element, *bounds, &scale, theme);
			}
		}
	}

	// Pass 3: connections
	for element in doc.elements() {
		if let Some(Geometry::Edge(points)) = &element.geometry {
			draw_edge(ctx, element, points, &scale, theme);
		}
	}

	// Pass 4: markers
	for element in doc.elements() {
		let kinds = state.markers_of(&element.id);
		let (Some(strongest), Some(geometry)) = (kinds.first(), &element.geometry) else {
			continue;
		};
		let style = theme.marker(*strongest);
		match geometry {
			Geometry::Shape(bounds) => {
				outline(ctx, shape_kind(element), *bounds, theme.shape.corner_radius);
				ctx.set_fill_style_str(&style.fill.to_css());
				ctx.fill();
				ctx.set_stroke_style_str(&style.stroke.to_css());
				ctx.set_line_width(scale.marker_width);
				ctx.stroke();
			}
			Geometry::Edge(points) => {
				polyline(ctx, points);
				ctx.set_stroke_style_str(&style.stroke.to_css());
				ctx.set_line_width(scale.marker_width);
				ctx.stroke();
			}
		}
		if let Some(bounds) = geometry.bounds() {
			for (i, kind) in kinds.iter().enumerate() {
				draw_badge(ctx, bounds, i, kind.glyph(), theme.marker(*kind).badge.to_css(), &scale);
			}
		}
	}

	// Pass 5: flash rings
	for id in state.flash.ids() {
		let t = smooth_step(state.flash.intensity(id));
		let Some(bounds) = doc.bounds_of(id) else {
			continue;
		};
		let pad = scale.ring_offset;
		ctx.begin_path();
		ctx.rect(
			bounds.x - pad,
			bounds.y - pad,
			bounds.width + 2.0 * pad,
			bounds.height + 2.0 * pad,
		);
		ctx.set_stroke_style_str(&theme.flash.with_alpha(t).to_css());
		ctx.set_line_width(scale.marker_width * (1.0 + t));
		ctx.stroke();
	}

	// Pass 6: labels
	ctx.set_font(&scale.label_font);
	ctx.set_fill_style_str(&theme.shape.label.to_css());
	for element in doc.elements() {
		draw_label(ctx, element, &scale);
	}

	ctx.restore();
}

/// Traces the outline of a shape into the current path.
fn outline(ctx: &CanvasRenderingContext2d, kind: ShapeKind, b: Bounds, corner: f64) {
	ctx.begin_path();
	match kind {
		ShapeKind::Event => {
			let c = b.center();
			let _ = ctx.arc(c.x, c.y, b.width.min(b.height) / 2.0, 0.0, 2.0 * PI);
		}
		ShapeKind::Gateway => {
			let c = b.center();
			ctx.move_to(c.x, b.y);
			ctx.line_to(b.x + b.width, c.y);
			ctx.line_to(c.x, b.y + b.height);
			ctx.line_to(b.x, c.y);
			ctx.close_path();
		}
		ShapeKind::Activity => rounded_rect(ctx, b, corner.min(b.height / 2.0)),
		ShapeKind::Pill => rounded_rect(ctx, b, b.height / 2.0),
		ShapeKind::Container | ShapeKind::Annotation | ShapeKind::Plain => {
			ctx.rect(b.x, b.y, b.width, b.height);
		}
	}
}

fn rounded_rect(ctx: &CanvasRenderingContext2d, b: Bounds, r: f64) {
	let (right, bottom) = (b.x + b.width, b.y + b.height);
	ctx.move_to(b.x + r, b.y);
	let _ = ctx.arc_to(right, b.y, right, bottom, r);
	let _ = ctx.arc_to(right, bottom, b.x, bottom, r);
	let _ = ctx.arc_to(b.x, bottom, b.x, b.y, r);
	let _ = ctx.arc_to(b.x, b.y, right, b.y, r);
	ctx.close_path();
}

fn draw_shape(
	ctx: &CanvasRenderingContext2d,
	element: &DiagramElement,
	bounds: Bounds,
	scale: &ScaledValues,
	theme: &DiagramTheme,
) {
	let kind = shape_kind(element);
	ctx.set_stroke_style_str(&theme.shape.stroke.to_css());
	ctx.set_line_width(scale.stroke_width);

	if kind == ShapeKind::Annotation {
		// Open bracket on the left edge.
		let arm = bounds.width.min(15.0);
		ctx.begin_path();
		ctx.move_to(bounds.x + arm, bounds.y);
		ctx.line_to(bounds.x, bounds.y);
		ctx.line_to(bounds.x, bounds.y + bounds.height);
		ctx.line_to(bounds.x + arm, bounds.y + bounds.height);
		ctx.stroke();
		return;
	}

	outline(ctx, kind, bounds, theme.shape.corner_radius);
	if kind != ShapeKind::Container {
		ctx.set_fill_style_str(&theme.shape.fill.to_css());
		ctx.fill();
	}
	if element.local_kind() == "EndEvent" {
		ctx.set_line_width(scale.stroke_width * 2.5);
	}
	ctx.stroke();
}

fn polyline(ctx: &CanvasRenderingContext2d, points: &[Point]) {
	ctx.begin_path();
	if let Some((first, rest)) = points.split_first() {
		ctx.move_to(first.x, first.y);
		for p in rest {
			ctx.line_to(p.x, p.y);
		}
	}
}

fn draw_edge(
	ctx: &CanvasRenderingContext2d,
	element: &DiagramElement,
	points: &[Point],
	scale: &ScaledValues,
	theme: &DiagramTheme,
) {
	if points.len() < 2 {
		return;
	}
	let color = theme.edge.color.to_css();
	ctx.set_stroke_style_str(&color);
	ctx.set_line_width(scale.stroke_width);

	let dashed = is_dashed(element);
	if dashed {
		let (dash, gap) = theme.edge.dash;
		let pattern = js_sys::Array::of2(&JsValue::from(dash), &JsValue::from(gap));
		let _ = ctx.set_line_dash(&pattern);
	}
	polyline(ctx, points);
	ctx.stroke();
	if dashed {
		let _ = ctx.set_line_dash(&js_sys::Array::new());
	}

	// Associations carry no direction.
	if element.local_kind() == "Association" {
		return;
	}
	let (from, to) = (points[points.len() - 2], points[points.len() - 1]);
	draw_arrow(ctx, from, to, scale.arrow_size, &color);
}

fn draw_arrow(ctx: &CanvasRenderingContext2d, from: Point, to: Point, size: f64, color: &str) {
	let (dx, dy) = (to.x - from.x, to.y - from.y);
	let dist = (dx * dx + dy * dy).sqrt();
	if dist < 1e-6 {
		return;
	}
	let (ux, uy) = (dx / dist, dy / dist);
	let (px, py) = (-uy, ux);
	let half = size * 0.45;

	ctx.begin_path();
	ctx.move_to(to.x, to.y);
	ctx.line_to(to.x - ux * size + px * half, to.y - uy * size + py * half);
	ctx.line_to(to.x - ux * size - px * half, to.y - uy * size - py * half);
	ctx.close_path();
	ctx.set_fill_style_str(color);
	ctx.fill();
}

/// Badge `index` sits on the top-right corner, further badges step left.
fn draw_badge(
	ctx: &CanvasRenderingContext2d,
	bounds: Bounds,
	index: usize,
	glyph: &str,
	color: String,
	scale: &ScaledValues,
) {
	let r = scale.badge_radius;
	let x = bounds.x + bounds.width - index as f64 * r * 2.2;
	let y = bounds.y;

	ctx.begin_path();
	let _ = ctx.arc(x, y, r, 0.0, 2.0 * PI);
	ctx.set_fill_style_str(&color);
	ctx.fill();

	ctx.set_fill_style_str("#ffffff");
	ctx.set_font(&scale.badge_font);
	ctx.set_text_align("center");
	ctx.set_text_baseline("middle");
	let _ = ctx.fill_text(glyph, x, y);
	ctx.set_text_align("start");
	ctx.set_text_baseline("alphabetic");
}

fn draw_label(ctx: &CanvasRenderingContext2d, element: &DiagramElement, scale: &ScaledValues) {
	let Some(name) = element.name.as_deref().filter(|n| !n.is_empty()) else {
		return;
	};
	let Some(geometry) = &element.geometry else {
		return;
	};
	let line_height = scale.label_size * 1.2;
	match (shape_kind(element), geometry) {
		(ShapeKind::Container, Geometry::Shape(b)) => {
			// Rotated along the left band.
			ctx.save();
			let _ = ctx.translate(b.x + line_height, b.y + b.height / 2.0);
			let _ = ctx.rotate(-PI / 2.0);
			ctx.set_text_align("center");
			let _ = ctx.fill_text(name, 0.0, 0.0);
			ctx.restore();
		}
		(ShapeKind::Event | ShapeKind::Gateway, Geometry::Shape(b)) => {
			// External label below the shape.
			ctx.set_text_align("center");
			let lines = wrap(ctx, name, b.width.max(90.0));
			for (i, line) in lines.iter().enumerate() {
				let _ = ctx.fill_text(
					line,
					b.x + b.width / 2.0,
					b.y + b.height + line_height * (i as f64 + 1.0),
				);
			}
			ctx.set_text_align("start");
		}
		(ShapeKind::Annotation, Geometry::Shape(b)) => {
			let lines = wrap(ctx, name, (b.width - 8.0).max(10.0));
			for (i, line) in lines.iter().enumerate() {
				let _ = ctx.fill_text(line, b.x + 5.0, b.y + line_height * (i as f64 + 1.0));
			}
		}
		(_, Geometry::Shape(b)) => {
			ctx.set_text_align("center");
			ctx.set_text_baseline("middle");
			let lines = wrap(ctx, name, (b.width - 10.0).max(10.0));
			let top = b.y + b.height / 2.0 - line_height * (lines.len() as f64 - 1.0) / 2.0;
			for (i, line) in lines.iter().enumerate() {
				let _ = ctx.fill_text(line, b.x + b.width / 2.0, top + line_height * i as f64);
			}
			ctx.set_text_align("start");
			ctx.set_text_baseline("alphabetic");
		}
		(_, Geometry::Edge(points)) => {
			let Some(mid) = points.get(points.len() / 2) else {
				return;
			};
			let _ = ctx.fill_text(name, mid.x + 4.0, mid.y - 4.0);
		}
	}
}

/// Greedy word wrap to `max_width` diagram units.
fn wrap(ctx: &CanvasRenderingContext2d, text: &str, max_width: f64) -> Vec<String> {
	let width = |s: &str| ctx.measure_text(s).map(|m| m.width()).unwrap_or(0.0);
	let mut lines = Vec::new();
	let mut current = String::new();
	for word in text.split_whitespace() {
		let candidate = if current.is_empty() {
			word.to_string()
		} else {
			format!("{current} {word}")
		};
		if !current.is_empty() && width(&candidate) > max_width {
			lines.push(std::mem::replace(&mut current, word.to_string()));
		} else {
			current = candidate;
		}
	}
	if !current.is_empty() {
		lines.push(current);
	}
	lines
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_shape_kinds() {
		let kind = |t: &str| shape_kind(&DiagramElement::new("x", t));
		assert_eq!(kind("bpmn:StartEvent"), ShapeKind::Event);
		assert_eq!(kind("bpmn:BoundaryEvent"), ShapeKind::Event);
		assert_eq!(kind("bpmn:ExclusiveGateway"), ShapeKind::Gateway);
		assert_eq!(kind("bpmn:UserTask"), ShapeKind::Activity);
		assert_eq!(kind("bpmn:Participant"), ShapeKind::Container);
		assert_eq!(kind("dmn:Decision"), ShapeKind::Activity);
		assert_eq!(kind("dmn:InputData"), ShapeKind::Pill);
		assert_eq!(kind("bpmn:TextAnnotation"), ShapeKind::Annotation);
		assert_eq!(kind("bpmn:DataStoreReference"), ShapeKind::Plain);
	}

	#[test]
	fn test_dashed_edges() {
		let dashed = |t: &str| is_dashed(&DiagramElement::new("x", t));
		assert!(dashed("bpmn:MessageFlow"));
		assert!(dashed("dmn:AuthorityRequirement"));
		assert!(!dashed("dmn:InformationRequirement"));
		assert!(!dashed("bpmn:SequenceFlow"));
	}
}
