//! Visual theming for the diagram canvas.
//!
//! Two themes follow GitHub's light and dark color modes; both share the
//! same marker palette so a category reads the same on either.

use crate::diff::ChangeKind;

/// RGBA color representation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
	pub r: u8,
	pub g: u8,
	pub b: u8,
	pub a: f64,
}

impl Color {
	pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b, a: 1.0 }
	}

	pub const fn rgba(r: u8, g: u8, b: u8, a: f64) -> Self {
		Self { r, g, b, a }
	}

	pub fn with_alpha(self, a: f64) -> Self {
		Self { a, ..self }
	}

	/// Lighten the color by a factor (0.0 = unchanged, 1.0 = white)
	pub fn lighten(self, factor: f64) -> Self {
		let f = factor.clamp(0.0, 1.0);
		Self {
			r: (self.r as f64 + (255.0 - self.r as f64) * f) as u8,
			g: (self.g as f64 + (255.0 - self.g as f64) * f) as u8,
			b: (self.b as f64 + (255.0 - self.b as f64) * f) as u8,
			a: self.a,
		}
	}

	/// Linear interpolation between two colors
	pub fn lerp(self, other: Color, t: f64) -> Self {
		let t = t.clamp(0.0, 1.0);
		Self {
			r: (self.r as f64 * (1.0 - t) + other.r as f64 * t) as u8,
			g: (self.g as f64 * (1.0 - t) + other.g as f64 * t) as u8,
			b: (self.b as f64 * (1.0 - t) + other.b as f64 * t) as u8,
			a: self.a * (1.0 - t) + other.a * t,
		}
	}

	pub fn to_css(self) -> String {
		if (self.a - 1.0).abs() < 0.001 {
			format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
		} else {
			format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
		}
	}
}

/// Fill, outline and text colors for diagram shapes.
#[derive(Clone, Debug)]
pub struct ShapeStyle {
	pub fill: Color,
	pub stroke: Color,
	pub label: Color,
	/// Outline width in screen pixels.
	pub stroke_width: f64,
	/// Corner radius of activity-like shapes, in diagram units.
	pub corner_radius: f64,
}

/// Connection line style.
#[derive(Clone, Debug)]
pub struct EdgeStyle {
	pub color: Color,
	/// Dash pattern for associations and information requirements.
	pub dash: (f64, f64),
}

/// Highlight for one change category.
#[derive(Clone, Copy, Debug)]
pub struct MarkerStyle {
	pub stroke: Color,
	/// Tint laid over the shape's own fill.
	pub fill: Color,
	/// Badge background; the glyph is drawn in white.
	pub badge: Color,
}

/// Complete canvas theme.
#[derive(Clone, Debug)]
pub struct DiagramTheme {
	pub background: Color,
	pub shape: ShapeStyle,
	pub edge: EdgeStyle,
	pub flash: Color,
	pub added: MarkerStyle,
	pub removed: MarkerStyle,
	pub changed: MarkerStyle,
	pub layout_changed: MarkerStyle,
}

const ADDED: Color = Color::rgb(45, 164, 78);
const REMOVED: Color = Color::rgb(207, 34, 46);
const CHANGED: Color = Color::rgb(191, 135, 0);
const LAYOUT_CHANGED: Color = Color::rgb(9, 105, 218);

fn marker(base: Color) -> MarkerStyle {
	MarkerStyle {
		stroke: base,
		fill: base.with_alpha(0.18),
		badge: base,
	}
}

impl DiagramTheme {
	/// Matches GitHub's light mode.
	pub fn light() -> Self {
		Self {
			background: Color::rgb(255, 255, 255),
			shape: ShapeStyle {
				fill: Color::rgb(255, 255, 255),
				stroke: Color::rgb(31, 35, 40),
				label: Color::rgb(31, 35, 40),
				stroke_width: 1.5,
				corner_radius: 10.0,
			},
			edge: EdgeStyle {
				color: Color::rgb(31, 35, 40),
				dash: (4.0, 4.0),
			},
			flash: Color::rgb(130, 80, 223),
			added: marker(ADDED),
			removed: marker(REMOVED),
			changed: marker(CHANGED),
			layout_changed: marker(LAYOUT_CHANGED),
		}
	}

	/// Matches GitHub's dark mode.
	pub fn dark() -> Self {
		let light = Self::light();
		Self {
			background: Color::rgb(13, 17, 23),
			shape: ShapeStyle {
				fill: Color::rgb(22, 27, 34),
				stroke: Color::rgb(201, 209, 217),
				label: Color::rgb(230, 237, 243),
				..light.shape
			},
			edge: EdgeStyle {
				color: Color::rgb(201, 209, 217),
				..light.edge
			},
			flash: Color::rgb(163, 113, 247),
			added: marker(ADDED.lighten(0.2)),
			removed: marker(REMOVED.lighten(0.2)),
			changed: marker(CHANGED.lighten(0.2)),
			layout_changed: marker(LAYOUT_CHANGED.lighten(0.2)),
		}
	}

	pub fn for_color_mode(dark: bool) -> Self {
		if dark { Self::dark() } else { Self::light() }
	}

	pub fn marker(&self, kind: ChangeKind) -> &MarkerStyle {
		match kind {
			ChangeKind::Added => &self.added,
			ChangeKind::Removed => &self.removed,
			ChangeKind::Changed => &self.changed,
			ChangeKind::LayoutChanged => &self.layout_changed,
		}
	}
}

impl Default for DiagramTheme {
	fn default() -> Self {
		Self::light()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_to_css() {
		assert_eq!(Color::rgb(255, 0, 16).to_css(), "#ff0010");
		assert_eq!(Color::rgba(1, 2, 3, 0.5).to_css(), "rgba(1, 2, 3, 0.5)");
	}

	#[test]
	fn test_lerp_endpoints() {
		let a = Color::rgb(0, 0, 0);
		let b = Color::rgb(200, 100, 50);
		assert_eq!(a.lerp(b, 0.0), a);
		assert_eq!(a.lerp(b, 1.0), b);
		assert_eq!(a.lerp(b, 0.5), Color::rgb(100, 50, 25));
	}

	#[test]
	fn test_each_category_has_its_own_color() {
		let theme = DiagramTheme::dark();
		let strokes: Vec<Color> = ChangeKind::ALL
			.iter()
			.map(|k| theme.marker(*k).stroke)
			.collect();
		for (i, a) in strokes.iter().enumerate() {
			for b in &strokes[i + 1..] {
				assert_ne!(a, b);
			}
		}
	}
}
