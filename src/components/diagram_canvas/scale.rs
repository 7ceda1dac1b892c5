//! Zoom-dependent sizing of canvas decorations.
//!
//! Shapes and edges live in diagram units and scale with the canvas
//! transform. Outlines, labels and marker badges should stay readable at
//! any zoom, so their sizes are expressed in screen pixels and converted
//! back to diagram units once per frame.

/// Defines how a visual property scales with zoom level.
#[derive(Clone, Debug)]
pub enum ScaleBehavior {
	/// Constant diagram-space size. Appears larger when zoomed in.
	World,
	/// Constant screen-space size (pixels). Unaffected by zoom.
	Screen,
	/// Diagram-space scaling, clamped to min/max screen-space bounds.
	Clamped { min_screen: f64, max_screen: f64 },
}

impl ScaleBehavior {
	/// Diagram-space value for `base` at zoom `k`.
	pub fn apply(&self, base: f64, k: f64) -> f64 {
		match self {
			ScaleBehavior::World => base,
			ScaleBehavior::Screen => base / k,
			ScaleBehavior::Clamped {
				min_screen,
				max_screen,
			} => base.clamp(min_screen / k, max_screen / k),
		}
	}
}

/// Base sizes and their scaling behaviors.
#[derive(Clone, Debug)]
pub struct ScaleConfig {
	/// Shape outline width in screen pixels.
	pub stroke_width: f64,
	/// Marker outline width in screen pixels.
	pub marker_width: f64,
	/// Label font size in diagram units.
	pub label_size: f64,
	pub label_behavior: ScaleBehavior,
	/// Arrowhead length in diagram units.
	pub arrow_size: f64,
	pub arrow_behavior: ScaleBehavior,
	/// Badge radius in screen pixels.
	pub badge_radius: f64,
	/// Gap between a shape and its flash ring, in screen pixels.
	pub ring_offset: f64,
	/// Hit tolerance around edges, in screen pixels.
	pub hit_slop: f64,
}

impl Default for ScaleConfig {
	fn default() -> Self {
		Self {
			stroke_width: 1.5,
			marker_width: 3.0,
			label_size: 12.0,
			label_behavior: ScaleBehavior::Clamped {
				min_screen: 7.0,
				max_screen: 28.0,
			},
			arrow_size: 10.0,
			arrow_behavior: ScaleBehavior::World,
			badge_radius: 8.0,
			ring_offset: 4.0,
			hit_slop: 4.0,
		}
	}
}

/// Pre-computed scale values for a specific zoom level.
///
/// Create this once per frame and pass it to rendering functions.
/// All sizes are in diagram space (ready to use after the canvas transform).
#[derive(Clone, Debug)]
pub struct ScaledValues {
	pub k: f64,
	pub stroke_width: f64,
	pub marker_width: f64,
	pub label_size: f64,
	/// Label font string (e.g., "12px sans-serif").
	pub label_font: String,
	pub badge_font: String,
	pub arrow_size: f64,
	pub badge_radius: f64,
	pub ring_offset: f64,
	pub hit_slop: f64,
}

impl ScaledValues {
	pub fn new(config: &ScaleConfig, k: f64) -> Self {
		let label_size = config.label_behavior.apply(config.label_size, k);
		let badge_radius = ScaleBehavior::Screen.apply(config.badge_radius, k);
		Self {
			k,
			stroke_width: ScaleBehavior::Screen.apply(config.stroke_width, k),
			marker_width: ScaleBehavior::Screen.apply(config.marker_width, k),
			label_size,
			label_font: format!("{label_size}px sans-serif"),
			badge_font: format!("bold {}px sans-serif", badge_radius * 1.4),
			arrow_size: config.arrow_behavior.apply(config.arrow_size, k),
			badge_radius,
			ring_offset: ScaleBehavior::Screen.apply(config.ring_offset, k),
			hit_slop: ScaleBehavior::Screen.apply(config.hit_slop, k),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_behaviors() {
		assert_eq!(ScaleBehavior::World.apply(10.0, 2.0), 10.0);
		assert_eq!(ScaleBehavior::Screen.apply(10.0, 2.0), 5.0);

		let clamped = ScaleBehavior::Clamped {
			min_screen: 7.0,
			max_screen: 28.0,
		};
		// 12 units at k=0.25 would be 3px on screen; held at 7px.
		assert_eq!(clamped.apply(12.0, 0.25), 28.0);
		assert_eq!(clamped.apply(12.0, 1.0), 12.0);
		// 12 units at k=4 would be 48px; held at 28px.
		assert_eq!(clamped.apply(12.0, 4.0), 7.0);
	}

	#[test]
	fn test_screen_sizes_are_constant_on_screen() {
		let config = ScaleConfig::default();
		for k in [0.2, 1.0, 5.0] {
			let scaled = ScaledValues::new(&config, k);
			assert!((scaled.stroke_width * k - config.stroke_width).abs() < 1e-9);
			assert!((scaled.badge_radius * k - config.badge_radius).abs() < 1e-9);
		}
	}
}
