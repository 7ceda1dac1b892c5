//! Width share of the before pane, adjusted by dragging the divider.

const MIN_RATIO: f64 = 0.15;
const MAX_RATIO: f64 = 0.85;
const EVEN: f64 = 0.5;

/// Tracks an in-progress divider drag.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct SplitDrag {
	active: bool,
	start_x: f64,
	start_ratio: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Split {
	ratio: f64,
	drag: SplitDrag,
}

impl Default for Split {
	fn default() -> Self {
		Self {
			ratio: EVEN,
			drag: SplitDrag::default(),
		}
	}
}

impl Split {
	/// Share of the width given to the before pane, in `0.15..=0.85`.
	pub fn ratio(&self) -> f64 {
		self.ratio
	}

	pub fn is_dragging(&self) -> bool {
		self.drag.active
	}

	pub fn start_drag(&mut self, x: f64) {
		self.drag = SplitDrag {
			active: true,
			start_x: x,
			start_ratio: self.ratio,
		};
	}

	/// Follows the pointer at `x` across panes `width` pixels wide.
	pub fn drag_to(&mut self, x: f64, width: f64) {
		if !self.drag.active || width <= 0.0 {
			return;
		}
		let moved = (x - self.drag.start_x) / width;
		self.ratio = (self.drag.start_ratio + moved).clamp(MIN_RATIO, MAX_RATIO);
	}

	pub fn end_drag(&mut self) {
		self.drag.active = false;
	}

	/// Back to equal halves.
	pub fn reset(&mut self) {
		self.ratio = EVEN;
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_drag_moves_ratio_by_pointer_share() {
		let mut split = Split::default();
		split.start_drag(400.0);
		split.drag_to(480.0, 800.0);
		assert!((split.ratio() - 0.6).abs() < 1e-9);

		split.drag_to(360.0, 800.0);
		assert!((split.ratio() - 0.45).abs() < 1e-9);
	}

	#[test]
	fn test_drag_is_clamped() {
		let mut split = Split::default();
		split.start_drag(400.0);
		split.drag_to(-1000.0, 800.0);
		assert_eq!(split.ratio(), MIN_RATIO);
		split.drag_to(5000.0, 800.0);
		assert_eq!(split.ratio(), MAX_RATIO);
	}

	#[test]
	fn test_moves_without_drag_are_ignored() {
		let mut split = Split::default();
		split.drag_to(700.0, 800.0);
		assert_eq!(split.ratio(), EVEN);

		split.start_drag(400.0);
		split.drag_to(480.0, 800.0);
		split.end_drag();
		split.drag_to(100.0, 800.0);
		assert!(!split.is_dragging());
		assert!((split.ratio() - 0.6).abs() < 1e-9);

		split.reset();
		assert_eq!(split.ratio(), EVEN);
	}

	#[test]
	fn test_new_drag_starts_from_current_ratio() {
		let mut split = Split::default();
		split.start_drag(400.0);
		split.drag_to(560.0, 800.0);
		split.end_drag();

		split.start_drag(100.0);
		split.drag_to(20.0, 800.0);
		assert!((split.ratio() - 0.6).abs() < 1e-9);
	}
}
