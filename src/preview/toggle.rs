//! Source/rich display toggle for one file.

/// Which rendering of a file is on screen: the diagram preview or the
/// host page's own text diff. Exactly one is visible at any time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DisplayMode {
	#[default]
	Rich,
	Source,
}

impl DisplayMode {
	pub fn rich_visible(self) -> bool {
		self == DisplayMode::Rich
	}

	pub fn source_visible(self) -> bool {
		self == DisplayMode::Source
	}

	pub fn toggled(self) -> Self {
		match self {
			DisplayMode::Rich => DisplayMode::Source,
			DisplayMode::Source => DisplayMode::Rich,
		}
	}

	/// CSS `display` value for the rich and source containers.
	pub fn display_values(self) -> (&'static str, &'static str) {
		if self.rich_visible() {
			("block", "none")
		} else {
			("none", "block")
		}
	}
}
