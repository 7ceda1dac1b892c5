//! Client-side navigation tracking.
//!
//! GitHub swaps pages with Turbo (and pjax on older views) without reloading
//! the page script. Each new location starts a visit; a visit's plan is only
//! applied while it is still the latest one.

use log::debug;

use super::url::PageKind;

/// Document events GitHub fires once a navigation replaced the page body.
pub const NAVIGATION_EVENTS: &[&str] = &["turbo:render", "pjax:end"];

/// What one navigation event amounts to.
#[derive(Clone, Debug, PartialEq)]
pub struct Visit {
	pub generation: u64,
	/// False when the page was re-rendered at the location already visited.
	pub changed: bool,
	pub kind: Option<PageKind>,
}

/// Current location and the generation of its visit.
#[derive(Debug, Default)]
pub struct Navigation {
	location: Option<String>,
	generation: u64,
}

/// Anchors (`#diff-…`) move within a page, they do not leave it.
fn without_fragment(href: &str) -> &str {
	href.split_once('#').map_or(href, |(base, _)| base)
}

impl Navigation {
	pub fn visit(&mut self, href: &str) -> Visit {
		let location = without_fragment(href);
		let changed = self.location.as_deref() != Some(location);
		if changed {
			self.generation += 1;
			self.location = Some(location.to_string());
			debug!("visit {} at {location}", self.generation);
		}
		Visit {
			generation: self.generation,
			changed,
			kind: PageKind::detect(location),
		}
	}

	/// Whether `generation` is still the latest visit.
	pub fn is_current(&self, generation: u64) -> bool {
		generation == self.generation
	}
}
