//! Host page lookups: file elements, their containers and the color mode.

use log::info;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement};

use crate::error::{Error, Result};
use crate::forge::ChangeDescriptor;
use crate::notation::Notation;

/// Selector for diff file elements of a supported notation.
pub fn supported_selector() -> String {
	Notation::ALL
		.iter()
		.map(|n| format!(".file[data-file-type=\".{}\"]", n.extension()))
		.collect::<Vec<_>>()
		.join(", ")
}

fn html_elements(document: &Document, selector: &str) -> Vec<HtmlElement> {
	let Ok(nodes) = document.query_selector_all(selector) else {
		return vec![];
	};
	(0..nodes.length())
		.filter_map(|i| nodes.item(i))
		.filter_map(|node| node.dyn_into::<HtmlElement>().ok())
		.collect()
}

/// Diff file elements of supported notations, in page order.
pub fn supported_file_elements(document: &Document) -> Vec<HtmlElement> {
	html_elements(document, &supported_selector())
}

/// The filename a diff file element displays.
pub fn element_filename(element: &Element) -> Option<String> {
	element
		.query_selector(".file-info a[title]")
		.ok()
		.flatten()?
		.get_attribute("title")
}

/// Pairs page elements with API files, in order and by name.
///
/// Both lists must have the same length and agree on every filename;
/// anything else means the page layout is not the one expected.
pub fn match_files<E>(
	elements: Vec<(E, Option<String>)>,
	files: &[ChangeDescriptor],
) -> Result<Vec<(E, ChangeDescriptor)>> {
	if elements.len() != files.len() {
		return Err(Error::PageLayout(format!(
			"elements and files have different length. Got {} and {}",
			elements.len(),
			files.len()
		)));
	}
	elements
		.into_iter()
		.zip(files)
		.map(|((element, name), file)| {
			if name.as_deref() == Some(file.filename.as_str()) {
				Ok((element, file.clone()))
			} else {
				Err(Error::PageLayout(format!(
					"couldn't match {} with a diff element on the page",
					file.filename
				)))
			}
		})
		.collect()
}

/// Supported file elements on the page, paired with their API files.
pub fn injectable_elements(
	document: &Document,
	files: &[ChangeDescriptor],
) -> Result<Vec<(HtmlElement, ChangeDescriptor)>> {
	let elements: Vec<(HtmlElement, Option<String>)> = supported_file_elements(document)
		.into_iter()
		.map(|el| {
			let name = element_filename(&el);
			(el, name)
		})
		.collect();
	info!("found {} elements in the web page", elements.len());
	match_files(elements, files)
}

/// Where a preview goes inside the host page.
#[derive(Clone, Debug)]
pub struct Containers {
	/// Host for the source/rich toggle.
	pub toolbar: HtmlElement,
	/// Host for the rendered preview.
	pub content: HtmlElement,
	/// The host's own rendering, hidden while the preview is shown.
	pub source: Vec<HtmlElement>,
}

fn children(element: &Element) -> Vec<HtmlElement> {
	let list = element.children();
	(0..list.length())
		.filter_map(|i| list.item(i))
		.filter_map(|el| el.dyn_into::<HtmlElement>().ok())
		.collect()
}

fn query(root: &Element, selector: &str) -> Option<HtmlElement> {
	root.query_selector(selector).ok().flatten()?.dyn_into().ok()
}

impl Containers {
	/// Containers of one diff file element.
	pub fn for_file(root: &Element) -> Result<Self> {
		let toolbar = query(root, ".file-info")
			.ok_or_else(|| Error::PageLayout("no .file-info in file element".into()))?;
		let content = query(root, ".js-file-content")
			.ok_or_else(|| Error::PageLayout("no .js-file-content in file element".into()))?;
		let source = children(&content);
		Ok(Self {
			toolbar,
			content,
			source,
		})
	}

	/// Containers of a blob (file preview) page.
	pub fn for_preview(document: &Document) -> Result<Self> {
		let toolbar = document
			.get_element_by_id("repos-sticky-header")
			.and_then(|header| header.children().item(0))
			.and_then(|row| row.children().item(1))
			.and_then(|el| el.dyn_into::<HtmlElement>().ok())
			.ok_or_else(|| Error::PageLayout("no toolbar in sticky header".into()))?;
		let content = document
			.get_element_by_id("read-only-cursor-text-area")
			.and_then(|area| area.parent_element())
			.and_then(|el| el.dyn_into::<HtmlElement>().ok())
			.ok_or_else(|| Error::PageLayout("no source text area".into()))?;
		let source = children(&content);
		Ok(Self {
			toolbar,
			content,
			source,
		})
	}

	/// Shows or hides the host's own rendering.
	pub fn set_source_display(&self, display: &str) {
		for element in &self.source {
			let _ = element.style().set_property("display", display);
		}
	}
}

/// GitHub's `data-color-mode`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColorMode {
	Light,
	Dark,
	#[default]
	Auto,
}

impl ColorMode {
	pub fn parse(value: Option<&str>) -> Self {
		match value {
			Some("light") => ColorMode::Light,
			Some("dark") => ColorMode::Dark,
			_ => ColorMode::Auto,
		}
	}

	/// Resolves `Auto` with the system preference.
	pub fn is_dark(self, prefers_dark: bool) -> bool {
		match self {
			ColorMode::Light => false,
			ColorMode::Dark => true,
			ColorMode::Auto => prefers_dark,
		}
	}
}

pub fn color_mode(document: &Document) -> ColorMode {
	let value = document
		.document_element()
		.and_then(|html| html.get_attribute("data-color-mode"));
	ColorMode::parse(value.as_deref())
}

/// Whether the host page renders dark.
pub fn prefers_dark(document: &Document) -> bool {
	let system = web_sys::window()
		.and_then(|w| w.match_media("(prefers-color-scheme: dark)").ok().flatten())
		.map(|q| q.matches())
		.unwrap_or(false);
	color_mode(document).is_dark(system)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::forge::ChangeStatus;

	fn files(names: &[&str]) -> Vec<ChangeDescriptor> {
		names
			.iter()
			.map(|n| ChangeDescriptor::new(*n, ChangeStatus::Modified))
			.collect()
	}

	#[test]
	fn test_selector_covers_both_notations() {
		assert_eq!(
			supported_selector(),
			r#".file[data-file-type=".bpmn"], .file[data-file-type=".dmn"]"#
		);
	}

	#[test]
	fn test_match_files_in_order() {
		let elements = vec![(1, Some("a.bpmn".to_string())), (2, Some("b.dmn".to_string()))];
		let matched = match_files(elements, &files(&["a.bpmn", "b.dmn"])).unwrap();
		assert_eq!(matched[1].0, 2);
		assert_eq!(matched[1].1.filename, "b.dmn");
	}

	#[test]
	fn test_match_files_rejects_mismatch() {
		let elements = vec![(1, Some("a.bpmn".to_string()))];
		assert!(matches!(
			match_files(elements, &files(&["a.bpmn", "b.dmn"])),
			Err(Error::PageLayout(_))
		));

		let elements = vec![(1, Some("b.dmn".to_string())), (2, None)];
		assert!(matches!(
			match_files(elements, &files(&["a.bpmn", "b.dmn"])),
			Err(Error::PageLayout(_))
		));
	}

	#[test]
	fn test_color_mode() {
		assert_eq!(ColorMode::parse(Some("dark")), ColorMode::Dark);
		assert_eq!(ColorMode::parse(None), ColorMode::Auto);
		assert!(ColorMode::Auto.is_dark(true));
		assert!(!ColorMode::Light.is_dark(true));
	}
}
