//! The two supported diagram notations and their registry entries.
//!
//! Everything that differs per notation (parser, differ, viewer sizing) is
//! looked up once per file through [`Notation::support`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::diff::{self, DiffResult, RawDiff};
use crate::error::{Error, Result};
use crate::model::{ParsedDocument, parse_document};

/// One of the two supported diagram schemas.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Notation {
	Bpmn,
	Dmn,
}

/// Viewer sizing for a notation.
#[derive(Clone, Debug)]
pub struct ViewerSettings {
	/// Canvas height in CSS pixels.
	pub height: f64,
}

/// Registry entry: parser, differ and viewer settings for one notation.
pub struct NotationSupport {
	pub parse: fn(&str) -> Result<ParsedDocument>,
	pub diff: fn(&ParsedDocument, &ParsedDocument) -> Result<RawDiff>,
	pub viewer: ViewerSettings,
}

fn parse_bpmn(xml: &str) -> Result<ParsedDocument> {
	parse_document(Notation::Bpmn, xml)
}

fn parse_dmn(xml: &str) -> Result<ParsedDocument> {
	parse_document(Notation::Dmn, xml)
}

fn diff_bpmn(before: &ParsedDocument, after: &ParsedDocument) -> Result<RawDiff> {
	diff::bpmn::diff(before, after).map(RawDiff::Bpmn)
}

fn diff_dmn(before: &ParsedDocument, after: &ParsedDocument) -> Result<RawDiff> {
	diff::dmn::diff(before, after).map(RawDiff::Dmn)
}

static BPMN_SUPPORT: NotationSupport = NotationSupport {
	parse: parse_bpmn,
	diff: diff_bpmn,
	viewer: ViewerSettings { height: 300.0 },
};

static DMN_SUPPORT: NotationSupport = NotationSupport {
	parse: parse_dmn,
	diff: diff_dmn,
	viewer: ViewerSettings { height: 500.0 },
};

impl Notation {
	pub const ALL: [Notation; 2] = [Notation::Bpmn, Notation::Dmn];

	/// File extension without the leading dot.
	pub fn extension(self) -> &'static str {
		match self {
			Notation::Bpmn => "bpmn",
			Notation::Dmn => "dmn",
		}
	}

	pub fn from_extension(extension: &str) -> Option<Self> {
		Self::ALL.into_iter().find(|n| n.extension() == extension)
	}

	/// Selects the notation from a path's last extension.
	pub fn from_filename(filename: &str) -> Result<Self> {
		filename
			.rsplit_once('.')
			.and_then(|(_, ext)| Self::from_extension(ext))
			.ok_or_else(|| Error::UnsupportedExtension {
				filename: filename.to_string(),
			})
	}

	pub fn support(self) -> &'static NotationSupport {
		match self {
			Notation::Bpmn => &BPMN_SUPPORT,
			Notation::Dmn => &DMN_SUPPORT,
		}
	}

	pub fn parse(self, xml: &str) -> Result<ParsedDocument> {
		(self.support().parse)(xml)
	}

	/// Runs this notation's differ and normalizes its output.
	pub fn diff(self, before: &ParsedDocument, after: &ParsedDocument) -> Result<DiffResult> {
		let raw = (self.support().diff)(before, after)?;
		Ok(diff::normalize(raw))
	}
}

impl fmt::Display for Notation {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Notation::Bpmn => write!(f, "BPMN"),
			Notation::Dmn => write!(f, "DMN"),
		}
	}
}

/// Whether `filename` has one of the supported extensions.
pub fn is_filename_supported(filename: &str) -> bool {
	Notation::from_filename(filename).is_ok()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_from_filename() {
		assert_eq!(Notation::from_filename("process.bpmn"), Ok(Notation::Bpmn));
		assert_eq!(Notation::from_filename("rules/dish.v2.dmn"), Ok(Notation::Dmn));
		assert!(matches!(
			Notation::from_filename("README.md"),
			Err(Error::UnsupportedExtension { .. })
		));
		assert!(!is_filename_supported("bpmn"));
		assert!(!is_filename_supported("diagram.BPMN"));
	}

	#[test]
	fn test_registry_viewer_heights() {
		assert_eq!(Notation::Bpmn.support().viewer.height, 300.0);
		assert_eq!(Notation::Dmn.support().viewer.height, 500.0);
	}
}
