//! Per-file preview state machine.
//!
//! `Loading` → `Single` | `Dual` | `Error`. A new file identity restarts the
//! cycle; results that arrive for an identity no longer current are dropped.

use std::rc::Rc;

use log::{debug, warn};

use super::overlay::Side;
use crate::diff::DiffResult;
use crate::error::Error;
use crate::forge::{ChangeDescriptor, FileDiff};
use crate::model::ParsedDocument;
use crate::notation::Notation;
use crate::transport::{FileDiffParams, Request, Transport, call};

/// What a displayed file is: the file plus the two commits it is compared between.
#[derive(Clone, Debug, PartialEq)]
pub struct FileIdentity {
	pub owner: String,
	pub repo: String,
	pub sha: String,
	pub parent_sha: String,
	pub file: ChangeDescriptor,
}

impl FileIdentity {
	pub fn request(&self) -> Request {
		Request::GetFileDiff(FileDiffParams {
			owner: self.owner.clone(),
			repo: self.repo.clone(),
			sha: self.sha.clone(),
			parent_sha: self.parent_sha.clone(),
			file: self.file.clone(),
		})
	}
}

/// Placeholder shown instead of a preview.
#[derive(Clone, Debug, PartialEq)]
pub enum Notice {
	NotLoggedIn,
	Generic {
		message: String,
		documentation_url: Option<String>,
	},
}

impl From<&Error> for Notice {
	fn from(error: &Error) -> Self {
		if error.is_authentication() {
			return Notice::NotLoggedIn;
		}
		Notice::Generic {
			message: error.to_string(),
			documentation_url: error.documentation_url().map(str::to_string),
		}
	}
}

#[derive(Clone, Debug, Default, PartialEq)]
pub enum PreviewState {
	#[default]
	Loading,
	/// One side only: added/removed file, or the other side failed to parse.
	Single {
		side: Side,
		document: Rc<ParsedDocument>,
	},
	/// Both sides; `diff` is absent when the differ failed.
	Dual {
		before: Rc<ParsedDocument>,
		after: Rc<ParsedDocument>,
		diff: Option<Rc<DiffResult>>,
	},
	Error(Notice),
}

impl PreviewState {
	pub fn diff(&self) -> Option<&DiffResult> {
		match self {
			PreviewState::Dual { diff, .. } => diff.as_deref(),
			_ => None,
		}
	}

	pub fn is_loading(&self) -> bool {
		matches!(self, PreviewState::Loading)
	}
}

fn parse_side(notation: Notation, side: Side, text: Option<String>) -> Option<Rc<ParsedDocument>> {
	let text = text?;
	match notation.parse(&text) {
		Ok(document) => Some(Rc::new(document)),
		Err(e) => {
			warn!("{side:?} side not rendered: {e}");
			None
		}
	}
}

/// Parses whichever sides were fetched and diffs them when both parsed.
///
/// Parse and diff failures never surface as errors: they only lower the
/// fidelity of the result.
pub fn prepare(notation: Notation, sides: FileDiff) -> PreviewState {
	let before = parse_side(notation, Side::Before, sides.before);
	let after = parse_side(notation, Side::After, sides.after);
	match (before, after) {
		(Some(before), Some(after)) => {
			let diff = match notation.diff(&before, &after) {
				Ok(diff) => Some(Rc::new(diff)),
				Err(e) => {
					warn!("showing both sides without overlay: {e}");
					None
				}
			};
			PreviewState::Dual {
				before,
				after,
				diff,
			}
		}
		(Some(document), None) => PreviewState::Single {
			side: Side::Before,
			document,
		},
		(None, Some(document)) => PreviewState::Single {
			side: Side::After,
			document,
		},
		(None, None) => PreviewState::Error(Notice::Generic {
			message: format!("No {notation} diagram could be rendered for this file"),
			documentation_url: None,
		}),
	}
}

/// Fetches, parses and diffs one file.
pub async fn load_preview<T: Transport + ?Sized>(transport: &T, identity: &FileIdentity) -> PreviewState {
	let notation = match Notation::from_filename(&identity.file.filename) {
		Ok(notation) => notation,
		Err(e) => return PreviewState::Error(Notice::from(&e)),
	};
	match call::<FileDiff, T>(transport, identity.request()).await {
		Ok(sides) => prepare(notation, sides),
		Err(e) => {
			warn!("{}: {e}", identity.file.filename);
			PreviewState::Error(Notice::from(&e))
		}
	}
}

/// Proof of which load a result belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ticket(u64);

/// Holds the current identity and state, discarding stale results.
#[derive(Debug, Default)]
pub struct PreviewMachine {
	identity: Option<FileIdentity>,
	generation: u64,
	state: PreviewState,
}

impl PreviewMachine {
	/// Restarts from `Loading` when `identity` differs from the current one.
	/// Returns `None` if that identity is already loading or loaded.
	pub fn begin(&mut self, identity: &FileIdentity) -> Option<Ticket> {
		if self.identity.as_ref() == Some(identity) {
			return None;
		}
		self.identity = Some(identity.clone());
		self.generation += 1;
		self.state = PreviewState::Loading;
		Some(Ticket(self.generation))
	}

	/// Stores `state` if `ticket` is still current.
	pub fn complete(&mut self, ticket: Ticket, state: PreviewState) -> bool {
		if ticket.0 != self.generation {
			debug!(
				"discarding result of load {} (current is {})",
				ticket.0, self.generation
			);
			return false;
		}
		self.state = state;
		true
	}

	/// Forgets the current identity; a load still in flight completes as stale.
	pub fn cancel(&mut self) {
		self.identity = None;
		self.generation += 1;
		self.state = PreviewState::Loading;
	}

	pub fn state(&self) -> &PreviewState {
		&self.state
	}

	pub fn identity(&self) -> Option<&FileIdentity> {
		self.identity.as_ref()
	}
}
