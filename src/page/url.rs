//! Recognizes the GitHub pages a preview can be injected into.

use std::sync::OnceLock;

use log::info;
use regex::Regex;

const SEGMENT: &str = r"([a-zA-Z0-9_.-]+)";

fn pattern(cell: &'static OnceLock<Regex>, tail: &str) -> &'static Regex {
	cell.get_or_init(|| {
		Regex::new(&format!(r"https://github\.com/{SEGMENT}/{SEGMENT}/{tail}"))
			.expect("page url regex must compile")
	})
}

fn pull_re() -> &'static Regex {
	static RE: OnceLock<Regex> = OnceLock::new();
	pattern(&RE, r"pull/(\d+)/files")
}

fn commit_re() -> &'static Regex {
	static RE: OnceLock<Regex> = OnceLock::new();
	pattern(&RE, r"commit/(\w+)")
}

fn commit_in_pull_re() -> &'static Regex {
	static RE: OnceLock<Regex> = OnceLock::new();
	pattern(&RE, r"pull/(\d+)/commits/(\w+)")
}

fn blob_re() -> &'static Regex {
	static RE: OnceLock<Regex> = OnceLock::new();
	pattern(&RE, r"blob/([a-zA-Z0-9_.-]+)/([a-zA-Z0-9_/.-]+)")
}

/// A supported page and the parameters read from its URL.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PageKind {
	/// Files tab of a pull request.
	Pull { owner: String, repo: String, pull: u64 },
	Commit { owner: String, repo: String, sha: String },
	/// A single commit viewed from a pull request.
	CommitInPull {
		owner: String,
		repo: String,
		pull: u64,
		sha: String,
	},
	/// A file viewed at a ref. `path` starts with `/`.
	FilePreview {
		owner: String,
		repo: String,
		reference: String,
		path: String,
	},
}

impl PageKind {
	pub fn detect(url: &str) -> Option<Self> {
		let kind = Self::pull(url)
			.or_else(|| Self::preview(url))
			.or_else(|| Self::commit(url))
			.or_else(|| Self::commit_in_pull(url))?;
		info!("found a supported page: {kind:?}");
		Some(kind)
	}

	fn pull(url: &str) -> Option<Self> {
		let caps = pull_re().captures(url)?;
		Some(PageKind::Pull {
			owner: caps[1].to_string(),
			repo: caps[2].to_string(),
			pull: caps[3].parse().ok()?,
		})
	}

	fn commit(url: &str) -> Option<Self> {
		let caps = commit_re().captures(url)?;
		Some(PageKind::Commit {
			owner: caps[1].to_string(),
			repo: caps[2].to_string(),
			sha: caps[3].to_string(),
		})
	}

	fn commit_in_pull(url: &str) -> Option<Self> {
		let caps = commit_in_pull_re().captures(url)?;
		Some(PageKind::CommitInPull {
			owner: caps[1].to_string(),
			repo: caps[2].to_string(),
			pull: caps[3].parse().ok()?,
			sha: caps[4].to_string(),
		})
	}

	fn preview(url: &str) -> Option<Self> {
		let caps = blob_re().captures(url)?;
		Some(PageKind::FilePreview {
			owner: caps[1].to_string(),
			repo: caps[2].to_string(),
			reference: caps[3].to_string(),
			path: format!("/{}", &caps[4]),
		})
	}

	pub fn owner(&self) -> &str {
		match self {
			PageKind::Pull { owner, .. }
			| PageKind::Commit { owner, .. }
			| PageKind::CommitInPull { owner, .. }
			| PageKind::FilePreview { owner, .. } => owner,
		}
	}
}
