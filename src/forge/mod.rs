//! Access to the hosted git forge: change metadata and file content.
//!
//! [`Forge`] is the seam between the pipeline and the network. The
//! background context talks to GitHub through [`github::GithubClient`];
//! tests substitute an in-memory forge.

mod fetch;
pub mod github;

use serde::{Deserialize, Serialize};

use crate::error::Result;

pub use fetch::{FileDiff, get_content_string, get_file_diff};
pub use github::GithubClient;

/// Status of one file in a pull request or commit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeStatus {
	Added,
	Removed,
	Modified,
	Renamed,
	Copied,
	Changed,
	Unchanged,
}

impl ChangeStatus {
	pub fn as_str(self) -> &'static str {
		match self {
			ChangeStatus::Added => "added",
			ChangeStatus::Removed => "removed",
			ChangeStatus::Modified => "modified",
			ChangeStatus::Renamed => "renamed",
			ChangeStatus::Copied => "copied",
			ChangeStatus::Changed => "changed",
			ChangeStatus::Unchanged => "unchanged",
		}
	}
}

/// One changed file as reported by the forge.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChangeDescriptor {
	pub filename: String,
	pub status: ChangeStatus,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub previous_filename: Option<String>,
}

impl ChangeDescriptor {
	pub fn new(filename: impl Into<String>, status: ChangeStatus) -> Self {
		Self {
			filename: filename.into(),
			status,
			previous_filename: None,
		}
	}
}

/// The two commits a pull request's diff is taken between.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PullRequest {
	pub head_sha: String,
	pub base_sha: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Commit {
	pub files: Vec<ChangeDescriptor>,
	pub parent_shas: Vec<String>,
}

impl Commit {
	/// The parent diffs are shown against; merge commits use the first one.
	pub fn first_parent(&self) -> Option<&str> {
		self.parent_shas.first().map(String::as_str)
	}
}

/// The identity behind the current credential.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
	pub login: String,
}

/// Address of one file at one ref.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentRef {
	pub owner: String,
	pub repo: String,
	#[serde(rename = "ref")]
	pub reference: String,
	pub path: String,
}

/// Raw body of the contents endpoint.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentFile {
	#[serde(default)]
	pub content: Option<String>,
	#[serde(default)]
	pub encoding: Option<String>,
}

/// Operations the pipeline needs from the forge.
#[allow(async_fn_in_trait)]
pub trait Forge {
	/// File body at `at.reference`; content is still encoded.
	async fn content(&self, at: &ContentRef) -> Result<ContentFile>;

	async fn pull_files(&self, owner: &str, repo: &str, pull: u64) -> Result<Vec<ChangeDescriptor>>;

	async fn pull(&self, owner: &str, repo: &str, pull: u64) -> Result<PullRequest>;

	async fn commit(&self, owner: &str, repo: &str, sha: &str) -> Result<Commit>;

	async fn authenticated_user(&self) -> Result<User>;
}
