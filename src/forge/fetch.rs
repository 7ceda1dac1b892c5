//! Resolves change descriptors into before/after file text.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use log::debug;
use serde::{Deserialize, Serialize};

use super::{ChangeDescriptor, ChangeStatus, ContentRef, Forge};
use crate::error::{Error, Result};
use crate::notation::Notation;

/// Before/after text of one changed file. Which sides are present follows
/// the change status: both for modified, `after` for added, `before` for removed.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FileDiff {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub before: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub after: Option<String>,
}

/// Fetches one file at one ref and decodes it to text.
pub async fn get_content_string<F: Forge>(forge: &F, at: &ContentRef) -> Result<String> {
	let file = forge.content(at).await?;
	let encoded = match file.content {
		Some(content) if !content.is_empty() => content,
		_ => {
			return Err(Error::ContentNotFound {
				path: at.path.clone(),
				reference: at.reference.clone(),
			});
		}
	};

	// The contents API wraps base64 at 60 columns.
	let compact: String = encoded.split_ascii_whitespace().collect();
	let bytes = STANDARD.decode(compact).map_err(|e| Error::Forge {
		message: format!("Invalid content encoding for {} at {}: {e}", at.path, at.reference),
		documentation_url: None,
		status: None,
	})?;
	Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Fetches the sides of `file` its status calls for.
///
/// The extension is checked before any request goes out. For a modified
/// file both sides are requested concurrently.
pub async fn get_file_diff<F: Forge>(
	forge: &F,
	owner: &str,
	repo: &str,
	sha: &str,
	parent_sha: &str,
	file: &ChangeDescriptor,
) -> Result<FileDiff> {
	Notation::from_filename(&file.filename)?;

	let at = |reference: &str| ContentRef {
		owner: owner.to_string(),
		repo: repo.to_string(),
		reference: reference.to_string(),
		path: file.filename.clone(),
	};
	debug!("fetching {} ({})", file.filename, file.status.as_str());

	match file.status {
		ChangeStatus::Modified => {
			let (before_ref, after_ref) = (at(parent_sha), at(sha));
			let (before, after) = futures::try_join!(
				get_content_string(forge, &before_ref),
				get_content_string(forge, &after_ref)
			)?;
			Ok(FileDiff {
				before: Some(before),
				after: Some(after),
			})
		}
		ChangeStatus::Added => Ok(FileDiff {
			before: None,
			after: Some(get_content_string(forge, &at(sha)).await?),
		}),
		ChangeStatus::Removed => Ok(FileDiff {
			before: Some(get_content_string(forge, &at(parent_sha)).await?),
			after: None,
		}),
		other => Err(Error::UnsupportedStatus(other.as_str().to_string())),
	}
}
