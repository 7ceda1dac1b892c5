//! Decides what to inject on a recognized page, before touching the DOM.

use log::{info, warn};

use super::url::PageKind;
use crate::error::Result;
use crate::forge::{ChangeDescriptor, Commit, ContentRef, PullRequest, User};
use crate::notation::{Notation, is_filename_supported};
use crate::preview::Notice;
use crate::transport::{CommitParams, ContentBody, PullParams, Request, Transport, call};

/// What the page gets.
#[derive(Clone, Debug, PartialEq)]
pub enum PagePlan {
	/// No valid credential: every supported file gets the login notice.
	NotLoggedIn,
	/// Page metadata could not be fetched.
	Error(Notice),
	/// One preview per supported changed file.
	Diff {
		owner: String,
		repo: String,
		sha: String,
		parent_sha: String,
		files: Vec<ChangeDescriptor>,
	},
	/// A single file shown at one ref.
	Preview {
		notation: Notation,
		path: String,
		content: String,
	},
	/// Recognized page with nothing to render.
	Skip,
}

fn supported(files: Vec<ChangeDescriptor>) -> Vec<ChangeDescriptor> {
	let files: Vec<ChangeDescriptor> = files
		.into_iter()
		.filter(|f| is_filename_supported(&f.filename))
		.collect();
	info!("found {} supported files with the API", files.len());
	files
}

/// Checks the session, then fetches what `kind` needs.
///
/// Identity is checked first, so an unauthenticated page never issues a
/// diagram fetch.
pub async fn resolve_page<T: Transport + ?Sized>(transport: &T, kind: &PageKind) -> PagePlan {
	if let Err(e) = call::<User, T>(transport, Request::GetGithubUser).await {
		warn!("not logged in: {e}");
		return PagePlan::NotLoggedIn;
	}

	let result = match kind {
		PageKind::Pull { owner, repo, pull } => resolve_pull(transport, owner, repo, *pull).await,
		PageKind::Commit { owner, repo, sha } | PageKind::CommitInPull { owner, repo, sha, .. } => {
			resolve_commit(transport, owner, repo, sha).await
		}
		PageKind::FilePreview {
			owner,
			repo,
			reference,
			path,
		} => resolve_preview(transport, owner, repo, reference, path).await,
	};
	result.unwrap_or_else(|e| PagePlan::Error(Notice::from(&e)))
}

async fn resolve_pull<T: Transport + ?Sized>(
	transport: &T,
	owner: &str,
	repo: &str,
	pull: u64,
) -> Result<PagePlan> {
	let params = PullParams {
		owner: owner.to_string(),
		repo: repo.to_string(),
		pull,
	};
	let files: Vec<ChangeDescriptor> = call(transport, Request::GetPullFiles(params.clone())).await?;
	let pull: PullRequest = call(transport, Request::GetGithubPull(params)).await?;
	Ok(PagePlan::Diff {
		owner: owner.to_string(),
		repo: repo.to_string(),
		sha: pull.head_sha,
		parent_sha: pull.base_sha,
		files: supported(files),
	})
}

async fn resolve_commit<T: Transport + ?Sized>(
	transport: &T,
	owner: &str,
	repo: &str,
	sha: &str,
) -> Result<PagePlan> {
	let commit: Commit = call(
		transport,
		Request::GetGithubCommit(CommitParams {
			owner: owner.to_string(),
			repo: repo.to_string(),
			sha: sha.to_string(),
		}),
	)
	.await?;
	let Some(parent_sha) = commit.first_parent().map(str::to_string) else {
		return Ok(PagePlan::Error(Notice::Generic {
			message: "Found no commit parent".into(),
			documentation_url: None,
		}));
	};
	Ok(PagePlan::Diff {
		owner: owner.to_string(),
		repo: repo.to_string(),
		sha: sha.to_string(),
		parent_sha,
		files: supported(commit.files),
	})
}

async fn resolve_preview<T: Transport + ?Sized>(
	transport: &T,
	owner: &str,
	repo: &str,
	reference: &str,
	path: &str,
) -> Result<PagePlan> {
	let Ok(notation) = Notation::from_filename(path) else {
		return Ok(PagePlan::Skip);
	};
	let body: ContentBody = call(
		transport,
		Request::GetGithubFilePreview(ContentRef {
			owner: owner.to_string(),
			repo: repo.to_string(),
			reference: reference.to_string(),
			path: path.to_string(),
		}),
	)
	.await?;
	Ok(PagePlan::Preview {
		notation,
		path: path.to_string(),
		content: body.content,
	})
}
