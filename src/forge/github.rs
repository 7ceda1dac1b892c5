//! GitHub REST API v3 client.

use log::debug;
use reqwest::Client as HttpClient;
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use super::{ChangeDescriptor, Commit, ContentFile, ContentRef, Forge, PullRequest, User};
use crate::config::ForgeSettings;
use crate::error::{Error, Result};

const ACCEPT: &str = "application/vnd.github+json";
const API_VERSION: &str = "2022-11-28";

/// Error body GitHub sends with non-success statuses.
#[derive(Debug, Default, Deserialize)]
struct ErrorResponse {
	#[serde(default)]
	message: Option<String>,
	#[serde(default)]
	documentation_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ShaRef {
	sha: String,
}

#[derive(Debug, Deserialize)]
struct PullResponse {
	head: ShaRef,
	base: ShaRef,
}

#[derive(Debug, Deserialize)]
struct CommitResponse {
	#[serde(default)]
	files: Vec<ChangeDescriptor>,
	#[serde(default)]
	parents: Vec<ShaRef>,
}

/// Authenticated GitHub client.
pub struct GithubClient {
	http: HttpClient,
	token: String,
	api_url: String,
	per_page: u32,
}

impl GithubClient {
	pub fn new(token: impl Into<String>, settings: &ForgeSettings) -> Result<Self> {
		let http = HttpClient::builder().build()?;
		Ok(Self {
			http,
			token: token.into(),
			api_url: settings.api_url.trim_end_matches('/').to_string(),
			per_page: settings.per_page,
		})
	}

	/// Set custom API URL (GitHub Enterprise or tests)
	pub fn with_api_url(mut self, url: &str) -> Self {
		self.api_url = url.trim_end_matches('/').to_string();
		self
	}

	/// `segments` are percent-encoded one by one and appended to the API URL.
	async fn get<T: DeserializeOwned>(&self, segments: &[&str], query: &[(&str, String)]) -> Result<T> {
		let url = endpoint(&self.api_url, segments)?;
		debug!("GET {url}");
		let response = self
			.http
			.get(url)
			.bearer_auth(&self.token)
			.header("Accept", ACCEPT)
			.header("X-GitHub-Api-Version", API_VERSION)
			.query(query)
			.send()
			.await?;

		let status = response.status();
		if !status.is_success() {
			let body = response.text().await.unwrap_or_default();
			return Err(error_from_response(status, &body));
		}
		Ok(response.json::<T>().await?)
	}

	fn per_page(&self) -> (&'static str, String) {
		("per_page", self.per_page.to_string())
	}
}

fn endpoint(api_url: &str, segments: &[&str]) -> Result<Url> {
	let invalid = |reason: String| Error::Forge {
		message: format!("Invalid API URL {api_url}: {reason}"),
		documentation_url: None,
		status: None,
	};
	let mut url = Url::parse(api_url).map_err(|e| invalid(e.to_string()))?;
	url.path_segments_mut()
		.map_err(|()| invalid("cannot be a base".into()))?
		.pop_if_empty()
		.extend(segments);
	Ok(url)
}

/// Maps a non-success response to an [`Error`], keeping GitHub's message and
/// documentation link.
fn error_from_response(status: StatusCode, body: &str) -> Error {
	let parsed: ErrorResponse = serde_json::from_str(body).unwrap_or_default();
	let message = parsed
		.message
		.unwrap_or_else(|| format!("GitHub request failed with status {status}"));
	if status == StatusCode::UNAUTHORIZED {
		return Error::Authentication(message);
	}
	Error::Forge {
		message,
		documentation_url: parsed.documentation_url,
		status: Some(status.as_u16()),
	}
}

impl Forge for GithubClient {
	async fn content(&self, at: &ContentRef) -> Result<ContentFile> {
		let mut segments = vec!["repos", at.owner.as_str(), at.repo.as_str(), "contents"];
		segments.extend(at.path.split('/').filter(|s| !s.is_empty()));
		self.get(&segments, &[("ref", at.reference.clone())]).await
	}

	async fn pull_files(&self, owner: &str, repo: &str, pull: u64) -> Result<Vec<ChangeDescriptor>> {
		let pull = pull.to_string();
		self.get(&["repos", owner, repo, "pulls", pull.as_str(), "files"], &[self.per_page()])
			.await
	}

	async fn pull(&self, owner: &str, repo: &str, pull: u64) -> Result<PullRequest> {
		let pull = pull.to_string();
		let raw: PullResponse = self.get(&["repos", owner, repo, "pulls", pull.as_str()], &[]).await?;
		Ok(PullRequest {
			head_sha: raw.head.sha,
			base_sha: raw.base.sha,
		})
	}

	async fn commit(&self, owner: &str, repo: &str, sha: &str) -> Result<Commit> {
		let raw: CommitResponse = self
			.get(&["repos", owner, repo, "commits", sha], &[self.per_page()])
			.await?;
		Ok(Commit {
			files: raw.files,
			parent_shas: raw.parents.into_iter().map(|p| p.sha).collect(),
		})
	}

	async fn authenticated_user(&self) -> Result<User> {
		self.get(&["user"], &[]).await
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_unauthorized_is_authentication_error() {
		let body = r#"{"message":"Bad credentials","documentation_url":"https://docs.github.com/rest"}"#;
		let error = error_from_response(StatusCode::UNAUTHORIZED, body);
		assert_eq!(error, Error::Authentication("Bad credentials".into()));
	}

	#[test]
	fn test_error_body_is_kept() {
		let body = r#"{"message":"Not Found","documentation_url":"https://docs.github.com/rest/repos/contents"}"#;
		let error = error_from_response(StatusCode::NOT_FOUND, body);
		assert_eq!(error.to_string(), "Not Found");
		assert_eq!(
			error.documentation_url(),
			Some("https://docs.github.com/rest/repos/contents")
		);
	}

	#[test]
	fn test_unparseable_error_body() {
		let error = error_from_response(StatusCode::BAD_GATEWAY, "<html>");
		assert!(matches!(error, Error::Forge { status: Some(502), .. }));
	}

	#[test]
	fn test_commit_response_shape() {
		let json = r#"{
			"sha": "c0ffee",
			"parents": [{"sha": "p1", "url": "x"}, {"sha": "p2"}],
			"files": [{"filename": "a.bpmn", "status": "modified", "additions": 3}]
		}"#;
		let raw: CommitResponse = serde_json::from_str(json).unwrap();
		assert_eq!(raw.parents.len(), 2);
		assert_eq!(raw.files[0].status, super::super::ChangeStatus::Modified);
	}

	#[test]
	fn test_content_path_segments_are_encoded() {
		let url = endpoint(
			"https://ghe.example.com/api/v3",
			&["repos", "o", "r", "contents", "models", "order #2?.bpmn"],
		)
		.unwrap();
		assert_eq!(
			url.as_str(),
			"https://ghe.example.com/api/v3/repos/o/r/contents/models/order%20%232%3F.bpmn"
		);
		assert_eq!(url.query(), None);
		assert_eq!(url.fragment(), None);
	}

	#[test]
	fn test_invalid_api_url_is_forge_error() {
		let error = endpoint("not a url", &["user"]).unwrap_err();
		assert!(matches!(error, Error::Forge { status: None, .. }));
	}

	#[test]
	fn test_trailing_slash_is_trimmed() {
		let client = GithubClient::new("t", &ForgeSettings::default())
			.unwrap()
			.with_api_url("https://ghe.example.com/api/v3/");
		assert_eq!(client.api_url, "https://ghe.example.com/api/v3");
	}
}
