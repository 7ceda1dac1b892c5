//! Request/response envelope between the page and the background context.
//!
//! A request is `{ id, data? }`. A response is either the raw result value or
//! `{ error }`; [`Response::into_result`] is the only way to read it, so the
//! error check cannot be skipped.

mod background;
pub mod chrome;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{Error, ErrorBody, Result};
use crate::forge::{ChangeDescriptor, ContentRef};

pub use background::Background;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullParams {
	pub owner: String,
	pub repo: String,
	pub pull: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitParams {
	pub owner: String,
	pub repo: String,
	pub sha: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileDiffParams {
	pub owner: String,
	pub repo: String,
	pub sha: String,
	pub parent_sha: String,
	pub file: ChangeDescriptor,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenParams {
	pub token: String,
}

/// Result of [`Request::GetGithubFilePreview`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentBody {
	pub content: String,
}

/// Operations the background context answers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "id", content = "data")]
pub enum Request {
	GetPullFiles(PullParams),
	GetGithubPull(PullParams),
	GetGithubCommit(CommitParams),
	GetGithubFilePreview(ContentRef),
	GetFileDiff(FileDiffParams),
	GetGithubUser,
	SaveGithubToken(TokenParams),
	OpenOptionsPage,
}

impl Request {
	/// The operation tag, as sent in `id`.
	pub fn id(&self) -> &'static str {
		match self {
			Request::GetPullFiles(_) => "GetPullFiles",
			Request::GetGithubPull(_) => "GetGithubPull",
			Request::GetGithubCommit(_) => "GetGithubCommit",
			Request::GetGithubFilePreview(_) => "GetGithubFilePreview",
			Request::GetFileDiff(_) => "GetFileDiff",
			Request::GetGithubUser => "GetGithubUser",
			Request::SaveGithubToken(_) => "SaveGithubToken",
			Request::OpenOptionsPage => "OpenOptionsPage",
		}
	}

	/// Whether answering this request reads diagram content from the forge.
	pub fn fetches_diagram(&self) -> bool {
		matches!(
			self,
			Request::GetFileDiff(_) | Request::GetGithubFilePreview(_)
		)
	}
}

/// Either `{ "error": … }` or the operation's raw result.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Response {
	Err { error: ErrorBody },
	Ok(serde_json::Value),
}

impl Response {
	pub fn ok<T: Serialize>(value: &T) -> Self {
		match serde_json::to_value(value) {
			Ok(value) => Response::Ok(value),
			Err(e) => Response::error(&Error::from(e)),
		}
	}

	pub fn error(error: &Error) -> Self {
		Response::Err {
			error: ErrorBody::from(error),
		}
	}

	/// Response for operations with no result value.
	pub fn empty() -> Self {
		Response::Ok(serde_json::Value::Null)
	}

	pub fn from_result<T: Serialize>(result: Result<T>) -> Self {
		match result {
			Ok(value) => Response::ok(&value),
			Err(e) => Response::error(&e),
		}
	}

	pub fn is_error(&self) -> bool {
		matches!(self, Response::Err { .. })
	}

	/// Checks for the error key, then decodes the payload.
	pub fn into_result<T: DeserializeOwned>(self) -> Result<T> {
		match self {
			Response::Err { error } => Err(Error::from(error)),
			Response::Ok(value) => Ok(serde_json::from_value(value)?),
		}
	}
}

/// Carries a request to the background context and returns its answer.
#[allow(async_fn_in_trait)]
pub trait Transport {
	async fn send(&self, request: Request) -> Response;
}

/// Sends `request` and decodes the typed result.
pub async fn call<T, X>(transport: &X, request: Request) -> Result<T>
where
	T: DeserializeOwned,
	X: Transport + ?Sized,
{
	transport.send(request).await.into_result()
}
