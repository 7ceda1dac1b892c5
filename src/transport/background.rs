//! The background side of the transport: answers requests against the session.

use std::cell::RefCell;

use log::{debug, info};

use super::{ContentBody, FileDiffParams, PullParams, Request, Response, TokenParams, Transport};
use crate::error::{Error, Result};
use crate::forge::{Forge, get_content_string, get_file_diff};
use crate::session::{CredentialStore, Session};

/// Answers transport requests against the current forge session.
///
/// Holds the only [`Session`]; saving a credential swaps in a freshly built
/// one. Also usable directly as an in-process [`Transport`].
pub struct Background<F, S, C> {
	store: S,
	connect: C,
	session: RefCell<Session<F>>,
	open_options: Option<Box<dyn Fn()>>,
}

impl<F, S, C> Background<F, S, C>
where
	F: Forge,
	S: CredentialStore,
	C: Fn(&str) -> Result<F>,
{
	/// Starts with an uninitialized session; call [`Background::initialize`].
	pub fn new(store: S, connect: C) -> Self {
		Self {
			store,
			connect,
			session: RefCell::new(Session::default()),
			open_options: None,
		}
	}

	/// Hook run for [`Request::OpenOptionsPage`].
	pub fn with_options_page(mut self, open: impl Fn() + 'static) -> Self {
		self.open_options = Some(Box::new(open));
		self
	}

	/// Builds the session from the stored credential.
	pub async fn initialize(&self) {
		let session = Session::initialize(&self.store, &self.connect).await;
		*self.session.borrow_mut() = session;
	}

	pub fn is_authenticated(&self) -> bool {
		self.session.borrow().is_authenticated()
	}

	/// Answers one request. Never fails: errors come back as `{ error }`.
	pub async fn handle(&self, request: Request) -> Response {
		debug!("received {}", request.id());
		match request {
			Request::SaveGithubToken(TokenParams { token }) => {
				match Session::replace_credential(&self.store, &token, &self.connect).await {
					Ok(session) => {
						info!(
							"access token saved, session authenticated: {}",
							session.is_authenticated()
						);
						*self.session.borrow_mut() = session;
						Response::ok(&TokenParams { token })
					}
					Err(e) => Response::error(&e),
				}
			}
			Request::OpenOptionsPage => {
				if let Some(open) = &self.open_options {
					open();
				}
				Response::empty()
			}
			request => {
				// The session borrow ends here; the forge outlives a concurrent token swap.
				let forge = self.session.borrow().forge();
				match forge {
					Ok(forge) => dispatch(forge.as_ref(), request).await,
					Err(e) => Response::error(&e),
				}
			}
		}
	}
}

async fn dispatch<F: Forge>(forge: &F, request: Request) -> Response {
	match request {
		Request::GetPullFiles(PullParams { owner, repo, pull }) => {
			Response::from_result(forge.pull_files(&owner, &repo, pull).await)
		}
		Request::GetGithubPull(PullParams { owner, repo, pull }) => {
			Response::from_result(forge.pull(&owner, &repo, pull).await)
		}
		Request::GetGithubCommit(params) => {
			Response::from_result(forge.commit(&params.owner, &params.repo, &params.sha).await)
		}
		Request::GetGithubFilePreview(at) => Response::from_result(
			get_content_string(forge, &at)
				.await
				.map(|content| ContentBody { content }),
		),
		Request::GetFileDiff(FileDiffParams {
			owner,
			repo,
			sha,
			parent_sha,
			file,
		}) => Response::from_result(get_file_diff(forge, &owner, &repo, &sha, &parent_sha, &file).await),
		Request::GetGithubUser => Response::from_result(forge.authenticated_user().await),
		Request::SaveGithubToken(_) | Request::OpenOptionsPage => Response::error(&Error::Transport(
			"request is not a forge operation".into(),
		)),
	}
}

impl<F, S, C> Transport for Background<F, S, C>
where
	F: Forge,
	S: CredentialStore,
	C: Fn(&str) -> Result<F>,
{
	/// Round-trips both envelopes through JSON, as the browser channel does.
	async fn send(&self, request: Request) -> Response {
		let wire = match serde_json::to_string(&request) {
			Ok(wire) => wire,
			Err(e) => return Response::error(&Error::from(e)),
		};
		let request = match serde_json::from_str::<Request>(&wire) {
			Ok(request) => request,
			Err(e) => return Response::error(&Error::from(e)),
		};
		let response = self.handle(request).await;
		serde_json::to_string(&response)
			.and_then(|wire| serde_json::from_str(&wire))
			.unwrap_or_else(|e| Response::error(&Error::from(e)))
	}
}

#[cfg(test)]
mod tests {
	use std::cell::Cell;
	use std::rc::Rc;

	use futures::executor::block_on;

	use super::*;
	use crate::forge::{ChangeDescriptor, Commit, ContentFile, ContentRef, PullRequest, User};
	use crate::session::MemoryCredentialStore;
	use crate::transport::{CommitParams, call};

	struct StubForge;

	impl Forge for StubForge {
		async fn content(&self, _: &ContentRef) -> Result<ContentFile> {
			Ok(ContentFile::default())
		}

		async fn pull_files(&self, _: &str, _: &str, _: u64) -> Result<Vec<ChangeDescriptor>> {
			Ok(vec![])
		}

		async fn pull(&self, _: &str, _: &str, pull: u64) -> Result<PullRequest> {
			Ok(PullRequest {
				head_sha: format!("head-{pull}"),
				base_sha: "base".into(),
			})
		}

		async fn commit(&self, _: &str, _: &str, sha: &str) -> Result<Commit> {
			Ok(Commit {
				files: vec![],
				parent_shas: vec![format!("{sha}^")],
			})
		}

		async fn authenticated_user(&self) -> Result<User> {
			Ok(User { login: "octocat".into() })
		}
	}

	fn connect(token: &str) -> Result<StubForge> {
		match token {
			"good" => Ok(StubForge),
			_ => Err(Error::Authentication("Bad credentials".into())),
		}
	}

	#[test]
	fn test_uninitialized_background_answers_with_error() {
		let background = Background::new(MemoryCredentialStore::with_token("good"), connect);
		let response = block_on(background.send(Request::GetGithubUser));
		assert!(response.is_error());
	}

	#[test]
	fn test_forge_operations_after_initialize() {
		let background = Background::new(MemoryCredentialStore::with_token("good"), connect);
		block_on(background.initialize());
		assert!(background.is_authenticated());

		let pull: PullRequest = block_on(call(
			&background,
			Request::GetGithubPull(PullParams {
				owner: "o".into(),
				repo: "r".into(),
				pull: 7,
			}),
		))
		.unwrap();
		assert_eq!(pull.head_sha, "head-7");

		let commit: Commit = block_on(call(
			&background,
			Request::GetGithubCommit(CommitParams {
				owner: "o".into(),
				repo: "r".into(),
				sha: "c0ffee".into(),
			}),
		))
		.unwrap();
		assert_eq!(commit.first_parent(), Some("c0ffee^"));
	}

	#[test]
	fn test_save_token_echoes_and_rebuilds_session() {
		let background = Background::new(MemoryCredentialStore::default(), connect);
		block_on(background.initialize());
		assert!(!background.is_authenticated());

		let echoed: TokenParams = block_on(call(
			&background,
			Request::SaveGithubToken(TokenParams {
				token: "good".into(),
			}),
		))
		.unwrap();
		assert_eq!(echoed.token, "good");
		assert!(background.is_authenticated());
	}

	#[test]
	fn test_open_options_page_runs_hook() {
		let opened = Rc::new(Cell::new(0));
		let counter = opened.clone();
		let background = Background::new(MemoryCredentialStore::default(), connect)
			.with_options_page(move || counter.set(counter.get() + 1));
		let response = block_on(background.send(Request::OpenOptionsPage));
		assert!(!response.is_error());
		assert_eq!(opened.get(), 1);
	}
}
