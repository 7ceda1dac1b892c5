//! Forge session: the credential-holding client and its lifecycle.
//!
//! A [`Session`] is built from the persisted credential when the background
//! context starts, rebuilt from scratch whenever the credential changes, and
//! handed to every operation that needs the forge.

use std::cell::RefCell;
use std::rc::Rc;

use log::{info, warn};

use crate::error::{Error, Result};
use crate::forge::{Forge, User};

/// Message of the error returned while no authenticated client exists.
pub const NO_CLIENT: &str = "API client is undefined";

/// Where the access credential is persisted.
#[allow(async_fn_in_trait)]
pub trait CredentialStore {
	async fn load(&self) -> Result<Option<String>>;
	async fn store(&self, token: &str) -> Result<()>;
}

/// Credential store that lives only as long as the process.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
	token: RefCell<Option<String>>,
}

impl MemoryCredentialStore {
	pub fn with_token(token: impl Into<String>) -> Self {
		Self {
			token: RefCell::new(Some(token.into())),
		}
	}
}

impl CredentialStore for MemoryCredentialStore {
	async fn load(&self) -> Result<Option<String>> {
		Ok(self.token.borrow().clone())
	}

	async fn store(&self, token: &str) -> Result<()> {
		*self.token.borrow_mut() = Some(token.to_string());
		Ok(())
	}
}

/// Lifecycle: `Uninitialized` until the stored credential has been tried,
/// then `Authenticated` or `Unauthenticated`.
pub enum SessionState<F> {
	Uninitialized,
	Authenticated { forge: Rc<F>, user: User },
	Unauthenticated(String),
}

pub struct Session<F> {
	state: SessionState<F>,
}

impl<F> Default for Session<F> {
	fn default() -> Self {
		Self {
			state: SessionState::Uninitialized,
		}
	}
}

impl<F: Forge> Session<F> {
	/// Builds a session from the stored credential, verifying it against the
	/// forge. Any failure leaves the session unauthenticated.
	pub async fn initialize<S, C>(store: &S, connect: C) -> Self
	where
		S: CredentialStore,
		C: Fn(&str) -> Result<F>,
	{
		let token = match store.load().await {
			Ok(Some(token)) if !token.is_empty() => token,
			Ok(_) => return Self::unauthenticated("no access token stored".into()),
			Err(e) => return Self::unauthenticated(e.to_string()),
		};

		let forge = match connect(&token) {
			Ok(forge) => forge,
			Err(e) => return Self::unauthenticated(e.to_string()),
		};
		match forge.authenticated_user().await {
			Ok(user) => {
				info!("logged in on the forge as {}", user.login);
				Self {
					state: SessionState::Authenticated {
						forge: Rc::new(forge),
						user,
					},
				}
			}
			Err(e) => Self::unauthenticated(e.to_string()),
		}
	}

	/// Persists `token` and rebuilds the session from it.
	pub async fn replace_credential<S, C>(store: &S, token: &str, connect: C) -> Result<Self>
	where
		S: CredentialStore,
		C: Fn(&str) -> Result<F>,
	{
		store.store(token).await?;
		Ok(Self::initialize(store, connect).await)
	}

	fn unauthenticated(reason: String) -> Self {
		warn!("could not initiate the forge client: {reason}");
		Self {
			state: SessionState::Unauthenticated(reason),
		}
	}

	/// The authenticated forge, or [`Error::Authentication`].
	pub fn forge(&self) -> Result<Rc<F>> {
		match &self.state {
			SessionState::Authenticated { forge, .. } => Ok(Rc::clone(forge)),
			_ => Err(Error::Authentication(NO_CLIENT.to_string())),
		}
	}

	pub fn user(&self) -> Option<&User> {
		match &self.state {
			SessionState::Authenticated { user, .. } => Some(user),
			_ => None,
		}
	}

	pub fn state(&self) -> &SessionState<F> {
		&self.state
	}

	pub fn is_authenticated(&self) -> bool {
		matches!(self.state, SessionState::Authenticated { .. })
	}
}

#[cfg(test)]
mod tests {
	use futures::executor::block_on;

	use super::*;
	use crate::forge::{ChangeDescriptor, Commit, ContentFile, ContentRef, PullRequest};

	struct TokenForge {
		token: String,
	}

	impl Forge for TokenForge {
		async fn content(&self, _: &ContentRef) -> Result<ContentFile> {
			Ok(ContentFile::default())
		}

		async fn pull_files(&self, _: &str, _: &str, _: u64) -> Result<Vec<ChangeDescriptor>> {
			Ok(vec![])
		}

		async fn pull(&self, _: &str, _: &str, _: u64) -> Result<PullRequest> {
			Err(Error::Transport("unused".into()))
		}

		async fn commit(&self, _: &str, _: &str, _: &str) -> Result<Commit> {
			Err(Error::Transport("unused".into()))
		}

		async fn authenticated_user(&self) -> Result<User> {
			if self.token == "good" {
				Ok(User { login: "octocat".into() })
			} else {
				Err(Error::Authentication("Bad credentials".into()))
			}
		}
	}

	fn connect(token: &str) -> Result<TokenForge> {
		Ok(TokenForge {
			token: token.to_string(),
		})
	}

	#[test]
	fn test_default_is_uninitialized() {
		let session = Session::<TokenForge>::default();
		assert!(matches!(session.state(), SessionState::Uninitialized));
		assert!(session.forge().is_err());
	}

	#[test]
	fn test_no_token_is_unauthenticated() {
		let store = MemoryCredentialStore::default();
		let session = block_on(Session::initialize(&store, connect));
		assert!(!session.is_authenticated());
		let error = session.forge().err().unwrap();
		assert!(error.is_authentication());
		assert_eq!(error.to_string(), "Not authenticated: API client is undefined");
	}

	#[test]
	fn test_rejected_token_is_unauthenticated() {
		let store = MemoryCredentialStore::with_token("expired");
		let session = block_on(Session::initialize(&store, connect));
		assert!(matches!(session.state(), SessionState::Unauthenticated(_)));
	}

	#[test]
	fn test_replace_credential_rebuilds_session() {
		let store = MemoryCredentialStore::with_token("expired");
		let session = block_on(Session::initialize(&store, connect));
		assert!(!session.is_authenticated());

		let session = block_on(Session::replace_credential(&store, "good", connect)).unwrap();
		assert!(session.is_authenticated());
		assert_eq!(session.user().map(|u| u.login.as_str()), Some("octocat"));
		assert_eq!(block_on(store.load()).unwrap().as_deref(), Some("good"));
	}
}
