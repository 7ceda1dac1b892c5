//! Error types for the preview pipeline.
//!
//! Every failure that can cross the transport boundary is an [`Error`]. The
//! serializable [`ErrorBody`] projection lets the page side rebuild a typed
//! error from a `{ "error": … }` response, so the not-logged-in and generic
//! error paths stay distinguishable after a round trip.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::notation::Notation;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for fetch, parse, diff and page-integration failures.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum Error {
	#[error("Unsupported extension for {filename}, expected one of: bpmn, dmn")]
	UnsupportedExtension { filename: String },

	#[error("No content associated with {path} at {reference}")]
	ContentNotFound { path: String, reference: String },

	#[error("Unsupported status: {0}")]
	UnsupportedStatus(String),

	#[error("Not authenticated: {0}")]
	Authentication(String),

	#[error("Malformed {notation} document: {message}")]
	Parse { notation: Notation, message: String },

	#[error("Diff computation failed: {0}")]
	DiffComputation(String),

	#[error("{message}")]
	Forge {
		message: String,
		documentation_url: Option<String>,
		status: Option<u16>,
	},

	#[error("Transport error: {0}")]
	Transport(String),

	#[error("Storage error: {0}")]
	Storage(String),

	#[error("Page layout error: {0}")]
	PageLayout(String),
}

impl Error {
	/// Optional link to the forge's documentation for this failure.
	pub fn documentation_url(&self) -> Option<&str> {
		match self {
			Error::Forge {
				documentation_url, ..
			} => documentation_url.as_deref(),
			_ => None,
		}
	}

	/// Whether this error should send the user to the credential entry path.
	pub fn is_authentication(&self) -> bool {
		matches!(self, Error::Authentication(_))
	}
}

impl From<reqwest::Error> for Error {
	fn from(error: reqwest::Error) -> Self {
		Self::Forge {
			message: error.to_string(),
			documentation_url: None,
			status: error.status().map(|s| s.as_u16()),
		}
	}
}

impl From<serde_json::Error> for Error {
	fn from(error: serde_json::Error) -> Self {
		Self::Transport(error.to_string())
	}
}

/// Category tag carried by [`ErrorBody`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
	UnsupportedExtension,
	ContentNotFound,
	UnsupportedStatus,
	Authentication,
	Parse,
	DiffComputation,
	Forge,
	Transport,
	Storage,
	PageLayout,
}

/// Wire form of an [`Error`], sent as the value of the `error` key.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
	pub kind: ErrorKind,
	pub message: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub documentation_url: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub status: Option<u16>,
}

impl From<&Error> for ErrorBody {
	fn from(error: &Error) -> Self {
		let kind = match error {
			Error::UnsupportedExtension { .. } => ErrorKind::UnsupportedExtension,
			Error::ContentNotFound { .. } => ErrorKind::ContentNotFound,
			Error::UnsupportedStatus(_) => ErrorKind::UnsupportedStatus,
			Error::Authentication(_) => ErrorKind::Authentication,
			Error::Parse { .. } => ErrorKind::Parse,
			Error::DiffComputation(_) => ErrorKind::DiffComputation,
			Error::Forge { .. } => ErrorKind::Forge,
			Error::Transport(_) => ErrorKind::Transport,
			Error::Storage(_) => ErrorKind::Storage,
			Error::PageLayout(_) => ErrorKind::PageLayout,
		};
		let status = match error {
			Error::Forge { status, .. } => *status,
			_ => None,
		};
		Self {
			kind,
			message: error.to_string(),
			documentation_url: error.documentation_url().map(str::to_string),
			status,
		}
	}
}

impl From<ErrorBody> for Error {
	/// Rebuilds a typed error on the receiving side of the transport.
	///
	/// Variants with structured fields that are not carried on the wire come
	/// back as [`Error::Forge`] holding the rendered message, which is all the
	/// UI needs from them.
	fn from(body: ErrorBody) -> Self {
		match body.kind {
			ErrorKind::Authentication => Error::Authentication(body.message),
			ErrorKind::UnsupportedStatus => Error::UnsupportedStatus(body.message),
			ErrorKind::DiffComputation => Error::DiffComputation(body.message),
			ErrorKind::Transport => Error::Transport(body.message),
			ErrorKind::Storage => Error::Storage(body.message),
			ErrorKind::PageLayout => Error::PageLayout(body.message),
			_ => Error::Forge {
				message: body.message,
				documentation_url: body.documentation_url,
				status: body.status,
			},
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_authentication_survives_round_trip() {
		let error = Error::Authentication("API client is undefined".into());
		let body = ErrorBody::from(&error);
		assert_eq!(body.kind, ErrorKind::Authentication);

		let json = serde_json::to_string(&body).unwrap();
		let back: ErrorBody = serde_json::from_str(&json).unwrap();
		assert!(Error::from(back).is_authentication());
	}

	#[test]
	fn test_forge_error_keeps_documentation_link() {
		let error = Error::Forge {
			message: "Not Found".into(),
			documentation_url: Some("https://docs.github.com/rest".into()),
			status: Some(404),
		};
		let body = ErrorBody::from(&error);
		assert_eq!(body.status, Some(404));

		let rebuilt = Error::from(body);
		assert_eq!(rebuilt.documentation_url(), Some("https://docs.github.com/rest"));
		assert_eq!(rebuilt.to_string(), "Not Found");
	}

	#[test]
	fn test_content_not_found_message() {
		let error = Error::ContentNotFound {
			path: "process.bpmn".into(),
			reference: "abc123".into(),
		};
		assert_eq!(
			error.to_string(),
			"No content associated with process.bpmn at abc123"
		);
	}
}
