//! model-diff-viewer: rich BPMN and DMN previews for GitHub.
//!
//! The crate builds two wasm entrypoints. The page script (`src/main.rs`)
//! recognizes pull request, commit and blob pages, asks the background for
//! file contents and mounts side-by-side diagram viewers with a structural
//! diff overlay. The background script (`src/bin/background.rs`) owns the
//! GitHub token and answers those requests.

use log::{Level, info};

pub mod components;
pub mod config;
pub mod diff;
pub mod error;
pub mod forge;
pub mod model;
pub mod notation;
pub mod page;
pub mod preview;
pub mod session;
pub mod transport;

pub use error::{Error, ErrorKind, Result};
pub use notation::Notation;

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("model-diff-viewer: logging initialized");
}
