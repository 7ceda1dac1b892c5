//! Page script entrypoint, injected into GitHub pages.

// Bin target reuses lib deps, silence noisy lint.
#![allow(unused_crate_dependencies)]

use model_diff_viewer::{init_logging, page};
use wasm_bindgen_futures::spawn_local;

fn main() {
	init_logging();
	spawn_local(page::run());
}
