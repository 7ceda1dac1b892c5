//! Background entrypoint: owns the forge session and answers page requests.

// Bin target reuses lib deps, silence noisy lint.
#![allow(unused_crate_dependencies)]

use std::rc::Rc;

use model_diff_viewer::config::Settings;
use model_diff_viewer::forge::GithubClient;
use model_diff_viewer::init_logging;
use model_diff_viewer::transport::Background;
use model_diff_viewer::transport::chrome::{ChromeStorage, install_listener, open_options};
use wasm_bindgen_futures::spawn_local;

fn main() {
	init_logging();

	let settings = Settings::default();
	let background = Rc::new(
		Background::new(ChromeStorage, move |token: &str| {
			GithubClient::new(token, &settings.forge)
		})
		.with_options_page(open_options),
	);

	install_listener(background.clone());
	spawn_local(async move { background.initialize().await });
}
