//! Rich rendering of a single file on a blob page.

use leptos::prelude::*;

use super::file_diff::{PreviewBody, bind_source_display};
use crate::config::Settings;
use crate::forge::FileDiff;
use crate::notation::Notation;
use crate::page::dom::Containers;
use crate::preview::{DisplayMode, prepare};

/// The content is already fetched, so the view starts past `Loading`.
#[component]
pub fn FilePreviewView(
	notation: Notation,
	content: String,
	containers: Containers,
	mode: RwSignal<DisplayMode>,
) -> impl IntoView {
	let sides = FileDiff {
		before: None,
		after: Some(content),
	};
	let state = RwSignal::new_local(prepare(notation, sides));
	let height = notation.support().viewer.height;
	bind_source_display(containers, mode);

	view! {
		<div class="mdv-preview" style:display=move || mode.get().display_values().0>
			<PreviewBody state height settings=Settings::default() />
		</div>
	}
}
