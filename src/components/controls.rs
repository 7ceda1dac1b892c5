//! Toolbar controls: the source/rich toggle and the overlay layer toggle.

use leptos::prelude::*;

use crate::diff::ChangeKind;
use crate::preview::{DisplayMode, LayerVisibility};

const SOURCE_TEXT: &str = "Display the source diff";
const RICH_TEXT: &str = "Display the rich diff";

fn button_class(selected: bool) -> &'static str {
	if selected {
		"btn btn-sm BtnGroup-item selected"
	} else {
		"btn btn-sm BtnGroup-item"
	}
}

/// Two buttons; exactly one of the preview and the host's source diff is shown.
#[component]
pub fn SourceRichToggle(mode: RwSignal<DisplayMode>) -> impl IntoView {
	view! {
		<div class="BtnGroup mdv-toggle">
			<button
				type="button"
				class=move || button_class(mode.get().source_visible())
				title=SOURCE_TEXT
				aria-label=SOURCE_TEXT
				on:click=move |_| mode.set(DisplayMode::Source)
			>
				"Source"
			</button>
			<button
				type="button"
				class=move || button_class(mode.get().rich_visible())
				title=RICH_TEXT
				aria-label=RICH_TEXT
				on:click=move |_| mode.set(DisplayMode::Rich)
			>
				"Rich"
			</button>
		</div>
	}
}

const LAYERS: [(ChangeKind, &str); 4] = [
	(ChangeKind::Added, "Added"),
	(ChangeKind::Removed, "Removed"),
	(ChangeKind::LayoutChanged, "Layout changed"),
	(ChangeKind::Changed, "Attributes changed"),
];

/// One checkbox per overlay layer.
#[component]
pub fn LayerToggle(layers: RwSignal<LayerVisibility>) -> impl IntoView {
	let boxes = LAYERS
		.into_iter()
		.map(|(kind, label)| {
			view! {
				<label class=format!("mdv-layer {}", kind.marker_class())>
					<input
						type="checkbox"
						prop:checked=move || layers.with(|l| l.is_visible(kind))
						on:change=move |_| layers.update(|l| l.toggle(kind))
					/>
					<span class="mdv-glyph">{kind.glyph()}</span>
					{label}
				</label>
			}
		})
		.collect_view();

	view! { <div class="mdv-layers">{boxes}</div> }
}
