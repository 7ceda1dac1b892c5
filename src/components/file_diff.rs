//! Per-file preview: runs the load pipeline and renders its outcome.

use std::cell::RefCell;
use std::rc::Rc;

use leptos::either::{Either, EitherOf5};
use leptos::prelude::*;
use leptos::task::spawn_local;
use log::warn;
use web_sys::MouseEvent;

use super::change_list::ChangeListDialog;
use super::controls::LayerToggle;
use super::diagram_canvas::{CanvasViewer, DiagramCanvas};
use super::notices::{ErrorNotice, Loading, NotLoggedIn};
use crate::config::Settings;
use crate::diff::DiffResult;
use crate::diff::changes::ChangeList;
use crate::model::ParsedDocument;
use crate::notation::Notation;
use crate::page::dom::Containers;
use crate::preview::overlay::{apply_layers, reveal};
use crate::preview::{
	DiagramViewer, DisplayMode, FileIdentity, LayerVisibility, Notice, PreviewMachine,
	PreviewState, Side, Split, ViewportSync, load_preview,
};
use crate::transport::chrome::ChromeTransport;

const DEFAULT_HEIGHT: f64 = 300.0;

/// Keeps the host's source rendering hidden whenever the preview is shown.
pub(crate) fn bind_source_display(containers: Containers, mode: RwSignal<DisplayMode>) {
	Effect::new(move |_| {
		let (_, source) = mode.get().display_values();
		containers.set_source_display(source);
	});
}

/// Renders a [`PreviewState`] for a file of the given height.
#[component]
pub fn PreviewBody(
	state: RwSignal<PreviewState, LocalStorage>,
	height: f64,
	settings: Settings,
) -> impl IntoView {
	let layers = settings.layers;
	let page_size = settings.change_list.page_size;
	move || match state.get() {
		PreviewState::Loading => EitherOf5::A(view! { <Loading /> }),
		PreviewState::Error(Notice::NotLoggedIn) => EitherOf5::B(view! { <NotLoggedIn /> }),
		PreviewState::Error(Notice::Generic {
			message,
			documentation_url,
		}) => EitherOf5::C(view! { <ErrorNotice message=Some(message) documentation_url /> }),
		PreviewState::Single { side, document } => {
			EitherOf5::D(view! { <SingleViewer side document height /> })
		}
		PreviewState::Dual {
			before,
			after,
			diff,
		} => EitherOf5::E(view! { <DualViewer before after diff height layers page_size /> }),
	}
}

/// Rich preview of one changed file, mounted into its `.js-file-content`.
#[component]
pub fn FileDiffView(
	identity: FileIdentity,
	containers: Containers,
	mode: RwSignal<DisplayMode>,
	#[prop(default = Settings::default())] settings: Settings,
) -> impl IntoView {
	let height = Notation::from_filename(&identity.file.filename)
		.map(|n| n.support().viewer.height)
		.unwrap_or(DEFAULT_HEIGHT);
	let state = RwSignal::new_local(PreviewState::Loading);
	let machine = Rc::new(RefCell::new(PreviewMachine::default()));

	let ticket = machine.borrow_mut().begin(&identity);
	if let Some(ticket) = ticket {
		let machine = machine.clone();
		spawn_local(async move {
			let loaded = load_preview(&ChromeTransport, &identity).await;
			if machine.borrow_mut().complete(ticket, loaded.clone()) {
				state.set(loaded);
			}
		});
	}
	// Unmounted mid-load, e.g. after navigating away.
	let machine = StoredValue::new_local(machine);
	on_cleanup(move || {
		machine.try_with_value(|machine| machine.borrow_mut().cancel());
	});
	bind_source_display(containers, mode);

	view! {
		<div class="mdv-preview" style:display=move || mode.get().display_values().0>
			<PreviewBody state height settings />
		</div>
	}
}

#[component]
pub fn SingleViewer(side: Side, document: Rc<ParsedDocument>, height: f64) -> impl IntoView {
	let viewer = CanvasViewer::new();
	if let Err(e) = viewer.import(document) {
		warn!("{side:?} viewer: {e}");
	}
	let viewers = StoredValue::new_local(viewer.clone());
	on_cleanup(move || {
		viewers.try_with_value(|viewer| viewer.destroy());
	});
	let caption = match side {
		Side::Before => "Before",
		Side::After => "After",
	};

	view! {
		<div class="mdv-single">
			<div class="mdv-side-label">{caption}</div>
			<DiagramCanvas viewer height />
		</div>
	}
}

/// Before and after side by side with a synced viewport and the diff overlay.
#[component]
pub fn DualViewer(
	before: Rc<ParsedDocument>,
	after: Rc<ParsedDocument>,
	diff: Option<Rc<DiffResult>>,
	height: f64,
	layers: LayerVisibility,
	page_size: usize,
) -> impl IntoView {
	let (before_viewer, after_viewer) = (CanvasViewer::new(), CanvasViewer::new());
	for (viewer, document, side) in [
		(&before_viewer, before, Side::Before),
		(&after_viewer, after, Side::After),
	] {
		if let Err(e) = viewer.import(document) {
			warn!("{side:?} viewer: {e}");
		}
	}
	let dyn_before: Rc<dyn DiagramViewer> = before_viewer.clone();
	let dyn_after: Rc<dyn DiagramViewer> = after_viewer.clone();
	let sync = ViewportSync::link(&dyn_before, &dyn_after);

	let viewers = StoredValue::new_local((before_viewer.clone(), after_viewer.clone(), sync));
	on_cleanup(move || {
		viewers.try_with_value(|(before, after, _)| {
			before.destroy();
			after.destroy();
		});
	});

	let layers = RwSignal::new(layers);
	if let Some(diff) = diff.clone() {
		let (before, after) = (before_viewer.clone(), after_viewer.clone());
		Effect::new(move |_| apply_layers(before.as_ref(), after.as_ref(), &diff, layers.get()));
	}
	let on_select = Callback::new(move |id: String| {
		viewers.with_value(|(before, after, _)| reveal(before.as_ref(), after.as_ref(), &id));
	});

	let toolbar = match diff.as_deref() {
		Some(diff) => {
			let list = ChangeList::new(diff, page_size);
			Either::Left(view! {
				<LayerToggle layers />
				<ChangeListDialog list on_select />
			})
		}
		None => Either::Right(view! {
			<span class="mdv-muted">"No diff available for this file."</span>
		}),
	};

	let split = RwSignal::new(Split::default());
	let sides_ref = NodeRef::<leptos::html::Div>::new();
	let on_divider_down = move |ev: MouseEvent| {
		ev.prevent_default();
		split.update(|split| split.start_drag(ev.client_x() as f64));
	};
	let on_sides_move = move |ev: MouseEvent| {
		if !split.with_untracked(Split::is_dragging) {
			return;
		}
		let width = sides_ref.get().map_or(0.0, |sides| sides.client_width() as f64);
		split.update(|split| split.drag_to(ev.client_x() as f64, width));
	};
	let on_drag_end = move |_: MouseEvent| split.update(Split::end_drag);
	let grow = move |before: bool| {
		let ratio = split.with(Split::ratio);
		format!("{} 1 0", if before { ratio } else { 1.0 - ratio })
	};

	view! {
		<div class="mdv-dual">
			<div class="mdv-toolbar">{toolbar}</div>
			<div
				class=move || {
					if split.with(Split::is_dragging) { "mdv-sides mdv-resizing" } else { "mdv-sides" }
				}
				node_ref=sides_ref
				on:mousemove=on_sides_move
				on:mouseup=on_drag_end
				on:mouseleave=on_drag_end
			>
				<div class="mdv-side" style:flex=move || grow(true)>
					<div class="mdv-side-label">"Before"</div>
					<DiagramCanvas viewer=before_viewer height />
				</div>
				<div
					class="mdv-divider"
					title="Drag to resize, double-click to reset"
					on:mousedown=on_divider_down
					on:dblclick=move |_| split.update(Split::reset)
				/>
				<div class="mdv-side" style:flex=move || grow(false)>
					<div class="mdv-side-label">"After"</div>
					<DiagramCanvas viewer=after_viewer height />
				</div>
			</div>
		</div>
	}
}
