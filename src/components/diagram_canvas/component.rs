//! Leptos component wrapping the diagram canvas.
//!
//! The component creates an HTML canvas element and wires up mouse/wheel
//! event handlers for panning and zooming. An animation loop runs via
//! `requestAnimationFrame` and redraws whenever the viewer's state changed.
//! The loop ends, and the viewer is destroyed, once the canvas leaves the page.

use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent, Window};

use super::render;
use super::scale::ScaleConfig;
use super::theme::DiagramTheme;
use super::viewer::CanvasViewer;
use crate::page::dom::prefers_dark;
use crate::preview::DiagramViewer;

const FRAME_SECONDS: f64 = 0.016;

fn pointer(canvas: &HtmlCanvasElement, ev: &MouseEvent) -> (f64, f64) {
	let rect = canvas.get_bounding_client_rect();
	(
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	)
}

/// Width the canvas should take, once its parent is laid out.
fn parent_width(canvas: &HtmlCanvasElement) -> Option<u32> {
	canvas
		.parent_element()
		.map(|p| p.client_width())
		.filter(|w| *w > 0)
		.map(|w| w as u32)
}

/// Renders one diagram viewer. The canvas tracks its parent's width and has
/// the given height in CSS pixels.
#[component]
pub fn DiagramCanvas(viewer: Rc<CanvasViewer>, height: f64) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let (viewer_init, animate_init) = (viewer.clone(), animate.clone());

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let window: Window = web_sys::window().unwrap();
		let document = window.document().unwrap();

		let width = parent_width(&canvas).unwrap_or(800);
		canvas.set_width(width);
		canvas.set_height(height as u32);
		viewer_init.update(|state| state.resize(width as f64, height));

		let ctx: CanvasRenderingContext2d = canvas
			.get_context("2d")
			.unwrap()
			.unwrap()
			.dyn_into()
			.unwrap();
		let theme = DiagramTheme::for_color_mode(prefers_dark(&document));
		let scale = ScaleConfig::default();

		let (viewer_anim, animate_inner) = (viewer_init.clone(), animate_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			if !canvas.is_connected() {
				viewer_anim.destroy();
			}
			if viewer_anim.is_destroyed() {
				// wasm-bindgen frees a closure dropped during its own call
				// once that call returns.
				animate_inner.borrow_mut().take();
				return;
			}
			// Follows the pane when the split or the page is resized.
			if let Some(width) = parent_width(&canvas).filter(|w| *w != canvas.width()) {
				canvas.set_width(width);
				viewer_anim.update(|state| state.resize(width as f64, height));
			}
			let redraw = viewer_anim.update(|state| {
				state.tick(FRAME_SECONDS);
				state.take_dirty()
			});
			if redraw {
				viewer_anim.with_state(|state| render::render(state, &ctx, &scale, &theme));
			}
			if let Some(ref cb) = *animate_inner.borrow() {
				let _ = web_sys::window()
					.unwrap()
					.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let viewer_md = viewer.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let canvas: HtmlCanvasElement = canvas_ref.get().unwrap().into();
		let (x, y) = pointer(&canvas, &ev);
		viewer_md.update(|state| state.start_pan(x, y));
	};

	let viewer_mm = viewer.clone();
	let scale = ScaleConfig::default();
	let on_mousemove = move |ev: MouseEvent| {
		let canvas: HtmlCanvasElement = canvas_ref.get().unwrap().into();
		let (x, y) = pointer(&canvas, &ev);
		let panning = viewer_mm.update(|state| state.pan_to(x, y));
		if panning {
			return;
		}
		let title = viewer_mm.with_state(|state| {
			let slop = scale.hit_slop / state.transform.zoom;
			let id = state.element_at(x, y, slop)?;
			state.document()?.get(id).map(|el| el.label().to_string())
		});
		let _ = canvas.set_attribute("title", title.as_deref().unwrap_or(""));
	};

	let viewer_mu = viewer.clone();
	let on_mouseup = move |_: MouseEvent| {
		viewer_mu.update(|state| state.end_pan());
	};

	let viewer_ml = viewer.clone();
	let on_mouseleave = move |_: MouseEvent| {
		viewer_ml.update(|state| state.end_pan());
	};

	let viewer_wh = viewer;
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let canvas: HtmlCanvasElement = canvas_ref.get().unwrap().into();
		let (x, y) = pointer(&canvas, &ev);
		let factor = if ev.delta_y() > 0.0 { 0.9 } else { 1.1 };
		viewer_wh.update(|state| state.zoom_at(x, y, factor));
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="mdv-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:wheel=on_wheel
			style="display: block; cursor: grab;"
		/>
	}
}
