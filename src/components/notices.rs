//! Placeholders shown instead of a preview: loading, error and not logged in.

use leptos::html::Div;
use leptos::prelude::*;
use leptos::task::spawn_local;
use log::warn;
use web_sys::MouseEvent;

use crate::transport::chrome::ChromeTransport;
use crate::transport::{Request, call};

pub const DEFAULT_ERROR: &str = "Sorry, the rich preview can't be displayed for this file.";

#[component]
pub fn Loading() -> impl IntoView {
	view! {
		<div class="mdv-loading" role="status">
			<span class="mdv-spinner"></span>
			"Loading diagram"
		</div>
	}
}

/// Removes the notice it belongs to from the page.
#[component]
fn HideButton(notice: NodeRef<Div>) -> impl IntoView {
	view! {
		<button
			type="button"
			class="btn btn-sm btn-danger"
			on:click=move |_| {
				if let Some(el) = notice.get() {
					el.remove();
				}
			}
		>
			"Hide this message"
		</button>
	}
}

#[component]
pub fn ErrorNotice(
	#[prop(default = None)] message: Option<String>,
	#[prop(default = None)] documentation_url: Option<String>,
) -> impl IntoView {
	let notice = NodeRef::<Div>::new();
	let message = message.unwrap_or_else(|| DEFAULT_ERROR.to_string());

	view! {
		<div node_ref=notice class="mdv-notice" role="alert">
			<div class="mdv-notice-icon">"!"</div>
			<h3>"Something went wrong."</h3>
			<p>{message}</p>
			<div class="mdv-notice-actions">
				{documentation_url.map(|href| view! {
					<a class="btn btn-sm btn-primary" href=href target="_blank" rel="noopener noreferrer">
						"Read more"
					</a>
				})}
				<HideButton notice />
			</div>
		</div>
	}
}

#[component]
pub fn NotLoggedIn() -> impl IntoView {
	let notice = NodeRef::<Div>::new();
	let open_settings = move |_: MouseEvent| {
		spawn_local(async {
			if let Err(e) = call::<(), _>(&ChromeTransport, Request::OpenOptionsPage).await {
				warn!("could not open the settings: {e}");
			}
		});
	};

	view! {
		<div node_ref=notice class="mdv-notice" role="alert">
			<div class="mdv-notice-icon">"!"</div>
			<h3>"You have not authorized the extension to access your Github account."</h3>
			<p>
				"To be able to see a graphical representation of you diagram, please open the settings and follow the instructions to authorize the extension."
			</p>
			<div class="mdv-notice-actions">
				<button type="button" class="btn btn-sm btn-primary" on:click=open_settings>
					"Open the settings"
				</button>
				<HideButton notice />
			</div>
		</div>
	}
}
