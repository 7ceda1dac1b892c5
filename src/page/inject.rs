//! Mounts previews and notices into the host page.
//!
//! Injection re-runs when GitHub loads more diff content, and starts over on
//! every client-side navigation. Each mount is tracked, so leaving a page or
//! losing a host element unmounts the view and runs its cleanup.

use std::any::Any;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

use leptos::either::Either;
use leptos::mount::mount_to;
use leptos::prelude::*;
use leptos::task::spawn_local;
use log::{debug, info, warn};
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlElement, MutationObserver, MutationObserverInit};

use super::dom::{Containers, injectable_elements, supported_file_elements};
use super::navigation::{NAVIGATION_EVENTS, Navigation};
use super::plan::{PagePlan, resolve_page};
use crate::components::{
	ErrorNotice, FileDiffView, FilePreviewView, NotLoggedIn, STYLE_ID, SourceRichToggle,
	ViewerStyles,
};
use crate::preview::{DisplayMode, FileIdentity, Notice};
use crate::transport::chrome::ChromeTransport;

/// Set on every element a preview or notice has been mounted for.
const INJECTED_ATTR: &str = "data-model-diff-viewer";

/// Containers GitHub fills in after the initial page load.
const LATE_CONTAINERS: &str = ".js-diff-load-container, .js-diff-progressive-container";

/// One mounted view.
struct Mount {
	/// Element carrying [`INJECTED_ATTR`] for this view.
	claimed: Element,
	/// Node created to host the view, removed with it.
	host: Option<HtmlElement>,
	/// Leptos `UnmountHandle`; dropping it unmounts the view and disposes
	/// its owner.
	_handle: Box<dyn Any>,
}

impl Drop for Mount {
	fn drop(&mut self) {
		let _ = self.claimed.remove_attribute(INJECTED_ATTR);
		if let Some(host) = &self.host {
			host.remove();
		}
	}
}

/// Observer on the late containers of the current page.
struct LateObserver {
	observer: MutationObserver,
	_callback: Closure<dyn FnMut(js_sys::Array, MutationObserver)>,
}

impl Drop for LateObserver {
	fn drop(&mut self) {
		self.observer.disconnect();
	}
}

/// Page-script state that lives across navigations.
struct Injector {
	document: Document,
	navigation: RefCell<Navigation>,
	plan: RefCell<Option<Rc<PagePlan>>>,
	mounts: RefCell<Vec<Mount>>,
	observer: RefCell<Option<LateObserver>>,
}

/// Handles the current page, then every page GitHub navigates to.
pub async fn run() {
	let Some(document) = web_sys::window().and_then(|w| w.document()) else {
		return;
	};
	let injector = Rc::new(Injector {
		document,
		navigation: RefCell::new(Navigation::default()),
		plan: RefCell::new(None),
		mounts: RefCell::new(Vec::new()),
		observer: RefCell::new(None),
	});
	injector.listen();
	injector.visit().await;
}

fn install_styles(document: &Document) {
	if document.get_element_by_id(STYLE_ID).is_some() {
		return;
	}
	if let Some(body) = document.body() {
		mount_to(body, || view! { <ViewerStyles /> }).forget();
	}
}

/// Marks `element` as handled. False if it already was.
fn claim(element: &Element) -> bool {
	if element.has_attribute(INJECTED_ATTR) {
		return false;
	}
	let _ = element.set_attribute(INJECTED_ATTR, "");
	true
}

impl Injector {
	/// Starts a visit after every navigation, and on history traversal.
	fn listen(self: &Rc<Self>) {
		let injector = self.clone();
		let callback = Closure::<dyn FnMut()>::new(move || {
			spawn_local(injector.clone().visit());
		});
		let target = callback.as_ref().unchecked_ref();
		for event in NAVIGATION_EVENTS {
			if let Err(e) = self.document.add_event_listener_with_callback(event, target) {
				warn!("cannot listen for {event}: {e:?}");
			}
		}
		if let Some(window) = web_sys::window() {
			let _ = window.add_event_listener_with_callback("popstate", target);
		}
		// Listens for the lifetime of the page.
		callback.forget();
	}

	async fn visit(self: Rc<Self>) {
		let Some(href) = web_sys::window().and_then(|w| w.location().href().ok()) else {
			return;
		};
		let visit = self.navigation.borrow_mut().visit(&href);
		if !visit.changed {
			let plan = self.plan.borrow().clone();
			if let Some(plan) = plan {
				self.inject(&plan);
			}
			return;
		}

		self.reset();
		let Some(kind) = visit.kind else {
			debug!("{href} is not a supported page");
			return;
		};
		let plan = Rc::new(resolve_page(&ChromeTransport, &kind).await);
		if !self.navigation.borrow().is_current(visit.generation) {
			debug!("discarding plan of visit {}, the page was left", visit.generation);
			return;
		}

		install_styles(&self.document);
		*self.plan.borrow_mut() = Some(plan.clone());
		self.inject(&plan);
		if !matches!(*plan, PagePlan::Preview { .. } | PagePlan::Skip) {
			self.observe_late_containers();
		}
	}

	/// Unmounts everything from the previous page.
	fn reset(&self) {
		self.observer.borrow_mut().take();
		self.plan.borrow_mut().take();
		let mounts = std::mem::take(&mut *self.mounts.borrow_mut());
		if !mounts.is_empty() {
			debug!("unmounting {} views", mounts.len());
		}
		drop(mounts);
	}

	/// Unmounts views whose element GitHub took off the page.
	fn prune(&self) {
		let stale: Vec<Mount> = {
			let mut mounts = self.mounts.borrow_mut();
			let (live, stale): (Vec<Mount>, Vec<Mount>) = std::mem::take(&mut *mounts)
				.into_iter()
				.partition(|mount| mount.claimed.is_connected());
			*mounts = live;
			stale
		};
		if !stale.is_empty() {
			debug!("unmounting {} views removed from the page", stale.len());
		}
	}

	fn keep(&self, claimed: &Element, host: Option<HtmlElement>, handle: impl Any) {
		self.mounts.borrow_mut().push(Mount {
			claimed: claimed.clone(),
			host,
			_handle: Box::new(handle),
		});
	}

	/// Mounts everything `plan` calls for that is not on the page yet.
	fn inject(&self, plan: &PagePlan) {
		self.prune();
		match plan {
			PagePlan::NotLoggedIn => self.notify_files(&Notice::NotLoggedIn),
			PagePlan::Error(notice) => self.notify_files(notice),
			PagePlan::Diff {
				owner,
				repo,
				sha,
				parent_sha,
				files,
			} => {
				let matched = match injectable_elements(&self.document, files) {
					Ok(matched) => matched,
					Err(e) => {
						warn!("{e}");
						return;
					}
				};
				for (element, file) in matched {
					if !claim(&element) {
						continue;
					}
					let identity = FileIdentity {
						owner: owner.clone(),
						repo: repo.clone(),
						sha: sha.clone(),
						parent_sha: parent_sha.clone(),
						file,
					};
					match Containers::for_file(&element) {
						Ok(containers) => self.mount_file_diff(&element, identity, containers),
						Err(e) => {
							let _ = element.remove_attribute(INJECTED_ATTR);
							warn!("{}: {e}", identity.file.filename);
						}
					}
				}
			}
			PagePlan::Preview {
				notation,
				path,
				content,
			} => {
				let containers = match Containers::for_preview(&self.document) {
					Ok(containers) => containers,
					Err(e) => {
						warn!("{path}: {e}");
						return;
					}
				};
				if !claim(&containers.content) {
					return;
				}
				info!("rendering {notation} preview of {path}");
				let claimed: Element = containers.content.clone().into();
				let mode = RwSignal::new(DisplayMode::Rich);
				self.mount_toggle(&claimed, &containers.toolbar, mode);
				let (notation, content) = (*notation, content.clone());
				let host = containers.content.clone();
				let handle = mount_to(host, move || {
					view! { <FilePreviewView notation content containers mode /> }
				});
				self.keep(&claimed, None, handle);
			}
			PagePlan::Skip => {}
		}
	}

	fn mount_toggle(&self, claimed: &Element, toolbar: &HtmlElement, mode: RwSignal<DisplayMode>) {
		let handle = mount_to(toolbar.clone(), move || view! { <SourceRichToggle mode /> });
		self.keep(claimed, None, handle);
	}

	fn mount_file_diff(&self, claimed: &Element, identity: FileIdentity, containers: Containers) {
		let mode = RwSignal::new(DisplayMode::Rich);
		self.mount_toggle(claimed, &containers.toolbar, mode);
		let host = containers.content.clone();
		let handle = mount_to(host, move || view! { <FileDiffView identity containers mode /> });
		self.keep(claimed, None, handle);
	}

	/// Puts `notice` at the top of every supported file's content.
	fn notify_files(&self, notice: &Notice) {
		for element in supported_file_elements(&self.document) {
			if !claim(&element) {
				continue;
			}
			let containers = match Containers::for_file(&element) {
				Ok(containers) => containers,
				Err(e) => {
					let _ = element.remove_attribute(INJECTED_ATTR);
					warn!("{e}");
					continue;
				}
			};
			let Some(host) = self
				.document
				.create_element("div")
				.ok()
				.and_then(|el| el.dyn_into::<HtmlElement>().ok())
			else {
				continue;
			};
			let _ = containers.content.prepend_with_node_1(&host);

			let notice = notice.clone();
			let handle = mount_to(host.clone(), move || match notice {
				Notice::NotLoggedIn => Either::Left(view! { <NotLoggedIn /> }),
				Notice::Generic {
					message,
					documentation_url,
				} => Either::Right(view! { <ErrorNotice message=Some(message) documentation_url /> }),
			});
			self.keep(&element, Some(host), handle);
		}
	}

	/// Re-runs [`Injector::inject`] whenever a late container gains children.
	fn observe_late_containers(self: &Rc<Self>) {
		let Ok(containers) = self.document.query_selector_all(LATE_CONTAINERS) else {
			return;
		};
		if containers.length() == 0 {
			return;
		}

		let injector: Weak<Self> = Rc::downgrade(self);
		let callback = Closure::<dyn FnMut(js_sys::Array, MutationObserver)>::new(
			move |_records: js_sys::Array, _observer: MutationObserver| {
				let Some(injector) = injector.upgrade() else {
					return;
				};
				let plan = injector.plan.borrow().clone();
				if let Some(plan) = plan {
					debug!("diff content loaded late, injecting again");
					injector.inject(&plan);
				}
			},
		);
		let Ok(observer) = MutationObserver::new(callback.as_ref().unchecked_ref()) else {
			return;
		};
		let init = MutationObserverInit::new();
		init.set_child_list(true);
		for node in (0..containers.length()).filter_map(|i| containers.item(i)) {
			if let Err(e) = observer.observe_with_options(&node, &init) {
				warn!("cannot observe late container: {e:?}");
			}
		}
		*self.observer.borrow_mut() = Some(LateObserver {
			observer,
			_callback: callback,
		});
	}
}
