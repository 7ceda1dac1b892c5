//! Browser extension bindings: runtime messaging and local storage.

use std::rc::Rc;

use js_sys::{Function, JSON, Object, Promise, Reflect};
use log::{debug, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{JsFuture, spawn_local};

use super::{Request, Response, Transport};
use crate::config::CREDENTIAL_KEY;
use crate::error::{Error, Result};
use crate::forge::Forge;
use crate::session::CredentialStore;
use crate::transport::Background;

#[wasm_bindgen]
extern "C" {
	#[wasm_bindgen(js_namespace = ["chrome", "runtime"], js_name = sendMessage, catch)]
	fn send_message(message: &JsValue) -> std::result::Result<Promise, JsValue>;

	#[wasm_bindgen(js_namespace = ["chrome", "runtime"], js_name = openOptionsPage)]
	fn open_options_page();

	#[wasm_bindgen(js_namespace = ["chrome", "runtime", "onMessage"], js_name = addListener)]
	fn add_message_listener(listener: &Closure<dyn FnMut(JsValue, JsValue, Function) -> bool>);

	#[wasm_bindgen(js_namespace = ["chrome", "storage", "local"], js_name = get, catch)]
	fn storage_get(keys: &JsValue) -> std::result::Result<Promise, JsValue>;

	#[wasm_bindgen(js_namespace = ["chrome", "storage", "local"], js_name = set, catch)]
	fn storage_set(items: &JsValue) -> std::result::Result<Promise, JsValue>;
}

fn js_error(context: &str, value: JsValue) -> String {
	let detail = value
		.as_string()
		.or_else(|| {
			JSON::stringify(&value)
				.ok()
				.and_then(|s| s.as_string())
		})
		.unwrap_or_else(|| "unknown error".to_string());
	format!("{context}: {detail}")
}

fn to_js<T: serde::Serialize>(value: &T) -> Result<JsValue> {
	let serializer = serde_wasm_bindgen::Serializer::json_compatible();
	value
		.serialize(&serializer)
		.map_err(|e| Error::Transport(e.to_string()))
}

/// Reads a JS value through its JSON text; integers stay integers that way.
fn from_js<T: serde::de::DeserializeOwned>(value: &JsValue) -> Result<T> {
	if value.is_undefined() {
		return Ok(serde_json::from_value(serde_json::Value::Null)?);
	}
	let text = JSON::stringify(value)
		.map_err(|e| Error::Transport(js_error("unserializable message", e)))?
		.as_string()
		.unwrap_or_else(|| "null".to_string());
	Ok(serde_json::from_str(&text)?)
}

/// Page-side transport over `chrome.runtime.sendMessage`.
#[derive(Clone, Copy, Debug, Default)]
pub struct ChromeTransport;

impl ChromeTransport {
	async fn round_trip(&self, request: &Request) -> Result<Response> {
		let message = to_js(request)?;
		let promise = send_message(&message)
			.map_err(|e| Error::Transport(js_error("sendMessage failed", e)))?;
		let reply = JsFuture::from(promise)
			.await
			.map_err(|e| Error::Transport(js_error("no response from background", e)))?;
		from_js(&reply)
	}
}

impl Transport for ChromeTransport {
	async fn send(&self, request: Request) -> Response {
		match self.round_trip(&request).await {
			Ok(response) => response,
			Err(e) => {
				warn!("{} failed: {e}", request.id());
				Response::error(&e)
			}
		}
	}
}

/// The access credential in `chrome.storage.local`.
#[derive(Clone, Copy, Debug, Default)]
pub struct ChromeStorage;

impl CredentialStore for ChromeStorage {
	async fn load(&self) -> Result<Option<String>> {
		let promise = storage_get(&JsValue::from_str(CREDENTIAL_KEY))
			.map_err(|e| Error::Storage(js_error("storage.get failed", e)))?;
		let items = JsFuture::from(promise)
			.await
			.map_err(|e| Error::Storage(js_error("storage.get failed", e)))?;
		let token = Reflect::get(&items, &JsValue::from_str(CREDENTIAL_KEY))
			.map_err(|e| Error::Storage(js_error("storage.get failed", e)))?;
		Ok(token.as_string())
	}

	async fn store(&self, token: &str) -> Result<()> {
		let items = Object::new();
		Reflect::set(
			&items,
			&JsValue::from_str(CREDENTIAL_KEY),
			&JsValue::from_str(token),
		)
		.map_err(|e| Error::Storage(js_error("storage.set failed", e)))?;
		let promise = storage_set(&items).map_err(|e| Error::Storage(js_error("storage.set failed", e)))?;
		JsFuture::from(promise)
			.await
			.map_err(|e| Error::Storage(js_error("storage.set failed", e)))?;
		Ok(())
	}
}

/// Opens the extension's options page.
pub fn open_options() {
	open_options_page();
}

/// Routes `chrome.runtime.onMessage` into `background`.
///
/// Each message is answered asynchronously, so the listener returns `true`
/// to keep the response channel open.
pub fn install_listener<F, S, C>(background: Rc<Background<F, S, C>>)
where
	F: Forge + 'static,
	S: CredentialStore + 'static,
	C: Fn(&str) -> Result<F> + 'static,
{
	let listener = Closure::<dyn FnMut(JsValue, JsValue, Function) -> bool>::new(
		move |message: JsValue, _sender: JsValue, send_response: Function| {
			let background = background.clone();
			spawn_local(async move {
				let response = match from_js::<Request>(&message) {
					Ok(request) => background.handle(request).await,
					Err(e) => Response::error(&e),
				};
				let reply = to_js(&response).unwrap_or(JsValue::NULL);
				if let Err(e) = send_response.call1(&JsValue::NULL, &reply) {
					debug!("{}", js_error("sendResponse failed", e));
				}
			});
			true
		},
	);
	add_message_listener(&listener);
	// The listener lives as long as the background context.
	listener.forget();
}
