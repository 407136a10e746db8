//! Programmatic data ingress for embedding pages and notebooks.
//!
//! Two entry points feed the same handler while an [`IngressSubscription`] is
//! alive: a window `message` listener accepting
//! `postMessage({ type: "graph-data", data })`, and a `window.loadGraphData(data)`
//! function. Dropping the subscription removes both.
//!
//! Posted messages are accepted only from the page's own origin.

use std::rc::Rc;

use log::{debug, info, warn};
use wasm_bindgen::prelude::*;
use web_sys::MessageEvent;

use crate::data::ingest::parse_payload_str;
use crate::data::{LoadError, Payload, parse_payload};

/// `type` field of a posted message carrying graph data.
pub const MESSAGE_TYPE: &str = "graph-data";
/// Name of the window function installed for direct calls.
pub const LOADER_NAME: &str = "loadGraphData";

/// Whether a posted message came from the page's own origin.
fn same_origin(message_origin: &str, page_origin: &str) -> bool {
	!page_origin.is_empty() && message_origin == page_origin
}

/// Converts a JS value (row array, JSON string or envelope object) into a payload.
pub fn payload_from_js(value: JsValue) -> Result<Payload, LoadError> {
	if let Some(text) = value.as_string() {
		return parse_payload_str(&text);
	}
	let json: serde_json::Value = serde_wasm_bindgen::from_value(value)
		.map_err(|e| LoadError::payload_detail(e.to_string()))?;
	parse_payload(json)
}

/// Registered ingress handlers. Unregisters on drop.
pub struct IngressSubscription {
	on_message: Closure<dyn FnMut(MessageEvent)>,
	loader: Closure<dyn FnMut(JsValue)>,
}

impl IngressSubscription {
	/// Installs both entry points. `handler` receives every decoded payload or
	/// the error that decoding it produced.
	pub fn register(handler: impl Fn(Result<Payload, LoadError>) + 'static) -> Option<Self> {
		let window = web_sys::window()?;
		let handler: Rc<dyn Fn(Result<Payload, LoadError>)> = Rc::new(handler);

		let on_message = {
			let handler = handler.clone();
			let page_origin = window.location().origin().unwrap_or_default();
			Closure::<dyn FnMut(MessageEvent)>::new(move |ev: MessageEvent| {
				let origin = ev.origin();
				if !same_origin(&origin, &page_origin) {
					debug!("ignoring message from origin {}", origin);
					return;
				}
				let message = ev.data();
				let kind = js_sys::Reflect::get(&message, &JsValue::from_str("type"))
					.ok()
					.and_then(|v| v.as_string());
				if kind.as_deref() != Some(MESSAGE_TYPE) {
					debug!("ignoring message of type {:?}", kind);
					return;
				}
				let data = js_sys::Reflect::get(&message, &JsValue::from_str("data"))
					.unwrap_or(JsValue::UNDEFINED);
				let result = payload_from_js(data);
				if let Err(e) = &result {
					warn!("posted graph data rejected: {}", e);
				}
				handler(result);
			})
		};
		if let Err(e) =
			window.add_event_listener_with_callback("message", on_message.as_ref().unchecked_ref())
		{
			warn!("could not listen for messages: {:?}", e);
			return None;
		}

		let loader = Closure::<dyn FnMut(JsValue)>::new(move |data: JsValue| {
			let result = payload_from_js(data);
			if let Err(e) = &result {
				warn!("{} rejected data: {}", LOADER_NAME, e);
			}
			handler(result);
		});
		if let Err(e) = js_sys::Reflect::set(&window, &JsValue::from_str(LOADER_NAME), loader.as_ref()) {
			warn!("could not install window.{}: {:?}", LOADER_NAME, e);
		}

		info!("data ingress registered");
		Some(Self { on_message, loader })
	}
}

impl Drop for IngressSubscription {
	fn drop(&mut self) {
		let Some(window) = web_sys::window() else {
			return;
		};
		let _ = window
			.remove_event_listener_with_callback("message", self.on_message.as_ref().unchecked_ref());
		let installed = js_sys::Reflect::get(&window, &JsValue::from_str(LOADER_NAME))
			.is_ok_and(|f| f == *self.loader.as_ref());
		if installed {
			let _ = js_sys::Reflect::delete_property(&window, &JsValue::from_str(LOADER_NAME));
		}
		info!("data ingress removed");
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn only_the_page_origin_may_post() {
		let page = "https://graphs.example.org";
		assert!(same_origin("https://graphs.example.org", page));
		assert!(!same_origin("https://evil.example.com", page));
		assert!(!same_origin("http://graphs.example.org", page));
		assert!(!same_origin("null", page));
		assert!(!same_origin("", ""));
	}
}
