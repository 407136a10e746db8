//! relation-graph: interactive force-directed visualization of tabular relationship data.
//!
//! Rows from a CSV file, a bundled sample, a URL parameter or a programmatic
//! payload are folded into an immutable graph of entities and typed
//! relationships, then laid out with a force simulation on a canvas with
//! pan/zoom, dragging, hover highlights and a legend filter.

use leptos::prelude::*;
use leptos_meta::*;
use log::{Level, info, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::{JsFuture, spawn_local};
use web_sys::{File, HtmlInputElement, Response};

pub mod components;
pub mod data;
pub mod ingress;

pub use components::force_graph::{ForceGraphCanvas, ForceGraphState, Theme};
pub use data::{
	ColumnMapping, ColumnRole, DataSession, Edge, GraphModel, LoadError, Node, Payload, Row,
	SAMPLES, SampleDataset, check_extension, parse_csv, parse_payload, payload_from_query,
	process_rows,
};
pub use ingress::IngressSubscription;

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("relation-graph: logging initialized");
}

fn js_message(e: &JsValue) -> String {
	e.as_string().unwrap_or_else(|| format!("{:?}", e))
}

async fn read_file(file: &File) -> Result<String, LoadError> {
	let text = JsFuture::from(file.text())
		.await
		.map_err(|e| LoadError::Parse(js_message(&e)))?;
	text.as_string()
		.ok_or_else(|| LoadError::Parse("file is not text".into()))
}

async fn fetch_text(path: &str) -> Result<String, LoadError> {
	let fetch_error = |e: JsValue| LoadError::Fetch(js_message(&e));
	let window = web_sys::window().ok_or_else(|| LoadError::Fetch("no window".into()))?;
	let response: Response = JsFuture::from(window.fetch_with_str(path))
		.await
		.map_err(fetch_error)?
		.dyn_into()
		.map_err(fetch_error)?;
	if !response.ok() {
		return Err(LoadError::Fetch(format!(
			"{} returned HTTP {}",
			path,
			response.status()
		)));
	}
	let text = JsFuture::from(response.text().map_err(fetch_error)?)
		.await
		.map_err(fetch_error)?;
	text.as_string()
		.ok_or_else(|| LoadError::Fetch(format!("{} is not text", path)))
}

/// Main application component.
///
/// Owns the data session and wires every ingestion channel into it. A new
/// graph reaches the canvas only after it was built in full.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	let session = RwSignal::new(DataSession::default());
	let graph = RwSignal::new(None::<std::sync::Arc<GraphModel>>);
	let error = RwSignal::new(None::<String>);
	let loading = RwSignal::new(false);
	let directed = RwSignal::new(false);

	let commit = move |rows: Vec<Row>, mapping: Option<ColumnMapping>| -> Result<(), LoadError> {
		let model = session.write().load(rows, mapping)?;
		graph.set(Some(model));
		Ok(())
	};

	let report = move |result: Result<(), LoadError>| {
		match result {
			Ok(()) => error.set(None),
			Err(e) => {
				warn!("relation-graph: load failed: {}", e);
				error.set(Some(e.to_string()));
			}
		}
		loading.set(false);
	};

	// Best effort: a bad URL payload is logged, never shown.
	if let Some(search) = web_sys::window().and_then(|w| w.location().search().ok()) {
		match payload_from_query(&search) {
			Ok(Some(payload)) => {
				if let Err(e) = commit(payload.rows, payload.mapping) {
					warn!("relation-graph: URL data ignored: {}", e);
				}
			}
			Ok(None) => {}
			Err(e) => warn!("relation-graph: URL data ignored: {}", e),
		}
	}

	let ingress = StoredValue::new_local(IngressSubscription::register(move |payload| {
		report(payload.and_then(|p| commit(p.rows, p.mapping)));
	}));
	on_cleanup(move || {
		ingress.update_value(|subscription| {
			subscription.take();
		});
	});

	let on_file = move |ev: leptos::ev::Event| {
		let input: HtmlInputElement = event_target(&ev);
		let Some(file) = input.files().and_then(|files| files.get(0)) else {
			return;
		};
		if let Err(e) = check_extension(&file.name()) {
			report(Err(e));
			return;
		}
		loading.set(true);
		spawn_local(async move {
			let result = read_file(&file)
				.await
				.and_then(|text| parse_csv(&text))
				.and_then(|rows| commit(rows, None));
			report(result);
		});
	};

	let load_sample = move |sample: SampleDataset| {
		loading.set(true);
		spawn_local(async move {
			let result = fetch_text(sample.path)
				.await
				.and_then(|text| parse_csv(&text))
				.and_then(|rows| commit(rows, Some(sample.mapping())));
			report(result);
		});
	};

	let role_select = move |role: ColumnRole, label: &'static str| {
		let on_change = move |ev: leptos::ev::Event| {
			let value = event_target_value(&ev);
			let mut mapping = session.with_untracked(|s| s.mapping().clone());
			mapping.set(role, (!value.is_empty()).then_some(value));
			let result = session.write().remap(mapping).map(|model| graph.set(Some(model)));
			report(result);
		};
		view! {
			<label class="column-select">
				{label}
				<select on:change=on_change>
					<option value="" selected=move || session.with(|s| s.mapping().get(role).is_none())>
						"(by position)"
					</option>
					{move || {
						session
							.with(|s| {
								s.headers()
									.iter()
									.map(|h| {
										let selected = s.mapping().get(role) == Some(h.as_str());
										view! { <option value=h.clone() selected=selected>{h.clone()}</option> }
									})
									.collect_view()
							})
					}}
				</select>
			</label>
		}
	};

	let canvas_data = Signal::derive(move || graph.get().unwrap_or_default());
	let summary = move || {
		graph.with(|g| {
			g.as_ref()
				.map(|g| format!("{} nodes, {} edges", g.nodes.len(), g.edges.len()))
		})
	};

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="dark" />
		<Title text="Relationship Graph" />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<div class="app">
			<header class="controls">
				<h1>"Relationship Graph"</h1>
				<input type="file" accept=".csv" on:change=on_file />
				{SAMPLES
					.iter()
					.map(|&sample| {
						view! { <button on:click=move |_| load_sample(sample)>{sample.label}</button> }
					})
					.collect_view()}
				<Show when=move || session.with(|s| !s.headers().is_empty())>
					{role_select(ColumnRole::Source, "Source")}
					{role_select(ColumnRole::Target, "Target")}
					{role_select(ColumnRole::Type, "Type")}
				</Show>
				<label class="directed-toggle">
					<input
						type="checkbox"
						prop:checked=move || directed.get()
						on:change=move |ev| directed.set(event_target_checked(&ev))
					/>
					"Directed"
				</label>
				<span class="summary">{summary}</span>
			</header>

			<Show when=move || loading.get()>
				<div class="loading">"Loading…"</div>
			</Show>
			{move || error.get().map(|message| view! { <div class="error">{message}</div> })}

			<Show
				when=move || graph.with(Option::is_some)
				fallback=|| view! { <p class="subtitle">"Load a CSV file or a sample to begin."</p> }
			>
				<div class="graph-area">
					<ForceGraphCanvas data=canvas_data directed=directed />
				</div>
				<p class="subtitle">"Drag nodes to reposition. Scroll to zoom. Drag background to pan. Click a legend entry to filter."</p>
			</Show>
		</div>
	}
}
