//! Leptos component wrapping the force-directed graph canvas.
//!
//! The component creates an HTML canvas element and wires up mouse/wheel event
//! handlers for node dragging, panning, zooming and hover. An animation loop
//! runs via `requestAnimationFrame`, ticking the layout and redrawing the scene
//! each frame. Replacing the model or flipping the directed mode stops the
//! current layout before a new one is built; unmounting cancels the pending
//! frame and stops the layout for good.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Arc;

use leptos::prelude::*;
use log::{info, warn};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent, Window};

use crate::data::GraphModel;

use super::legend::LegendEntry;
use super::render;
use super::state::ForceGraphState;

/// Graph state paired with the drawing context it renders into.
struct GraphContext {
	state: ForceGraphState,
	ctx: CanvasRenderingContext2d,
}

/// Browser-side handles owned by one mounted canvas.
#[derive(Clone, Default)]
struct FrameLoop {
	context: Rc<RefCell<Option<GraphContext>>>,
	animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>>,
	resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>>,
	frame: Rc<Cell<Option<i32>>>,
}

impl FrameLoop {
	fn with_state<R>(&self, f: impl FnOnce(&mut ForceGraphState) -> R) -> Option<R> {
		self.context.borrow_mut().as_mut().map(|c| f(&mut c.state))
	}

	/// Swaps in a new graph, stopping the layout it replaces.
	fn replace(&self, next: GraphContext) {
		if let Some(mut previous) = self.context.borrow_mut().replace(next) {
			previous.state.stop();
			info!("graph replaced, previous layout stopped");
		}
	}

	fn start(&self) {
		if self.animate.borrow().is_none() {
			let frame_loop = self.clone();
			*self.animate.borrow_mut() = Some(Closure::new(move || {
				frame_loop.frame.set(None);
				if let Some(c) = frame_loop.context.borrow_mut().as_mut() {
					c.state.tick();
					render::render(&c.state, &c.ctx);
				}
				frame_loop.request_frame();
			}));
		}
		self.request_frame();
	}

	fn request_frame(&self) {
		if self.frame.get().is_some() {
			return;
		}
		let Some(window) = web_sys::window() else {
			return;
		};
		let requested = self
			.animate
			.borrow()
			.as_ref()
			.map(|cb| window.request_animation_frame(cb.as_ref().unchecked_ref()));
		match requested {
			Some(Ok(id)) => self.frame.set(Some(id)),
			Some(Err(e)) => warn!("requestAnimationFrame failed: {:?}", e),
			None => {}
		}
	}

	fn watch_resize(&self, window: &Window, canvas: HtmlCanvasElement) {
		if self.resize_cb.borrow().is_some() {
			return;
		}
		let context = self.context.clone();
		let cb: Closure<dyn FnMut()> = Closure::new(move || {
			let Some(win) = web_sys::window() else {
				return;
			};
			let (w, h) = viewport_size(&win);
			canvas.set_width(w as u32);
			canvas.set_height(h as u32);
			if let Some(c) = context.borrow_mut().as_mut() {
				c.state.resize(w, h);
			}
		});
		if let Err(e) = window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref()) {
			warn!("could not watch window resize: {:?}", e);
		}
		*self.resize_cb.borrow_mut() = Some(cb);
	}

	/// Cancels the pending frame, stops the layout and releases listeners.
	fn shutdown(&self) {
		let window = web_sys::window();
		if let (Some(id), Some(win)) = (self.frame.take(), window.as_ref()) {
			let _ = win.cancel_animation_frame(id);
		}
		if let Some(mut c) = self.context.borrow_mut().take() {
			c.state.stop();
		}
		if let (Some(cb), Some(win)) = (self.resize_cb.borrow_mut().take(), window.as_ref()) {
			let _ = win.remove_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
		}
		self.animate.borrow_mut().take();
	}
}

fn viewport_size(window: &Window) -> (f64, f64) {
	let dimension = |v: Result<JsValue, JsValue>, fallback: f64| {
		v.ok().and_then(|v| v.as_f64()).unwrap_or(fallback)
	};
	(
		dimension(window.inner_width(), 800.0),
		dimension(window.inner_height(), 600.0),
	)
}

fn context_2d(canvas: &HtmlCanvasElement) -> Option<CanvasRenderingContext2d> {
	canvas
		.get_context("2d")
		.ok()
		.flatten()
		.and_then(|ctx| ctx.dyn_into().ok())
}

fn local_point(canvas_ref: NodeRef<leptos::html::Canvas>, ev: &MouseEvent) -> Option<(f64, f64)> {
	let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some((
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

#[derive(Clone, Debug, PartialEq)]
struct Tooltip {
	text: String,
	x: f64,
	y: f64,
}

/// Renders an interactive force-directed graph on a canvas element, with a
/// hover tooltip and a clickable relationship-type legend.
///
/// The component sizes itself to its parent container by default; set
/// `fullscreen = true` to fill the viewport and resize automatically with the
/// window. Explicit `width`/`height` override automatic sizing.
#[component]
pub fn ForceGraphCanvas(
	#[prop(into)] data: Signal<Arc<GraphModel>>,
	#[prop(into)] directed: Signal<bool>,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let frame_loop = StoredValue::new_local(FrameLoop::default());
	let legend = RwSignal::new(Vec::<LegendEntry>::new());
	let active_type = RwSignal::new(None::<String>);
	let tooltip = RwSignal::new(None::<Tooltip>);

	Effect::new(move |_| {
		let model = data.get();
		let directed = directed.get();
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			warn!("no window, graph not rendered");
			return;
		};

		let (w, h) = if fullscreen {
			viewport_size(&window)
		} else {
			(
				width.unwrap_or_else(|| {
					canvas
						.parent_element()
						.map(|p| p.client_width() as f64)
						.unwrap_or(800.0)
				}),
				height.unwrap_or_else(|| {
					canvas
						.parent_element()
						.map(|p| p.client_height() as f64)
						.unwrap_or(600.0)
				}),
			)
		};
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let Some(ctx) = context_2d(&canvas) else {
			warn!("canvas 2d context unavailable, graph not rendered");
			return;
		};

		let state = ForceGraphState::new(model, w, h, directed);
		legend.set(state.legend.entries.clone());
		active_type.set(None);
		tooltip.set(None);

		frame_loop.with_value(|fl| {
			fl.replace(GraphContext { state, ctx });
			if fullscreen {
				fl.watch_resize(&window, canvas);
			}
			fl.start();
		});
	});

	on_cleanup(move || {
		frame_loop.try_with_value(|fl| fl.shutdown());
	});

	let on_mousedown = move |ev: MouseEvent| {
		let Some((x, y)) = local_point(canvas_ref, &ev) else {
			return;
		};
		frame_loop.with_value(|fl| fl.with_state(|s| s.pointer_down(x, y)));
		tooltip.set(None);
	};

	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = local_point(canvas_ref, &ev) else {
			return;
		};
		let text = frame_loop
			.with_value(|fl| {
				fl.with_state(|s| {
					s.pointer_move(x, y);
					if s.drag.active || s.pan.active {
						None
					} else {
						s.tooltip()
					}
				})
			})
			.flatten();
		tooltip.set(text.map(|text| Tooltip { text, x, y }));
	};

	let on_mouseup = move |_: MouseEvent| {
		frame_loop.with_value(|fl| fl.with_state(|s| s.pointer_up()));
	};

	let on_mouseleave = move |_: MouseEvent| {
		frame_loop.with_value(|fl| fl.with_state(|s| s.pointer_leave()));
		tooltip.set(None);
	};

	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some((x, y)) = local_point(canvas_ref, &ev) else {
			return;
		};
		frame_loop.with_value(|fl| fl.with_state(|s| s.zoom_at(x, y, ev.delta_y())));
	};

	let toggle = move |edge_type: String| {
		let next = frame_loop
			.with_value(|fl| {
				fl.with_state(|s| {
					s.toggle_filter(&edge_type);
					s.interaction.filter.active_type().map(str::to_string)
				})
			})
			.flatten();
		active_type.set(next);
	};

	view! {
		<div class="force-graph" style="position: relative;">
			<canvas
				node_ref=canvas_ref
				class="force-graph-canvas"
				on:mousedown=on_mousedown
				on:mousemove=on_mousemove
				on:mouseup=on_mouseup
				on:mouseleave=on_mouseleave
				on:wheel=on_wheel
				style="display: block; cursor: grab;"
			/>
			<Show when=move || tooltip.with(Option::is_some)>
				<div
					class="graph-tooltip"
					style=move || {
						tooltip
							.with(|t| {
								t.as_ref()
									.map(|t| {
										format!(
											"position: absolute; left: {}px; top: {}px; pointer-events: none;",
											t.x + 12.0,
											t.y + 12.0,
										)
									})
							})
							.unwrap_or_default()
					}
				>
					{move || tooltip.with(|t| t.as_ref().map(|t| t.text.clone()).unwrap_or_default())}
				</div>
			</Show>
			<ul class="graph-legend">
				{move || {
					legend
						.get()
						.into_iter()
						.map(|entry| {
							let edge_type = entry.edge_type.clone();
							let is_active = {
								let edge_type = edge_type.clone();
								move || active_type.with(|a| a.as_deref() == Some(edge_type.as_str()))
							};
							let swatch = format!("background: {};", entry.color.to_css());
							view! {
								<li class="legend-entry" class:active=is_active on:click=move |_| toggle(edge_type.clone())>
									<span class="legend-swatch" style=swatch></span>
									<span class="legend-label">{entry.edge_type}</span>
								</li>
							}
						})
						.collect_view()
				}}
			</ul>
		</div>
	}
}
