//! Per-graph runtime state and pointer interaction.
//!
//! Wraps the layout simulation with the view transform for pan/zoom, drag and
//! pan tracking, the legend filter and hover overlay, and the retained scene
//! the renderer reads from.

use std::sync::Arc;

use crate::data::GraphModel;

use super::interaction::{HoverTarget, InteractionState};
use super::legend::Legend;
use super::scale::ScaleConfig;
use super::scene::Scene;
use super::simulation::{Simulation, SimulationConfig};
use super::theme::Theme;

/// Pan and zoom transform applied to the entire graph view.
#[derive(Clone, Debug, PartialEq)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	/// Zoom factor (1.0 = 100%, clamped by [`ScaleConfig::clamp_zoom`]).
	pub k: f64,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self {
			x: 0.0,
			y: 0.0,
			k: 1.0,
		}
	}
}

/// Tracks an in-progress node drag operation.
#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub active: bool,
	pub node_id: Option<String>,
}

/// Tracks an in-progress canvas pan operation.
#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
}

/// Core graph state combining the layout simulation with interaction tracking.
///
/// Created when the component mounts or the model is replaced, then mutated
/// each frame by the animation loop. The model itself is never mutated.
pub struct ForceGraphState {
	pub model: Arc<GraphModel>,
	pub simulation: Simulation,
	pub legend: Legend,
	pub scene: Scene,
	pub interaction: InteractionState,
	pub transform: ViewTransform,
	pub drag: DragState,
	pub pan: PanState,
	pub scale: ScaleConfig,
	pub theme: Theme,
	pub directed: bool,
	pub width: f64,
	pub height: f64,
}

impl ForceGraphState {
	pub fn new(model: Arc<GraphModel>, width: f64, height: f64, directed: bool) -> Self {
		let theme = Theme::default();
		let simulation = Simulation::new(&model, width, height, SimulationConfig::default());
		let legend = Legend::new(&model, &theme.edge_palette);
		let mut state = Self {
			model,
			simulation,
			legend,
			scene: Scene::default(),
			interaction: InteractionState::default(),
			transform: ViewTransform::default(),
			drag: DragState::default(),
			pan: PanState::default(),
			scale: ScaleConfig::default(),
			theme,
			directed,
			width,
			height,
		};
		state.sync_scene();
		state
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	/// What lies under a screen point. Nodes win over edges.
	pub fn target_at(&self, sx: f64, sy: f64) -> HoverTarget {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		if let Some(id) = self.scene.node_at(gx, gy, self.scale.hit_radius) {
			return HoverTarget::Node(id.to_string());
		}
		let tolerance = self.scale.edge_hit_tolerance / self.transform.k;
		match self.scene.edge_at(gx, gy, tolerance) {
			Some(index) => HoverTarget::Edge(index),
			None => HoverTarget::None,
		}
	}

	/// Updates the hover overlay. Returns whether it changed.
	pub fn hover_at(&mut self, sx: f64, sy: f64) -> bool {
		let target = self.target_at(sx, sy);
		if target == self.interaction.hover {
			return false;
		}
		self.interaction.set_hover(target);
		self.sync_scene();
		true
	}

	pub fn clear_hover(&mut self) {
		self.interaction.clear_hover();
		self.sync_scene();
	}

	/// Tooltip for the hovered element, if any.
	pub fn tooltip(&self) -> Option<String> {
		match &self.interaction.hover {
			HoverTarget::None => None,
			HoverTarget::Node(id) => Some(id.clone()),
			HoverTarget::Edge(index) => self.model.edges.get(*index).map(|edge| {
				let separator = if self.directed { "→" } else { "—" };
				format!(
					"{} {} {}: {}",
					edge.source, separator, edge.target, edge.edge_type
				)
			}),
		}
	}

	pub fn toggle_filter(&mut self, edge_type: &str) {
		self.interaction.filter.toggle(edge_type);
		self.sync_scene();
	}

	pub fn tick(&mut self) {
		self.simulation.tick();
		self.sync_scene();
	}

	/// Starts a node drag when the press lands on a node, otherwise a pan.
	pub fn pointer_down(&mut self, sx: f64, sy: f64) {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		let hit = self
			.scene
			.node_at(gx, gy, self.scale.hit_radius)
			.map(str::to_string);
		match hit {
			Some(id) if self.simulation.drag_start(&id, gx, gy) => {
				self.drag.active = true;
				self.drag.node_id = Some(id);
			}
			_ => {
				self.pan = PanState {
					active: true,
					start_x: sx,
					start_y: sy,
					transform_start_x: self.transform.x,
					transform_start_y: self.transform.y,
				};
			}
		}
	}

	pub fn pointer_move(&mut self, sx: f64, sy: f64) {
		if self.drag.active {
			if let Some(id) = &self.drag.node_id {
				let (gx, gy) = self.screen_to_graph(sx, sy);
				self.simulation.drag_move(id, gx, gy);
			}
		} else if self.pan.active {
			self.transform.x = self.pan.transform_start_x + (sx - self.pan.start_x);
			self.transform.y = self.pan.transform_start_y + (sy - self.pan.start_y);
		} else {
			self.hover_at(sx, sy);
		}
	}

	pub fn pointer_up(&mut self) {
		if let Some(id) = self.drag.node_id.take() {
			self.simulation.drag_end(&id);
		}
		self.drag.active = false;
		self.pan.active = false;
	}

	pub fn pointer_leave(&mut self) {
		self.pointer_up();
		self.clear_hover();
	}

	/// Zooms one wheel notch around a screen point, which stays fixed.
	pub fn zoom_at(&mut self, sx: f64, sy: f64, delta_y: f64) {
		let factor = if delta_y > 0.0 {
			1.0 / self.scale.zoom_step
		} else {
			self.scale.zoom_step
		};
		let new_k = self.scale.clamp_zoom(self.transform.k * factor);
		let ratio = new_k / self.transform.k;
		self.transform.x = sx - (sx - self.transform.x) * ratio;
		self.transform.y = sy - (sy - self.transform.y) * ratio;
		self.transform.k = new_k;
	}

	/// Halts the layout. Positions are frozen from here on.
	pub fn stop(&mut self) {
		self.simulation.stop();
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
		self.simulation.resize(width, height);
		self.sync_scene();
	}

	fn sync_scene(&mut self) {
		self.scene.sync(
			&self.model,
			&self.simulation,
			&self.interaction,
			&self.legend,
			&self.theme,
			&self.scale,
			self.directed,
		);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::data::{ColumnMapping, parse_csv, process_rows};

	fn state(directed: bool) -> ForceGraphState {
		let csv = "s,k,t\nAlice,knows,Bob\nBob,works with,Carol\n";
		let model = process_rows(&parse_csv(csv).unwrap(), &ColumnMapping::default()).unwrap();
		let mut state = ForceGraphState::new(Arc::new(model), 800.0, 600.0, directed);
		for _ in 0..300 {
			state.tick();
		}
		state
	}

	#[test]
	fn screen_to_graph_inverts_pan_and_zoom() {
		let mut s = state(false);
		s.transform = ViewTransform {
			x: 100.0,
			y: 50.0,
			k: 2.0,
		};
		assert_eq!(s.screen_to_graph(300.0, 250.0), (100.0, 100.0));
	}

	#[test]
	fn zoom_is_clamped_and_keeps_anchor() {
		let mut s = state(false);
		let before = s.screen_to_graph(400.0, 300.0);
		s.zoom_at(400.0, 300.0, -1.0);
		let after = s.screen_to_graph(400.0, 300.0);
		assert!((before.0 - after.0).abs() < 1e-9 && (before.1 - after.1).abs() < 1e-9);

		for _ in 0..200 {
			s.zoom_at(0.0, 0.0, 1.0);
		}
		assert_eq!(s.transform.k, 0.1);
		for _ in 0..200 {
			s.zoom_at(0.0, 0.0, -1.0);
		}
		assert_eq!(s.transform.k, 8.0);
	}

	#[test]
	fn pan_moves_view_but_not_layout() {
		let mut s = state(false);
		s.stop();
		let layout = s.simulation.nodes().to_vec();
		s.pointer_down(2.0, 2.0);
		assert!(s.pan.active);
		s.pointer_move(52.0, 12.0);
		s.pointer_up();
		assert_eq!((s.transform.x, s.transform.y), (50.0, 10.0));
		assert_eq!(s.simulation.nodes(), layout.as_slice());
	}

	#[test]
	fn dragging_a_node_pins_then_releases_it() {
		let mut s = state(false);
		let (x, y) = s.simulation.position("Bob").unwrap();
		s.pointer_down(x, y);
		assert_eq!(s.drag.node_id.as_deref(), Some("Bob"));

		s.pointer_move(200.0, 150.0);
		s.tick();
		assert_eq!(s.simulation.position("Bob"), Some((200.0, 150.0)));

		s.pointer_up();
		assert!(!s.drag.active);
		assert!(!s.simulation.node("Bob").unwrap().is_pinned());
	}

	#[test]
	fn hovering_a_node_shows_its_id() {
		let mut s = state(false);
		let (x, y) = s.simulation.position("Carol").unwrap();
		assert!(s.hover_at(x, y));
		assert_eq!(s.tooltip().as_deref(), Some("Carol"));
		assert!(!s.hover_at(x, y));
		s.pointer_leave();
		assert_eq!(s.tooltip(), None);
	}

	#[test]
	fn edge_tooltip_separator_follows_mode() {
		let mut undirected = state(false);
		undirected.interaction.set_hover(HoverTarget::Edge(1));
		assert_eq!(
			undirected.tooltip().as_deref(),
			Some("Bob — Carol: works with")
		);

		let mut directed = state(true);
		directed.interaction.set_hover(HoverTarget::Edge(0));
		assert_eq!(directed.tooltip().as_deref(), Some("Alice → Bob: knows"));
	}

	#[test]
	fn filter_toggle_restyles_scene() {
		let mut s = state(false);
		s.toggle_filter("knows");
		assert!(s.scene.edges[&1].opacity < 1.0);
		s.toggle_filter("knows");
		assert_eq!(s.scene.edges[&1].opacity, 1.0);
	}

	#[test]
	fn stopped_state_ignores_ticks() {
		let mut s = state(false);
		s.stop();
		let layout = s.simulation.nodes().to_vec();
		s.tick();
		assert_eq!(s.simulation.nodes(), layout.as_slice());
	}
}
