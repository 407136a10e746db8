//! Legend filter and hover highlight state.
//!
//! The filter is a two-state machine, `Idle` or `TypeFiltered(type)`, driven by
//! legend clicks. Hover is a transient overlay on top of it: while a node or
//! edge is hovered its highlight decides the styling, and when the pointer
//! leaves, the filter styling is back in effect because it was never replaced.

use std::collections::HashSet;

use log::debug;

use crate::data::{Edge, GraphModel};

pub const FULL_OPACITY: f64 = 1.0;
/// Edges of other types while a type filter is active.
pub const FILTERED_EDGE_OPACITY: f64 = 0.1;
/// Nodes not touching the active type.
pub const FILTERED_NODE_OPACITY: f64 = 0.2;
/// Nodes outside the hovered neighborhood.
pub const HOVER_DIM_NODE_OPACITY: f64 = 0.3;
/// Edges not touching the hovered node.
pub const HOVER_DIM_EDGE_OPACITY: f64 = 0.1;
/// Stroke width multiplier for emphasised edges.
pub const EMPHASIS_WIDTH: f64 = 2.0;

/// Legend-driven filter.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum FilterState {
	#[default]
	Idle,
	TypeFiltered(String),
}

impl FilterState {
	/// Clicking the active entry clears the filter; any other entry switches to it.
	pub fn toggle(&mut self, edge_type: &str) {
		*self = match &*self {
			FilterState::TypeFiltered(active) if active == edge_type => FilterState::Idle,
			_ => FilterState::TypeFiltered(edge_type.to_string()),
		};
		debug!("filter now {:?}", self);
	}

	pub fn active_type(&self) -> Option<&str> {
		match self {
			FilterState::Idle => None,
			FilterState::TypeFiltered(t) => Some(t),
		}
	}
}

/// What the pointer is currently over.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum HoverTarget {
	#[default]
	None,
	Node(String),
	/// Index into `GraphModel::edges`.
	Edge(usize),
}

/// Visual attributes of one edge for the current frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgeStyle {
	pub opacity: f64,
	/// Multiplier on the base stroke width.
	pub width: f64,
}

impl EdgeStyle {
	const NORMAL: Self = Self {
		opacity: FULL_OPACITY,
		width: 1.0,
	};
	const EMPHASISED: Self = Self {
		opacity: FULL_OPACITY,
		width: EMPHASIS_WIDTH,
	};
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InteractionState {
	pub filter: FilterState,
	pub hover: HoverTarget,
}

impl InteractionState {
	pub fn set_hover(&mut self, hover: HoverTarget) {
		self.hover = hover;
	}

	pub fn clear_hover(&mut self) {
		self.hover = HoverTarget::None;
	}

	/// Precomputes the lookups needed to style every node and edge this frame.
	pub fn resolve<'a>(&'a self, model: &'a GraphModel) -> Highlight<'a> {
		let filter_nodes: Option<HashSet<&str>> = self.filter.active_type().map(|active| {
			model
				.edges
				.iter()
				.filter(|e| e.edge_type == active)
				.flat_map(|e| [e.source.as_str(), e.target.as_str()])
				.collect()
		});

		let hover = match &self.hover {
			HoverTarget::None => HoverOverlay::None,
			HoverTarget::Node(id) => {
				let mut around: HashSet<&str> = model.neighbors(id).into_iter().collect();
				around.insert(id.as_str());
				HoverOverlay::Node {
					id: id.as_str(),
					around,
				}
			}
			HoverTarget::Edge(index) => match model.edges.get(*index) {
				Some(edge) => HoverOverlay::Edge { index: *index, edge },
				None => HoverOverlay::None,
			},
		};

		Highlight {
			active_type: self.filter.active_type(),
			filter_nodes,
			hover,
		}
	}
}

enum HoverOverlay<'a> {
	None,
	Node { id: &'a str, around: HashSet<&'a str> },
	Edge { index: usize, edge: &'a Edge },
}

/// Per-frame styling rules derived from [`InteractionState`].
pub struct Highlight<'a> {
	active_type: Option<&'a str>,
	filter_nodes: Option<HashSet<&'a str>>,
	hover: HoverOverlay<'a>,
}

impl Highlight<'_> {
	fn base_node_opacity(&self, id: &str) -> f64 {
		match &self.filter_nodes {
			Some(touching) if !touching.contains(id) => FILTERED_NODE_OPACITY,
			_ => FULL_OPACITY,
		}
	}

	fn base_edge_style(&self, edge: &Edge) -> EdgeStyle {
		match self.active_type {
			None => EdgeStyle::NORMAL,
			Some(active) if edge.edge_type == active => EdgeStyle::EMPHASISED,
			Some(_) => EdgeStyle {
				opacity: FILTERED_EDGE_OPACITY,
				width: 1.0,
			},
		}
	}

	pub fn node_opacity(&self, id: &str) -> f64 {
		match &self.hover {
			HoverOverlay::None => self.base_node_opacity(id),
			HoverOverlay::Node { around, .. } => {
				if around.contains(id) {
					FULL_OPACITY
				} else {
					HOVER_DIM_NODE_OPACITY
				}
			}
			HoverOverlay::Edge { edge, .. } => {
				if edge.source == id || edge.target == id {
					FULL_OPACITY
				} else {
					self.base_node_opacity(id)
				}
			}
		}
	}

	pub fn edge_style(&self, index: usize, edge: &Edge) -> EdgeStyle {
		match &self.hover {
			HoverOverlay::None => self.base_edge_style(edge),
			HoverOverlay::Node { id, .. } => {
				if edge.source == *id || edge.target == *id {
					EdgeStyle::EMPHASISED
				} else {
					EdgeStyle {
						opacity: HOVER_DIM_EDGE_OPACITY,
						width: 1.0,
					}
				}
			}
			HoverOverlay::Edge { index: hovered, .. } if *hovered == index => EdgeStyle::EMPHASISED,
			HoverOverlay::Edge { .. } => self.base_edge_style(edge),
		}
	}

	/// Whether `id` is the hovered node.
	pub fn is_hovered_node(&self, id: &str) -> bool {
		matches!(&self.hover, HoverOverlay::Node { id: hovered, .. } if *hovered == id)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::data::{ColumnMapping, parse_csv, process_rows};

	fn model() -> GraphModel {
		let csv = "s,k,t\na,friend,b\nb,work,c\nc,friend,d\ne,work,e\n";
		process_rows(&parse_csv(csv).unwrap(), &ColumnMapping::default()).unwrap()
	}

	fn snapshot(state: &InteractionState, model: &GraphModel) -> (Vec<f64>, Vec<EdgeStyle>) {
		let h = state.resolve(model);
		let nodes = model.nodes.keys().map(|id| h.node_opacity(id)).collect();
		let edges = model
			.edges
			.iter()
			.enumerate()
			.map(|(i, e)| h.edge_style(i, e))
			.collect();
		(nodes, edges)
	}

	#[test]
	fn toggle_same_type_returns_to_idle() {
		let mut filter = FilterState::default();
		filter.toggle("friend");
		assert_eq!(filter.active_type(), Some("friend"));
		filter.toggle("work");
		assert_eq!(filter, FilterState::TypeFiltered("work".into()));
		filter.toggle("work");
		assert_eq!(filter, FilterState::Idle);
	}

	#[test]
	fn filter_twice_restores_full_opacity() {
		let m = model();
		let mut state = InteractionState::default();
		let before = snapshot(&state, &m);
		assert!(before.0.iter().all(|&o| o == FULL_OPACITY));

		state.filter.toggle("work");
		let filtered = snapshot(&state, &m);
		assert_ne!(filtered, before);

		state.filter.toggle("work");
		assert_eq!(snapshot(&state, &m), before);
	}

	#[test]
	fn filter_dims_other_types() {
		let m = model();
		let mut state = InteractionState::default();
		state.filter.toggle("friend");
		let h = state.resolve(&m);
		assert_eq!(h.edge_style(0, &m.edges[0]), EdgeStyle::EMPHASISED);
		assert_eq!(h.edge_style(1, &m.edges[1]).opacity, FILTERED_EDGE_OPACITY);
		assert_eq!(h.node_opacity("a"), FULL_OPACITY);
		assert_eq!(h.node_opacity("e"), FILTERED_NODE_OPACITY);
	}

	#[test]
	fn hover_out_reapplies_active_filter() {
		let m = model();
		let mut state = InteractionState::default();
		state.filter.toggle("friend");
		let filtered = snapshot(&state, &m);

		state.set_hover(HoverTarget::Node("e".into()));
		let hovered = snapshot(&state, &m);
		assert_ne!(hovered, filtered);
		assert_eq!(state.resolve(&m).node_opacity("e"), FULL_OPACITY);

		state.clear_hover();
		assert_eq!(snapshot(&state, &m), filtered);
	}

	#[test]
	fn node_hover_highlights_neighborhood() {
		let m = model();
		let mut state = InteractionState::default();
		state.set_hover(HoverTarget::Node("b".into()));
		let h = state.resolve(&m);
		assert!(h.is_hovered_node("b"));
		assert_eq!(h.node_opacity("a"), FULL_OPACITY);
		assert_eq!(h.node_opacity("c"), FULL_OPACITY);
		assert_eq!(h.node_opacity("d"), HOVER_DIM_NODE_OPACITY);
		assert_eq!(h.edge_style(1, &m.edges[1]).width, EMPHASIS_WIDTH);
		assert_eq!(h.edge_style(2, &m.edges[2]).opacity, HOVER_DIM_EDGE_OPACITY);
	}

	#[test]
	fn edge_hover_overlays_base_style() {
		let m = model();
		let mut state = InteractionState::default();
		state.filter.toggle("work");
		state.set_hover(HoverTarget::Edge(0));
		let h = state.resolve(&m);
		assert_eq!(h.edge_style(0, &m.edges[0]), EdgeStyle::EMPHASISED);
		assert_eq!(h.edge_style(2, &m.edges[2]).opacity, FILTERED_EDGE_OPACITY);
		assert_eq!(h.node_opacity("a"), FULL_OPACITY);
		assert_eq!(h.node_opacity("d"), FILTERED_NODE_OPACITY);
	}
}
