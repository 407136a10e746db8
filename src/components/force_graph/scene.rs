//! Retained scene graph for one rendered graph.
//!
//! Visual primitives are keyed by node id and edge index. Each frame
//! [`Scene::sync`] creates or updates the primitive for every current node and
//! edge from simulator output and interaction state, and drops primitives whose
//! key is gone. The renderer only ever reads the scene.

use std::f64::consts::{PI, TAU};

use indexmap::IndexMap;

use crate::data::GraphModel;

use super::interaction::InteractionState;
use super::legend::Legend;
use super::scale::ScaleConfig;
use super::simulation::Simulation;
use super::theme::{Color, Theme};

/// Below this separation two endpoints count as coincident.
const COINCIDENT: f64 = 1e-3;

/// Geometry of one drawn edge, in simulator coordinates.
#[derive(Clone, Debug, PartialEq)]
pub enum EdgePath {
	Line { x1: f64, y1: f64, x2: f64, y2: f64 },
	/// Clockwise circular arc from `start` to `end` (radians, `end > start`).
	Arc { cx: f64, cy: f64, r: f64, start: f64, end: f64 },
	/// Closed loop for an edge whose endpoints coincide.
	Loop { cx: f64, cy: f64, r: f64 },
}

/// Direction marker at the target end of a directed edge.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Arrow {
	pub tip: (f64, f64),
	/// Unit vector pointing along the edge into the target.
	pub dir: (f64, f64),
}

impl EdgePath {
	/// Straight segment when undirected; an arc whose radius equals the
	/// endpoint distance when directed. Coincident endpoints give a loop.
	pub fn between(from: (f64, f64), to: (f64, f64), directed: bool, loop_radius: f64) -> Self {
		let (dx, dy) = (to.0 - from.0, to.1 - from.1);
		let dist = (dx * dx + dy * dy).sqrt();
		if dist < COINCIDENT {
			return EdgePath::Loop {
				cx: from.0,
				cy: from.1 - loop_radius,
				r: loop_radius,
			};
		}
		if !directed {
			return EdgePath::Line {
				x1: from.0,
				y1: from.1,
				x2: to.0,
				y2: to.1,
			};
		}

		let r = dist;
		let (ux, uy) = (dx / dist, dy / dist);
		let h = (r * r - dist * dist / 4.0).sqrt();
		let (cx, cy) = ((from.0 + to.0) / 2.0 - uy * h, (from.1 + to.1) / 2.0 + ux * h);
		let start = (from.1 - cy).atan2(from.0 - cx);
		let mut end = (to.1 - cy).atan2(to.0 - cx);
		if end < start {
			end += TAU;
		}
		EdgePath::Arc {
			cx,
			cy,
			r,
			start,
			end,
		}
	}

	/// Shortest distance from a point to the drawn path.
	pub fn distance_to(&self, px: f64, py: f64) -> f64 {
		match *self {
			EdgePath::Line { x1, y1, x2, y2 } => {
				let (dx, dy) = (x2 - x1, y2 - y1);
				let len2 = dx * dx + dy * dy;
				let t = (((px - x1) * dx + (py - y1) * dy) / len2).clamp(0.0, 1.0);
				let (qx, qy) = (x1 + t * dx, y1 + t * dy);
				((px - qx).powi(2) + (py - qy).powi(2)).sqrt()
			}
			EdgePath::Arc {
				cx,
				cy,
				r,
				start,
				end,
			} => {
				let angle = (py - cy).atan2(px - cx);
				let offset = (angle - start).rem_euclid(TAU);
				if offset <= end - start {
					(((px - cx).powi(2) + (py - cy).powi(2)).sqrt() - r).abs()
				} else {
					let at = |a: f64| (cx + r * a.cos(), cy + r * a.sin());
					let ((sx, sy), (ex, ey)) = (at(start), at(end));
					let ds = ((px - sx).powi(2) + (py - sy).powi(2)).sqrt();
					let de = ((px - ex).powi(2) + (py - ey).powi(2)).sqrt();
					ds.min(de)
				}
			}
			EdgePath::Loop { cx, cy, r } => {
				(((px - cx).powi(2) + (py - cy).powi(2)).sqrt() - r).abs()
			}
		}
	}

	/// Marker placement, backed off from the target center by `inset` along the path.
	pub fn arrow(&self, inset: f64) -> Arrow {
		match *self {
			EdgePath::Line { x1, y1, x2, y2 } => {
				let (dx, dy) = (x2 - x1, y2 - y1);
				let len = (dx * dx + dy * dy).sqrt().max(COINCIDENT);
				let dir = (dx / len, dy / len);
				Arrow {
					tip: (x2 - dir.0 * inset, y2 - dir.1 * inset),
					dir,
				}
			}
			EdgePath::Arc {
				cx,
				cy,
				r,
				start,
				end,
			} => {
				let a = (end - inset / r).max(start);
				Arrow {
					tip: (cx + r * a.cos(), cy + r * a.sin()),
					dir: (-a.sin(), a.cos()),
				}
			}
			EdgePath::Loop { cx, cy, r } => {
				// Where the loop re-enters the node, travelling clockwise.
				let a = PI / 2.0 - inset / r;
				Arrow {
					tip: (cx + r * a.cos(), cy + r * a.sin()),
					dir: (-a.sin(), a.cos()),
				}
			}
		}
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct NodeVisual {
	pub x: f64,
	pub y: f64,
	pub radius: f64,
	pub fill: Color,
	pub opacity: f64,
	pub hovered: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EdgeVisual {
	pub path: EdgePath,
	pub color: Color,
	pub opacity: f64,
	/// Multiplier on the base stroke width.
	pub width: f64,
	pub arrow: Option<Arrow>,
}

#[derive(Clone, Debug, Default)]
pub struct Scene {
	pub nodes: IndexMap<String, NodeVisual>,
	pub edges: IndexMap<usize, EdgeVisual>,
}

impl Scene {
	/// Brings every primitive up to date with the current frame.
	#[allow(clippy::too_many_arguments)]
	pub fn sync(
		&mut self,
		model: &GraphModel,
		sim: &Simulation,
		interaction: &InteractionState,
		legend: &Legend,
		theme: &Theme,
		scale: &ScaleConfig,
		directed: bool,
	) {
		let highlight = interaction.resolve(model);

		for sim_node in sim.nodes() {
			let Some(node) = model.nodes.get(&sim_node.id) else {
				continue;
			};
			let visual = NodeVisual {
				x: sim_node.x,
				y: sim_node.y,
				radius: scale.node_radius,
				fill: theme.node_fill(node.group),
				opacity: highlight.node_opacity(&node.id),
				hovered: highlight.is_hovered_node(&node.id),
			};
			// Existing keys keep their slot; new keys are appended.
			self.nodes.insert(node.id.clone(), visual);
		}
		self.nodes.retain(|id, _| sim.node(id).is_some());

		for (index, edge) in model.edges.iter().enumerate() {
			let (Some(from), Some(to)) = (sim.position(&edge.source), sim.position(&edge.target))
			else {
				continue;
			};
			let path = EdgePath::between(from, to, directed, scale.loop_radius);
			let style = highlight.edge_style(index, edge);
			let arrow = directed.then(|| path.arrow(scale.node_radius));
			let color = legend
				.color_for(&edge.edge_type)
				.unwrap_or_else(|| theme.edge_palette.get(0));
			let visual = EdgeVisual {
				path,
				color,
				opacity: style.opacity,
				width: style.width,
				arrow,
			};
			self.edges.insert(index, visual);
		}
		self.edges.retain(|&index, _| index < model.edges.len());
	}

	/// Topmost node within `hit_radius` of a point.
	pub fn node_at(&self, x: f64, y: f64, hit_radius: f64) -> Option<&str> {
		self.nodes
			.iter()
			.rev()
			.find(|(_, n)| ((n.x - x).powi(2) + (n.y - y).powi(2)).sqrt() < hit_radius)
			.map(|(id, _)| id.as_str())
	}

	/// Closest edge within `tolerance` of a point.
	pub fn edge_at(&self, x: f64, y: f64, tolerance: f64) -> Option<usize> {
		self.edges
			.iter()
			.map(|(&index, e)| (index, e.path.distance_to(x, y)))
			.filter(|&(_, d)| d <= tolerance)
			.min_by(|a, b| a.1.total_cmp(&b.1))
			.map(|(index, _)| index)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::force_graph::simulation::SimulationConfig;
	use crate::data::{ColumnMapping, parse_csv, process_rows};

	fn close(a: f64, b: f64) -> bool {
		(a - b).abs() < 1e-9
	}

	#[test]
	fn undirected_edges_are_straight() {
		let path = EdgePath::between((0.0, 0.0), (10.0, 0.0), false, 12.0);
		assert_eq!(
			path,
			EdgePath::Line {
				x1: 0.0,
				y1: 0.0,
				x2: 10.0,
				y2: 0.0
			}
		);
		assert!(close(path.distance_to(5.0, 3.0), 3.0));
		assert!(close(path.distance_to(-4.0, 3.0), 5.0));
	}

	#[test]
	fn directed_arc_radius_equals_endpoint_distance() {
		let path = EdgePath::between((0.0, 0.0), (100.0, 0.0), true, 12.0);
		let EdgePath::Arc {
			cx,
			cy,
			r,
			start,
			end,
		} = path
		else {
			panic!("expected arc, got {path:?}");
		};
		assert!(close(r, 100.0));
		// Both endpoints lie on the circle.
		assert!(close(((0.0 - cx).powi(2) + (0.0 - cy).powi(2)).sqrt(), r));
		assert!(close(((100.0 - cx).powi(2) + (0.0 - cy).powi(2)).sqrt(), r));
		// Chord equal to the radius subtends 60 degrees.
		assert!(close(end - start, PI / 3.0));
		// The bow is on the negative-y side for a left-to-right edge.
		let mid = (start + end) / 2.0;
		assert!(cy + r * mid.sin() < 0.0);
	}

	#[test]
	fn arc_bow_scales_with_distance() {
		let bow = |d: f64| {
			let EdgePath::Arc { cy, r, .. } = EdgePath::between((0.0, 0.0), (d, 0.0), true, 12.0)
			else {
				unreachable!()
			};
			r - cy
		};
		assert!(close(bow(200.0) / bow(100.0), 2.0));
	}

	#[test]
	fn coincident_endpoints_draw_a_loop() {
		for directed in [true, false] {
			let path = EdgePath::between((5.0, 5.0), (5.0, 5.0), directed, 12.0);
			assert_eq!(
				path,
				EdgePath::Loop {
					cx: 5.0,
					cy: -7.0,
					r: 12.0
				}
			);
		}
	}

	#[test]
	fn arrow_points_into_target() {
		let arrow = EdgePath::between((0.0, 0.0), (100.0, 0.0), false, 12.0).arrow(8.0);
		assert!(close(arrow.tip.0, 92.0));
		assert!(close(arrow.dir.0, 1.0));

		let arc = EdgePath::between((0.0, 0.0), (100.0, 0.0), true, 12.0).arrow(0.0);
		assert!(close(arc.tip.0, 100.0) && arc.tip.1.abs() < 1e-9);
		// Arriving from above on a clockwise arc means heading down and right.
		assert!(arc.dir.0 > 0.0 && arc.dir.1 > 0.0);
	}

	#[test]
	fn arc_hit_testing_ignores_far_side_of_circle() {
		let path = EdgePath::between((0.0, 0.0), (100.0, 0.0), true, 12.0);
		let EdgePath::Arc { cx, cy, r, .. } = path else {
			unreachable!()
		};
		// Point on the circle but opposite the drawn arc.
		assert!(path.distance_to(cx, cy + r) > 50.0);
		assert!(path.distance_to(cx, cy - r) < 1e-9);
	}

	#[test]
	fn sync_creates_updates_and_removes() {
		let theme = Theme::default();
		let scale = ScaleConfig::default();
		let interaction = InteractionState::default();
		let build = |csv: &str| {
			process_rows(&parse_csv(csv).unwrap(), &ColumnMapping::default()).unwrap()
		};

		let first = build("s,k,t\na,r,b\nb,r,c\n");
		let mut sim = Simulation::new(&first, 400.0, 300.0, SimulationConfig::default());
		let legend = Legend::new(&first, &theme.edge_palette);
		let mut scene = Scene::default();
		scene.sync(&first, &sim, &interaction, &legend, &theme, &scale, true);
		assert_eq!(scene.nodes.len(), 3);
		assert_eq!(scene.edges.len(), 2);
		assert!(scene.edges[&0].arrow.is_some());

		sim.tick();
		scene.sync(&first, &sim, &interaction, &legend, &theme, &scale, true);
		assert_eq!(scene.nodes["a"].x, sim.position("a").unwrap().0);

		let second = build("s,k,t\nx,r,a\n");
		let sim = Simulation::new(&second, 400.0, 300.0, SimulationConfig::default());
		scene.sync(&second, &sim, &interaction, &legend, &theme, &scale, false);
		let ids: Vec<&str> = scene.nodes.keys().map(String::as_str).collect();
		assert_eq!(ids, vec!["a", "x"]);
		assert_eq!(scene.edges.len(), 1);
		assert!(scene.edges[&0].arrow.is_none());
	}

	#[test]
	fn hit_testing_finds_nodes_and_edges() {
		let mut scene = Scene::default();
		let fill = Color::rgb(0, 0, 0);
		scene.nodes.insert(
			"a".into(),
			NodeVisual {
				x: 10.0,
				y: 10.0,
				radius: 8.0,
				fill,
				opacity: 1.0,
				hovered: false,
			},
		);
		scene.edges.insert(
			0,
			EdgeVisual {
				path: EdgePath::between((10.0, 10.0), (110.0, 10.0), false, 12.0),
				color: fill,
				opacity: 1.0,
				width: 1.0,
				arrow: None,
			},
		);
		assert_eq!(scene.node_at(12.0, 11.0, 12.0), Some("a"));
		assert_eq!(scene.node_at(60.0, 11.0, 12.0), None);
		assert_eq!(scene.edge_at(60.0, 12.0, 5.0), Some(0));
		assert_eq!(scene.edge_at(60.0, 40.0, 5.0), None);
	}
}
