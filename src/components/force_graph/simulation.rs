//! Force-directed layout.
//!
//! Positions live in a [`SimNode`] table owned by the simulation and indexed by
//! node id; the [`GraphModel`] it was built from is never mutated. Each tick
//! combines four forces, scaled by a decaying `alpha`:
//!
//! - link springs pulling linked nodes toward `link_distance`
//! - all-pairs repulsion (`charge_strength`, negative) falling off with distance
//! - a weak pull toward the canvas center on both axes
//! - collision avoidance between node discs of `collide_radius`
//!
//! After integration every node is clamped inside the canvas minus `margin`.
//! Pinned nodes (being dragged) hold their pin exactly.

use std::collections::HashMap;
use std::f64::consts::PI;

use log::info;

use crate::data::GraphModel;

/// Tuning for the force simulation.
#[derive(Clone, Debug)]
pub struct SimulationConfig {
	/// Rest length of link springs.
	pub link_distance: f64,
	/// Many-body strength. Negative values repel.
	pub charge_strength: f64,
	/// Strength of the pull toward the canvas center.
	pub center_strength: f64,
	/// Collision radius of each node.
	pub collide_radius: f64,
	/// Inset from each canvas edge that positions are clamped to.
	pub margin: f64,
	/// Below this alpha the layout is at rest.
	pub alpha_min: f64,
	/// Fraction of the gap to `alpha_target` closed each tick.
	pub alpha_decay: f64,
	/// Fraction of velocity lost each tick.
	pub velocity_decay: f64,
	/// Alpha target while a node is dragged.
	pub drag_alpha_target: f64,
}

impl Default for SimulationConfig {
	fn default() -> Self {
		let alpha_min = 0.001_f64;
		Self {
			link_distance: 100.0,
			charge_strength: -400.0,
			center_strength: 0.1,
			collide_radius: 20.0,
			margin: 20.0,
			alpha_min,
			// Reaches alpha_min from 1.0 in about 300 ticks.
			alpha_decay: 1.0 - alpha_min.powf(1.0 / 300.0),
			velocity_decay: 0.4,
			drag_alpha_target: 0.3,
		}
	}
}

/// Mutable layout state for one node.
#[derive(Clone, Debug, PartialEq)]
pub struct SimNode {
	pub id: String,
	pub x: f64,
	pub y: f64,
	pub vx: f64,
	pub vy: f64,
	/// Pinned x. Set exactly while the node is dragged.
	pub fx: Option<f64>,
	pub fy: Option<f64>,
}

impl SimNode {
	pub fn is_pinned(&self) -> bool {
		self.fx.is_some() && self.fy.is_some()
	}
}

#[derive(Clone, Debug)]
struct Link {
	source: usize,
	target: usize,
	strength: f64,
	bias: f64,
}

/// Linear congruential generator used to break exact overlaps deterministically.
#[derive(Clone, Debug)]
struct Lcg(u64);

impl Lcg {
	const A: u64 = 1_664_525;
	const C: u64 = 1_013_904_223;
	const M: u64 = 1 << 32;

	fn next(&mut self) -> f64 {
		self.0 = (Self::A * self.0 + Self::C) % Self::M;
		self.0 as f64 / Self::M as f64
	}

	fn jiggle(&mut self) -> f64 {
		(self.next() - 0.5) * 1e-6
	}
}

/// Iterative force-directed layout over a fixed graph.
#[derive(Clone, Debug)]
pub struct Simulation {
	config: SimulationConfig,
	nodes: Vec<SimNode>,
	index: HashMap<String, usize>,
	links: Vec<Link>,
	width: f64,
	height: f64,
	alpha: f64,
	alpha_target: f64,
	stopped: bool,
	rng: Lcg,
}

impl Simulation {
	/// Seeds positions on a phyllotaxis spiral around the canvas center.
	pub fn new(model: &GraphModel, width: f64, height: f64, config: SimulationConfig) -> Self {
		let (cx, cy) = (width / 2.0, height / 2.0);
		let golden_angle = PI * (3.0 - 5.0_f64.sqrt());

		let mut index = HashMap::with_capacity(model.nodes.len());
		let nodes: Vec<SimNode> = model
			.nodes
			.keys()
			.enumerate()
			.map(|(i, id)| {
				index.insert(id.clone(), i);
				let radius = 10.0 * (0.5 + i as f64).sqrt();
				let angle = i as f64 * golden_angle;
				SimNode {
					id: id.clone(),
					x: cx + radius * angle.cos(),
					y: cy + radius * angle.sin(),
					vx: 0.0,
					vy: 0.0,
					fx: None,
					fy: None,
				}
			})
			.collect();

		let endpoints: Vec<(usize, usize)> = model
			.edges
			.iter()
			.filter(|e| !e.is_self_loop())
			.filter_map(|e| Some((*index.get(&e.source)?, *index.get(&e.target)?)))
			.collect();
		let mut degree = vec![0usize; nodes.len()];
		for &(s, t) in &endpoints {
			degree[s] += 1;
			degree[t] += 1;
		}
		let links = endpoints
			.into_iter()
			.map(|(source, target)| {
				let (ds, dt) = (degree[source] as f64, degree[target] as f64);
				Link {
					source,
					target,
					strength: 1.0 / ds.min(dt),
					bias: ds / (ds + dt),
				}
			})
			.collect();

		let mut sim = Self {
			config,
			nodes,
			index,
			links,
			width,
			height,
			alpha: 1.0,
			alpha_target: 0.0,
			stopped: false,
			rng: Lcg(1),
		};
		sim.clamp_all();
		info!(
			"simulation started: {} nodes, {} links",
			sim.nodes.len(),
			sim.links.len()
		);
		sim
	}

	/// Advances the layout by one step. Does nothing once stopped.
	pub fn tick(&mut self) {
		if self.stopped {
			return;
		}

		self.alpha += (self.alpha_target - self.alpha) * self.config.alpha_decay;
		if self.is_active() {
			let alpha = self.alpha;
			self.apply_links(alpha);
			self.apply_charge(alpha);
			self.apply_centering(alpha);
			self.apply_collisions();

			let keep = 1.0 - self.config.velocity_decay;
			for node in &mut self.nodes {
				node.vx *= keep;
				node.vy *= keep;
				node.x += node.vx;
				node.y += node.vy;
			}
		}

		for node in &mut self.nodes {
			if let (Some(fx), Some(fy)) = (node.fx, node.fy) {
				node.x = fx;
				node.y = fy;
				node.vx = 0.0;
				node.vy = 0.0;
			}
		}
		self.clamp_all();
	}

	fn apply_links(&mut self, alpha: f64) {
		for link in &self.links {
			let (s, t) = (&self.nodes[link.source], &self.nodes[link.target]);
			let mut x = t.x + t.vx - s.x - s.vx;
			let mut y = t.y + t.vy - s.y - s.vy;
			if x == 0.0 {
				x = self.rng.jiggle();
			}
			if y == 0.0 {
				y = self.rng.jiggle();
			}
			let l = (x * x + y * y).sqrt();
			let l = (l - self.config.link_distance) / l * alpha * link.strength;
			let (x, y) = (x * l, y * l);

			let t = &mut self.nodes[link.target];
			t.vx -= x * link.bias;
			t.vy -= y * link.bias;
			let s = &mut self.nodes[link.source];
			s.vx += x * (1.0 - link.bias);
			s.vy += y * (1.0 - link.bias);
		}
	}

	fn apply_charge(&mut self, alpha: f64) {
		let strength = self.config.charge_strength;
		for i in 0..self.nodes.len() {
			let (xi, yi) = (self.nodes[i].x, self.nodes[i].y);
			let (mut dvx, mut dvy) = (0.0, 0.0);
			for j in 0..self.nodes.len() {
				if i == j {
					continue;
				}
				let mut x = self.nodes[j].x - xi;
				let mut y = self.nodes[j].y - yi;
				let mut l = x * x + y * y;
				if x == 0.0 {
					x = self.rng.jiggle();
					l += x * x;
				}
				if y == 0.0 {
					y = self.rng.jiggle();
					l += y * y;
				}
				// Soften the singularity below unit distance.
				if l < 1.0 {
					l = l.sqrt();
				}
				let w = strength * alpha / l;
				dvx += x * w;
				dvy += y * w;
			}
			self.nodes[i].vx += dvx;
			self.nodes[i].vy += dvy;
		}
	}

	fn apply_centering(&mut self, alpha: f64) {
		let (cx, cy) = (self.width / 2.0, self.height / 2.0);
		let k = self.config.center_strength * alpha;
		for node in &mut self.nodes {
			node.vx += (cx - node.x) * k;
			node.vy += (cy - node.y) * k;
		}
	}

	fn apply_collisions(&mut self) {
		let r = self.config.collide_radius;
		let min_dist = r + r;
		for i in 0..self.nodes.len() {
			let xi = self.nodes[i].x + self.nodes[i].vx;
			let yi = self.nodes[i].y + self.nodes[i].vy;
			for j in (i + 1)..self.nodes.len() {
				let other = &self.nodes[j];
				let mut x = xi - other.x - other.vx;
				let mut y = yi - other.y - other.vy;
				let mut l = x * x + y * y;
				if l >= min_dist * min_dist {
					continue;
				}
				if x == 0.0 {
					x = self.rng.jiggle();
					l += x * x;
				}
				if y == 0.0 {
					y = self.rng.jiggle();
					l += y * y;
				}
				let l = l.sqrt();
				let push = (min_dist - l) / l;
				let (x, y) = (x * push, y * push);
				// Equal radii share the correction evenly.
				self.nodes[i].vx += x * 0.5;
				self.nodes[i].vy += y * 0.5;
				self.nodes[j].vx -= x * 0.5;
				self.nodes[j].vy -= y * 0.5;
			}
		}
	}

	fn bounds(&self) -> ((f64, f64), (f64, f64)) {
		let axis = |extent: f64| {
			let lo = self.config.margin.min(extent / 2.0);
			(lo, (extent - self.config.margin).max(lo))
		};
		(axis(self.width), axis(self.height))
	}

	fn clamp_point(&self, x: f64, y: f64) -> (f64, f64) {
		let ((x0, x1), (y0, y1)) = self.bounds();
		(x.clamp(x0, x1), y.clamp(y0, y1))
	}

	fn clamp_all(&mut self) {
		let ((x0, x1), (y0, y1)) = self.bounds();
		for node in &mut self.nodes {
			node.x = node.x.clamp(x0, x1);
			node.y = node.y.clamp(y0, y1);
		}
	}

	/// Pins `id` at the pointer and reheats so other nodes react.
	pub fn drag_start(&mut self, id: &str, x: f64, y: f64) -> bool {
		self.alpha_target = self.config.drag_alpha_target;
		self.pin(id, x, y)
	}

	pub fn drag_move(&mut self, id: &str, x: f64, y: f64) -> bool {
		self.pin(id, x, y)
	}

	/// Releases the pin and lets activity decay back to rest.
	pub fn drag_end(&mut self, id: &str) {
		self.alpha_target = 0.0;
		if let Some(&i) = self.index.get(id) {
			self.nodes[i].fx = None;
			self.nodes[i].fy = None;
		}
	}

	fn pin(&mut self, id: &str, x: f64, y: f64) -> bool {
		let (x, y) = self.clamp_point(x, y);
		match self.index.get(id) {
			Some(&i) => {
				let node = &mut self.nodes[i];
				node.fx = Some(x);
				node.fy = Some(y);
				node.x = x;
				node.y = y;
				true
			}
			None => false,
		}
	}

	/// Raises alpha to at least `alpha`.
	pub fn reheat(&mut self, alpha: f64) {
		self.alpha = self.alpha.max(alpha);
	}

	/// Halts the simulation for good. Later ticks leave positions untouched.
	pub fn stop(&mut self) {
		if !self.stopped {
			self.stopped = true;
			info!("simulation stopped");
		}
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
		self.clamp_all();
		self.reheat(self.config.drag_alpha_target);
	}

	/// Whether forces are still being integrated.
	pub fn is_active(&self) -> bool {
		self.alpha >= self.config.alpha_min
	}

	pub fn nodes(&self) -> &[SimNode] {
		&self.nodes
	}

	pub fn node(&self, id: &str) -> Option<&SimNode> {
		self.index.get(id).map(|&i| &self.nodes[i])
	}

	pub fn position(&self, id: &str) -> Option<(f64, f64)> {
		self.node(id).map(|n| (n.x, n.y))
	}

	pub fn config(&self) -> &SimulationConfig {
		&self.config
	}
}
