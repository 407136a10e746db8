//! Zoom limits and zoom-dependent sizes of graph visuals.
//!
//! Zoom and pan are a pure view transform; simulator coordinates are never
//! touched. Sizes are either world-space (grow when zoomed in, like node discs
//! and the collision radius they represent) or screen-space (constant pixel
//! size, like stroke widths and label text).

/// Defines how a visual property scales with zoom level.
#[derive(Clone, Debug)]
pub enum ScaleBehavior {
	/// Constant world-space size. Appears larger when zoomed in.
	World,
	/// Constant screen-space size (pixels). Unaffected by zoom.
	Screen,
}

impl ScaleBehavior {
	/// World-space value to draw with after the canvas transform is applied.
	pub fn apply(&self, base: f64, k: f64) -> f64 {
		match self {
			ScaleBehavior::World => base,
			ScaleBehavior::Screen => base / k,
		}
	}
}

/// Complete scale configuration for all graph elements.
#[derive(Clone, Debug)]
pub struct ScaleConfig {
	pub node_radius: f64,
	/// Pointer distance (world units) that still counts as over a node.
	pub hit_radius: f64,
	pub edge_width: f64,
	pub edge_width_behavior: ScaleBehavior,
	/// Pointer distance (screen pixels) that still counts as over an edge.
	pub edge_hit_tolerance: f64,
	pub arrow_size: f64,
	/// Radius of the loop drawn for self-referencing edges.
	pub loop_radius: f64,
	/// Label font size in screen pixels.
	pub label_size: f64,
	pub min_zoom: f64,
	pub max_zoom: f64,
	/// Multiplicative zoom change per wheel notch.
	pub zoom_step: f64,
}

impl Default for ScaleConfig {
	fn default() -> Self {
		Self {
			node_radius: 8.0,
			hit_radius: 12.0,
			edge_width: 1.5,
			edge_width_behavior: ScaleBehavior::Screen,
			edge_hit_tolerance: 5.0,
			arrow_size: 7.0,
			loop_radius: 12.0,
			label_size: 11.0,
			min_zoom: 0.1,
			max_zoom: 8.0,
			zoom_step: 1.1,
		}
	}
}

impl ScaleConfig {
	pub fn clamp_zoom(&self, k: f64) -> f64 {
		k.clamp(self.min_zoom, self.max_zoom)
	}
}

/// Pre-computed scale values for a specific zoom level.
///
/// Create this once per frame and pass it to rendering functions.
#[derive(Clone, Debug)]
pub struct ScaledValues {
	pub k: f64,
	pub edge_width: f64,
	pub ring_width: f64,
	pub label_font: String,
}

impl ScaledValues {
	pub fn new(config: &ScaleConfig, k: f64) -> Self {
		Self {
			k,
			edge_width: config.edge_width_behavior.apply(config.edge_width, k),
			ring_width: ScaleBehavior::Screen.apply(1.5, k),
			label_font: format!("{}px sans-serif", config.label_size / k),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn zoom_is_clamped_to_range() {
		let config = ScaleConfig::default();
		assert_eq!(config.clamp_zoom(0.01), 0.1);
		assert_eq!(config.clamp_zoom(20.0), 8.0);
		assert_eq!(config.clamp_zoom(2.0), 2.0);
	}

	#[test]
	fn screen_sizes_counter_zoom() {
		let scaled = ScaledValues::new(&ScaleConfig::default(), 2.0);
		assert_eq!(scaled.edge_width, 0.75);
		assert_eq!(ScaleBehavior::World.apply(8.0, 2.0), 8.0);
	}
}
