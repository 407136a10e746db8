//! Canvas rendering for the force graph.
//!
//! Draws the retained [`Scene`](super::scene::Scene) in passes for correct
//! z-ordering:
//! 1. Background (screen space)
//! 2. Edges with direction markers (world space)
//! 3. Nodes, then hover rings and labels on top

use std::f64::consts::PI;

use web_sys::CanvasRenderingContext2d;

use super::scale::ScaledValues;
use super::scene::{Arrow, EdgePath, EdgeVisual, NodeVisual};
use super::state::ForceGraphState;
use super::theme::Theme;

/// Renders the complete graph to the canvas.
pub fn render(state: &ForceGraphState, ctx: &CanvasRenderingContext2d) {
	let scale = ScaledValues::new(&state.scale, state.transform.k);

	draw_background(state, ctx, &state.theme);

	ctx.save();
	let _ = ctx.translate(state.transform.x, state.transform.y);
	let _ = ctx.scale(state.transform.k, state.transform.k);

	for edge in state.scene.edges.values() {
		draw_edge(ctx, edge, &scale, state.scale.arrow_size / scale.k);
	}
	ctx.set_global_alpha(1.0);

	for node in state.scene.nodes.values() {
		draw_node(ctx, node, &state.theme);
	}
	for (id, node) in &state.scene.nodes {
		if node.hovered {
			draw_hover_ring(ctx, node, &scale, &state.theme);
		}
		draw_label(ctx, id, node, &scale, &state.theme);
	}
	ctx.set_global_alpha(1.0);

	ctx.restore();
}

fn draw_background(state: &ForceGraphState, ctx: &CanvasRenderingContext2d, theme: &Theme) {
	ctx.set_fill_style_str(&theme.background.to_css());
	ctx.fill_rect(0.0, 0.0, state.width, state.height);
}

fn draw_edge(ctx: &CanvasRenderingContext2d, edge: &EdgeVisual, scale: &ScaledValues, arrow_size: f64) {
	let color = edge.color.to_css();
	ctx.set_global_alpha(edge.opacity);
	ctx.set_stroke_style_str(&color);
	ctx.set_line_width(scale.edge_width * edge.width);

	ctx.begin_path();
	match edge.path {
		EdgePath::Line { x1, y1, x2, y2 } => {
			ctx.move_to(x1, y1);
			ctx.line_to(x2, y2);
		}
		EdgePath::Arc {
			cx,
			cy,
			r,
			start,
			end,
		} => {
			let _ = ctx.arc(cx, cy, r, start, end);
		}
		EdgePath::Loop { cx, cy, r } => {
			let _ = ctx.arc(cx, cy, r, 0.0, 2.0 * PI);
		}
	}
	ctx.stroke();

	if let Some(arrow) = edge.arrow {
		ctx.set_fill_style_str(&color);
		draw_arrow(ctx, arrow, arrow_size);
	}
}

fn draw_arrow(ctx: &CanvasRenderingContext2d, arrow: Arrow, size: f64) {
	let Arrow {
		tip: (tip_x, tip_y),
		dir: (ux, uy),
	} = arrow;
	let (back_x, back_y) = (tip_x - ux * size, tip_y - uy * size);
	let (px, py) = (-uy * size * 0.5, ux * size * 0.5);

	ctx.begin_path();
	ctx.move_to(tip_x, tip_y);
	ctx.line_to(back_x + px, back_y + py);
	ctx.line_to(back_x - px, back_y - py);
	ctx.close_path();
	ctx.fill();
}

fn draw_node(ctx: &CanvasRenderingContext2d, node: &NodeVisual, theme: &Theme) {
	let (x, y, radius) = (node.x, node.y, node.radius);
	ctx.set_global_alpha(node.opacity);

	ctx.begin_path();
	let _ = ctx.arc(x, y, radius, 0.0, 2.0 * PI);
	let gradient = theme
		.node_gradient
		.then(|| ctx.create_radial_gradient(x - radius * 0.3, y - radius * 0.3, 0.0, x, y, radius))
		.and_then(Result::ok);
	match gradient {
		Some(gradient) => {
			let _ = gradient.add_color_stop(0.0, &node.fill.lighten(0.4).to_css());
			let _ = gradient.add_color_stop(1.0, &node.fill.to_css());
			#[allow(deprecated)]
			ctx.set_fill_style(&gradient);
		}
		None => ctx.set_fill_style_str(&node.fill.to_css()),
	}
	ctx.fill();
}

fn draw_hover_ring(ctx: &CanvasRenderingContext2d, node: &NodeVisual, scale: &ScaledValues, theme: &Theme) {
	ctx.set_global_alpha(1.0);
	ctx.begin_path();
	let _ = ctx.arc(node.x, node.y, node.radius + 3.0 / scale.k, 0.0, 2.0 * PI);
	ctx.set_stroke_style_str(&theme.hover_ring.to_css());
	ctx.set_line_width(scale.ring_width);
	ctx.stroke();
}

fn draw_label(ctx: &CanvasRenderingContext2d, label: &str, node: &NodeVisual, scale: &ScaledValues, theme: &Theme) {
	if node.opacity < 0.5 && !node.hovered {
		return;
	}
	ctx.set_global_alpha(node.opacity);
	ctx.set_fill_style_str(&theme.label_color.to_css());
	ctx.set_font(&scale.label_font);
	let _ = ctx.fill_text(label, node.x + node.radius + 4.0 / scale.k, node.y + 3.0 / scale.k);
}
