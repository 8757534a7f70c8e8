use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::{CanvasRenderingContext2d, CanvasWindingRule};

use super::layers::{EdgeStroke, NodeMarker};
use super::state::MapState;
use crate::network::regions::RegionShape;

const BACKGROUND: &str = "#1a1a2e";
const OUTLINE: &str = "rgba(255, 255, 255, 0.25)";

pub fn render(state: &MapState, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, state.width, state.height);

	draw_regions(state, ctx);
	let visibility = &state.visibility;
	if visibility.active_edges {
		draw_edges(state, ctx, &state.layers.active_edges);
	}
	if visibility.disrupted_edges {
		draw_edges(state, ctx, &state.layers.disrupted_edges);
	}
	if visibility.active_nodes {
		draw_nodes(state, ctx, &state.layers.active_nodes);
	}
	if visibility.disrupted_nodes {
		draw_nodes(state, ctx, &state.layers.disrupted_nodes);
	}
	ctx.set_global_alpha(1.0);
}

fn trace_shape(state: &MapState, ctx: &CanvasRenderingContext2d, shape: &RegionShape) {
	ctx.begin_path();
	for ring in shape.polygons.iter().flatten() {
		for (i, point) in ring.iter().enumerate() {
			let (x, y) = state.to_screen(*point);
			if i == 0 {
				ctx.move_to(x, y);
			} else {
				ctx.line_to(x, y);
			}
		}
		ctx.close_path();
	}
}

/// Outlines always serve as the base map; the disruption fill is its own
/// layer.
fn draw_regions(state: &MapState, ctx: &CanvasRenderingContext2d) {
	let _ = ctx.set_line_dash(&js_sys::Array::of1(&JsValue::from_f64(3.0)));
	ctx.set_line_width(1.0);
	ctx.set_stroke_style_str(OUTLINE);
	for fill in &state.layers.regions {
		let Some(shape) = state.regions.get(fill.shape) else {
			continue;
		};
		trace_shape(state, ctx, shape);
		if state.visibility.regions {
			let (color, alpha) = fill.status.fill();
			ctx.set_global_alpha(alpha);
			ctx.set_fill_style_str(color);
			ctx.fill_with_canvas_winding_rule(CanvasWindingRule::Evenodd);
			ctx.set_global_alpha(1.0);
		}
		ctx.stroke();
	}
	let _ = ctx.set_line_dash(&js_sys::Array::new());
}

fn draw_edges(state: &MapState, ctx: &CanvasRenderingContext2d, strokes: &[EdgeStroke]) {
	ctx.set_line_cap("round");
	for stroke in strokes {
		ctx.set_global_alpha(stroke.style.opacity);
		ctx.set_stroke_style_str(stroke.style.color);
		ctx.set_line_width(stroke.style.weight);
		ctx.begin_path();
		for (i, point) in stroke.path.iter().enumerate() {
			let (x, y) = state.to_screen(*point);
			if i == 0 {
				ctx.move_to(x, y);
			} else {
				ctx.line_to(x, y);
			}
		}
		ctx.stroke();
	}
	ctx.set_global_alpha(1.0);
}

fn draw_nodes(state: &MapState, ctx: &CanvasRenderingContext2d, markers: &[NodeMarker]) {
	let margin = 20.0;
	for marker in markers {
		let (x, y) = state.to_screen(marker.position);
		if x < -margin || y < -margin || x > state.width + margin || y > state.height + margin {
			continue;
		}
		ctx.set_global_alpha(marker.style.opacity);
		ctx.begin_path();
		let _ = ctx.arc(x, y, marker.style.radius, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(marker.style.color);
		ctx.fill();
		ctx.set_global_alpha(1.0);
		ctx.set_stroke_style_str(marker.style.color);
		ctx.set_line_width(1.0);
		ctx.stroke();
	}
}
