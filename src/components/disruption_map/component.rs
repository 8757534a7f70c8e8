use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use log::{debug, error};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent};

use super::layers::LayerVisibility;
use super::render;
use super::state::{MapHit, MapState, Pending};
use crate::config::AppConfig;
use crate::error::AppError;
use crate::network::regions::RegionShape;
use crate::network::session::Session;

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

fn context_2d(canvas: &HtmlCanvasElement) -> Result<CanvasRenderingContext2d, AppError> {
	canvas
		.get_context("2d")?
		.ok_or_else(|| AppError::Js("canvas has no 2d context".into()))?
		.dyn_into::<CanvasRenderingContext2d>()
		.map_err(|_| AppError::Js("unexpected context type".into()))
}

fn parent_size(canvas: &HtmlCanvasElement) -> (f64, f64) {
	canvas
		.parent_element()
		.map(|p| (p.client_width() as f64, p.client_height() as f64))
		.filter(|(w, h)| *w > 0.0 && *h > 0.0)
		.unwrap_or((800.0, 600.0))
}

fn local_position(canvas: &HtmlCanvasElement, ev: &MouseEvent) -> (f64, f64) {
	let rect = canvas.get_bounding_client_rect();
	(
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	)
}

/// Canvas map of the network. Session changes are picked up on the next
/// animation frame; clicks on markers or regions are reported via `on_hit`.
#[component]
pub fn DisruptionMap(
	session: RwSignal<Session>,
	#[prop(into)] regions: Signal<Vec<RegionShape>>,
	#[prop(into)] visibility: Signal<LayerVisibility>,
	config: AppConfig,
	#[prop(into)] on_hit: Callback<MapHit>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let state: Rc<RefCell<Option<MapState>>> = Rc::new(RefCell::new(None));
	let animate: FrameCallback = Rc::new(RefCell::new(None));
	let resize_cb: FrameCallback = Rc::new(RefCell::new(None));
	let (state_init, animate_init, resize_cb_init) =
		(state.clone(), animate.clone(), resize_cb.clone());

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			return;
		};

		let (w, h) = parent_size(&canvas);
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let ctx = match context_2d(&canvas) {
			Ok(ctx) => ctx,
			Err(e) => {
				error!("Map canvas unavailable: {e}");
				return;
			}
		};
		let mut map = MapState::new(&config, w, h);
		map.regions = regions.get_untracked();
		map.visibility = visibility.get_untracked();
		*state_init.borrow_mut() = Some(map);

		let (state_resize, canvas_resize) = (state_init.clone(), canvas.clone());
		*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
			let (nw, nh) = parent_size(&canvas_resize);
			canvas_resize.set_width(nw as u32);
			canvas_resize.set_height(nh as u32);
			if let Some(ref mut s) = *state_resize.borrow_mut() {
				s.resize(nw, nh);
			}
		}));
		if let Some(ref cb) = *resize_cb_init.borrow() {
			let _ = window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
		}

		let (state_anim, animate_inner) = (state_init.clone(), animate_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			if let Some(ref mut s) = *state_anim.borrow_mut() {
				if session.with_untracked(|session| s.flush(session)) {
					render::render(s, &ctx);
				}
			}
			if let Some(ref cb) = *animate_inner.borrow() {
				if let Some(win) = web_sys::window() {
					let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
				}
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let state_rev = state.clone();
	Effect::new(move |_| {
		let revision = session.with(|s| s.revision());
		if let Some(ref mut s) = *state_rev.borrow_mut() {
			debug!("Session revision {revision}, rebuilding layers");
			s.schedule(Pending::Rebuild);
		}
	});

	let state_regions = state.clone();
	Effect::new(move |_| {
		let shapes = regions.get();
		if let Some(ref mut s) = *state_regions.borrow_mut() {
			s.regions = shapes;
			s.schedule(Pending::Rebuild);
		}
	});

	let state_vis = state.clone();
	Effect::new(move |_| {
		let layers = visibility.get();
		if let Some(ref mut s) = *state_vis.borrow_mut() {
			s.visibility = layers;
			s.schedule(Pending::Repaint);
		}
	});

	let canvas_el = move || -> Option<HtmlCanvasElement> { canvas_ref.get().map(Into::into) };

	let state_md = state.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some(canvas) = canvas_el() else { return };
		let (x, y) = local_position(&canvas, &ev);
		if let Some(ref mut s) = *state_md.borrow_mut() {
			s.start_pan(x, y);
		}
	};

	let state_mm = state.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some(canvas) = canvas_el() else { return };
		let (x, y) = local_position(&canvas, &ev);
		if let Some(ref mut s) = *state_mm.borrow_mut() {
			s.move_pan(x, y);
		}
	};

	let state_mu = state.clone();
	let on_mouseup = move |ev: MouseEvent| {
		let Some(canvas) = canvas_el() else { return };
		let (x, y) = local_position(&canvas, &ev);
		let hit = state_mu
			.borrow_mut()
			.as_mut()
			.and_then(|s| if s.end_pan() { s.hit_test(x, y) } else { None });
		if let Some(hit) = hit {
			on_hit.run(hit);
		}
	};

	let state_ml = state.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_ml.borrow_mut() {
			s.end_pan();
		}
	};

	let state_wh = state.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some(canvas) = canvas_el() else { return };
		let (x, y) = local_position(&canvas, &ev);
		if let Some(ref mut s) = *state_wh.borrow_mut() {
			let delta = if ev.delta_y() > 0.0 { -1.0 } else { 1.0 };
			s.zoom_at(x, y, delta);
		}
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="disruption-map-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:wheel=on_wheel
			style="display: block; cursor: grab;"
		/>
	}
}
