use super::layers::{LayerSet, LayerVisibility, build_layers};
use crate::config::AppConfig;
use crate::network::regions::RegionShape;
use crate::network::session::Session;
use crate::network::types::GeoPoint;

/// World width in pixels at zoom 0.
pub const TILE_SIZE: f64 = 256.0;
/// Extra pixels around a marker that still count as a hit.
pub const HIT_SLOP: f64 = 4.0;
/// Pointer travel below which a press counts as a click, not a pan.
pub const CLICK_TOLERANCE: f64 = 4.0;

pub fn world_size(zoom: f64) -> f64 {
	TILE_SIZE * 2f64.powf(zoom)
}

/// Equirectangular projection to world pixels at `zoom`.
pub fn project(p: GeoPoint, zoom: f64) -> (f64, f64) {
	let size = world_size(zoom);
	((p.lon + 180.0) / 360.0 * size, (90.0 - p.lat) / 360.0 * size)
}

pub fn unproject(x: f64, y: f64, zoom: f64) -> GeoPoint {
	let size = world_size(zoom);
	GeoPoint::new(x / size * 360.0 - 180.0, 90.0 - y / size * 360.0)
}

/// Screen offset of the world origin plus the current zoom level.
#[derive(Clone, Debug, Default)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub zoom: f64,
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub moved: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
}

/// Work the next animation frame has to do, strongest first.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum Pending {
	#[default]
	Idle,
	Repaint,
	Resize,
	Rebuild,
}

/// What a click landed on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MapHit {
	Node(String),
	Region(String),
}

pub struct MapState {
	pub transform: ViewTransform,
	pub pan: PanState,
	pub width: f64,
	pub height: f64,
	pub layers: LayerSet,
	pub regions: Vec<RegionShape>,
	pub visibility: LayerVisibility,
	pending: Pending,
	min_zoom: f64,
	max_zoom: f64,
}

impl MapState {
	pub fn new(config: &AppConfig, width: f64, height: f64) -> Self {
		let zoom = config.initial_zoom;
		let center = GeoPoint::new(config.initial_center.lon, config.initial_center.lat);
		let (cx, cy) = project(center, zoom);
		Self {
			transform: ViewTransform {
				x: width / 2.0 - cx,
				y: height / 2.0 - cy,
				zoom,
			},
			pan: PanState::default(),
			width,
			height,
			layers: LayerSet::default(),
			regions: Vec::new(),
			visibility: LayerVisibility::default(),
			pending: Pending::Rebuild,
			min_zoom: config.min_zoom,
			max_zoom: config.max_zoom,
		}
	}

	pub fn schedule(&mut self, work: Pending) {
		self.pending = self.pending.max(work);
	}

	pub fn pending(&self) -> Pending {
		self.pending
	}

	/// Applies scheduled work. Returns whether the canvas needs painting.
	pub fn flush(&mut self, session: &Session) -> bool {
		let work = std::mem::take(&mut self.pending);
		match work {
			Pending::Idle => return false,
			Pending::Repaint => {}
			Pending::Resize => self.layers.resize(self.transform.zoom),
			Pending::Rebuild => {
				self.layers = build_layers(session, &self.regions, self.transform.zoom);
			}
		}
		true
	}

	pub fn to_screen(&self, p: GeoPoint) -> (f64, f64) {
		let (x, y) = project(p, self.transform.zoom);
		(x + self.transform.x, y + self.transform.y)
	}

	pub fn to_geo(&self, sx: f64, sy: f64) -> GeoPoint {
		unproject(
			sx - self.transform.x,
			sy - self.transform.y,
			self.transform.zoom,
		)
	}

	/// Steps zoom by `delta` levels keeping the point under the cursor fixed.
	pub fn zoom_at(&mut self, sx: f64, sy: f64, delta: f64) {
		let zoom = (self.transform.zoom + delta).clamp(self.min_zoom, self.max_zoom);
		if zoom == self.transform.zoom {
			return;
		}
		let ratio = 2f64.powf(zoom - self.transform.zoom);
		self.transform.x = sx - (sx - self.transform.x) * ratio;
		self.transform.y = sy - (sy - self.transform.y) * ratio;
		self.transform.zoom = zoom;
		self.schedule(Pending::Resize);
	}

	pub fn start_pan(&mut self, sx: f64, sy: f64) {
		self.pan = PanState {
			active: true,
			moved: false,
			start_x: sx,
			start_y: sy,
			transform_start_x: self.transform.x,
			transform_start_y: self.transform.y,
		};
	}

	pub fn move_pan(&mut self, sx: f64, sy: f64) {
		if !self.pan.active {
			return;
		}
		let (dx, dy) = (sx - self.pan.start_x, sy - self.pan.start_y);
		if dx.hypot(dy) > CLICK_TOLERANCE {
			self.pan.moved = true;
		}
		if self.pan.moved {
			self.transform.x = self.pan.transform_start_x + dx;
			self.transform.y = self.pan.transform_start_y + dy;
			self.schedule(Pending::Repaint);
		}
	}

	/// Ends a press. Returns whether it was a click rather than a drag.
	pub fn end_pan(&mut self) -> bool {
		let click = self.pan.active && !self.pan.moved;
		self.pan = PanState::default();
		click
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.transform.x += (width - self.width) / 2.0;
		self.transform.y += (height - self.height) / 2.0;
		self.width = width;
		self.height = height;
		self.schedule(Pending::Repaint);
	}

	/// Topmost visible marker under the point, disrupted markers first since
	/// they are drawn last.
	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<&str> {
		let layers = [
			(self.visibility.disrupted_nodes, &self.layers.disrupted_nodes),
			(self.visibility.active_nodes, &self.layers.active_nodes),
		];
		layers
			.into_iter()
			.filter(|(on, _)| *on)
			.flat_map(|(_, markers)| markers.iter().rev())
			.find(|marker| {
				let (x, y) = self.to_screen(marker.position);
				(x - sx).hypot(y - sy) <= marker.style.radius + HIT_SLOP
			})
			.map(|marker| marker.code.as_str())
	}

	pub fn region_at_position(&self, sx: f64, sy: f64) -> Option<&str> {
		if !self.visibility.regions {
			return None;
		}
		let point = self.to_geo(sx, sy);
		self.regions
			.iter()
			.find(|r| r.contains(point))
			.map(|r| r.name.as_str())
	}

	pub fn hit_test(&self, sx: f64, sy: f64) -> Option<MapHit> {
		if let Some(code) = self.node_at_position(sx, sy) {
			return Some(MapHit::Node(code.to_string()));
		}
		self.region_at_position(sx, sy)
			.map(|name| MapHit::Region(name.to_string()))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::network::regions::parse_boundaries;
	use crate::network::types::fixtures;

	fn state() -> MapState {
		MapState::new(&AppConfig::default(), 800.0, 600.0)
	}

	fn session_with_positions() -> Session {
		let mut features = fixtures::features();
		for (i, node) in features.nodes.iter_mut().enumerate() {
			node.position = GeoPoint::new(i as f64 * 20.0, 20.0);
		}
		Session::new(features)
	}

	#[test]
	fn initial_center_is_screen_center() {
		let state = state();
		let (x, y) = state.to_screen(GeoPoint::new(0.0, 20.0));
		assert!((x - 400.0).abs() < 1e-9 && (y - 300.0).abs() < 1e-9);
	}

	#[test]
	fn projection_round_trips() {
		let p = GeoPoint::new(-73.78, 40.64);
		let (x, y) = project(p, 5.0);
		let back = unproject(x, y, 5.0);
		assert!((back.lon - p.lon).abs() < 1e-9 && (back.lat - p.lat).abs() < 1e-9);
	}

	#[test]
	fn zoom_keeps_cursor_anchor_and_clamps() {
		let mut state = state();
		let anchor = state.to_geo(100.0, 150.0);
		state.zoom_at(100.0, 150.0, 1.0);
		let after = state.to_geo(100.0, 150.0);
		assert!((anchor.lon - after.lon).abs() < 1e-9);
		assert_eq!(state.transform.zoom, 3.0);
		assert_eq!(state.pending(), Pending::Rebuild);

		state.zoom_at(0.0, 0.0, -5.0);
		assert_eq!(state.transform.zoom, 2.0);
	}

	#[test]
	fn scheduling_keeps_strongest_work() {
		let session = session_with_positions();
		let mut state = state();
		assert!(state.flush(&session));
		assert_eq!(state.pending(), Pending::Idle);
		assert!(!state.flush(&session));

		state.schedule(Pending::Resize);
		state.schedule(Pending::Repaint);
		assert_eq!(state.pending(), Pending::Resize);
		state.schedule(Pending::Rebuild);
		assert_eq!(state.pending(), Pending::Rebuild);
	}

	#[test]
	fn zoom_only_resizes_layers() {
		let session = session_with_positions();
		let mut state = state();
		state.flush(&session);
		state.zoom_at(400.0, 300.0, 2.0);
		assert_eq!(state.pending(), Pending::Resize);
		state.flush(&session);
		assert_eq!(state.layers, build_layers(&session, &[], 4.0));
	}

	#[test]
	fn click_without_drag_hits_node() {
		let session = session_with_positions();
		let mut state = state();
		state.flush(&session);

		let (x, y) = state.to_screen(GeoPoint::new(20.0, 20.0));
		state.start_pan(x, y);
		state.move_pan(x + 1.0, y);
		assert!(state.end_pan());
		assert_eq!(state.hit_test(x + 1.0, y), Some(MapHit::Node("LAX".into())));

		state.start_pan(x, y);
		state.move_pan(x + 50.0, y);
		assert!(!state.end_pan());
	}

	#[test]
	fn hidden_layers_are_not_hit() {
		let session = session_with_positions();
		let mut state = state();
		state.flush(&session);
		state.visibility.active_nodes = false;
		let (x, y) = state.to_screen(GeoPoint::new(20.0, 20.0));
		assert_eq!(state.node_at_position(x, y), None);
	}

	#[test]
	fn region_hit_needs_visible_overlay() {
		let mut state = state();
		state.regions = parse_boundaries(
			r#"{"features": [{"properties": {"name": "France"},
				"geometry": {"type": "Polygon", "coordinates": [[[-5, 42], [8, 42], [8, 51], [-5, 51], [-5, 42]]]}}]}"#,
		)
		.unwrap();
		let (x, y) = state.to_screen(GeoPoint::new(2.0, 47.0));
		assert_eq!(state.hit_test(x, y), None);

		state.visibility.regions = true;
		assert_eq!(state.hit_test(x, y), Some(MapHit::Region("France".into())));
	}
}
