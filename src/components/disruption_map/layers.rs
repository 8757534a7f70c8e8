//! Derives the five map layers from a session snapshot and a zoom level.
//!
//! A full [`build_layers`] pass classifies every feature; [`LayerSet::resize`]
//! only recomputes the zoom dependent sizes of what is already classified.

use crate::network::country_index::CountryIndex;
use crate::network::disruption::DisruptionStore;
use crate::network::palette::{
	BRIDGE_COLOR, DISRUPTED_COLOR, STRANDED_AIRPORT_COLOR, STRANDED_ROUTE_COLOR, community_color,
};
use crate::network::regions::RegionShape;
use crate::network::session::Session;
use crate::network::types::{BRIDGE_COMMUNITY, EdgeFeature, GeoPoint, NodeFeature};

/// Visual classification of one feature, highest priority first.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VisualState {
	Disrupted,
	Stranded,
	Active(i64),
}

pub fn resolve_node(node: &NodeFeature, store: &DisruptionStore) -> VisualState {
	if node.disrupted || store.is_disrupted(&node.code) {
		VisualState::Disrupted
	} else if store.is_stranded(&node.code) {
		VisualState::Stranded
	} else {
		VisualState::Active(node.community)
	}
}

pub fn resolve_edge(edge: &EdgeFeature, store: &DisruptionStore) -> VisualState {
	let endpoints = [edge.source.as_str(), edge.target.as_str()];
	if edge.disrupted || endpoints.iter().any(|c| store.is_disrupted(c)) {
		VisualState::Disrupted
	} else if endpoints.iter().any(|c| store.is_stranded(c)) {
		VisualState::Stranded
	} else {
		VisualState::Active(edge.community)
	}
}

pub fn base_radius(zoom: f64) -> f64 {
	(zoom / 2.0).max(1.0)
}

pub fn base_weight(zoom: f64) -> f64 {
	(zoom / 5.0).max(0.3)
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodeStyle {
	pub color: &'static str,
	pub radius: f64,
	pub opacity: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgeStyle {
	pub color: &'static str,
	pub weight: f64,
	pub opacity: f64,
}

pub fn node_style(state: VisualState, zoom: f64) -> NodeStyle {
	let radius = base_radius(zoom);
	match state {
		VisualState::Disrupted => NodeStyle {
			color: DISRUPTED_COLOR,
			radius: radius + 2.0,
			opacity: 0.8,
		},
		VisualState::Stranded => NodeStyle {
			color: STRANDED_AIRPORT_COLOR,
			radius,
			opacity: 0.8,
		},
		VisualState::Active(community) => NodeStyle {
			color: community_color(community),
			radius,
			opacity: 0.8,
		},
	}
}

pub fn edge_style(state: VisualState, zoom: f64) -> EdgeStyle {
	let weight = base_weight(zoom);
	// Active routes fade in linearly with zoom down to a floor.
	let fade = |base: f64, floor: f64| (base * zoom / 5.0).clamp(floor, 1.0);
	match state {
		VisualState::Disrupted => EdgeStyle {
			color: DISRUPTED_COLOR,
			weight: weight * 1.5,
			opacity: 1.0,
		},
		VisualState::Stranded => EdgeStyle {
			color: STRANDED_ROUTE_COLOR,
			weight: weight * 1.3,
			opacity: 0.7,
		},
		VisualState::Active(BRIDGE_COMMUNITY) => EdgeStyle {
			color: BRIDGE_COLOR,
			weight: weight * 0.6,
			opacity: fade(0.2, 0.06),
		},
		VisualState::Active(community) => EdgeStyle {
			color: community_color(community),
			weight,
			opacity: fade(0.3, 0.1),
		},
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct NodeMarker {
	pub code: String,
	pub position: GeoPoint,
	pub state: VisualState,
	pub style: NodeStyle,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EdgeStroke {
	pub path: Vec<GeoPoint>,
	pub state: VisualState,
	pub style: EdgeStyle,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegionStatus {
	Unaffected,
	Partial,
	Full,
}

impl RegionStatus {
	pub fn fill(&self) -> (&'static str, f64) {
		match self {
			Self::Full => (DISRUPTED_COLOR, 0.4),
			Self::Partial => (STRANDED_AIRPORT_COLOR, 0.3),
			Self::Unaffected => (BRIDGE_COLOR, 0.1),
		}
	}
}

pub fn region_status(name: &str, countries: &CountryIndex, store: &DisruptionStore) -> RegionStatus {
	let Some(members) = countries.members(name) else {
		return RegionStatus::Unaffected;
	};
	match store.disrupted_among(members) {
		0 => RegionStatus::Unaffected,
		n if n == members.len() => RegionStatus::Full,
		_ => RegionStatus::Partial,
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct RegionFill {
	pub shape: usize,
	pub status: RegionStatus,
}

/// Which of the five layers are drawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LayerVisibility {
	pub active_nodes: bool,
	pub disrupted_nodes: bool,
	pub active_edges: bool,
	pub disrupted_edges: bool,
	pub regions: bool,
}

impl Default for LayerVisibility {
	fn default() -> Self {
		Self {
			active_nodes: true,
			disrupted_nodes: true,
			active_edges: true,
			disrupted_edges: true,
			regions: false,
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayerKind {
	ActiveNodes,
	DisruptedNodes,
	ActiveEdges,
	DisruptedEdges,
	Regions,
}

impl LayerKind {
	pub const ALL: [LayerKind; 5] = [
		Self::ActiveNodes,
		Self::DisruptedNodes,
		Self::ActiveEdges,
		Self::DisruptedEdges,
		Self::Regions,
	];

	pub fn label(&self) -> &'static str {
		match self {
			Self::ActiveNodes => "Active airports",
			Self::DisruptedNodes => "Disrupted airports",
			Self::ActiveEdges => "Active routes",
			Self::DisruptedEdges => "Disrupted routes",
			Self::Regions => "Countries",
		}
	}
}

impl LayerVisibility {
	pub fn get(&self, kind: LayerKind) -> bool {
		match kind {
			LayerKind::ActiveNodes => self.active_nodes,
			LayerKind::DisruptedNodes => self.disrupted_nodes,
			LayerKind::ActiveEdges => self.active_edges,
			LayerKind::DisruptedEdges => self.disrupted_edges,
			LayerKind::Regions => self.regions,
		}
	}

	pub fn toggle(&mut self, kind: LayerKind) {
		let flag = match kind {
			LayerKind::ActiveNodes => &mut self.active_nodes,
			LayerKind::DisruptedNodes => &mut self.disrupted_nodes,
			LayerKind::ActiveEdges => &mut self.active_edges,
			LayerKind::DisruptedEdges => &mut self.disrupted_edges,
			LayerKind::Regions => &mut self.regions,
		};
		*flag = !*flag;
	}
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct LayerSet {
	pub zoom: f64,
	pub active_nodes: Vec<NodeMarker>,
	pub disrupted_nodes: Vec<NodeMarker>,
	pub active_edges: Vec<EdgeStroke>,
	pub disrupted_edges: Vec<EdgeStroke>,
	pub regions: Vec<RegionFill>,
}

/// Full rebuild of every layer.
pub fn build_layers(session: &Session, regions: &[RegionShape], zoom: f64) -> LayerSet {
	let store = session.store();
	let features = session.features();
	let mut layers = LayerSet {
		zoom,
		..Default::default()
	};

	for node in &features.nodes {
		let state = resolve_node(node, store);
		let marker = NodeMarker {
			code: node.code.clone(),
			position: node.position,
			state,
			style: node_style(state, zoom),
		};
		match state {
			VisualState::Disrupted => layers.disrupted_nodes.push(marker),
			_ => layers.active_nodes.push(marker),
		}
	}

	for edge in &features.edges {
		let state = resolve_edge(edge, store);
		let path = if edge.path.len() >= 2 {
			edge.path.clone()
		} else {
			match (session.node(&edge.source), session.node(&edge.target)) {
				(Some(a), Some(b)) => vec![a.position, b.position],
				_ => continue,
			}
		};
		let stroke = EdgeStroke {
			path,
			state,
			style: edge_style(state, zoom),
		};
		match state {
			VisualState::Disrupted => layers.disrupted_edges.push(stroke),
			_ => layers.active_edges.push(stroke),
		}
	}

	layers.regions = regions
		.iter()
		.enumerate()
		.map(|(shape, region)| RegionFill {
			shape,
			status: region_status(&region.name, session.countries(), store),
		})
		.collect();

	layers
}

impl LayerSet {
	pub fn node_count(&self) -> usize {
		self.active_nodes.len() + self.disrupted_nodes.len()
	}

	/// Recomputes sizes for a new zoom level without reclassifying.
	pub fn resize(&mut self, zoom: f64) {
		self.zoom = zoom;
		for marker in self.active_nodes.iter_mut().chain(&mut self.disrupted_nodes) {
			marker.style = node_style(marker.state, zoom);
		}
		for stroke in self.active_edges.iter_mut().chain(&mut self.disrupted_edges) {
			stroke.style = edge_style(stroke.state, zoom);
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::network::types::{AnalysisResult, NetworkMetrics, fixtures};

	fn session() -> Session {
		Session::new(fixtures::features())
	}

	fn reconciled(disrupted: &[&str], stranded: &[&str]) -> Session {
		let mut session = session();
		let mut features = fixtures::features();
		for node in &mut features.nodes {
			node.disrupted = disrupted.contains(&node.code.as_str());
		}
		for edge in &mut features.edges {
			edge.disrupted = disrupted.contains(&edge.source.as_str())
				|| disrupted.contains(&edge.target.as_str());
		}
		session.apply_result(AnalysisResult {
			before: NetworkMetrics::default(),
			after: NetworkMetrics::default(),
			confirmed_disrupted: disrupted.iter().map(|s| s.to_string()).collect(),
			confirmed_stranded: stranded.iter().map(|s| s.to_string()).collect(),
			community_count: 3,
			features,
		});
		session
	}

	fn state_of(layers: &LayerSet, code: &str) -> VisualState {
		layers
			.active_nodes
			.iter()
			.chain(&layers.disrupted_nodes)
			.find(|m| m.code == code)
			.map(|m| m.state)
			.unwrap()
	}

	#[test]
	fn disrupted_beats_stranded_beats_community() {
		let mut store = DisruptionStore::new(["A", "B"]);
		let mut node = fixtures::node("A", "X", 4);
		assert_eq!(resolve_node(&node, &store), VisualState::Active(4));

		let mut result = AnalysisResult {
			before: NetworkMetrics::default(),
			after: NetworkMetrics::default(),
			confirmed_disrupted: vec![],
			confirmed_stranded: vec!["A".into()],
			community_count: 0,
			features: Default::default(),
		};
		store.replace_from_result(&result);
		assert_eq!(resolve_node(&node, &store), VisualState::Stranded);

		node.disrupted = true;
		assert_eq!(resolve_node(&node, &store), VisualState::Disrupted);

		node.disrupted = false;
		result.confirmed_disrupted = vec!["A".into()];
		store.replace_from_result(&result);
		assert_eq!(resolve_node(&node, &store), VisualState::Disrupted);
	}

	#[test]
	fn reconciled_result_renders_disrupted_and_stranded() {
		let layers = build_layers(&reconciled(&["JFK", "LAX"], &["ANC"]), &[], 2.0);

		assert_eq!(state_of(&layers, "JFK"), VisualState::Disrupted);
		assert_eq!(state_of(&layers, "LAX"), VisualState::Disrupted);
		assert_eq!(state_of(&layers, "ANC"), VisualState::Stranded);
		assert_eq!(state_of(&layers, "CDG"), VisualState::Active(2));
		assert_eq!(layers.disrupted_nodes.len(), 2);
		assert_eq!(layers.node_count(), 6);

		let anc = layers.active_nodes.iter().find(|m| m.code == "ANC").unwrap();
		assert_eq!(anc.style.color, STRANDED_AIRPORT_COLOR);
	}

	#[test]
	fn operator_selection_shows_before_simulation() {
		let mut session = session();
		session.toggle_node("CDG");
		let layers = build_layers(&session, &[], 4.0);

		assert_eq!(state_of(&layers, "CDG"), VisualState::Disrupted);
		// JFK-CDG, CDG-ORY and LHR-CDG all touch CDG.
		assert_eq!(layers.disrupted_edges.len(), 3);
	}

	#[test]
	fn stranded_endpoint_marks_edge() {
		let session = reconciled(&[], &["ANC"]);
		let layers = build_layers(&session, &[], 2.0);
		let stranded: Vec<_> = layers
			.active_edges
			.iter()
			.filter(|e| e.state == VisualState::Stranded)
			.collect();
		assert_eq!(stranded.len(), 1);
		assert_eq!(stranded[0].style.color, STRANDED_ROUTE_COLOR);
	}

	#[test]
	fn bridge_edges_are_thinner_and_fainter() {
		for zoom in [2.0, 5.0, 10.0] {
			let bridge = edge_style(VisualState::Active(BRIDGE_COMMUNITY), zoom);
			let local = edge_style(VisualState::Active(3), zoom);
			assert!(bridge.weight < local.weight);
			assert!(bridge.opacity < local.opacity);
		}
	}

	#[test]
	fn edges_grow_with_zoom_down_to_a_floor() {
		let low = edge_style(VisualState::Active(0), 0.5);
		let lower = edge_style(VisualState::Active(0), 0.1);
		let high = edge_style(VisualState::Active(0), 8.0);
		assert_eq!(low, lower);
		assert!(high.weight > low.weight && high.opacity > low.opacity);
		assert_eq!(base_radius(0.5), 1.0);
	}

	#[test]
	fn resize_matches_full_rebuild() {
		let mut session = reconciled(&["JFK"], &["ANC"]);
		session.toggle_node("ORY");
		let mut layers = build_layers(&session, &[], 2.0);
		layers.resize(7.0);
		assert_eq!(layers, build_layers(&session, &[], 7.0));
	}

	#[test]
	fn region_status_follows_disrupted_set() {
		let mut session = session();
		let countries = session.countries().clone();
		assert_eq!(
			region_status("France", &countries, session.store()),
			RegionStatus::Unaffected
		);
		session.toggle_node("CDG");
		assert_eq!(
			region_status("France", &countries, session.store()),
			RegionStatus::Partial
		);
		session.toggle_node("ORY");
		assert_eq!(
			region_status("France", &countries, session.store()),
			RegionStatus::Full
		);
		assert_eq!(
			region_status("Atlantis", &countries, session.store()),
			RegionStatus::Unaffected
		);
	}

	#[test]
	fn visibility_toggles_each_layer() {
		let mut visibility = LayerVisibility::default();
		assert!(!visibility.get(LayerKind::Regions));
		for kind in LayerKind::ALL {
			let before = visibility.get(kind);
			visibility.toggle(kind);
			assert_ne!(before, visibility.get(kind));
		}
	}
}
