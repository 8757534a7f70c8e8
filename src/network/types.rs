use serde::{Deserialize, Serialize};

/// Community id the analysis service assigns to bridge routes and nodes
/// without a strong group.
pub const BRIDGE_COMMUNITY: i64 = -1;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GeoPoint {
	pub lon: f64,
	pub lat: f64,
}

impl GeoPoint {
	pub fn new(lon: f64, lat: f64) -> Self {
		Self { lon, lat }
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct NodeFeature {
	pub code: String,
	pub name: String,
	pub city: String,
	pub country: String,
	pub position: GeoPoint,
	pub community: i64,
	pub disrupted: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EdgeFeature {
	pub source: String,
	pub target: String,
	pub community: i64,
	pub disrupted: bool,
	pub path: Vec<GeoPoint>,
}

impl EdgeFeature {
	pub fn is_bridge(&self) -> bool {
		self.community == BRIDGE_COMMUNITY
	}
}

/// One generation of node and edge features. A simulation round replaces
/// the whole set.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FeatureSet {
	pub nodes: Vec<NodeFeature>,
	pub edges: Vec<EdgeFeature>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkMetrics {
	pub nodes: u64,
	pub edges: u64,
	pub largest_component: u64,
	#[serde(default)]
	pub efficiency: Option<f64>,
}

impl NetworkMetrics {
	/// Global efficiency when the service could compute one.
	pub fn efficiency(&self) -> Option<f64> {
		self.efficiency.filter(|e| e.is_finite() && *e > 0.0)
	}
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CentralityMetric {
	#[default]
	Betweenness,
	Degree,
	Closeness,
}

impl CentralityMetric {
	pub const ALL: [CentralityMetric; 3] = [Self::Betweenness, Self::Degree, Self::Closeness];

	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Betweenness => "betweenness",
			Self::Degree => "degree",
			Self::Closeness => "closeness",
		}
	}

	pub fn label(&self) -> &'static str {
		match self {
			Self::Betweenness => "Betweenness",
			Self::Degree => "Degree",
			Self::Closeness => "Closeness",
		}
	}

	pub fn parse(value: &str) -> Option<Self> {
		Self::ALL.into_iter().find(|m| m.as_str() == value)
	}
}

/// Authoritative outcome of one simulation round.
#[derive(Clone, Debug, PartialEq)]
pub struct AnalysisResult {
	pub before: NetworkMetrics,
	pub after: NetworkMetrics,
	pub confirmed_disrupted: Vec<String>,
	pub confirmed_stranded: Vec<String>,
	pub community_count: u32,
	pub features: FeatureSet,
}

// Wire formats

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRequest {
	pub disrupted: Vec<String>,
	pub auto_top_n: u32,
	pub centrality_metric: CentralityMetric,
}

#[derive(Clone, Debug, Deserialize)]
pub struct FeatureCollection<P, G> {
	pub features: Vec<Feature<P, G>>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Feature<P, G> {
	pub properties: P,
	pub geometry: G,
}

#[derive(Clone, Debug, Deserialize)]
pub struct PointGeometry {
	pub coordinates: [f64; 2],
}

#[derive(Clone, Debug, Deserialize)]
pub struct LineGeometry {
	pub coordinates: Vec<[f64; 2]>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct AirportProperties {
	pub code: String,
	#[serde(default)]
	pub name: String,
	#[serde(default)]
	pub city: String,
	#[serde(default)]
	pub country: String,
	#[serde(default)]
	pub disrupted: bool,
	#[serde(default)]
	pub group: i64,
}

#[derive(Clone, Debug, Deserialize)]
pub struct RouteProperties {
	pub src: String,
	pub dst: String,
	#[serde(default)]
	pub disrupted: bool,
	#[serde(default)]
	pub group: i64,
}

pub type AirportCollection = FeatureCollection<AirportProperties, PointGeometry>;
pub type RouteCollection = FeatureCollection<RouteProperties, LineGeometry>;

/// Node and edge collections as the page host injects them at startup.
#[derive(Clone, Debug, Deserialize)]
pub struct InitialData {
	pub airports: AirportCollection,
	pub routes: RouteCollection,
}

impl InitialData {
	pub fn into_features(self) -> FeatureSet {
		features_from_collections(self.airports, self.routes)
	}
}

#[derive(Clone, Debug, Deserialize)]
pub struct AnalysisResponse {
	pub before: NetworkMetrics,
	pub after: NetworkMetrics,
	pub disrupted_list: Vec<String>,
	#[serde(default)]
	pub stranded_list: Option<Vec<String>>,
	#[serde(default)]
	pub community_count: Option<u32>,
	pub airports_geo: AirportCollection,
	pub routes_geo: RouteCollection,
}

impl From<AnalysisResponse> for AnalysisResult {
	fn from(resp: AnalysisResponse) -> Self {
		Self {
			before: resp.before,
			after: resp.after,
			confirmed_disrupted: resp.disrupted_list,
			confirmed_stranded: resp.stranded_list.unwrap_or_default(),
			community_count: resp.community_count.unwrap_or(0),
			features: features_from_collections(resp.airports_geo, resp.routes_geo),
		}
	}
}

/// Error body the service sends alongside a non-success status.
#[derive(Clone, Debug, Deserialize)]
pub struct ServiceError {
	pub error: String,
}

fn features_from_collections(airports: AirportCollection, routes: RouteCollection) -> FeatureSet {
	let nodes = airports
		.features
		.into_iter()
		.map(|f| {
			let [lon, lat] = f.geometry.coordinates;
			NodeFeature {
				code: f.properties.code,
				name: f.properties.name,
				city: f.properties.city,
				country: f.properties.country,
				position: GeoPoint::new(lon, lat),
				community: f.properties.group,
				disrupted: f.properties.disrupted,
			}
		})
		.collect();

	let edges = routes
		.features
		.into_iter()
		.map(|f| EdgeFeature {
			source: f.properties.src,
			target: f.properties.dst,
			community: f.properties.group,
			disrupted: f.properties.disrupted,
			path: f
				.geometry
				.coordinates
				.into_iter()
				.map(|[lon, lat]| GeoPoint::new(lon, lat))
				.collect(),
		})
		.collect();

	FeatureSet { nodes, edges }
}


#[cfg(test)]
mod tests {
	use super::*;

	const RESPONSE: &str = r#"{
		"before": {"nodes": 3, "edges": 2, "largest_component": 3, "efficiency": 0.66},
		"after": {"nodes": 2, "edges": 0, "largest_component": 1, "efficiency": 0},
		"disrupted_list": ["JFK"],
		"stranded_list": ["ANC"],
		"community_count": 2,
		"airports_geo": {"type": "FeatureCollection", "features": [
			{"type": "Feature",
			 "properties": {"code": "JFK", "name": "John F Kennedy", "city": "New York",
			                "country": "United States", "disrupted": true, "group": 0},
			 "geometry": {"type": "Point", "coordinates": [-73.78, 40.64]}}
		]},
		"routes_geo": {"type": "FeatureCollection", "features": [
			{"type": "Feature",
			 "properties": {"src": "JFK", "dst": "LAX", "disrupted": true, "group": -1},
			 "geometry": {"type": "LineString", "coordinates": [[-73.78, 40.64], [-118.4, 33.94]]}}
		]}
	}"#;

	#[test]
	fn response_converts_to_result() {
		let resp: AnalysisResponse = serde_json::from_str(RESPONSE).unwrap();
		let result = AnalysisResult::from(resp);

		assert_eq!(result.confirmed_disrupted, vec!["JFK"]);
		assert_eq!(result.confirmed_stranded, vec!["ANC"]);
		assert_eq!(result.community_count, 2);
		assert_eq!(result.after.efficiency(), None);
		assert_eq!(result.before.efficiency(), Some(0.66));

		let jfk = &result.features.nodes[0];
		assert_eq!(jfk.position, GeoPoint::new(-73.78, 40.64));
		assert!(jfk.disrupted);
		assert!(result.features.edges[0].is_bridge());
		assert_eq!(result.features.edges[0].path.len(), 2);
	}

	#[test]
	fn missing_stranded_list_is_empty() {
		let mut value: serde_json::Value = serde_json::from_str(RESPONSE).unwrap();
		value.as_object_mut().unwrap().remove("stranded_list");
		let resp: AnalysisResponse = serde_json::from_value(value).unwrap();
		assert!(AnalysisResult::from(resp).confirmed_stranded.is_empty());
	}

	#[test]
	fn request_serializes_metric_lowercase() {
		let req = AnalysisRequest {
			disrupted: vec!["JFK".into()],
			auto_top_n: 5,
			centrality_metric: CentralityMetric::Closeness,
		};
		let json = serde_json::to_value(&req).unwrap();
		assert_eq!(json["centrality_metric"], "closeness");
		assert_eq!(json["auto_top_n"], 5);
		assert_eq!(CentralityMetric::parse("degree"), Some(CentralityMetric::Degree));
		assert_eq!(CentralityMetric::parse("pagerank"), None);
	}
}
