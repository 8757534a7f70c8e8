use serde::Deserialize;

use super::types::{FeatureCollection, GeoPoint};

#[derive(Clone, Debug, Deserialize)]
pub struct BoundaryProperties {
	pub name: String,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "type")]
pub enum BoundaryGeometry {
	Polygon { coordinates: Vec<Vec<[f64; 2]>> },
	MultiPolygon { coordinates: Vec<Vec<Vec<[f64; 2]>>> },
}

pub type BoundaryCollection = FeatureCollection<BoundaryProperties, BoundaryGeometry>;

/// A named region outline. Each polygon is a list of rings, outer ring
/// first.
#[derive(Clone, Debug, PartialEq)]
pub struct RegionShape {
	pub name: String,
	pub polygons: Vec<Vec<Vec<GeoPoint>>>,
}

fn ring(points: Vec<[f64; 2]>) -> Vec<GeoPoint> {
	points
		.into_iter()
		.map(|[lon, lat]| GeoPoint::new(lon, lat))
		.collect()
}

impl RegionShape {
	/// Even-odd test over every ring, so holes are excluded.
	pub fn contains(&self, point: GeoPoint) -> bool {
		self.polygons.iter().any(|polygon| {
			polygon
				.iter()
				.filter(|ring| ring_contains(ring, point))
				.count() % 2
				== 1
		})
	}
}

fn ring_contains(ring: &[GeoPoint], p: GeoPoint) -> bool {
	let mut inside = false;
	let mut j = ring.len().wrapping_sub(1);
	for i in 0..ring.len() {
		let (a, b) = (ring[i], ring[j]);
		if (a.lat > p.lat) != (b.lat > p.lat)
			&& p.lon < (b.lon - a.lon) * (p.lat - a.lat) / (b.lat - a.lat) + a.lon
		{
			inside = !inside;
		}
		j = i;
	}
	inside
}

pub fn parse_boundaries(json: &str) -> Result<Vec<RegionShape>, serde_json::Error> {
	let collection: BoundaryCollection = serde_json::from_str(json)?;
	Ok(collection
		.features
		.into_iter()
		.map(|f| RegionShape {
			name: f.properties.name,
			polygons: match f.geometry {
				BoundaryGeometry::Polygon { coordinates } => {
					vec![coordinates.into_iter().map(ring).collect()]
				}
				BoundaryGeometry::MultiPolygon { coordinates } => coordinates
					.into_iter()
					.map(|polygon| polygon.into_iter().map(ring).collect())
					.collect(),
			},
		})
		.collect())
}
