use std::collections::BTreeMap;

use super::types::NodeFeature;

/// How a region name was matched against the index.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RegionMatch<'a> {
	Exact(&'a str),
	Fuzzy(&'a str),
	Ambiguous(Vec<&'a str>),
	None,
}

impl<'a> RegionMatch<'a> {
	pub fn region(&self) -> Option<&'a str> {
		match self {
			Self::Exact(name) | Self::Fuzzy(name) => Some(name),
			Self::Ambiguous(_) | Self::None => None,
		}
	}
}

/// Region name to member codes, in first-seen order. Built once from the
/// initial node set and never updated afterwards.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CountryIndex {
	members: BTreeMap<String, Vec<String>>,
}

impl CountryIndex {
	pub fn new(nodes: &[NodeFeature]) -> Self {
		let mut members: BTreeMap<String, Vec<String>> = BTreeMap::new();
		for node in nodes {
			let codes = members.entry(node.country.clone()).or_default();
			if !codes.contains(&node.code) {
				codes.push(node.code.clone());
			}
		}
		Self { members }
	}

	pub fn len(&self) -> usize {
		self.members.len()
	}

	pub fn is_empty(&self) -> bool {
		self.members.is_empty()
	}

	pub fn regions(&self) -> impl Iterator<Item = &str> {
		self.members.keys().map(String::as_str)
	}

	/// Resolves a boundary or operator supplied name.
	///
	/// Exact key first, then a case-insensitive exact match, then a
	/// case-insensitive substring match in either direction. A substring
	/// match only counts when it is unique; overlapping names are reported
	/// as ambiguous instead of picking one.
	pub fn resolve(&self, name: &str) -> RegionMatch<'_> {
		if let Some((key, codes)) = self.members.get_key_value(name) {
			if !codes.is_empty() {
				return RegionMatch::Exact(key);
			}
		}

		let needle = name.to_lowercase();
		if needle.is_empty() {
			return RegionMatch::None;
		}
		if let Some(key) = self.regions().find(|k| k.to_lowercase() == needle) {
			return RegionMatch::Exact(key);
		}

		let candidates: Vec<&str> = self
			.regions()
			.filter(|k| {
				let key = k.to_lowercase();
				!key.is_empty() && (key.contains(&needle) || needle.contains(&key))
			})
			.collect();
		match candidates.len() {
			0 => RegionMatch::None,
			1 => RegionMatch::Fuzzy(candidates[0]),
			_ => RegionMatch::Ambiguous(candidates),
		}
	}

	/// Member codes of the region `name` resolves to, if any.
	pub fn members(&self, name: &str) -> Option<&[String]> {
		self.resolve(name)
			.region()
			.and_then(|region| self.members.get(region))
			.map(Vec::as_slice)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::network::types::fixtures;

	fn index() -> CountryIndex {
		CountryIndex::new(&fixtures::features().nodes)
	}

	#[test]
	fn groups_in_first_seen_order() {
		let index = index();
		assert_eq!(index.len(), 3);
		assert_eq!(
			index.members("United States").unwrap(),
			["JFK", "LAX", "ANC"]
		);
		assert_eq!(index.members("France").unwrap(), ["CDG", "ORY"]);
	}

	#[test]
	fn exact_match_wins() {
		assert_eq!(index().resolve("France"), RegionMatch::Exact("France"));
		assert_eq!(index().resolve("france"), RegionMatch::Exact("France"));
	}

	#[test]
	fn unique_substring_matches() {
		let index = index();
		assert_eq!(
			index.resolve("United States of America"),
			RegionMatch::Fuzzy("United States")
		);
		assert_eq!(index.resolve("Kingdom"), RegionMatch::Fuzzy("United Kingdom"));
	}

	#[test]
	fn overlapping_substring_is_ambiguous() {
		let index = index();
		assert_eq!(
			index.resolve("United"),
			RegionMatch::Ambiguous(vec!["United Kingdom", "United States"])
		);
		assert!(index.members("United").is_none());
	}

	#[test]
	fn unknown_region_resolves_to_none() {
		assert_eq!(index().resolve("Atlantis"), RegionMatch::None);
		assert_eq!(index().resolve(""), RegionMatch::None);
	}
}
