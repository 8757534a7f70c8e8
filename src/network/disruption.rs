use std::collections::{BTreeSet, HashSet};

use log::{debug, warn};

use super::country_index::{CountryIndex, RegionMatch};
use super::types::AnalysisResult;

/// What a bulk region toggle did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RegionToggle {
	Disrupted { region: String, count: usize },
	Restored { region: String, count: usize },
	Unresolved,
}

/// Operator selected and server confirmed disruptions, plus the stranded
/// nodes of the last simulation round.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DisruptionStore {
	known: HashSet<String>,
	disrupted: BTreeSet<String>,
	stranded: BTreeSet<String>,
}

impl DisruptionStore {
	pub fn new<I, S>(known: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self {
			known: known.into_iter().map(Into::into).collect(),
			..Default::default()
		}
	}

	pub fn is_known(&self, code: &str) -> bool {
		self.known.contains(code)
	}

	pub fn is_disrupted(&self, code: &str) -> bool {
		self.disrupted.contains(code)
	}

	pub fn is_stranded(&self, code: &str) -> bool {
		self.stranded.contains(code)
	}

	pub fn disrupted(&self) -> &BTreeSet<String> {
		&self.disrupted
	}

	pub fn stranded(&self) -> &BTreeSet<String> {
		&self.stranded
	}

	pub fn disrupted_codes(&self) -> Vec<String> {
		self.disrupted.iter().cloned().collect()
	}

	/// Flips `code`. Returns whether it is disrupted afterwards.
	///
	/// `code` must be a known node; unknown codes are a caller bug.
	pub fn toggle(&mut self, code: &str) -> bool {
		debug_assert!(self.is_known(code), "toggled unknown node {code}");
		if !self.is_known(code) {
			warn!("Ignoring toggle of unknown node {code}");
			return false;
		}
		if self.disrupted.remove(code) {
			false
		} else {
			self.disrupted.insert(code.to_string());
			true
		}
	}

	/// All-or-nothing toggle of every member of a region: clears them when
	/// all are disrupted, otherwise disrupts all of them.
	pub fn toggle_region(&mut self, name: &str, index: &CountryIndex) -> RegionToggle {
		let region = match index.resolve(name) {
			RegionMatch::Exact(region) | RegionMatch::Fuzzy(region) => region,
			RegionMatch::Ambiguous(candidates) => {
				warn!("Region name {name:?} is ambiguous: {candidates:?}");
				return RegionToggle::Unresolved;
			}
			RegionMatch::None => {
				debug!("No nodes found for region {name:?}");
				return RegionToggle::Unresolved;
			}
		};
		let Some(members) = index.members(region) else {
			return RegionToggle::Unresolved;
		};

		let members: Vec<&String> = members.iter().filter(|c| self.is_known(c)).collect();
		let all_disrupted = members.iter().all(|c| self.disrupted.contains(c.as_str()));
		let region = region.to_string();
		if all_disrupted {
			for code in &members {
				self.disrupted.remove(code.as_str());
			}
			RegionToggle::Restored {
				region,
				count: members.len(),
			}
		} else {
			self.disrupted.extend(members.iter().map(|c| c.to_string()));
			RegionToggle::Disrupted {
				region,
				count: members.len(),
			}
		}
	}

	/// Overwrites both sets with the confirmed lists of a simulation round.
	pub fn replace_from_result(&mut self, result: &AnalysisResult) {
		self.disrupted.clear();
		self.stranded.clear();
		self.known
			.extend(result.features.nodes.iter().map(|n| n.code.clone()));
		for code in result
			.confirmed_disrupted
			.iter()
			.chain(&result.confirmed_stranded)
		{
			if !self.known.contains(code) {
				warn!("Service confirmed unknown node {code}");
			}
		}
		self.disrupted
			.extend(result.confirmed_disrupted.iter().cloned());
		self.stranded
			.extend(result.confirmed_stranded.iter().cloned());
	}

	pub fn reset(&mut self) {
		self.disrupted.clear();
		self.stranded.clear();
	}

	/// Disrupted member count of `codes`.
	pub fn disrupted_among<'a>(&self, codes: impl IntoIterator<Item = &'a String>) -> usize {
		codes
			.into_iter()
			.filter(|c| self.disrupted.contains(c.as_str()))
			.count()
	}
}
