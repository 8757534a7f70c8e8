use std::collections::HashMap;

use log::{info, warn};

use super::country_index::CountryIndex;
use super::disruption::{DisruptionStore, RegionToggle};
use super::metrics::{DerivedMetrics, derive_metrics};
use super::types::{AnalysisResult, FeatureSet, NetworkMetrics, NodeFeature};

/// Last reconciled simulation round.
#[derive(Clone, Debug, PartialEq)]
pub struct SimulationOutcome {
	pub before: NetworkMetrics,
	pub after: NetworkMetrics,
	pub disrupted: Vec<String>,
	pub stranded: Vec<String>,
	pub derived: DerivedMetrics,
}

/// Everything one operator session mutates: current features, disruption
/// state and the outcome of the last simulation.
///
/// Every mutation bumps `revision`, which the map watches to schedule a
/// layer rebuild.
#[derive(Clone, Debug)]
pub struct Session {
	initial: FeatureSet,
	features: FeatureSet,
	node_index: HashMap<String, usize>,
	store: DisruptionStore,
	countries: CountryIndex,
	community_count: u32,
	outcome: Option<SimulationOutcome>,
	revision: u64,
}

fn index_nodes(nodes: &[NodeFeature]) -> HashMap<String, usize> {
	nodes
		.iter()
		.enumerate()
		.map(|(i, n)| (n.code.clone(), i))
		.collect()
}

impl Session {
	pub fn new(initial: FeatureSet) -> Self {
		let countries = CountryIndex::new(&initial.nodes);
		let store = DisruptionStore::new(initial.nodes.iter().map(|n| n.code.clone()));
		info!(
			"Session started with {} nodes, {} edges, {} regions",
			initial.nodes.len(),
			initial.edges.len(),
			countries.len()
		);
		Self {
			node_index: index_nodes(&initial.nodes),
			features: initial.clone(),
			initial,
			store,
			countries,
			community_count: 0,
			outcome: None,
			revision: 0,
		}
	}

	pub fn features(&self) -> &FeatureSet {
		&self.features
	}

	pub fn store(&self) -> &DisruptionStore {
		&self.store
	}

	pub fn countries(&self) -> &CountryIndex {
		&self.countries
	}

	pub fn community_count(&self) -> u32 {
		self.community_count
	}

	pub fn outcome(&self) -> Option<&SimulationOutcome> {
		self.outcome.as_ref()
	}

	pub fn revision(&self) -> u64 {
		self.revision
	}

	pub fn node(&self, code: &str) -> Option<&NodeFeature> {
		self.node_index.get(code).map(|&i| &self.features.nodes[i])
	}

	/// Flips a node. Unknown codes are ignored and leave the revision alone.
	pub fn toggle_node(&mut self, code: &str) -> bool {
		if !self.store.is_known(code) {
			warn!("Ignoring toggle of unknown node {code}");
			return false;
		}
		let disrupted = self.store.toggle(code);
		self.revision += 1;
		disrupted
	}

	pub fn toggle_region(&mut self, name: &str) -> RegionToggle {
		let outcome = self.store.toggle_region(name, &self.countries);
		if outcome != RegionToggle::Unresolved {
			info!("Region toggle {name:?}: {outcome:?}");
			self.revision += 1;
		}
		outcome
	}

	/// Replaces features and disruption state with an authoritative result.
	pub fn apply_result(&mut self, result: AnalysisResult) {
		self.store.replace_from_result(&result);
		let derived = derive_metrics(
			&result.before,
			&result.after,
			&result.confirmed_disrupted,
			&result.confirmed_stranded,
		);
		self.community_count = result.community_count;
		self.node_index = index_nodes(&result.features.nodes);
		self.features = result.features;
		self.outcome = Some(SimulationOutcome {
			before: result.before,
			after: result.after,
			disrupted: result.confirmed_disrupted,
			stranded: result.confirmed_stranded,
			derived,
		});
		self.revision += 1;
	}

	/// Back to the first feature generation with nothing disrupted.
	pub fn reset(&mut self) {
		self.features = self.initial.clone();
		self.node_index = index_nodes(&self.features.nodes);
		self.store.reset();
		self.community_count = 0;
		self.outcome = None;
		self.revision += 1;
	}
}
