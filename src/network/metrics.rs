use std::fmt;

use super::types::NetworkMetrics;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resilience {
	High,
	Medium,
	Low,
}

impl Resilience {
	/// Classifies by the percentage of the largest component that was lost.
	pub fn from_component_loss(loss_pct: f64) -> Self {
		if loss_pct < 20.0 {
			Self::High
		} else if loss_pct < 50.0 {
			Self::Medium
		} else {
			Self::Low
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
	Minor,
	Moderate,
	Severe,
}

impl Severity {
	pub fn from_disrupted_count(count: usize) -> Self {
		match count {
			0..10 => Self::Minor,
			10..30 => Self::Moderate,
			_ => Self::Severe,
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Fragmentation {
	Connected,
	Fragmented,
}

macro_rules! display_as_debug {
	($($ty:ty),*) => {
		$(impl fmt::Display for $ty {
			fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
				fmt::Debug::fmt(self, f)
			}
		})*
	};
}

display_as_debug!(Resilience, Severity, Fragmentation);

/// Impact figures derived from one before/after pair. Percentages are
/// losses (positive when the network shrank); `None` marks a value that is
/// undefined for the inputs.
#[derive(Clone, Debug, PartialEq)]
pub struct DerivedMetrics {
	pub nodes_lost: i64,
	pub edges_lost: i64,
	pub component_lost: i64,
	pub node_loss_pct: Option<f64>,
	pub edge_loss_pct: Option<f64>,
	pub component_loss_pct: Option<f64>,
	pub efficiency_loss_pct: Option<f64>,
	pub efficiency_before: Option<f64>,
	pub efficiency_after: Option<f64>,
	pub density_before: Option<f64>,
	pub density_after: Option<f64>,
	pub disrupted_count: usize,
	pub stranded_count: usize,
	pub affected_pct: Option<f64>,
	pub fragmentation: Fragmentation,
	pub resilience: Resilience,
	pub severity: Severity,
}

fn loss_pct(before: f64, after: f64) -> Option<f64> {
	(before > 0.0).then(|| (before - after) / before * 100.0)
}

/// Fraction of possible node pairs that are connected.
pub fn density(metrics: &NetworkMetrics) -> Option<f64> {
	if metrics.nodes < 2 {
		return None;
	}
	let n = metrics.nodes as f64;
	Some(metrics.edges as f64 / (n * (n - 1.0) / 2.0))
}

pub fn derive_metrics(
	before: &NetworkMetrics,
	after: &NetworkMetrics,
	confirmed_disrupted: &[String],
	confirmed_stranded: &[String],
) -> DerivedMetrics {
	let component_loss_pct = loss_pct(
		before.largest_component as f64,
		after.largest_component as f64,
	);
	let efficiency_loss_pct = before
		.efficiency()
		.and_then(|b| loss_pct(b, after.efficiency().unwrap_or(0.0)));
	let disrupted_count = confirmed_disrupted.len();
	let stranded_count = confirmed_stranded.len();

	DerivedMetrics {
		nodes_lost: before.nodes as i64 - after.nodes as i64,
		edges_lost: before.edges as i64 - after.edges as i64,
		component_lost: before.largest_component as i64 - after.largest_component as i64,
		node_loss_pct: loss_pct(before.nodes as f64, after.nodes as f64),
		edge_loss_pct: loss_pct(before.edges as f64, after.edges as f64),
		component_loss_pct,
		efficiency_loss_pct,
		efficiency_before: before.efficiency(),
		efficiency_after: after.efficiency(),
		density_before: density(before),
		density_after: density(after),
		disrupted_count,
		stranded_count,
		affected_pct: loss_pct(before.nodes as f64, before.nodes as f64 - disrupted_count as f64),
		fragmentation: if stranded_count > 0 {
			Fragmentation::Fragmented
		} else {
			Fragmentation::Connected
		},
		resilience: Resilience::from_component_loss(component_loss_pct.unwrap_or(0.0)),
		severity: Severity::from_disrupted_count(disrupted_count),
	}
}
