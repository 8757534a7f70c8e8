use leptos::prelude::*;

use crate::network::metrics::{Fragmentation, Resilience, Severity};
use crate::network::session::{Session, SimulationOutcome};

/// Signed change for a loss percentage, or "N/A".
pub fn format_change(loss_pct: Option<f64>, decimals: usize) -> String {
	match loss_pct {
		Some(loss) if loss != 0.0 => format!("{:.*}%", decimals, -loss),
		Some(_) => format!("{:.*}%", decimals, 0.0),
		None => "N/A".into(),
	}
}

pub fn format_value(value: Option<f64>, decimals: usize) -> String {
	value.map_or_else(|| "N/A".into(), |v| format!("{v:.decimals$}"))
}

/// Absolute change next to its percentage, e.g. `-50 (-16.67%)`.
pub fn format_loss(lost: i64, loss_pct: Option<f64>) -> String {
	let change = match lost {
		0 => "0".to_string(),
		lost => format!("{:+}", -lost),
	};
	format!("{change} ({})", format_change(loss_pct, 2))
}

const STRANDED_RANK_STYLE: &str = "background: #ed8936;";

fn resilience_class(r: Resilience) -> &'static str {
	match r {
		Resilience::High => "metric-row-value positive",
		Resilience::Medium => "metric-row-value neutral",
		Resilience::Low => "metric-row-value negative",
	}
}

fn severity_class(s: Severity) -> &'static str {
	match s {
		Severity::Minor => "metric-row-value neutral",
		Severity::Moderate => "metric-row-value",
		Severity::Severe => "metric-row-value negative",
	}
}

#[component]
fn MetricCard(label: &'static str, value: String, change: String) -> impl IntoView {
	view! {
		<div class="metric-card">
			<div class="metric-label">{label}</div>
			<div class="metric-value">{value}</div>
			<div class="metric-change negative">{change}</div>
		</div>
	}
}

/// Headline numbers of the last simulation.
#[component]
pub fn MetricsSummary(#[prop(into)] outcome: Signal<Option<SimulationOutcome>>) -> impl IntoView {
	move || {
		outcome.get().map(|o| {
			let d = &o.derived;
			view! {
				<div class="metrics-grid">
					<MetricCard
						label="Nodes"
						value=o.after.nodes.to_string()
						change=format_change(d.node_loss_pct, 1)
					/>
					<MetricCard
						label="Edges"
						value=o.after.edges.to_string()
						change=format_change(d.edge_loss_pct, 1)
					/>
					<MetricCard
						label="Largest Component"
						value=o.after.largest_component.to_string()
						change=format_change(d.component_loss_pct, 1)
					/>
					<MetricCard
						label="Efficiency"
						value=format_value(d.efficiency_after, 3)
						change=format_change(d.efficiency_loss_pct, 1)
					/>
				</div>
			}
		})
	}
}

#[component]
fn MetricRow(
	label: &'static str,
	value: String,
	#[prop(default = "metric-row-value")] tone: &'static str,
) -> impl IntoView {
	view! {
		<div class="metric-row">
			<span class="metric-row-label">{label}</span>
			<span class=tone>{value}</span>
		</div>
	}
}

#[component]
fn CodeList(title: String, rows: Vec<(String, String)>, rank_style: &'static str) -> impl IntoView {
	view! {
		<div class="metric-section">
			<div class="metric-section-title">{title}</div>
			<div class="top-airports-list">
				{rows
					.into_iter()
					.enumerate()
					.map(|(i, (code, name))| {
						view! {
							<div class="top-airport-item">
								<span class="top-airport-rank" style=rank_style>{i + 1}</span>
								<span class="top-airport-code">{code}</span>
								<span class="top-airport-score">{name}</span>
							</div>
						}
					})
					.collect_view()}
			</div>
		</div>
	}
}

fn named(session: &Session, codes: &[String]) -> Vec<(String, String)> {
	codes
		.iter()
		.map(|code| {
			let name = session
				.node(code)
				.map_or_else(|| "Unknown".to_string(), |n| n.name.clone());
			(code.clone(), name)
		})
		.collect()
}

/// Collapsible breakdown of the last simulation.
#[component]
pub fn DetailedMetrics(session: RwSignal<Session>) -> impl IntoView {
	let expanded = RwSignal::new(false);
	let button_label = move || {
		if expanded.get() {
			"Hide Detailed Statistics"
		} else {
			"Show Detailed Statistics"
		}
	};

	let details = move || {
		let (o, disrupted, stranded) = session.with(|s| {
			let o = s.outcome()?.clone();
			let disrupted = named(s, &o.disrupted);
			let stranded = named(s, &o.stranded);
			Some((o, disrupted, stranded))
		})?;
		let d = o.derived.clone();
		let (fragmentation_class, fragmentation) = match d.fragmentation {
			Fragmentation::Fragmented => ("metric-row-value negative", "Fragmented"),
			Fragmentation::Connected => ("metric-row-value positive", "Connected"),
		};
		let density_before = format!("{}%", format_value(d.density_before.map(|v| v * 100.0), 4));
		let density_after = format!("{}%", format_value(d.density_after.map(|v| v * 100.0), 4));
		let routes_lost = format_loss(d.edges_lost, d.edge_loss_pct);
		let component_lost = format_loss(d.component_lost, d.component_loss_pct);
		let affected = format!("{}%", format_value(d.affected_pct, 1));
		let disrupted_list = (!disrupted.is_empty()).then(|| {
			view! {
				<CodeList
					title=format!("Disrupted Airports ({})", disrupted.len())
					rows=disrupted
					rank_style=""
				/>
			}
		});
		let stranded_list = (!stranded.is_empty()).then(|| {
			view! {
				<CodeList
					title=format!("Stranded Airports ({})", stranded.len())
					rows=stranded
					rank_style=STRANDED_RANK_STYLE
				/>
			}
		});

		Some(view! {
			<div class="metric-section">
				<div class="metric-section-title">"Network Overview"</div>
				<MetricRow label="Total Airports (Before)" value=o.before.nodes.to_string() tone="metric-row-value neutral" />
				<MetricRow label="Active Airports (After)" value=o.after.nodes.to_string() />
				<MetricRow label="Disrupted Airports" value=d.disrupted_count.to_string() tone="metric-row-value negative" />
				<MetricRow label="Stranded Airports" value=d.stranded_count.to_string() tone="metric-row-value stranded" />
			</div>
			<div class="metric-section">
				<div class="metric-section-title">"Route Statistics"</div>
				<MetricRow label="Total Routes (Before)" value=o.before.edges.to_string() tone="metric-row-value neutral" />
				<MetricRow label="Active Routes (After)" value=o.after.edges.to_string() />
				<MetricRow label="Routes Lost" value=routes_lost tone="metric-row-value negative" />
			</div>
			<div class="metric-section">
				<div class="metric-section-title">"Network Properties"</div>
				<MetricRow label="Network Density (Before)" value=density_before tone="metric-row-value neutral" />
				<MetricRow label="Network Density (After)" value=density_after />
				<MetricRow label="Global Efficiency (Before)" value=format_value(d.efficiency_before, 4) tone="metric-row-value neutral" />
				<MetricRow label="Global Efficiency (After)" value=format_value(d.efficiency_after, 4) />
				<MetricRow label="Efficiency Loss" value=format_change(d.efficiency_loss_pct, 2) tone="metric-row-value negative" />
			</div>
			<div class="metric-section">
				<div class="metric-section-title">"Connectivity Analysis"</div>
				<MetricRow label="Largest Component (Before)" value=o.before.largest_component.to_string() tone="metric-row-value neutral" />
				<MetricRow label="Largest Component (After)" value=o.after.largest_component.to_string() />
				<MetricRow label="Component Size Loss" value=component_lost tone="metric-row-value negative" />
				<MetricRow label="Network Fragmentation" value=fragmentation.to_string() tone=fragmentation_class />
			</div>
			<div class="metric-section">
				<div class="metric-section-title">"Impact Summary"</div>
				<MetricRow label="Airports Affected" value=affected tone="metric-row-value negative" />
				<MetricRow label="Network Resilience" value=d.resilience.to_string() tone=resilience_class(d.resilience) />
				<MetricRow label="Severity Level" value=d.severity.to_string() tone=severity_class(d.severity) />
			</div>
			{disrupted_list}
			{stranded_list}
		})
	};

	view! {
		<Show when=move || session.with(|s| s.outcome().is_some())>
			<div class="detailed-metrics-container">
				<button
					class=move || if expanded.get() { "expand-metrics-btn expanded" } else { "expand-metrics-btn" }
					on:click=move |_| expanded.update(|e| *e = !*e)
				>
					<span>{button_label}</span>
				</button>
				<div class=move || if expanded.get() { "detailed-metrics expanded" } else { "detailed-metrics" }>
					{details}
				</div>
			</div>
		</Show>
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn change_is_negated_loss() {
		assert_eq!(format_change(Some(16.666), 1), "-16.7%");
		assert_eq!(format_change(Some(-5.0), 1), "5.0%");
		assert_eq!(format_change(Some(0.0), 2), "0.00%");
		assert_eq!(format_change(None, 1), "N/A");
	}

	#[test]
	fn loss_sign_follows_direction() {
		assert_eq!(format_loss(50, Some(16.666)), "-50 (-16.67%)");
		assert_eq!(format_loss(-5, Some(-10.0)), "+5 (10.00%)");
		assert_eq!(format_loss(0, None), "0 (N/A)");
	}

	#[test]
	fn values_render_na_when_undefined() {
		assert_eq!(format_value(Some(0.123456), 3), "0.123");
		assert_eq!(format_value(None, 4), "N/A");
	}
}
