use leptos::prelude::*;

use crate::components::disruption_map::{LayerKind, LayerVisibility};
use crate::network::types::CentralityMetric;

/// Parses the auto top-N field; anything that is not a non-negative integer
/// counts as zero.
pub fn parse_auto_n(value: &str) -> u32 {
	value.trim().parse().unwrap_or(0)
}

/// Simulation inputs and actions.
#[component]
pub fn SimulationControls(
	auto_n: RwSignal<u32>,
	centrality: RwSignal<CentralityMetric>,
	#[prop(into)] loading: Signal<bool>,
	#[prop(into)] on_simulate: Callback<()>,
	#[prop(into)] on_reset: Callback<()>,
) -> impl IntoView {
	view! {
		<div class="controls">
			<label class="control-row">
				<span>"Auto-disrupt top N"</span>
				<input
					type="number"
					min="0"
					prop:value=move || auto_n.get().to_string()
					on:input=move |ev| auto_n.set(parse_auto_n(&event_target_value(&ev)))
				/>
			</label>
			<label class="control-row">
				<span>"Centrality"</span>
				<select on:change=move |ev| {
					if let Some(metric) = CentralityMetric::parse(&event_target_value(&ev)) {
						centrality.set(metric);
					}
				}>
					{CentralityMetric::ALL
						.into_iter()
						.map(|metric| {
							view! {
								<option
									value=metric.as_str()
									selected=move || centrality.get() == metric
								>
									{metric.label()}
								</option>
							}
						})
						.collect_view()}
				</select>
			</label>
			<div class="control-buttons">
				<button
					class="btn btn-primary"
					disabled=move || loading.get()
					on:click=move |_| on_simulate.run(())
				>
					{move || if loading.get() { "Simulating..." } else { "Simulate" }}
				</button>
				<button class="btn" on:click=move |_| on_reset.run(())>
					"Reset"
				</button>
			</div>
		</div>
	}
}

/// Checkboxes for the five map layers.
#[component]
pub fn LayerToggles(visibility: RwSignal<LayerVisibility>) -> impl IntoView {
	view! {
		<div class="layer-toggles">
			{LayerKind::ALL
				.into_iter()
				.map(|kind| {
					view! {
						<label class="layer-toggle">
							<input
								type="checkbox"
								prop:checked=move || visibility.with(|v| v.get(kind))
								on:change=move |_| visibility.update(|v| v.toggle(kind))
							/>
							<span>{kind.label()}</span>
						</label>
					}
				})
				.collect_view()}
		</div>
	}
}

/// Last request failure, if any.
#[component]
pub fn ErrorBanner(error: RwSignal<Option<String>>) -> impl IntoView {
	move || {
		error.get().map(|message| {
			view! {
				<div class="error-banner">
					<span>{message}</span>
					<button class="btn-close" on:click=move |_| error.set(None)>
						"×"
					</button>
				</div>
			}
		})
	}
}
