use leptos::prelude::*;

use crate::network::palette::{BRIDGE_COLOR, PALETTE};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LegendEntry {
	pub label: String,
	pub color: &'static str,
}

/// The legend only means something once the network splits.
pub fn legend_visible(community_count: u32) -> bool {
	community_count > 1
}

/// Swatches for the detected communities, capped at the palette size, plus
/// the bridge color. Empty when there is at most one community.
pub fn legend_entries(community_count: u32) -> Vec<LegendEntry> {
	if !legend_visible(community_count) {
		return Vec::new();
	}
	let shown = (community_count as usize).min(PALETTE.len());
	let mut entries: Vec<LegendEntry> = PALETTE[..shown]
		.iter()
		.enumerate()
		.map(|(i, color)| LegendEntry {
			label: format!("Community {i}"),
			color,
		})
		.collect();
	entries.push(LegendEntry {
		label: "Inter-community".into(),
		color: BRIDGE_COLOR,
	});
	entries
}

#[component]
pub fn CommunityLegend(#[prop(into)] community_count: Signal<u32>) -> impl IntoView {
	let entries = move || legend_entries(community_count.get());

	view! {
		<Show when=move || { legend_visible(community_count.get()) }>
			<div class="community-legend">
				<div class="legend-title">"Communities"</div>
				{move || {
					entries()
						.into_iter()
						.map(|entry| {
							view! {
								<div class="legend-item">
									<div
										class="legend-color-box"
										style=format!("background: {};", entry.color)
									></div>
									<span>{entry.label}</span>
								</div>
							}
						})
						.collect_view()
				}}
			</div>
		</Show>
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn hidden_for_single_community() {
		assert!(legend_entries(0).is_empty());
		assert!(legend_entries(1).is_empty());
	}

	#[test]
	fn visibility_threshold() {
		assert!(!legend_visible(1));
		assert!(legend_visible(2));
		assert_eq!(legend_entries(2).len(), 3);
	}

	#[test]
	fn capped_at_palette_size() {
		let entries = legend_entries(40);
		assert_eq!(entries.len(), PALETTE.len() + 1);
		assert_eq!(entries.last().unwrap().color, BRIDGE_COLOR);
		assert_eq!(entries[3].label, "Community 3");
	}
}
