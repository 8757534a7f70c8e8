use leptos::prelude::*;

use crate::network::palette::{DISRUPTED_COLOR, community_color};
use crate::network::session::Session;

#[derive(Clone, Debug, PartialEq)]
pub struct AirportRow {
	pub code: String,
	pub name: String,
	pub location: String,
	pub disrupted: bool,
	pub community: i64,
}

/// Disrupted airports first, then alphabetical by code.
pub fn airport_rows(session: &Session) -> Vec<AirportRow> {
	let store = session.store();
	let mut rows: Vec<AirportRow> = session
		.features()
		.nodes
		.iter()
		.map(|n| AirportRow {
			code: n.code.clone(),
			name: n.name.clone(),
			location: format!("{}, {}", n.city, n.country),
			disrupted: store.is_disrupted(&n.code),
			community: n.community,
		})
		.collect();
	rows.sort_by(|a, b| b.disrupted.cmp(&a.disrupted).then_with(|| a.code.cmp(&b.code)));
	rows
}

#[component]
pub fn AirportList(
	session: RwSignal<Session>,
	#[prop(into)] on_toggle: Callback<String>,
) -> impl IntoView {
	let rows = move || session.with(airport_rows);

	view! {
		<div class="airport-list">
			<For
				each=rows
				key=|row| (row.code.clone(), row.disrupted, row.community)
				children=move |row: AirportRow| {
					let code = row.code.clone();
					let color = if row.disrupted {
						DISRUPTED_COLOR
					} else {
						community_color(row.community)
					};
					let (item_class, badge_class, badge) = if row.disrupted {
						("airport-item disrupted", "status-badge disrupted", "Disrupted")
					} else {
						("airport-item", "status-badge active", "Active")
					};
					view! {
						<div class=item_class on:click=move |_| on_toggle.run(code.clone())>
							<div class="airport-code" style=format!("color: {color};")>
								{row.code}
							</div>
							<div class="airport-details">
								<div class="airport-name">{row.name}</div>
								<div class="airport-location">{row.location}</div>
							</div>
							<div class=badge_class>{badge}</div>
						</div>
					}
				}
			/>
		</div>
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::network::types::fixtures;

	#[test]
	fn disrupted_rows_come_first() {
		let mut session = Session::new(fixtures::features());
		session.toggle_node("ORY");
		session.toggle_node("ANC");
		let codes: Vec<String> = airport_rows(&session).into_iter().map(|r| r.code).collect();
		assert_eq!(codes, ["ANC", "ORY", "CDG", "JFK", "LAX", "LHR"]);
	}

	#[test]
	fn row_carries_location() {
		let session = Session::new(fixtures::features());
		let rows = airport_rows(&session);
		assert_eq!(rows[0].code, "ANC");
		let cdg = rows.iter().find(|r| r.code == "CDG").unwrap();
		assert_eq!(cdg.location, "CDG City, France");
		assert!(!cdg.disrupted);
	}
}
