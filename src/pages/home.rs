use leptos::prelude::*;
use leptos::task::spawn_local;
use log::{error, info, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;

use crate::components::disruption_map::{DisruptionMap, LayerVisibility, MapHit};
use crate::components::panels::{
	AirportList, CommunityLegend, DetailedMetrics, ErrorBanner, LayerToggles, MetricsSummary,
	SimulationControls,
};
use crate::config::{AppConfig, read_window_json};
use crate::error::AppError;
use crate::network::client::{HttpTransport, SimulationClient, SimulationParams, fetch_boundaries};
use crate::network::regions::RegionShape;
use crate::network::session::Session;
use crate::network::types::{CentralityMetric, FeatureSet, InitialData};

type Client = SimulationClient<HttpTransport>;

/// Network the page host embedded as `window.INITIAL_DATA`.
fn load_initial_features() -> Result<FeatureSet, AppError> {
	let json = read_window_json("INITIAL_DATA")
		.map_err(AppError::Js)?
		.ok_or(AppError::MissingInitialData)?;
	let data: InitialData = serde_json::from_str(&json)?;
	Ok(data.into_features())
}

fn load_config() -> AppConfig {
	AppConfig::from_window().unwrap_or_else(|e| {
		warn!("Using default config: {e}");
		AppConfig::default()
	})
}

/// Arms the coalescer and schedules the fire after the debounce window.
fn trigger_simulation(
	client: Client,
	params: SimulationParams,
	delay_ms: u32,
	session: RwSignal<Session>,
	loading: RwSignal<bool>,
	error: RwSignal<Option<String>>,
) {
	let token = client.coalescer().arm(params);
	let Some(window) = web_sys::window() else {
		return;
	};
	let fire = Closure::once_into_js(move || {
		if let Some(params) = client.coalescer().fire(token) {
			spawn_local(run_simulation(client, params, session, loading, error));
		}
	});
	if let Err(e) = window.set_timeout_with_callback_and_timeout_and_arguments_0(
		fire.unchecked_ref(),
		delay_ms as i32,
	) {
		error!("Failed to schedule simulation: {}", AppError::from(e));
	}
}

async fn run_simulation(
	client: Client,
	params: SimulationParams,
	session: RwSignal<Session>,
	loading: RwSignal<bool>,
	error: RwSignal<Option<String>>,
) {
	loading.set(true);
	match client.execute(params).await {
		Ok(Some(result)) => {
			session.update(|s| s.apply_result(result));
			error.set(None);
		}
		Ok(None) => {}
		Err(e) => error.set(Some(e.to_string())),
	}
	loading.set(client.in_flight() > 0);
}

#[component]
fn Dashboard(features: FeatureSet, config: AppConfig) -> impl IntoView {
	let session = RwSignal::new(Session::new(features));
	let regions = RwSignal::new(Vec::<RegionShape>::new());
	let visibility = RwSignal::new(LayerVisibility::default());
	let auto_n = RwSignal::new(0u32);
	let centrality = RwSignal::new(CentralityMetric::default());
	let loading = RwSignal::new(false);
	let error = RwSignal::new(None::<String>);
	let client = StoredValue::new_local(SimulationClient::new(HttpTransport::new(
		config.analyze_url.clone(),
	)));

	let borders_url = config.borders_url.clone();
	spawn_local(async move {
		match fetch_boundaries(&borders_url).await {
			Ok(shapes) => {
				info!("Loaded {} region boundaries", shapes.len());
				regions.set(shapes);
			}
			Err(e) => error!("Failed to load region boundaries: {e}"),
		}
	});

	let on_hit = Callback::new(move |hit: MapHit| match hit {
		MapHit::Node(code) => session.update(|s| {
			s.toggle_node(&code);
		}),
		MapHit::Region(name) => session.update(|s| {
			s.toggle_region(&name);
		}),
	});
	let on_toggle = Callback::new(move |code: String| {
		session.update(|s| {
			s.toggle_node(&code);
		})
	});

	let debounce_ms = config.debounce_ms;
	let on_simulate = Callback::new(move |()| {
		let params = SimulationParams {
			disrupted: session.with_untracked(|s| s.store().disrupted_codes()),
			auto_top_n: auto_n.get_untracked(),
			centrality: centrality.get_untracked(),
		};
		trigger_simulation(client.get_value(), params, debounce_ms, session, loading, error);
	});
	let on_reset = Callback::new(move |()| {
		client.with_value(|c| c.invalidate());
		session.update(Session::reset);
		auto_n.set(0);
		error.set(None);
	});

	let outcome = Signal::derive(move || session.with(|s| s.outcome().cloned()));
	let community_count = Signal::derive(move || session.with(|s| s.community_count()));
	let summary = move || {
		session.with(|s| {
			let store = s.store();
			format!(
				"{} airports, {} disrupted, {} stranded",
				s.features().nodes.len(),
				store.disrupted().len(),
				store.stranded().len()
			)
		})
	};

	view! {
		<div class="dashboard">
			<aside class="sidebar">
				<h1>"Network Disruption Map"</h1>
				<p class="subtitle">{summary}</p>
				<ErrorBanner error=error />
				<SimulationControls
					auto_n=auto_n
					centrality=centrality
					loading=loading
					on_simulate=on_simulate
					on_reset=on_reset
				/>
				<LayerToggles visibility=visibility />
				<MetricsSummary outcome=outcome />
				<DetailedMetrics session=session />
				<CommunityLegend community_count=community_count />
				<AirportList session=session on_toggle=on_toggle />
			</aside>
			<main class="map-container">
				<DisruptionMap
					session=session
					regions=regions
					visibility=visibility
					config=config
					on_hit=on_hit
				/>
				<Show when=move || loading.get()>
					<div class="loading-overlay">"Running analysis..."</div>
				</Show>
			</main>
		</div>
	}
}

/// Dashboard over the embedded network, or the load error.
#[component]
pub fn Home() -> impl IntoView {
	let config = load_config();
	let dashboard = load_initial_features()
		.inspect_err(|e| error!("Cannot start: {e}"))
		.map(|features| view! { <Dashboard features=features config=config /> });

	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>
			{dashboard}
		</ErrorBoundary>
	}
}
