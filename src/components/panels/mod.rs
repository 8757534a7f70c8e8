mod airport_list;
mod controls;
mod legend;
mod metrics_panel;

pub use airport_list::AirportList;
pub use controls::{ErrorBanner, LayerToggles, SimulationControls};
pub use legend::CommunityLegend;
pub use metrics_panel::{DetailedMetrics, MetricsSummary};
