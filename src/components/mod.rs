pub mod disruption_map;
pub mod panels;
