//! Network model, disruption bookkeeping and the analysis service client.

pub mod client;
pub mod country_index;
pub mod disruption;
pub mod metrics;
pub mod palette;
pub mod regions;
pub mod session;
pub mod types;
