mod component;
pub mod layers;
mod render;
pub mod state;

pub use component::DisruptionMap;
pub use layers::{LayerKind, LayerVisibility};
pub use state::MapHit;
