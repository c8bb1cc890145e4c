pub mod geometry;
mod projection;
mod renderer;

pub use projection::{Viewport, DEFAULT_LAT, DEFAULT_LON, DEFAULT_ZOOM};
pub use renderer::{MapLayers, MapRenderer, Scene};
