// src/raster/mod.rs
pub mod grid;
pub mod region;
pub mod scene;

pub use grid::{GeoTransform, GridSpec, Pixel, Raster, Window, NODATA};
pub use region::Region;
pub use scene::{BandRole, Scene};
