// tests/common/mod.rs
#![allow(dead_code)]

use annual_composite::raster::{BandRole, GeoTransform, GridSpec, Raster, Region, Scene};
use chrono::{TimeZone, Utc};

/// Grid of unit pixels whose north-west corner sits at (0, height)
pub fn test_grid(width: usize, height: usize) -> GridSpec {
    GridSpec::new(
        width,
        height,
        GeoTransform {
            origin_x: 0.0,
            origin_y: height as f64,
            pixel_width: 1.0,
            pixel_height: 1.0,
        },
    )
}

/// Region covering the whole test grid
pub fn full_region(grid: &GridSpec) -> Region {
    Region::rectangle(0.0, 0.0, grid.width as f64, grid.height as f64).unwrap()
}

pub fn band(grid: GridSpec, values: &[f32]) -> Raster<f32> {
    // Repeat the pattern over the grid if needed
    let data = (0..grid.len()).map(|i| values[i % values.len()]).collect();
    Raster::new(grid, data, None).unwrap()
}

pub fn quality(grid: GridSpec, values: &[u16]) -> Raster<u16> {
    let data = (0..grid.len()).map(|i| values[i % values.len()]).collect();
    Raster::new(grid, data, None).unwrap()
}

/// Scene with the given bands and a quality layer
pub fn create_scene(
    id: &str,
    year: i32,
    month: u32,
    grid: GridSpec,
    bands: &[(BandRole, &[f32])],
    qa: &[u16],
) -> Scene {
    let acquired = Utc.with_ymd_and_hms(year, month, 15, 10, 30, 0).unwrap();
    let mut scene = Scene::new(id, acquired, grid).with_quality(quality(grid, qa));
    for (role, values) in bands {
        scene = scene.with_band(*role, band(grid, values));
    }
    scene
}

/// Scene carrying every band role with uniform raw values
pub fn full_scene(id: &str, year: i32, grid: GridSpec, qa: &[u16]) -> Scene {
    create_scene(
        id,
        year,
        6,
        grid,
        &[
            (BandRole::Blue, &[8000.0]),
            (BandRole::Green, &[9000.0]),
            (BandRole::Red, &[10000.0]),
            (BandRole::Nir, &[20000.0]),
            (BandRole::Swir1, &[15000.0]),
            (BandRole::Thermal, &[44000.0]),
        ],
        qa,
    )
}

/// Scene whose NDVI equals `nir/red` driven values at every pixel
pub fn ndvi_scene(id: &str, year: i32, grid: GridSpec, nir: &[f32], red: &[f32]) -> Scene {
    create_scene(
        id,
        year,
        6,
        grid,
        &[(BandRole::Nir, nir), (BandRole::Red, red)],
        &[0],
    )
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
