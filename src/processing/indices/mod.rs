// src/processing/indices/mod.rs
pub mod evi;
pub mod lst;
pub mod ndi;

use std::fmt;
use std::str::FromStr;

use log::debug;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::processing::mask::Mask;
use crate::raster::{BandRole, Raster, Scene, NODATA};

// Re-export indices
pub use evi::Evi;
pub use lst::LandSurfaceTemperature;
pub use ndi::NormalizedDifference;

/// Most bands any calculator reads for one pixel
const MAX_INPUT_BANDS: usize = 4;

/// Trait for spectral index calculators
pub trait IndexCalculator: Send + Sync {
    /// Compute one output pixel from valid inputs given in `required_bands()` order.
    /// `None` marks the pixel as NoData.
    fn pixel(&self, inputs: &[f32]) -> Option<f32>;

    /// Bands read by this calculator, in the order `pixel` expects them
    fn required_bands(&self) -> &[BandRole];

    /// Return the name of the index
    fn name(&self) -> &str;
}

/// Linear rescale constants of the Landsat Collection-2 Level-2 products
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorCalibration {
    pub reflectance_scale: f32,
    pub reflectance_offset: f32,
    pub thermal_scale: f32,
    pub thermal_offset: f32,
}

impl Default for SensorCalibration {
    fn default() -> Self {
        Self {
            reflectance_scale: 0.000_027_5,
            reflectance_offset: -0.2,
            thermal_scale: 0.003_418_02,
            thermal_offset: 149.0,
        }
    }
}

impl SensorCalibration {
    pub fn reflectance(&self, raw: f32) -> f32 {
        raw * self.reflectance_scale + self.reflectance_offset
    }

    pub fn brightness_kelvin(&self, raw: f32) -> f32 {
        raw * self.thermal_scale + self.thermal_offset
    }
}

/// Supported spectral indices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SpectralIndex {
    Ndvi,
    Evi,
    Ndwi,
    Mndwi,
    Ndbi,
    Lst,
}

impl SpectralIndex {
    pub const ALL: [SpectralIndex; 6] = [
        SpectralIndex::Ndvi,
        SpectralIndex::Evi,
        SpectralIndex::Ndwi,
        SpectralIndex::Mndwi,
        SpectralIndex::Ndbi,
        SpectralIndex::Lst,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SpectralIndex::Ndvi => "NDVI",
            SpectralIndex::Evi => "EVI",
            SpectralIndex::Ndwi => "NDWI",
            SpectralIndex::Mndwi => "MNDWI",
            SpectralIndex::Ndbi => "NDBI",
            SpectralIndex::Lst => "LST",
        }
    }

    /// Calculator implementing this index
    pub fn calculator(&self, calibration: SensorCalibration) -> Box<dyn IndexCalculator> {
        let name = Some(self.as_str().to_string());
        match self {
            SpectralIndex::Ndvi => Box::new(NormalizedDifference::new(BandRole::Nir, BandRole::Red, name)),
            SpectralIndex::Evi => Box::new(Evi::new(calibration, name)),
            SpectralIndex::Ndwi => Box::new(NormalizedDifference::new(BandRole::Green, BandRole::Nir, name)),
            SpectralIndex::Mndwi => Box::new(NormalizedDifference::new(BandRole::Green, BandRole::Swir1, name)),
            SpectralIndex::Ndbi => Box::new(NormalizedDifference::new(BandRole::Swir1, BandRole::Nir, name)),
            SpectralIndex::Lst => Box::new(LandSurfaceTemperature::new(calibration, name)),
        }
    }

    /// Value range used when rendering the index
    pub fn display_range(&self) -> (f32, f32) {
        match self {
            SpectralIndex::Ndvi | SpectralIndex::Evi => (0.0, 1.0),
            SpectralIndex::Ndwi | SpectralIndex::Mndwi | SpectralIndex::Ndbi => (-0.5, 0.5),
            SpectralIndex::Lst => (15.0, 45.0),
        }
    }

    /// Colour ramp used when rendering the index
    pub fn palette(&self) -> &'static [&'static str] {
        const VEGETATION: &[&str] = &[
            "ffffff", "ce7e45", "df923d", "f1b555", "fcd163", "99b718", "74a901", "66a000",
            "529400", "3e8601", "207401", "056201", "004c00", "023b01", "012e01", "011d01",
            "011301",
        ];
        const WATER: &[&str] = &["0000ff", "00ffff", "ffff00", "ff0000", "ffffff"];
        const BUILT_UP: &[&str] = &["00441b", "f7f7f7", "762a83"];
        const TEMPERATURE: &[&str] = &[
            "313695", "4575b4", "abd9e9", "ffffbf", "fdae61", "f46d43", "a50026",
        ];

        match self {
            SpectralIndex::Ndvi | SpectralIndex::Evi => VEGETATION,
            SpectralIndex::Ndwi | SpectralIndex::Mndwi => WATER,
            SpectralIndex::Ndbi => BUILT_UP,
            SpectralIndex::Lst => TEMPERATURE,
        }
    }
}

impl fmt::Display for SpectralIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SpectralIndex {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        SpectralIndex::ALL
            .into_iter()
            .find(|index| index.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| EngineError::UnsupportedIndex(s.to_string()))
    }
}

impl TryFrom<String> for SpectralIndex {
    type Error = EngineError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<SpectralIndex> for String {
    fn from(index: SpectralIndex) -> Self {
        index.as_str().to_string()
    }
}

/// Index values of one scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexRaster {
    pub index: SpectralIndex,
    pub scene_id: String,
    pub year: i32,
    pub raster: Raster<f32>,
}

/// Run a calculator over a scene, writing NoData wherever the mask rejects a
/// pixel or any input band is missing a value
pub fn calculate(calculator: &dyn IndexCalculator, scene: &Scene, mask: &Mask) -> Result<Raster<f32>> {
    if mask.grid.shape() != scene.grid.shape() {
        return Err(EngineError::invalid_scene(
            &scene.id,
            format!("mask is {:?}, scene grid is {:?}", mask.shape(), scene.grid.shape()),
        ));
    }

    let bands = calculator
        .required_bands()
        .iter()
        .map(|&role| scene.band(role))
        .collect::<Result<Vec<_>>>()?;
    debug_assert!(bands.len() <= MAX_INPUT_BANDS);

    let mut result_data = vec![NODATA; scene.grid.len()];

    result_data.par_iter_mut().enumerate().for_each(|(i, result)| {
        if !mask.data[i] || bands.iter().any(|band| !band.is_valid(i)) {
            return;
        }

        let mut inputs = [0.0f32; MAX_INPUT_BANDS];
        for (slot, band) in inputs.iter_mut().zip(&bands) {
            *slot = band.data[i];
        }

        if let Some(value) = calculator.pixel(&inputs[..bands.len()]) {
            if value.is_finite() {
                *result = value;
            }
        }
    });

    Ok(Raster {
        grid: scene.grid,
        data: result_data,
        nodata: Some(NODATA),
    })
}

/// Evaluate `index` on a masked scene
pub fn evaluate_index(
    scene: &Scene,
    index: SpectralIndex,
    mask: &Mask,
    calibration: SensorCalibration,
) -> Result<IndexRaster> {
    let calculator = index.calculator(calibration);
    debug!("evaluating {} on scene {}", calculator.name(), scene.id);

    let raster = calculate(calculator.as_ref(), scene, mask)?;

    Ok(IndexRaster {
        index,
        scene_id: scene.id.clone(),
        year: scene.year(),
        raster,
    })
}
