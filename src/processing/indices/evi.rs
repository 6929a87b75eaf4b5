// src/processing/indices/evi.rs
use crate::processing::indices::{IndexCalculator, SensorCalibration};
use crate::raster::BandRole;

// EVI coefficients from MODIS documentation
const G: f32 = 2.5; // Gain factor
const L: f32 = 1.0; // Soil adjustment factor
const C1: f32 = 6.0; // Aerosol resistance (red)
const C2: f32 = 7.5; // Aerosol resistance (blue)

/// Enhanced Vegetation Index (EVI) calculator
pub struct Evi {
    calibration: SensorCalibration,
    name: String,
}

impl Evi {
    pub fn new(calibration: SensorCalibration, name: Option<String>) -> Self {
        Self {
            calibration,
            name: name.unwrap_or_else(|| "EVI".to_string()),
        }
    }
}

impl IndexCalculator for Evi {
    fn pixel(&self, inputs: &[f32]) -> Option<f32> {
        let nir = self.calibration.reflectance(inputs[0]);
        let red = self.calibration.reflectance(inputs[1]);
        let blue = self.calibration.reflectance(inputs[2]);

        let denominator = nir + C1 * red - C2 * blue + L;
        if denominator != 0.0 {
            Some(G * (nir - red) / denominator)
        } else {
            None
        }
    }

    fn required_bands(&self) -> &[BandRole] {
        &[BandRole::Nir, BandRole::Red, BandRole::Blue]
    }

    fn name(&self) -> &str {
        &self.name
    }
}
