// src/processing/indices/lst.rs
use crate::processing::indices::{IndexCalculator, SensorCalibration};
use crate::raster::BandRole;

const KELVIN_OFFSET: f32 = 273.15;

/// Land surface temperature in degrees Celsius from the thermal band
pub struct LandSurfaceTemperature {
    calibration: SensorCalibration,
    name: String,
}

impl LandSurfaceTemperature {
    pub fn new(calibration: SensorCalibration, name: Option<String>) -> Self {
        Self {
            calibration,
            name: name.unwrap_or_else(|| "LST".to_string()),
        }
    }
}

impl IndexCalculator for LandSurfaceTemperature {
    fn pixel(&self, inputs: &[f32]) -> Option<f32> {
        Some(self.calibration.brightness_kelvin(inputs[0]) - KELVIN_OFFSET)
    }

    fn required_bands(&self) -> &[BandRole] {
        &[BandRole::Thermal]
    }

    fn name(&self) -> &str {
        &self.name
    }
}
