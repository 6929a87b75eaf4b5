// src/processing/indices/ndi.rs
use crate::processing::indices::IndexCalculator;
use crate::raster::BandRole;

/// Normalized Difference Index (NDI) calculator: (A-B)/(A+B)
pub struct NormalizedDifference {
    bands: [BandRole; 2],
    name: String,
}

impl NormalizedDifference {
    pub fn new(band_a: BandRole, band_b: BandRole, name: Option<String>) -> Self {
        Self {
            bands: [band_a, band_b],
            name: name.unwrap_or_else(|| "NDI".to_string()),
        }
    }
}

impl IndexCalculator for NormalizedDifference {
    fn pixel(&self, inputs: &[f32]) -> Option<f32> {
        let a = inputs[0];
        let b = inputs[1];

        // Zero denominator is NoData
        if a + b != 0.0 {
            Some((a - b) / (a + b))
        } else {
            None
        }
    }

    fn required_bands(&self) -> &[BandRole] {
        &self.bands
    }

    fn name(&self) -> &str {
        &self.name
    }
}
