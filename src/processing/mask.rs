// src/processing/mask.rs
use std::fmt;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::raster::{Raster, Scene};

/// Dilated cloud, cloud, cloud shadow and snow flags of the QA_PIXEL layer
pub const CLOUD_SHADOW_BITS: u16 = (1 << 1) | (1 << 3) | (1 << 4) | (1 << 5);
/// Water flag of the QA_PIXEL layer
pub const WATER_BITS: u16 = 1 << 7;

/// Boolean grid, true where a pixel is usable
pub type Mask = Raster<bool>;

/// Mask strength as set on a 0-100 slider.
///
/// Any positive strength fully excludes flagged pixels; zero disables the test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MaskStrength(pub u8);

impl MaskStrength {
    pub const OFF: MaskStrength = MaskStrength(0);
    pub const FULL: MaskStrength = MaskStrength(100);

    pub fn is_enforced(&self) -> bool {
        self.0 > 0
    }
}

/// Cloud and water masking applied to every scene of a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaskConfig {
    #[serde(default = "default_cloud")]
    pub cloud: MaskStrength,
    #[serde(default = "default_water")]
    pub water: MaskStrength,
}

fn default_cloud() -> MaskStrength {
    MaskStrength::FULL
}

fn default_water() -> MaskStrength {
    MaskStrength::OFF
}

impl Default for MaskConfig {
    fn default() -> Self {
        Self {
            cloud: default_cloud(),
            water: default_water(),
        }
    }
}

impl MaskConfig {
    pub fn new(cloud: u8, water: u8) -> Self {
        Self {
            cloud: MaskStrength(cloud),
            water: MaskStrength(water),
        }
    }

    /// Bits that disqualify a pixel under this configuration
    pub fn rejected_bits(&self) -> u16 {
        let mut bits = 0;
        if self.cloud.is_enforced() {
            bits |= CLOUD_SHADOW_BITS;
        }
        if self.water.is_enforced() {
            bits |= WATER_BITS;
        }
        bits
    }

    /// Most likely reason a request produced no valid pixels
    pub fn probable_empty_cause(&self) -> EmptyCause {
        let water_heavy = self.water.0 > 50;
        if water_heavy && self.cloud.0 < 50 {
            EmptyCause::Water
        } else if water_heavy && self.cloud.0 > 50 {
            EmptyCause::WaterAndCloud
        } else {
            EmptyCause::Cloud
        }
    }
}

/// Diagnostic attached to an empty result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EmptyCause {
    Cloud,
    Water,
    WaterAndCloud,
}

impl EmptyCause {
    pub fn message(&self) -> String {
        format!("No pixels found for your '{self}' masking value.")
    }
}

impl fmt::Display for EmptyCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmptyCause::Cloud => f.write_str("Cloud"),
            EmptyCause::Water => f.write_str("Water"),
            EmptyCause::WaterAndCloud => f.write_str("Water/Cloud"),
        }
    }
}

/// Decode a quality band into a validity mask
pub fn build_mask(quality: &Raster<u16>, config: &MaskConfig) -> Mask {
    let rejected = config.rejected_bits();
    let mut data = vec![true; quality.data.len()];

    if rejected != 0 {
        data.par_iter_mut()
            .zip(quality.data.par_iter())
            .for_each(|(valid, &qa)| *valid = (qa & rejected) == 0);
    }

    Raster {
        grid: quality.grid,
        data,
        nodata: None,
    }
}

/// Build the validity mask of a scene from its quality layer
pub fn scene_mask(scene: &Scene, config: &MaskConfig) -> Result<Mask> {
    let quality = scene
        .quality
        .as_ref()
        .ok_or_else(|| EngineError::invalid_scene(&scene.id, "missing quality band"))?;

    if quality.grid.shape() != scene.grid.shape() {
        return Err(EngineError::invalid_scene(
            &scene.id,
            "quality band does not match scene grid",
        ));
    }

    Ok(build_mask(quality, config))
}
