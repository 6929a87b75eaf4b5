// src/raster/scene.rs
use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Datelike, Utc};
use geo::Polygon;
use serde::{Deserialize, Serialize};

use super::grid::{GridSpec, Raster};
use crate::error::{EngineError, Result};

/// Logical spectral role of a band, independent of sensor band numbering
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BandRole {
    Blue,
    Green,
    Red,
    Nir,
    Swir1,
    Thermal,
}

impl fmt::Display for BandRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BandRole::Blue => "blue",
            BandRole::Green => "green",
            BandRole::Red => "red",
            BandRole::Nir => "nir",
            BandRole::Swir1 => "swir1",
            BandRole::Thermal => "thermal",
        };
        f.write_str(name)
    }
}

/// One observation from the imagery archive
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scene {
    pub id: String,
    pub acquired: DateTime<Utc>,
    pub grid: GridSpec,
    pub bands: BTreeMap<BandRole, Raster<f32>>,
    /// Per-pixel condition bitmask
    #[serde(default)]
    pub quality: Option<Raster<u16>>,
    /// Valid-data footprint; the grid extent is used when absent
    #[serde(default)]
    pub footprint: Option<Polygon<f64>>,
}

impl Scene {
    pub fn new(id: impl Into<String>, acquired: DateTime<Utc>, grid: GridSpec) -> Self {
        Self {
            id: id.into(),
            acquired,
            grid,
            bands: BTreeMap::new(),
            quality: None,
            footprint: None,
        }
    }

    pub fn with_band(mut self, role: BandRole, band: Raster<f32>) -> Self {
        self.bands.insert(role, band);
        self
    }

    pub fn with_quality(mut self, quality: Raster<u16>) -> Self {
        self.quality = Some(quality);
        self
    }

    pub fn with_footprint(mut self, footprint: Polygon<f64>) -> Self {
        self.footprint = Some(footprint);
        self
    }

    pub fn year(&self) -> i32 {
        self.acquired.year()
    }

    pub fn footprint(&self) -> Polygon<f64> {
        self.footprint
            .clone()
            .unwrap_or_else(|| self.grid.extent().to_polygon())
    }

    pub fn band(&self, role: BandRole) -> Result<&Raster<f32>> {
        self.bands
            .get(&role)
            .ok_or_else(|| EngineError::invalid_scene(&self.id, format!("missing {role} band")))
    }

    /// Check that every band, and the quality layer, matches the scene grid in
    /// shape and in number of values
    pub fn validate(&self) -> Result<()> {
        for (role, band) in &self.bands {
            if band.data.len() != self.grid.len() {
                return Err(EngineError::invalid_scene(
                    &self.id,
                    format!(
                        "{role} band holds {} values, scene grid has {}",
                        band.data.len(),
                        self.grid.len()
                    ),
                ));
            }
            if band.grid.shape() != self.grid.shape() {
                return Err(EngineError::invalid_scene(
                    &self.id,
                    format!(
                        "{role} band is {:?}, scene grid is {:?}",
                        band.shape(),
                        self.grid.shape()
                    ),
                ));
            }
        }
        if let Some(quality) = &self.quality {
            if quality.data.len() != self.grid.len() {
                return Err(EngineError::invalid_scene(
                    &self.id,
                    format!(
                        "quality band holds {} values, scene grid has {}",
                        quality.data.len(),
                        self.grid.len()
                    ),
                ));
            }
            if quality.grid.shape() != self.grid.shape() {
                return Err(EngineError::invalid_scene(
                    &self.id,
                    format!(
                        "quality band is {:?}, scene grid is {:?}",
                        quality.shape(),
                        self.grid.shape()
                    ),
                ));
            }
        }
        Ok(())
    }
}
