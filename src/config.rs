// src/config.rs
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::processing::indices::SensorCalibration;

/// Engine-wide settings. Per-request values (region, index, year, mask
/// strengths, threshold) are passed with each call instead.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Worker threads for series builds
    #[serde(default = "default_threads")]
    pub threads: usize,
    #[serde(default = "default_start_year")]
    pub start_year: i32,
    #[serde(default = "default_end_year")]
    pub end_year: i32,
    #[serde(default)]
    pub calibration: SensorCalibration,
    #[serde(default = "default_anomaly_threshold")]
    pub anomaly_threshold: f32,
}

fn default_threads() -> usize {
    num_cpus::get()
}

fn default_start_year() -> i32 {
    2015
}

fn default_end_year() -> i32 {
    2025
}

fn default_anomaly_threshold() -> f32 {
    0.2
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            threads: default_threads(),
            start_year: default_start_year(),
            end_year: default_end_year(),
            calibration: SensorCalibration::default(),
            anomaly_threshold: default_anomaly_threshold(),
        }
    }
}

impl EngineConfig {
    pub fn years(&self) -> RangeInclusive<i32> {
        self.start_year..=self.end_year
    }
}
