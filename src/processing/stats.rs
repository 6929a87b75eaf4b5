// src/processing/stats.rs
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::raster::{Raster, Region};

/// Statistics of the valid pixels of a raster inside a region
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub median: f64,
    pub min: f64,
    pub max: f64,
    pub std_dev: f64,
}

/// Zonal statistics record. `summary` is absent when `count` is zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatsRecord {
    pub count: usize,
    pub summary: Option<Summary>,
}

impl StatsRecord {
    pub fn empty() -> Self {
        Self {
            count: 0,
            summary: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn median(&self) -> Option<f64> {
        self.summary.map(|s| s.median)
    }
}

/// Summarize the valid pixels of `raster` whose centres fall inside `region`
pub fn summarize(raster: &Raster<f32>, region: &Region) -> StatsRecord {
    let grid = raster.grid;
    let mut values: Vec<f64> = (0..raster.data.len())
        .into_par_iter()
        .filter(|&i| raster.is_valid(i))
        .filter(|&i| region.contains_pixel(&grid, i % grid.width, i / grid.width))
        .map(|i| raster.data[i] as f64)
        .collect();

    if values.is_empty() {
        return StatsRecord::empty();
    }

    let count = values.len();
    let mean = values.iter().sum::<f64>() / count as f64;
    let var = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / count as f64;

    values.sort_unstable_by(f64::total_cmp);
    let median = if count % 2 == 0 {
        (values[count / 2 - 1] + values[count / 2]) / 2.0
    } else {
        values[count / 2]
    };

    StatsRecord {
        count,
        summary: Some(Summary {
            median,
            min: values[0],
            max: values[count - 1],
            std_dev: var.sqrt(),
        }),
    }
}
