// src/processing/anomaly.rs
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::processing::composite::AnnualComposite;
use crate::raster::Raster;

pub const ANOMALOUS: u8 = 1;
pub const NORMAL: u8 = 0;
pub const MASK_NODATA: u8 = 255;

/// Pixels where two annual composites differ by more than a threshold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyMask {
    pub current_year: i32,
    pub baseline_year: i32,
    pub threshold: f32,
    pub raster: Raster<u8>,
}

impl AnomalyMask {
    pub fn anomalous_count(&self) -> usize {
        self.raster.data.iter().filter(|&&v| v == ANOMALOUS).count()
    }

    pub fn is_anomalous(&self, col: usize, row: usize) -> Option<bool> {
        match self.raster.get(col, row)? {
            MASK_NODATA => None,
            v => Some(v == ANOMALOUS),
        }
    }
}

/// Flag pixels where |current - baseline| > threshold.
///
/// NoData in either composite yields NoData, never an anomaly.
pub fn detect_anomaly(
    current: &AnnualComposite,
    baseline: &AnnualComposite,
    threshold: f32,
) -> Result<AnomalyMask> {
    let (a, b) = (&current.raster, &baseline.raster);
    if a.grid != b.grid {
        return Err(EngineError::GridMismatch {
            expected: a.shape(),
            found: b.shape(),
        });
    }

    let data = (0..a.data.len())
        .into_par_iter()
        .map(|i| {
            if !a.is_valid(i) || !b.is_valid(i) {
                MASK_NODATA
            } else if (a.data[i] - b.data[i]).abs() > threshold {
                ANOMALOUS
            } else {
                NORMAL
            }
        })
        .collect();

    Ok(AnomalyMask {
        current_year: current.year,
        baseline_year: baseline.year,
        threshold,
        raster: Raster {
            grid: a.grid,
            data,
            nodata: Some(MASK_NODATA),
        },
    })
}
