// src/processing/series.rs
use std::ops::RangeInclusive;

use chrono::NaiveDate;
use log::info;
use serde::{Deserialize, Serialize};

use crate::archive::SceneArchive;
use crate::error::{EngineError, Result};
use crate::processing::composite::composite;
use crate::processing::indices::{SensorCalibration, SpectralIndex};
use crate::processing::mask::MaskConfig;
use crate::processing::parallel::{CancelToken, YearPool};
use crate::processing::stats::summarize;
use crate::raster::Region;

/// Median index value of one year; `None` when the year had no valid pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub year: i32,
    /// Time-axis position of the year's composite
    pub time_start: Option<NaiveDate>,
    pub value: Option<f64>,
}

/// Tabular export row: year, timestamp, value, index name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesRow {
    pub year: i32,
    pub time_start: Option<NaiveDate>,
    pub value: Option<f64>,
    pub index: String,
}

/// Yearly trend of an index over a region, ordered by ascending year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    pub index: SpectralIndex,
    pub points: Vec<SeriesPoint>,
}

impl TimeSeries {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn years(&self) -> Vec<i32> {
        self.points.iter().map(|p| p.year).collect()
    }

    pub fn rows(&self) -> Vec<SeriesRow> {
        self.points
            .iter()
            .map(|p| SeriesRow {
                year: p.year,
                time_start: p.time_start,
                value: p.value,
                index: self.index.to_string(),
            })
            .collect()
    }
}

/// Composite and summarize every year of `years`, one worker per year
#[allow(clippy::too_many_arguments)]
pub fn build_series(
    archive: &dyn SceneArchive,
    index: SpectralIndex,
    region: Option<&Region>,
    years: RangeInclusive<i32>,
    masks: &MaskConfig,
    calibration: SensorCalibration,
    pool: &YearPool,
    cancel: &CancelToken,
) -> Result<TimeSeries> {
    let region = region.ok_or(EngineError::MissingRegion)?;
    let years: Vec<i32> = years.collect();
    info!(
        "building {} series over {} years on {} workers",
        index,
        years.len(),
        pool.threads()
    );

    let points = pool
        .run(&years, cancel, |year| {
            let annual = composite(archive, year, index, Some(region), masks, calibration, cancel)?;
            Ok((annual.time_start(), summarize(&annual.raster, region).median()))
        })?
        .into_iter()
        .map(|(year, (time_start, value))| SeriesPoint {
            year,
            time_start,
            value,
        })
        .collect();

    Ok(TimeSeries { index, points })
}
