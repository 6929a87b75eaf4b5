// src/processing/composite.rs
use chrono::NaiveDate;
use log::{debug, info, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::archive::SceneArchive;
use crate::error::{EngineError, Result};
use crate::processing::indices::{evaluate_index, IndexRaster, SensorCalibration, SpectralIndex};
use crate::processing::mask::{scene_mask, MaskConfig};
use crate::processing::parallel::CancelToken;
use crate::raster::{Raster, Region, Scene, NODATA};

/// Per-pixel temporal median of one year's index rasters, clipped to a region
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnualComposite {
    pub index: SpectralIndex,
    pub year: i32,
    /// Scenes that contributed to the reduction
    pub scene_count: usize,
    pub raster: Raster<f32>,
}

impl AnnualComposite {
    /// True when no pixel carries a value
    pub fn is_empty(&self) -> bool {
        self.raster.valid_count() == 0
    }

    /// Timestamp used to place the composite on a time axis (1 June)
    pub fn time_start(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, 6, 1)
    }
}

/// Median of the values in place; mean of the two middle values for an even count
pub fn median(values: &mut [f32]) -> Option<f32> {
    if values.is_empty() {
        return None;
    }
    values.sort_unstable_by(f32::total_cmp);

    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}

/// Reduce same-grid index rasters to their per-pixel median.
///
/// Pixels without a single valid contribution stay NoData.
pub fn median_reduce(rasters: &[Raster<f32>], template: &Raster<f32>) -> Result<Raster<f32>> {
    for raster in rasters {
        if raster.grid.shape() != template.grid.shape() {
            return Err(EngineError::GridMismatch {
                expected: template.grid.shape(),
                found: raster.grid.shape(),
            });
        }
    }

    let mut result_data = vec![NODATA; template.grid.len()];
    result_data.par_iter_mut().enumerate().for_each(|(i, result)| {
        let mut values: Vec<f32> = rasters
            .iter()
            .filter(|raster| raster.is_valid(i))
            .map(|raster| raster.data[i])
            .collect();

        if let Some(value) = median(&mut values) {
            *result = value;
        }
    });

    Ok(Raster {
        grid: template.grid,
        data: result_data,
        nodata: Some(NODATA),
    })
}

/// Set every pixel whose centre falls outside `region` to NoData
pub fn clip_to_region(raster: &mut Raster<f32>, region: &Region) {
    let grid = raster.grid;
    raster
        .data
        .par_iter_mut()
        .enumerate()
        .for_each(|(i, value)| {
            if !region.contains_pixel(&grid, i % grid.width, i / grid.width) {
                *value = NODATA;
            }
        });
}

/// Build the annual composite of `index` over `region` for calendar `year`
pub fn composite(
    archive: &dyn SceneArchive,
    year: i32,
    index: SpectralIndex,
    region: Option<&Region>,
    masks: &MaskConfig,
    calibration: SensorCalibration,
    cancel: &CancelToken,
) -> Result<AnnualComposite> {
    let region = region.ok_or(EngineError::MissingRegion)?;
    cancel.check()?;

    let grid = archive.grid();
    let window = grid.window(region.bounds());
    let (scenes, other_years): (Vec<&Scene>, Vec<&Scene>) = archive
        .scenes_for(year, region)?
        .into_iter()
        .partition(|scene| scene.year() == year);
    for scene in &other_years {
        debug!(
            "skipping scene {}: acquired in {}, requested {}",
            scene.id,
            scene.year(),
            year
        );
    }
    info!(
        "compositing {} for {} from {} scenes (cloud mask {}, water mask {})",
        index,
        year,
        scenes.len(),
        masks.cloud.0,
        masks.water.0
    );

    let index_rasters: Vec<IndexRaster> = scenes
        .par_iter()
        .map(|scene| {
            cancel.check()?;
            let mask = scene_mask(scene, masks)?;
            let raster = evaluate_index(scene, index, &mask, calibration)?;
            debug!(
                "scene {}: {} valid pixels after masking",
                scene.id,
                raster.raster.valid_count()
            );
            Ok(raster)
        })
        .collect::<Result<_>>()?;

    // Every scene has to be evaluated before the temporal reduction
    cancel.check()?;

    let cropped: Vec<Raster<f32>> = index_rasters
        .iter()
        .map(|raster| raster.raster.crop(&window))
        .collect();
    let template = Raster::filled(grid.sub_grid(&window), NODATA, Some(NODATA));
    let mut raster = median_reduce(&cropped, &template)?;
    clip_to_region(&mut raster, region);

    let composite = AnnualComposite {
        index,
        year,
        scene_count: index_rasters.len(),
        raster,
    };

    if composite.is_empty() {
        warn!(
            "{} composite for {} has no valid pixels: {}",
            index,
            year,
            masks.probable_empty_cause().message()
        );
    }

    Ok(composite)
}
