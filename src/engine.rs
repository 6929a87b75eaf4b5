// src/engine.rs
use std::ops::RangeInclusive;

use log::info;

use crate::archive::SceneArchive;
use crate::config::EngineConfig;
use crate::error::Result;
use crate::processing::{
    anomaly, composite, series, stats, AnnualComposite, AnomalyMask, CancelToken, MaskConfig,
    SpectralIndex, StatsRecord, TimeSeries, YearPool,
};
use crate::raster::Region;

/// Entry point for callers: composites, statistics, trends and anomalies over
/// a read-only scene archive.
///
/// The engine holds no per-request state; everything a request depends on is
/// passed in explicitly, so one engine can serve concurrent callers.
pub struct Engine<'a, A: SceneArchive> {
    archive: &'a A,
    config: EngineConfig,
    pool: YearPool,
}

impl<'a, A: SceneArchive> Engine<'a, A> {
    pub fn new(archive: &'a A, config: EngineConfig) -> Self {
        let pool = YearPool::new(Some(config.threads));
        Self {
            archive,
            config,
            pool,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn composite(
        &self,
        year: i32,
        index: SpectralIndex,
        region: Option<&Region>,
        masks: &MaskConfig,
    ) -> Result<AnnualComposite> {
        self.composite_with_cancel(year, index, region, masks, &CancelToken::new())
    }

    pub fn composite_with_cancel(
        &self,
        year: i32,
        index: SpectralIndex,
        region: Option<&Region>,
        masks: &MaskConfig,
        cancel: &CancelToken,
    ) -> Result<AnnualComposite> {
        composite::composite(
            self.archive,
            year,
            index,
            region,
            masks,
            self.config.calibration,
            cancel,
        )
    }

    /// Two composites built side by side, e.g. for a split-view comparison
    pub fn composite_pair(
        &self,
        left_year: i32,
        right_year: i32,
        index: SpectralIndex,
        region: Option<&Region>,
        masks: &MaskConfig,
    ) -> Result<(AnnualComposite, AnnualComposite)> {
        let (left, right) = rayon::join(
            || self.composite(left_year, index, region, masks),
            || self.composite(right_year, index, region, masks),
        );
        Ok((left?, right?))
    }

    pub fn summarize(&self, composite: &AnnualComposite, region: &Region) -> StatsRecord {
        stats::summarize(&composite.raster, region)
    }

    pub fn build_series(
        &self,
        index: SpectralIndex,
        region: Option<&Region>,
        years: RangeInclusive<i32>,
        masks: &MaskConfig,
    ) -> Result<TimeSeries> {
        self.build_series_with_cancel(index, region, years, masks, &CancelToken::new())
    }

    pub fn build_series_with_cancel(
        &self,
        index: SpectralIndex,
        region: Option<&Region>,
        years: RangeInclusive<i32>,
        masks: &MaskConfig,
        cancel: &CancelToken,
    ) -> Result<TimeSeries> {
        series::build_series(
            self.archive,
            index,
            region,
            years,
            masks,
            self.config.calibration,
            &self.pool,
            cancel,
        )
    }

    /// Series over the configured default year range
    pub fn default_series(
        &self,
        index: SpectralIndex,
        region: Option<&Region>,
        masks: &MaskConfig,
    ) -> Result<TimeSeries> {
        self.build_series(index, region, self.config.years(), masks)
    }

    pub fn detect_anomaly(
        &self,
        current: &AnnualComposite,
        baseline: &AnnualComposite,
        threshold: f32,
    ) -> Result<AnomalyMask> {
        info!(
            "anomaly {} vs {} at threshold {}",
            current.year, baseline.year, threshold
        );
        anomaly::detect_anomaly(current, baseline, threshold)
    }
}
