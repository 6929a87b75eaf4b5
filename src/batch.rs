// src/batch.rs
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::EngineConfig;
use crate::engine::Engine;
use crate::io::{read_archive, read_region, write_json};
use crate::processing::{MaskConfig, SpectralIndex, StatsRecord};

#[derive(Deserialize, Serialize, Debug)]
pub struct BatchConfig {
    pub global: GlobalParams,
    pub operations: Vec<Operation>,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct GlobalParams {
    /// Scene archive manifest
    pub archive: PathBuf,
    /// Region file
    pub region: PathBuf,
    #[serde(default)]
    pub masks: MaskConfig,
    #[serde(default)]
    pub engine: EngineConfig,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct Operation {
    #[serde(flatten)]
    pub kind: OperationKind,
    pub output: PathBuf,
    /// Overrides the global mask strengths for this operation
    pub masks: Option<MaskConfig>,
}

#[derive(Deserialize, Serialize, Debug)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OperationKind {
    Composite {
        index: String,
        year: i32,
    },
    Stats {
        index: String,
        year: i32,
    },
    Series {
        index: String,
        start: Option<i32>,
        end: Option<i32>,
    },
    Anomaly {
        index: String,
        year: i32,
        baseline: i32,
        threshold: Option<f32>,
    },
}

/// Statistics plus the empty-result diagnostic shown to the user
#[derive(Serialize, Debug)]
pub struct StatsReport {
    pub index: SpectralIndex,
    pub year: i32,
    pub stats: StatsRecord,
    pub message: Option<String>,
}

impl StatsReport {
    pub fn new(index: SpectralIndex, year: i32, stats: StatsRecord, masks: &MaskConfig) -> Self {
        let message = stats
            .is_empty()
            .then(|| masks.probable_empty_cause().message());
        Self {
            index,
            year,
            stats,
            message,
        }
    }
}

pub fn process_batch(config_path: &Path) -> Result<()> {
    // Read and parse configuration file
    let config_content = fs::read_to_string(config_path)
        .with_context(|| format!("reading batch file {}", config_path.display()))?;
    let config: BatchConfig = serde_json::from_str(&config_content)?;

    let archive = read_archive(&config.global.archive)?;
    let region = read_region(&config.global.region)?;
    let engine = Engine::new(&archive, config.global.engine.clone());

    log::info!(
        "Starting batch processing with {} operations...",
        config.operations.len()
    );

    for (i, op) in config.operations.iter().enumerate() {
        log::info!(
            "[{}/{}] {:?} -> {}",
            i + 1,
            config.operations.len(),
            op.kind,
            op.output.display()
        );

        let masks = op.masks.unwrap_or(config.global.masks);

        match &op.kind {
            OperationKind::Composite { index, year } => {
                let composite = engine.composite(*year, index.parse()?, Some(&region), &masks)?;
                write_json(&composite, &op.output)?;
            }
            OperationKind::Stats { index, year } => {
                let index: SpectralIndex = index.parse()?;
                let composite = engine.composite(*year, index, Some(&region), &masks)?;
                let stats = engine.summarize(&composite, &region);
                write_json(&StatsReport::new(index, *year, stats, &masks), &op.output)?;
            }
            OperationKind::Series { index, start, end } => {
                let years = start.unwrap_or(engine.config().start_year)
                    ..=end.unwrap_or(engine.config().end_year);
                let series = engine.build_series(index.parse()?, Some(&region), years, &masks)?;
                write_json(&series.rows(), &op.output)?;
            }
            OperationKind::Anomaly {
                index,
                year,
                baseline,
                threshold,
            } => {
                let index: SpectralIndex = index.parse()?;
                let (current, base) =
                    engine.composite_pair(*year, *baseline, index, Some(&region), &masks)?;
                let threshold = threshold.unwrap_or(engine.config().anomaly_threshold);
                let anomaly = engine.detect_anomaly(&current, &base, threshold)?;
                write_json(&anomaly, &op.output)?;
            }
        }
    }

    log::info!("Batch processing complete!");
    Ok(())
}
