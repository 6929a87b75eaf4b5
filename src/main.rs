// src/main.rs
use anyhow::{anyhow, Context, Result};
use clap::Parser;
use std::fs;

use annual_composite::batch::{process_batch, StatsReport};
use annual_composite::cli::{Cli, Commands};
use annual_composite::config::EngineConfig;
use annual_composite::engine::Engine;
use annual_composite::error::EngineError;
use annual_composite::io::{read_archive, read_region, write_json};
use annual_composite::processing::{MaskConfig, SpectralIndex};

fn load_config(cli: &Cli) -> Result<EngineConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let content = fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            serde_json::from_str(&content)?
        }
        None => EngineConfig::default(),
    };
    if let Some(threads) = cli.threads {
        config.threads = threads;
    }
    Ok(config)
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match &cli.command {
        Commands::Batch { file } => process_batch(file),
        _ => run(&cli),
    }
}

fn run(cli: &Cli) -> Result<()> {
    let archive_path = cli
        .archive
        .as_ref()
        .ok_or_else(|| anyhow!("--archive is required"))?;
    let archive = read_archive(archive_path)?;
    let region = cli.region.as_deref().map(read_region).transpose()?;
    let engine = Engine::new(&archive, load_config(cli)?);
    let masks = MaskConfig::new(cli.cloud_mask, cli.water_mask);

    match &cli.command {
        Commands::Composite { index, year } => {
            let index: SpectralIndex = index.parse()?;
            let composite = engine.composite(*year, index, region.as_ref(), &masks)?;
            write_json(&composite, &cli.output)?;
        }
        Commands::Stats { index, year } => {
            let index: SpectralIndex = index.parse()?;
            let region = region.as_ref().ok_or(EngineError::MissingRegion)?;
            let composite = engine.composite(*year, index, Some(region), &masks)?;
            let stats = engine.summarize(&composite, region);
            let report = StatsReport::new(index, *year, stats, &masks);
            if let Some(message) = &report.message {
                eprintln!("{message}");
            }
            write_json(&report, &cli.output)?;
        }
        Commands::Series { index, start, end } => {
            let years = start.unwrap_or(engine.config().start_year)
                ..=end.unwrap_or(engine.config().end_year);
            let series = engine.build_series(index.parse()?, region.as_ref(), years, &masks)?;
            write_json(&series, &cli.output)?;
        }
        Commands::Anomaly {
            index,
            year,
            baseline,
            threshold,
        } => {
            let (current, base) =
                engine.composite_pair(*year, *baseline, index.parse()?, region.as_ref(), &masks)?;
            let threshold = threshold.unwrap_or(engine.config().anomaly_threshold);
            let anomaly = engine.detect_anomaly(&current, &base, threshold)?;
            write_json(&anomaly, &cli.output)?;
        }
        Commands::Compare { index, left, right } => {
            let pair = engine.composite_pair(*left, *right, index.parse()?, region.as_ref(), &masks)?;
            write_json(&pair, &cli.output)?;
        }
        Commands::Batch { file } => process_batch(file)?,
    }

    Ok(())
}
