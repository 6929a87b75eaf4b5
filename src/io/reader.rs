// src/io/reader.rs
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::archive::MemoryArchive;
use crate::raster::{GridSpec, Region, Scene};

/// On-disk description of a scene archive
#[derive(Deserialize, Serialize, Debug)]
pub struct ArchiveManifest {
    pub grid: GridSpec,
    #[serde(default)]
    pub scenes: Vec<Scene>,
}

pub fn read_archive(path: &Path) -> Result<MemoryArchive> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading archive manifest {}", path.display()))?;
    let manifest: ArchiveManifest = serde_json::from_str(&content)
        .with_context(|| format!("parsing archive manifest {}", path.display()))?;

    let scene_count = manifest.scenes.len();
    let archive = MemoryArchive::with_scenes(manifest.grid, manifest.scenes)?;
    log::info!("loaded {} scenes from {}", scene_count, path.display());
    Ok(archive)
}

/// Read a region file: `{"vertices": [[lon, lat], ...]}`
pub fn read_region(path: &Path) -> Result<Region> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading region {}", path.display()))?;
    let region: Region = serde_json::from_str(&content)
        .with_context(|| format!("parsing region {}", path.display()))?;
    Ok(region)
}
