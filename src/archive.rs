// src/archive.rs
use log::debug;

use crate::error::{ArchiveError, EngineError, Result};
use crate::raster::{GridSpec, Region, Scene};

/// Read-only source of scenes.
///
/// Implementations must be safe to query from several threads at once.
pub trait SceneArchive: Sync {
    /// Grid shared by every scene in the archive
    fn grid(&self) -> GridSpec;

    /// Scenes acquired during `year` whose footprint intersects `region`
    fn scenes_for(&self, year: i32, region: &Region) -> std::result::Result<Vec<&Scene>, ArchiveError>;
}

/// Archive held entirely in memory
#[derive(Debug, Clone)]
pub struct MemoryArchive {
    grid: GridSpec,
    scenes: Vec<Scene>,
}

impl MemoryArchive {
    pub fn new(grid: GridSpec) -> Self {
        Self {
            grid,
            scenes: Vec::new(),
        }
    }

    /// Add a scene after checking it lines up with the archive grid
    pub fn insert(&mut self, scene: Scene) -> Result<()> {
        if scene.grid.shape() != self.grid.shape() {
            return Err(EngineError::invalid_scene(
                &scene.id,
                format!(
                    "scene grid {:?} does not match archive grid {:?}",
                    scene.grid.shape(),
                    self.grid.shape()
                ),
            ));
        }
        scene.validate()?;
        self.scenes.push(scene);
        Ok(())
    }

    pub fn with_scenes(grid: GridSpec, scenes: impl IntoIterator<Item = Scene>) -> Result<Self> {
        let mut archive = Self::new(grid);
        for scene in scenes {
            archive.insert(scene)?;
        }
        Ok(archive)
    }

    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }

    pub fn scenes(&self) -> &[Scene] {
        &self.scenes
    }
}

impl SceneArchive for MemoryArchive {
    fn grid(&self) -> GridSpec {
        self.grid
    }

    fn scenes_for(&self, year: i32, region: &Region) -> std::result::Result<Vec<&Scene>, ArchiveError> {
        let selected: Vec<&Scene> = self
            .scenes
            .iter()
            .filter(|scene| scene.year() == year)
            .filter(|scene| region.intersects(&scene.footprint()))
            .collect();

        debug!(
            "archive query year={} matched {} of {} scenes",
            year,
            selected.len(),
            self.scenes.len()
        );
        Ok(selected)
    }
}
