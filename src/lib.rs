// src/lib.rs
pub mod archive;
pub mod batch;
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod io;
pub mod processing;
pub mod raster;

pub use archive::{MemoryArchive, SceneArchive};
pub use config::EngineConfig;
pub use engine::Engine;
pub use error::{ArchiveError, EngineError, Result};

// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
